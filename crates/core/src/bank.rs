//! Question sourcing contract.
//!
//! Questions come exclusively from a fixed internal corpus (interview
//! transcripts, casebooks, primers, formula sheets); the controller never
//! fabricates question text. The shipped [`StaticQuestionBank`] loads that
//! corpus from a JSON file at startup.

use crate::cv::CvProfile;
use crate::domain::Domain;
use crate::question::Question;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// What the next question should be drawn for.
#[derive(Debug, Clone, PartialEq)]
pub enum QuestionQuery {
    /// Domain-based retrieval; `topic` of `None` means Generic, no
    /// sub-filtering within the domain.
    DomainTopic {
        domain: Domain,
        topic: Option<String>,
    },
    /// CV-based retrieval, personalised from the uploaded profile.
    Cv(CvProfile),
}

/// Defines the contract for the internal question repository.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionBank: Send + Sync {
    /// Topics available for a domain, not including the synthetic "Generic"
    /// entry the controller always offers first.
    async fn list_topics(&self, domain: Domain) -> Result<Vec<String>>;

    /// The next unasked question for `query`, or `None` when the repository
    /// has nothing further to offer.
    async fn next_question(
        &self,
        query: &QuestionQuery,
        excluding: &HashSet<String>,
    ) -> Result<Option<Question>>;
}

/// One corpus entry: a question plus the retrieval metadata used to route it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<Domain>,
    /// Topics within the domain this question belongs to; an empty list means
    /// the question only surfaces under Generic.
    #[serde(default)]
    pub topics: Vec<String>,
    /// Whether the question suits a CV-based interview.
    #[serde(default)]
    pub cv_suitable: bool,
    #[serde(flatten)]
    pub question: Question,
}

/// An in-memory [`QuestionBank`] over a JSON corpus file.
///
/// Corpus order is priority order: retrieval returns the first matching entry
/// not yet asked, so curators control sequencing by arrangement.
pub struct StaticQuestionBank {
    entries: Vec<CorpusEntry>,
}

impl StaticQuestionBank {
    pub fn new(entries: Vec<CorpusEntry>) -> Self {
        Self { entries }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let entries: Vec<CorpusEntry> =
            serde_json::from_str(json).context("Failed to parse question corpus")?;
        Ok(Self::new(entries))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read question corpus at {}", path.display()))?;
        Self::from_json(&json)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn matches(entry: &CorpusEntry, query: &QuestionQuery) -> bool {
        match query {
            QuestionQuery::DomainTopic { domain, topic } => {
                if entry.domain != Some(*domain) {
                    return false;
                }
                match topic {
                    None => true,
                    Some(topic) => entry
                        .topics
                        .iter()
                        .any(|t| t.eq_ignore_ascii_case(topic)),
                }
            }
            QuestionQuery::Cv(_) => entry.cv_suitable,
        }
    }
}

#[async_trait]
impl QuestionBank for StaticQuestionBank {
    async fn list_topics(&self, domain: Domain) -> Result<Vec<String>> {
        let mut topics: Vec<String> = Vec::new();
        for entry in self.entries.iter().filter(|e| e.domain == Some(domain)) {
            for topic in &entry.topics {
                if !topics.iter().any(|t| t.eq_ignore_ascii_case(topic)) {
                    topics.push(topic.clone());
                }
            }
        }
        topics.sort();
        Ok(topics)
    }

    async fn next_question(
        &self,
        query: &QuestionQuery,
        excluding: &HashSet<String>,
    ) -> Result<Option<Question>> {
        Ok(self
            .entries
            .iter()
            .filter(|e| Self::matches(e, query))
            .find(|e| !excluding.contains(&e.question.id))
            .map(|e| e.question.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cv::CvContentType;
    use crate::question::{SourceCitation, SourceKind};

    fn entry(id: &str, domain: Option<Domain>, topics: &[&str], cv_suitable: bool) -> CorpusEntry {
        CorpusEntry {
            domain,
            topics: topics.iter().map(|t| t.to_string()).collect(),
            cv_suitable,
            question: Question {
                id: id.to_string(),
                text: format!("question {id}"),
                category: "General".to_string(),
                citation: SourceCitation {
                    title: "Casebook".to_string(),
                    kind: SourceKind::Casebook,
                    url: None,
                    company: None,
                    year: None,
                    interviewee: None,
                },
                options: vec![],
            },
        }
    }

    fn bank() -> StaticQuestionBank {
        StaticQuestionBank::new(vec![
            entry("fin-001", Some(Domain::Finance), &["Valuation"], false),
            entry("fin-002", Some(Domain::Finance), &["Valuation", "M&A"], false),
            entry("fin-003", Some(Domain::Finance), &[], false),
            entry("mkt-001", Some(Domain::Marketing), &["Brand Management"], false),
            entry("cv-001", None, &[], true),
        ])
    }

    #[tokio::test]
    async fn topics_are_deduplicated_and_sorted() {
        let topics = bank().list_topics(Domain::Finance).await.unwrap();
        assert_eq!(topics, vec!["M&A".to_string(), "Valuation".to_string()]);
    }

    #[tokio::test]
    async fn generic_query_spans_the_whole_domain() {
        let query = QuestionQuery::DomainTopic {
            domain: Domain::Finance,
            topic: None,
        };
        let q = bank()
            .next_question(&query, &HashSet::new())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(q.id, "fin-001");
    }

    #[tokio::test]
    async fn topic_query_filters_within_the_domain() {
        let query = QuestionQuery::DomainTopic {
            domain: Domain::Finance,
            topic: Some("m&a".to_string()),
        };
        let q = bank()
            .next_question(&query, &HashSet::new())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(q.id, "fin-002");
    }

    #[tokio::test]
    async fn exclusion_set_advances_through_the_corpus() {
        let query = QuestionQuery::DomainTopic {
            domain: Domain::Finance,
            topic: None,
        };
        let excluding: HashSet<String> =
            ["fin-001", "fin-002"].iter().map(|s| s.to_string()).collect();
        let q = bank()
            .next_question(&query, &excluding)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(q.id, "fin-003");
    }

    #[tokio::test]
    async fn exhausted_selection_returns_none() {
        let query = QuestionQuery::DomainTopic {
            domain: Domain::Marketing,
            topic: Some("Brand Management".to_string()),
        };
        let excluding: HashSet<String> = ["mkt-001".to_string()].into_iter().collect();
        assert_eq!(bank().next_question(&query, &excluding).await.unwrap(), None);
    }

    #[tokio::test]
    async fn cv_query_only_surfaces_cv_suitable_entries() {
        let profile = CvProfile {
            filename: "cv.pdf".to_string(),
            content_type: CvContentType::Pdf,
            size_bytes: 1024,
            summary: None,
        };
        let q = bank()
            .next_question(&QuestionQuery::Cv(profile), &HashSet::new())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(q.id, "cv-001");
    }

    #[test]
    fn corpus_parses_from_json() {
        let json = r#"[
            {
                "domain": "Finance",
                "topics": ["Valuation"],
                "id": "fin-010",
                "text": "How would you value a loss-making startup?",
                "category": "Valuation",
                "citation": {"title": "Finance Casebook", "kind": "casebook"}
            }
        ]"#;
        let bank = StaticQuestionBank::from_json(json).unwrap();
        assert_eq!(bank.len(), 1);
    }
}
