//! End-of-interview scoring and the consolidated feedback report.
//!
//! The report is derived once, at termination, from the answered-question
//! ledger. Questions that were pending but never answered are not part of
//! the ledger and therefore never appear here.

use crate::domain::Domain;
use crate::question::SourceCitation;
use crate::session::{InterviewMode, QaRecord, Session};
use serde::{Deserialize, Serialize};

/// How "correct" is derived from a grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectnessRule {
    /// Trust the grader's explicit `is_correct` flag.
    GraderFlag,
    /// Derive correctness from `score > 0`.
    PositiveScore,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    pub correctness: CorrectnessRule,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            correctness: CorrectnessRule::GraderFlag,
        }
    }
}

impl ScoringPolicy {
    pub fn is_correct(&self, record: &QaRecord) -> bool {
        match self.correctness {
            CorrectnessRule::GraderFlag => record.grade.is_correct,
            CorrectnessRule::PositiveScore => record.grade.score > 0,
        }
    }
}

/// One row of the per-question breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionBreakdown {
    pub question: String,
    pub user_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
    pub score: u8,
    pub category: String,
    pub citation: SourceCitation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

/// Accuracy rollup for one question category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: String,
    pub total: u32,
    pub correct: u32,
}

/// The consolidated feedback produced when an interview terminates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackReport {
    pub total_questions: u32,
    pub correct_answers: u32,
    pub incorrect_answers: u32,
    /// Sum of per-question scores, each in 0..=10.
    pub score: u32,
    /// Percentage of answered questions judged correct; 0.0 for an empty
    /// ledger rather than a division by zero.
    pub accuracy: f64,
    pub domain: Option<Domain>,
    pub topic: Option<String>,
    pub mode: Option<InterviewMode>,
    pub breakdown: Vec<QuestionBreakdown>,
    pub categories: Vec<CategoryScore>,
}

impl FeedbackReport {
    pub fn from_session(session: &Session, policy: &ScoringPolicy) -> Self {
        let total = session.answered.len() as u32;
        let correct = session
            .answered
            .iter()
            .filter(|r| policy.is_correct(r))
            .count() as u32;
        let score = session
            .answered
            .iter()
            .map(|r| u32::from(r.grade.score))
            .sum();
        let accuracy = if total == 0 {
            0.0
        } else {
            f64::from(correct) / f64::from(total) * 100.0
        };

        let breakdown = session
            .answered
            .iter()
            .map(|r| QuestionBreakdown {
                question: r.question.text.clone(),
                user_answer: r.answer.clone(),
                correct_answer: r.grade.correct_answer.clone(),
                is_correct: policy.is_correct(r),
                score: r.grade.score,
                category: r.question.category.clone(),
                citation: r.question.citation.clone(),
                feedback: r.grade.feedback.clone(),
            })
            .collect();

        let mut categories: Vec<CategoryScore> = Vec::new();
        for record in &session.answered {
            let correct = policy.is_correct(record);
            match categories
                .iter_mut()
                .find(|c| c.category == record.question.category)
            {
                Some(entry) => {
                    entry.total += 1;
                    if correct {
                        entry.correct += 1;
                    }
                }
                None => categories.push(CategoryScore {
                    category: record.question.category.clone(),
                    total: 1,
                    correct: u32::from(correct),
                }),
            }
        }

        FeedbackReport {
            total_questions: total,
            correct_answers: correct,
            incorrect_answers: total - correct,
            score,
            accuracy,
            domain: session.selected_domain,
            topic: session.selected_topic.clone(),
            mode: session.mode,
            breakdown,
            categories,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::Grade;
    use crate::question::{Question, SourceKind};
    use crate::session::SessionPhase;

    fn record(id: &str, category: &str, score: u8, is_correct: bool) -> QaRecord {
        QaRecord {
            question: Question {
                id: id.to_string(),
                text: format!("question {id}"),
                category: category.to_string(),
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
            answer: "answer".to_string(),
            grade: Grade {
                score,
                is_correct,
                correct_answer: "reference".to_string(),
                feedback: None,
            },
        }
    }

    fn session_with(records: Vec<QaRecord>) -> Session {
        let mut session = Session::with_mode(InterviewMode::DomainBased);
        session.set_domain(Domain::Finance);
        session.selected_topic = Some("Generic".to_string());
        session.phase = SessionPhase::Questioning;
        session.answered = records;
        session
    }

    #[test]
    fn empty_ledger_reports_zero_accuracy() {
        let report = FeedbackReport::from_session(&session_with(vec![]), &ScoringPolicy::default());
        assert_eq!(report.total_questions, 0);
        assert_eq!(report.correct_answers, 0);
        assert_eq!(report.accuracy, 0.0);
        assert!(report.breakdown.is_empty());
    }

    #[test]
    fn single_correct_answer_reports_full_accuracy() {
        let session = session_with(vec![record("fin-001", "Valuation", 8, true)]);
        let report = FeedbackReport::from_session(&session, &ScoringPolicy::default());
        assert_eq!(report.total_questions, 1);
        assert_eq!(report.correct_answers, 1);
        assert_eq!(report.incorrect_answers, 0);
        assert_eq!(report.score, 8);
        assert_eq!(report.accuracy, 100.0);
        assert_eq!(report.domain, Some(Domain::Finance));
    }

    #[test]
    fn mixed_ledger_aggregates_scores_and_categories() {
        let session = session_with(vec![
            record("fin-001", "Valuation", 8, true),
            record("fin-002", "Valuation", 0, false),
            record("fin-003", "Accounting", 6, true),
            record("fin-004", "Accounting", 10, true),
        ]);
        let report = FeedbackReport::from_session(&session, &ScoringPolicy::default());
        assert_eq!(report.total_questions, 4);
        assert_eq!(report.correct_answers, 3);
        assert_eq!(report.incorrect_answers, 1);
        assert_eq!(report.score, 24);
        assert_eq!(report.accuracy, 75.0);
        assert_eq!(
            report.categories,
            vec![
                CategoryScore {
                    category: "Valuation".to_string(),
                    total: 2,
                    correct: 1
                },
                CategoryScore {
                    category: "Accounting".to_string(),
                    total: 2,
                    correct: 2
                },
            ]
        );
    }

    #[test]
    fn positive_score_rule_overrides_the_grader_flag() {
        // A grader glitch: flag says incorrect but the score is positive.
        let session = session_with(vec![record("fin-001", "Valuation", 5, false)]);
        let by_flag = FeedbackReport::from_session(&session, &ScoringPolicy::default());
        assert_eq!(by_flag.correct_answers, 0);

        let by_score = FeedbackReport::from_session(
            &session,
            &ScoringPolicy {
                correctness: CorrectnessRule::PositiveScore,
            },
        );
        assert_eq!(by_score.correct_answers, 1);
    }
}
