use serde::{Deserialize, Serialize};

/// Where a question was sourced from inside the internal repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Transcript,
    Casebook,
    Primer,
    FormulaSheet,
}

/// A citation back into the internal interview-preparation repository.
///
/// Transcript citations additionally carry the company, interview year and
/// interviewee so the final feedback can reference them inline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceCitation {
    pub title: String,
    pub kind: SourceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interviewee: Option<String>,
}

impl SourceCitation {
    /// Inline markdown rendering, `[label](url)` when a URL is available.
    pub fn markdown(&self) -> String {
        let mut label = self.title.clone();
        let mut details = Vec::new();
        if let Some(company) = &self.company {
            details.push(company.clone());
        }
        if let Some(year) = self.year {
            details.push(year.to_string());
        }
        if let Some(interviewee) = &self.interviewee {
            details.push(interviewee.clone());
        }
        if !details.is_empty() {
            label = format!("{} ({})", label, details.join(", "));
        }
        match &self.url {
            Some(url) => format!("[{label}]({url})"),
            None => label,
        }
    }
}

/// One option of a multiple-choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McqOption {
    pub id: String,
    pub text: String,
}

/// A single interview question drawn from the internal repository.
///
/// `options` is non-empty only for questions the repository itself stores as
/// multiple choice; open-ended questions are never reshaped into that form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    pub category: String,
    pub citation: SourceCitation,
    #[serde(default)]
    pub options: Vec<McqOption>,
}

impl Question {
    pub fn is_multiple_choice(&self) -> bool {
        !self.options.is_empty()
    }
}
