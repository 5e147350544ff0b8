//! Core protocol for MBA mock-interview sessions.
//!
//! This crate owns the interview session state machine: mode and
//! domain/topic selection, one-question-at-a-time pacing, the answer ledger,
//! and end-of-interview scoring. Everything with a side effect lives behind
//! a collaborator trait ([`bank::QuestionBank`], [`grading::Grader`]) so the
//! controller's transitions stay deterministic and unit-testable.

pub mod bank;
pub mod classify;
pub mod controller;
pub mod cv;
pub mod domain;
pub mod grading;
pub mod question;
pub mod report;
pub mod safety;
pub mod session;

use crate::question::{McqOption, SourceCitation};
use crate::report::FeedbackReport;
use serde::{Deserialize, Serialize};

/// The single outbound presentation directive produced for each user turn.
///
/// This enum is the primary API for decoupling the controller's decisions
/// from whatever renders them; the rendering side is also responsible for
/// turning user interaction back into a plain inbound message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Directive {
    /// Pose a free-text question.
    AskQuestion {
        text: String,
        citation: SourceCitation,
    },
    /// Pose a multiple-choice question.
    AskMcq {
        question_id: String,
        text: String,
        options: Vec<McqOption>,
    },
    /// Offer the domain/topic selector.
    ShowDomainTopicSelector {
        domains: Vec<String>,
        topics: Vec<String>,
    },
    /// The consolidated end-of-interview feedback.
    Report { report: FeedbackReport },
    /// A plain message: re-prompts, refusals, the helpline text.
    Plain { text: String },
}

impl Directive {
    /// Plain-text rendering of the directive for the conversation history.
    pub fn transcript_text(&self) -> String {
        match self {
            Directive::AskQuestion { text, .. } => text.clone(),
            Directive::AskMcq { text, options, .. } => {
                let mut lines = vec![text.clone()];
                for option in options {
                    lines.push(format!("{}: {}", option.id, option.text));
                }
                lines.join("\n")
            }
            Directive::ShowDomainTopicSelector { .. } => {
                "Please select a domain and topic for your interview.".to_string()
            }
            Directive::Report { report } => format!(
                "Interview feedback: {} of {} answers correct, total score {}, accuracy {:.1}%.",
                report.correct_answers, report.total_questions, report.score, report.accuracy
            ),
            Directive::Plain { text } => text.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::SourceKind;

    #[test]
    fn directive_serialization_is_tagged() {
        let directive = Directive::Plain {
            text: "hello".to_string(),
        };
        let json = serde_json::to_value(&directive).unwrap();
        assert_eq!(json["type"], "plain");
        assert_eq!(json["text"], "hello");
    }

    #[test]
    fn ask_question_round_trips() {
        let directive = Directive::AskQuestion {
            text: "Walk me through a DCF.".to_string(),
            citation: SourceCitation {
                title: "Finance Primer".to_string(),
                kind: SourceKind::Primer,
                url: None,
                company: None,
                year: None,
                interviewee: None,
            },
        };
        let json = serde_json::to_string(&directive).unwrap();
        let back: Directive = serde_json::from_str(&json).unwrap();
        assert_eq!(back, directive);
    }

    #[test]
    fn mcq_transcript_lists_options() {
        let directive = Directive::AskMcq {
            question_id: "fin-001".to_string(),
            text: "Which rate discounts FCFF?".to_string(),
            options: vec![
                McqOption {
                    id: "a".to_string(),
                    text: "Cost of equity".to_string(),
                },
                McqOption {
                    id: "b".to_string(),
                    text: "WACC".to_string(),
                },
            ],
        };
        assert_eq!(
            directive.transcript_text(),
            "Which rate discounts FCFF?\na: Cost of equity\nb: WACC"
        );
    }
}
