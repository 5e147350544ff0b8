//! Session state for one mock interview.
//!
//! A [`Session`] is the unit the controller owns for the lifetime of an
//! interview: which stage the conversation is in, what has been asked, what
//! has been answered, and the one question currently awaiting an answer. The
//! whole struct is serde-serializable and a restored snapshot resumes the
//! interview exactly where it left off.

use crate::cv::CvProfile;
use crate::domain::Domain;
use crate::grading::Grade;
use crate::question::Question;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewMode {
    CvBased,
    DomainBased,
}

impl fmt::Display for InterviewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterviewMode::CvBased => write!(f, "cv-based"),
            InterviewMode::DomainBased => write!(f, "domain-based"),
        }
    }
}

/// The stages of the interview state machine.
///
/// `SafetyStopped` and `Terminated` are absorbing: once entered, the session
/// only ever re-emits its terminal message and a new session is required to
/// continue practising.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    ModeSelect,
    DomainSelect,
    TopicSelect,
    Questioning,
    SafetyStopped,
    Terminated,
}

/// One answered question, immutable once recorded.
///
/// A record exists only for questions that were actually answered; a question
/// still pending when the interview ends is discarded, never scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaRecord {
    pub question: Question,
    pub answer: String,
    pub grade: Grade,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub mode: Option<InterviewMode>,
    pub phase: SessionPhase,
    pub selected_domain: Option<Domain>,
    pub selected_topic: Option<String>,
    pub answered: Vec<QaRecord>,
    pub pending: Option<Question>,
    /// IDs of every question issued so far, excluded from later retrieval.
    pub asked: HashSet<String>,
    pub cv: Option<CvProfile>,
}

impl Session {
    /// A fresh session with the mode still to be chosen.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            mode: None,
            phase: SessionPhase::ModeSelect,
            selected_domain: None,
            selected_topic: None,
            answered: Vec::new(),
            pending: None,
            asked: HashSet::new(),
            cv: None,
        }
    }

    /// A session whose mode was pre-determined by the entry point.
    ///
    /// Domain-based sessions start at domain selection; CV-based sessions
    /// stay in mode selection until a valid CV artifact arrives.
    pub fn with_mode(mode: InterviewMode) -> Self {
        let mut session = Self::new();
        session.mode = Some(mode);
        session.phase = match mode {
            InterviewMode::DomainBased => SessionPhase::DomainSelect,
            InterviewMode::CvBased => SessionPhase::ModeSelect,
        };
        session
    }

    pub fn is_active(&self) -> bool {
        !matches!(
            self.phase,
            SessionPhase::Terminated | SessionPhase::SafetyStopped
        )
    }

    /// Sets the domain, clearing any topic chosen for a previous domain.
    pub fn set_domain(&mut self, domain: Domain) {
        if self.selected_domain != Some(domain) {
            self.selected_topic = None;
        }
        self.selected_domain = Some(domain);
    }

    /// Clears the domain; the topic cannot outlive it.
    pub fn clear_domain(&mut self) {
        self.selected_domain = None;
        self.selected_topic = None;
    }

    /// Drops the pending question without scoring it.
    pub fn discard_pending(&mut self) -> Option<Question> {
        self.pending.take()
    }

    /// Issues a question: records its ID and makes it the pending one.
    ///
    /// A new question is never issued while another is pending.
    pub fn issue(&mut self, question: Question) {
        debug_assert!(self.pending.is_none());
        self.asked.insert(question.id.clone());
        self.pending = Some(question);
    }

    /// Closes the pending question into an immutable record.
    pub fn record_answer(&mut self, question: Question, answer: String, grade: Grade) {
        self.answered.push(QaRecord {
            question,
            answer,
            grade,
        });
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::{SourceCitation, SourceKind};

    fn question(id: &str) -> Question {
        Question {
            id: id.to_string(),
            text: "What drives working capital?".to_string(),
            category: "Corporate Finance".to_string(),
            citation: SourceCitation {
                title: "Finance Primer".to_string(),
                kind: SourceKind::Primer,
                url: None,
                company: None,
                year: None,
                interviewee: None,
            },
            options: vec![],
        }
    }

    #[test]
    fn new_session_awaits_mode_selection() {
        let session = Session::new();
        assert_eq!(session.phase, SessionPhase::ModeSelect);
        assert_eq!(session.mode, None);
        assert!(session.is_active());
    }

    #[test]
    fn domain_mode_entry_point_skips_mode_selection() {
        let session = Session::with_mode(InterviewMode::DomainBased);
        assert_eq!(session.phase, SessionPhase::DomainSelect);
    }

    #[test]
    fn cv_mode_entry_point_waits_for_artifact() {
        let session = Session::with_mode(InterviewMode::CvBased);
        assert_eq!(session.phase, SessionPhase::ModeSelect);
        assert_eq!(session.mode, Some(InterviewMode::CvBased));
    }

    #[test]
    fn changing_domain_clears_topic() {
        let mut session = Session::new();
        session.set_domain(Domain::Finance);
        session.selected_topic = Some("Valuation".to_string());

        session.set_domain(Domain::Finance);
        assert_eq!(session.selected_topic, Some("Valuation".to_string()));

        session.set_domain(Domain::Marketing);
        assert_eq!(session.selected_topic, None);

        session.clear_domain();
        assert_eq!(session.selected_domain, None);
        assert_eq!(session.selected_topic, None);
    }

    #[test]
    fn issuing_tracks_the_exclusion_set() {
        let mut session = Session::new();
        session.issue(question("fin-001"));
        assert!(session.asked.contains("fin-001"));
        assert_eq!(session.pending.as_ref().unwrap().id, "fin-001");
    }

    #[test]
    fn snapshot_round_trip_preserves_pending_and_ledger() {
        let mut session = Session::with_mode(InterviewMode::DomainBased);
        session.set_domain(Domain::Finance);
        session.selected_topic = Some("Generic".to_string());
        session.phase = SessionPhase::Questioning;
        session.issue(question("fin-001"));
        let pending = session.discard_pending().unwrap();
        session.record_answer(
            pending,
            "Receivables, payables and inventory.".to_string(),
            Grade {
                score: 7,
                is_correct: true,
                correct_answer: "The cash conversion cycle components.".to_string(),
                feedback: None,
            },
        );
        session.issue(question("fin-002"));

        let json = serde_json::to_string(&session).unwrap();
        let restored: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, session);
        assert_eq!(restored.pending.as_ref().unwrap().id, "fin-002");
        assert_eq!(restored.answered.len(), 1);
    }
}
