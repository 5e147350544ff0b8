//! Deterministic classification of inbound chat messages.
//!
//! Every user turn is classified against the current session state with a
//! fixed order of checks, first match wins: danger content, the termination
//! token, change commands, mode switches, then answer or selection depending
//! on where the conversation stands. The classifier is pure; it never
//! mutates the session.

use crate::safety;
use crate::session::{InterviewMode, Session, SessionPhase};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use regex::Regex;
use std::sync::LazyLock;

#[derive(Debug, Clone, PartialEq)]
pub enum UserIntent {
    /// Self-harm phrasing; overrides everything else.
    SafetyStop,
    /// The whole-message `END INTERVIEW` token.
    Terminate,
    /// "change domain" with an optional inline target.
    ChangeDomain(Option<String>),
    /// "change topic" with an optional inline target.
    ChangeTopic(Option<String>),
    /// "switch to cv/domain interview".
    SwitchMode(InterviewMode),
    /// Free text while a question is pending.
    Answer(String),
    /// Free text while the session sits in a selection stage.
    Selection(String),
    /// Anything else; handled with a contextual re-prompt.
    Other,
}

static CHANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^change\s+(?:the\s+|my\s+)?(domain|topic)(?:\s+to\s+(.+?))?\s*$")
        .expect("valid pattern")
});

static SWITCH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^switch\s+(?:to\s+)?(?:an?\s+|the\s+)?(cv|resume|domain)(?:[\s-]*(?:based|specific))?(?:\s+(?:interview|mode|flow))?$",
    )
    .expect("valid pattern")
});

/// Whole-message match for the termination command, case-insensitive and
/// tolerant of surrounding or repeated whitespace.
pub fn is_termination(text: &str) -> bool {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.eq_ignore_ascii_case("end interview")
}

pub fn classify(text: &str, session: &Session) -> UserIntent {
    if safety::is_danger(text) {
        return UserIntent::SafetyStop;
    }
    let trimmed = text.trim();
    if is_termination(trimmed) {
        return UserIntent::Terminate;
    }
    if let Some(caps) = CHANGE_RE.captures(trimmed) {
        let target = caps.get(2).map(|m| m.as_str().trim().to_string());
        return match &caps[1].to_lowercase()[..] {
            "domain" => UserIntent::ChangeDomain(target),
            _ => UserIntent::ChangeTopic(target),
        };
    }
    if let Some(caps) = SWITCH_RE.captures(trimmed) {
        let mode = match &caps[1].to_lowercase()[..] {
            "domain" => InterviewMode::DomainBased,
            _ => InterviewMode::CvBased,
        };
        return UserIntent::SwitchMode(mode);
    }
    if session.pending.is_some() {
        return UserIntent::Answer(trimmed.to_string());
    }
    if matches!(
        session.phase,
        SessionPhase::ModeSelect | SessionPhase::DomainSelect | SessionPhase::TopicSelect
    ) {
        return UserIntent::Selection(trimmed.to_string());
    }
    UserIntent::Other
}

const MIN_FUZZY_SCORE: i64 = 50;
const AMBIGUITY_MARGIN: i64 = 10;

/// Resolves free-text input against a list of offered choices.
///
/// Exact case-insensitive matches win outright; otherwise the best fuzzy
/// match is taken when it is both strong enough and unambiguous. Input that
/// matches nothing (or several things equally well) resolves to `None` and
/// the caller re-prompts.
pub fn resolve_choice(input: &str, candidates: &[String]) -> Option<usize> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if let Some(idx) = candidates
        .iter()
        .position(|c| c.trim().eq_ignore_ascii_case(input))
    {
        return Some(idx);
    }

    let matcher = SkimMatcherV2::default();
    let mut scored: Vec<(i64, usize)> = candidates
        .iter()
        .enumerate()
        .filter_map(|(idx, c)| matcher.fuzzy_match(c, input).map(|score| (score, idx)))
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    match scored.as_slice() {
        [] => None,
        [(score, idx)] if *score >= MIN_FUZZY_SCORE => Some(*idx),
        [(best, idx), (second, _), ..]
            if *best >= MIN_FUZZY_SCORE && *best - *second >= AMBIGUITY_MARGIN =>
        {
            Some(*idx)
        }
        _ => None,
    }
}
