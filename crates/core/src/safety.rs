//! Danger-content screen.
//!
//! Screening runs before any other classification of an inbound message. A
//! match moves the session into its terminal safety state and the fixed
//! helpline message below is the only directive ever emitted afterwards.

/// The fixed response for a safety stop. Never varied, never model-generated.
pub const HELPLINE_MESSAGE: &str = "I'm stopping the interview here, because what you wrote matters more than any practice session. If you are having thoughts of harming yourself, please reach out right now: AASRA at +91 98204 66726, iCall at +91 91529 87821, or your local emergency services. You are not alone, and a trained counsellor can help.";

const DANGER_PHRASES: &[&str] = &[
    "kill myself",
    "end my life",
    "take my own life",
    "suicide",
    "suicidal",
    "hurt myself",
    "harm myself",
    "harming myself",
    "self-harm",
    "self harm",
    "want to die",
    "better off dead",
];

/// Returns true when the message contains self-harm phrasing.
pub fn is_danger(text: &str) -> bool {
    let normalized = text.to_lowercase();
    DANGER_PHRASES
        .iter()
        .any(|phrase| normalized.contains(phrase))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_self_harm_phrasing() {
        assert!(is_danger("I want to KILL MYSELF"));
        assert!(is_danger("honestly feeling suicidal today"));
        assert!(is_danger("I keep thinking about self-harm"));
    }

    #[test]
    fn ignores_ordinary_interview_answers() {
        assert!(!is_danger("The NPV is negative, so I would kill the project."));
        assert!(!is_danger("We should end the campaign early."));
        assert!(!is_danger("END INTERVIEW"));
    }
}
