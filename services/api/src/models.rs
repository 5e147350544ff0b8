//! API and Database Models
//!
//! This module defines the core data structures used for both database mapping
//! with `sqlx` and for generating OpenAPI documentation with `utoipa`.

use chrono::{DateTime, Utc};
use interview_core::session::InterviewMode;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(sqlx::Type, Debug, Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq)]
#[sqlx(type_name = "session_status", rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Ended,
    SafetyStopped,
}

#[derive(sqlx::Type, Debug, Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq)]
#[sqlx(type_name = "message_role", rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

// Implement Display for easy conversion to a string, useful for logging and debugging.
impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// The interview mode as stored on the session row.
#[derive(sqlx::Type, Debug, Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq)]
#[sqlx(type_name = "interview_mode", rename_all = "snake_case")]
pub enum InterviewModeKind {
    CvBased,
    DomainBased,
}

impl From<InterviewModeKind> for InterviewMode {
    fn from(kind: InterviewModeKind) -> Self {
        match kind {
            InterviewModeKind::CvBased => InterviewMode::CvBased,
            InterviewModeKind::DomainBased => InterviewMode::DomainBased,
        }
    }
}

impl From<InterviewMode> for InterviewModeKind {
    fn from(mode: InterviewMode) -> Self {
        match mode {
            InterviewMode::CvBased => InterviewModeKind::CvBased,
            InterviewMode::DomainBased => InterviewModeKind::DomainBased,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, FromRow, Debug, Clone)]
pub struct InterviewSession {
    #[schema(value_type = String, format = Uuid)]
    pub id: Uuid,
    pub user_id: String,
    #[schema(value_type = Option<String>, example = "domain_based")]
    pub mode: Option<InterviewModeKind>,
    #[schema(value_type = String, example = "active")]
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, ToSchema, FromRow, Debug, Clone)]
pub struct Message {
    pub id: i64,
    #[schema(value_type = String, format = Uuid)]
    pub session_id: Uuid,
    #[schema(value_type = String, example = "user")]
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateSessionPayload {
    /// Pre-determines the interview mode; omitted means the assistant asks.
    #[schema(value_type = Option<String>, example = "cv_based")]
    pub mode: Option<InterviewModeKind>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateSessionStatusPayload {
    #[schema(example = "ended")]
    pub status: SessionStatus,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_status_round_trip() {
        for status in [
            SessionStatus::Active,
            SessionStatus::Ended,
            SessionStatus::SafetyStopped,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            let back: SessionStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(back, status);
        }
    }

    #[test]
    fn test_message_role_display() {
        assert_eq!(format!("{}", MessageRole::User), "user");
        assert_eq!(format!("{}", MessageRole::Assistant), "assistant");
    }

    #[test]
    fn test_mode_kind_converts_both_ways() {
        assert_eq!(
            InterviewMode::from(InterviewModeKind::CvBased),
            InterviewMode::CvBased
        );
        assert_eq!(
            InterviewModeKind::from(InterviewMode::DomainBased),
            InterviewModeKind::DomainBased
        );
    }

    #[test]
    fn test_session_serialization_round_trip() {
        let now = Utc::now();
        let session = InterviewSession {
            id: Uuid::new_v4(),
            user_id: "student_42".to_string(),
            mode: Some(InterviewModeKind::DomainBased),
            status: SessionStatus::Active,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_string(&session).unwrap();
        let deserialized: InterviewSession = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.id, session.id);
        assert_eq!(deserialized.user_id, session.user_id);
        assert_eq!(deserialized.mode, session.mode);
        assert_eq!(deserialized.status, session.status);
    }

    #[test]
    fn test_message_serialization_round_trip() {
        let message = Message {
            id: 42,
            session_id: Uuid::new_v4(),
            role: MessageRole::User,
            content: "Walk me through a DCF.".to_string(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&message).unwrap();
        let deserialized: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.id, message.id);
        assert_eq!(deserialized.session_id, message.session_id);
        assert_eq!(deserialized.role, message.role);
        assert_eq!(deserialized.content, message.content);
    }

    #[test]
    fn test_create_session_payload_mode_is_optional() {
        let payload: CreateSessionPayload = serde_json::from_str(r#"{}"#).unwrap();
        assert!(payload.mode.is_none());

        let payload: CreateSessionPayload =
            serde_json::from_str(r#"{"mode": "CvBased"}"#).unwrap();
        assert_eq!(payload.mode, Some(InterviewModeKind::CvBased));
    }

    #[test]
    fn test_invalid_enum_deserialization() {
        let result: Result<SessionStatus, _> = serde_json::from_str(r#""Paused""#);
        assert!(result.is_err());

        let result: Result<MessageRole, _> = serde_json::from_str(r#""system""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_error_response_serialization() {
        let error = ErrorResponse {
            message: "Session not found".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&error).unwrap(),
            r#"{"message":"Session not found"}"#
        );
    }
}
