//! Defines the WebSocket message protocol between the browser client and the API server.

use crate::models;
use interview_core::{Directive, session::Session};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Messages sent from the client (browser) to the server.
#[derive(Deserialize, Debug)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Resumes a session. This must be the first message.
    #[serde(rename = "init")]
    Init {
        /// The unique identifier of the session to resume.
        session_id: Uuid,
    },
    /// A text message from the user to the interviewer.
    #[serde(rename = "user_message")]
    UserMessage { text: String },
    /// Announces a CV upload; the file bytes follow in one binary frame.
    #[serde(rename = "cv_upload")]
    CvUpload {
        filename: String,
        content_type: String,
    },
}

/// Messages sent from the server to the client (browser).
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Confirms successful session resumption and provides the current state.
    Initialized {
        session_id: Uuid,
        session: Session,
        history: Vec<models::Message>,
    },
    /// The controller's presentation directive for this turn.
    Directive { directive: Directive },
    /// Reports a fatal error to the client.
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_message_parses() {
        let id = Uuid::new_v4();
        let json = format!(r#"{{"type": "init", "session_id": "{id}"}}"#);
        let msg: ClientMessage = serde_json::from_str(&json).unwrap();
        match msg {
            ClientMessage::Init { session_id } => assert_eq!(session_id, id),
            other => panic!("expected init, got {other:?}"),
        }
    }

    #[test]
    fn user_message_parses() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type": "user_message", "text": "Finance"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::UserMessage { text } if text == "Finance"));
    }

    #[test]
    fn cv_upload_announcement_parses() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type": "cv_upload", "filename": "cv.pdf", "content_type": "application/pdf"}"#,
        )
        .unwrap();
        assert!(matches!(msg, ClientMessage::CvUpload { .. }));
    }

    #[test]
    fn directive_message_is_tagged() {
        let msg = ServerMessage::Directive {
            directive: Directive::Plain {
                text: "hello".to_string(),
            },
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "directive");
        assert_eq!(json["directive"]["type"], "plain");
    }
}
