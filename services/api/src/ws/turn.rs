//! Runs one controller turn per inbound client message.
//!
//! Each turn persists the user message, advances the session controller,
//! snapshots the resulting state, and records the assistant-facing reply, in
//! that order, so a reconnecting client always resumes from the last
//! completed turn.

use crate::{
    models::{MessageRole, SessionStatus},
    state::AppState,
};
use anyhow::Result;
use interview_core::{
    Directive,
    cv::CvUpload,
    session::{Session, SessionPhase},
};
use tracing::info;

pub async fn handle_user_turn(
    state: &AppState,
    snapshot: &mut Session,
    text: &str,
) -> Result<Directive> {
    state
        .db
        .add_message(snapshot.id, MessageRole::User, text)
        .await?;
    let directive = state.controller.handle_message(snapshot, text).await?;
    finish_turn(state, snapshot, &directive).await?;
    Ok(directive)
}

pub async fn handle_cv_turn(
    state: &AppState,
    snapshot: &mut Session,
    upload: &CvUpload,
) -> Result<Directive> {
    state
        .db
        .add_message(
            snapshot.id,
            MessageRole::User,
            &format!("[uploaded CV: {}]", upload.filename),
        )
        .await?;
    let directive = state.controller.handle_cv_upload(snapshot, upload).await?;
    finish_turn(state, snapshot, &directive).await?;
    Ok(directive)
}

async fn finish_turn(state: &AppState, snapshot: &Session, directive: &Directive) -> Result<()> {
    state.db.save_snapshot(snapshot).await?;
    if let Some(status) = terminal_status(snapshot) {
        state.db.update_session_status(snapshot.id, status).await?;
        info!(?status, "session reached a terminal state");
    }
    state
        .db
        .add_message(
            snapshot.id,
            MessageRole::Assistant,
            &directive.transcript_text(),
        )
        .await?;
    Ok(())
}

fn terminal_status(snapshot: &Session) -> Option<SessionStatus> {
    match snapshot.phase {
        SessionPhase::Terminated => Some(SessionStatus::Ended),
        SessionPhase::SafetyStopped => Some(SessionStatus::SafetyStopped),
        _ => None,
    }
}
