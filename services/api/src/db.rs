//! Data Access Layer
//!
//! This module contains all the functions for interacting with the PostgreSQL
//! database. Controller state is persisted as append-only JSONB snapshots, one
//! per turn; restoring the latest snapshot resumes the interview exactly where
//! it left off.

use anyhow::Result;
use interview_core::session::Session;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{InterviewModeKind, InterviewSession, Message, MessageRole, SessionStatus};

/// A wrapper around the `PgPool` to provide a clear data access interface.
#[derive(Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    /// Creates a new `Db` instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Runs all pending `sqlx` migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Creates a new session row and its initial snapshot in one transaction.
    pub async fn create_session(
        &self,
        user_id: &str,
        snapshot: &Session,
    ) -> Result<InterviewSession> {
        let mut tx = self.pool.begin().await?;

        let mode: Option<InterviewModeKind> = snapshot.mode.map(Into::into);
        let session = sqlx::query_as::<_, InterviewSession>(
            r#"
            INSERT INTO interview_sessions (id, user_id, mode)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, mode, status, created_at, updated_at
            "#,
        )
        .bind(snapshot.id)
        .bind(user_id)
        .bind(mode)
        .fetch_one(&mut *tx)
        .await?;

        let state_json = serde_json::to_value(snapshot)?;
        sqlx::query("INSERT INTO session_snapshots (session_id, state_json) VALUES ($1, $2)")
            .bind(session.id)
            .bind(state_json)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(session)
    }

    /// Retrieves a single session by its ID, scoped to a specific user.
    pub async fn get_session(
        &self,
        session_id: Uuid,
        user_id: &str,
    ) -> Result<Option<InterviewSession>> {
        let session = sqlx::query_as::<_, InterviewSession>(
            r#"
            SELECT id, user_id, mode, status, created_at, updated_at
            FROM interview_sessions
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(session_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(session)
    }

    /// Lists all sessions for a given user, ordered by most recent.
    pub async fn list_sessions(&self, user_id: &str) -> Result<Vec<InterviewSession>> {
        let sessions = sqlx::query_as::<_, InterviewSession>(
            r#"
            SELECT id, user_id, mode, status, created_at, updated_at
            FROM interview_sessions
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(sessions)
    }

    /// Adds a new message to a session's conversation history.
    pub async fn add_message(
        &self,
        session_id: Uuid,
        role: MessageRole,
        content: &str,
    ) -> Result<Message> {
        let message = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (session_id, role, content)
            VALUES ($1, $2, $3)
            RETURNING id, session_id, role, content, created_at
            "#,
        )
        .bind(session_id)
        .bind(role)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;
        Ok(message)
    }

    /// Retrieves the full message history for a session, ordered chronologically.
    pub async fn get_session_messages(&self, session_id: Uuid) -> Result<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, session_id, role, content, created_at
            FROM messages
            WHERE session_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(messages)
    }

    /// Retrieves the most recent controller snapshot for a session.
    pub async fn get_latest_snapshot(&self, session_id: Uuid) -> Result<Option<Session>> {
        let record = sqlx::query_scalar::<_, serde_json::Value>(
            r#"
            SELECT state_json FROM session_snapshots
            WHERE session_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        match record {
            Some(state_json) => {
                let snapshot: Session = serde_json::from_value(state_json)?;
                Ok(Some(snapshot))
            }
            None => Ok(None),
        }
    }

    /// Persists a new snapshot and refreshes the session row's metadata.
    pub async fn save_snapshot(&self, snapshot: &Session) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let state_json = serde_json::to_value(snapshot)?;
        sqlx::query("INSERT INTO session_snapshots (session_id, state_json) VALUES ($1, $2)")
            .bind(snapshot.id)
            .bind(state_json)
            .execute(&mut *tx)
            .await?;

        let mode: Option<InterviewModeKind> = snapshot.mode.map(Into::into);
        sqlx::query(
            "UPDATE interview_sessions SET mode = COALESCE($2, mode), updated_at = now() WHERE id = $1",
        )
        .bind(snapshot.id)
        .bind(mode)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Updates the status of a session (e.g., from 'active' to 'ended').
    pub async fn update_session_status(
        &self,
        session_id: Uuid,
        status: SessionStatus,
    ) -> Result<InterviewSession> {
        let session = sqlx::query_as::<_, InterviewSession>(
            r#"
            UPDATE interview_sessions
            SET status = $1, updated_at = now()
            WHERE id = $2
            RETURNING id, user_id, mode, status, created_at, updated_at
            "#,
        )
        .bind(status)
        .bind(session_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(session)
    }
}
