//! Manages the primary WebSocket connection lifecycle for an interview session.

use super::{
    protocol::{ClientMessage, ServerMessage},
    turn,
};
use crate::{models, state::AppState};
use anyhow::{Context, Result, anyhow};
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use interview_core::{cv::CvUpload, session::Session};
use std::sync::Arc;
use tracing::{Instrument, error, info, instrument, warn};
use uuid::Uuid;

/// Axum handler to upgrade an HTTP connection to a WebSocket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Main handler for an individual WebSocket connection.
///
/// This function performs the initial handshake, restoring the session
/// snapshot and history from the database, and then runs the turn loop until
/// the client disconnects.
#[instrument(name = "ws_session", skip_all, fields(session_id))]
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    info!("New WebSocket connection. Awaiting initialization...");
    let (mut socket_tx, mut socket_rx) = socket.split();

    // The first message from the client must be an `init` message.
    let init = match socket_rx.next().await {
        Some(Ok(Message::Text(text))) => initialize_session_state(&text, &state).await,
        Some(Ok(_)) => Err(anyhow!("First message was not a text `init` message.")),
        _ => {
            info!("Client disconnected before sending init message.");
            return;
        }
    };

    let (snapshot, history) = match init {
        Ok(ok) => ok,
        Err(e) => {
            error!("Session initialization failed: {:?}", e);
            let _ = send_msg(
                &mut socket_tx,
                ServerMessage::Error {
                    message: e.to_string(),
                },
            )
            .await;
            return;
        }
    };
    tracing::Span::current().record("session_id", snapshot.id.to_string());

    // Confirm success and hand the client its current state.
    if send_msg(
        &mut socket_tx,
        ServerMessage::Initialized {
            session_id: snapshot.id,
            session: snapshot.clone(),
            history,
        },
    )
    .await
    .is_err()
    {
        error!("Failed to send Initialized message to client.");
        return;
    }

    let session_span = tracing::info_span!("interview_runtime", session_id = %snapshot.id);
    if let Err(e) = run_interview_session(state, &mut socket_tx, socket_rx, snapshot)
        .instrument(session_span)
        .await
    {
        error!(error = ?e, "Interview session terminated with error.");
    }
    info!("WebSocket connection closed.");
}

/// Parses the `init` message and loads the corresponding session state from the database.
async fn initialize_session_state(
    init_text: &str,
    state: &Arc<AppState>,
) -> Result<(Session, Vec<models::Message>)> {
    let init_msg: ClientMessage = serde_json::from_str(init_text)?;
    let ClientMessage::Init { session_id } = init_msg else {
        return Err(anyhow!("First message must be `init`"));
    };
    load_session_state(session_id, state).await
}

async fn load_session_state(
    session_id: Uuid,
    state: &Arc<AppState>,
) -> Result<(Session, Vec<models::Message>)> {
    let snapshot = state
        .db
        .get_latest_snapshot(session_id)
        .await?
        .context("Session state not found")?;
    let history = state.db.get_session_messages(session_id).await?;
    info!(%session_id, "Resuming existing session");
    Ok((snapshot, history))
}

/// The main event loop for an active WebSocket session.
///
/// Messages for a session are processed strictly sequentially: one inbound
/// message yields one controller transition and one outbound directive before
/// the next message is read. A turn in flight is dropped with the connection.
async fn run_interview_session(
    state: Arc<AppState>,
    socket_tx: &mut SplitSink<WebSocket, Message>,
    mut socket_rx: SplitStream<WebSocket>,
    mut snapshot: Session,
) -> Result<()> {
    // Metadata from a `cv_upload` announcement, consumed by the next binary frame.
    let mut pending_upload: Option<(String, String)> = None;

    while let Some(msg_result) = socket_rx.next().await {
        match msg_result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::UserMessage { text }) => {
                    let directive = turn::handle_user_turn(&state, &mut snapshot, &text).await?;
                    send_msg(socket_tx, ServerMessage::Directive { directive }).await?;
                }
                Ok(ClientMessage::CvUpload {
                    filename,
                    content_type,
                }) => {
                    pending_upload = Some((filename, content_type));
                }
                Ok(ClientMessage::Init { .. }) => {
                    warn!("Ignoring duplicate init message post-handshake.");
                }
                Err(e) => {
                    warn!(error = ?e, "Ignoring malformed client message.");
                }
            },
            Ok(Message::Binary(data)) => match pending_upload.take() {
                Some((filename, content_type)) => {
                    let upload = CvUpload {
                        filename,
                        content_type,
                        bytes: data.to_vec(),
                    };
                    let directive = turn::handle_cv_turn(&state, &mut snapshot, &upload).await?;
                    send_msg(socket_tx, ServerMessage::Directive { directive }).await?;
                }
                None => {
                    warn!("Received binary data without a preceding cv_upload message.");
                }
            },
            Ok(Message::Close(_)) => {
                info!("Client sent close frame. Shutting down session.");
                break;
            }
            Ok(Message::Ping(_) | Message::Pong(_)) => {}
            Err(e) => {
                error!("Error receiving from client WebSocket: {:?}", e);
                break;
            }
        }
    }
    Ok(())
}

/// A helper function to serialize and send a `ServerMessage` to the client.
pub(crate) async fn send_msg(
    socket_tx: &mut SplitSink<WebSocket, Message>,
    msg: ServerMessage,
) -> Result<()> {
    let serialized = serde_json::to_string(&msg)?;
    socket_tx.send(Message::Text(serialized.into())).await?;
    Ok(())
}
