//! WebSocket Session Management
//!
//! This module contains the core logic for running interview sessions over
//! WebSockets. It is structured into submodules for clarity:
//!
//! - `protocol`: Defines the JSON-based message format for client-server communication.
//! - `session`: Manages the WebSocket connection lifecycle, from handshake to termination.
//! - `turn`: Runs one controller turn per inbound client message and persists its outcome.

mod turn;
pub mod protocol;
pub mod session;

pub use session::ws_handler;
