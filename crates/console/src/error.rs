//! Error types for the console crate.

use thiserror::Error;
use transport::ChannelError;

use crate::session::SessionId;

/// Failure to establish a new session.
///
/// Creation failures are local and final: the caller gets the error
/// synchronously, nothing is registered, and no retry is attempted.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// The transport handshake or program start failed.
    #[error("connect failed: {0}")]
    Transport(#[from] ChannelError),

    /// The attempt was cancelled before the handshake completed.
    #[error("connect cancelled")]
    Cancelled,
}

/// A session operation invoked in a state that cannot serve it.
///
/// These mark a contract violation in the caller, not a condition to
/// retry.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The handshake has not completed yet.
    #[error("session not ready: {0}")]
    NotReady(SessionId),

    /// The session is closed; the operation can never succeed.
    #[error("session closed: {0}")]
    Closed(SessionId),

    /// The session is not registered.
    #[error("session not found: {0}")]
    NotFound(SessionId),
}
