//! Error types for the transport crate.

use thiserror::Error;

/// Channel error type covering all transport failure modes.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// Failed to establish the transport-level connection.
    #[error("connect failed: {0}")]
    ConnectFailed(String),

    /// Failed to start the requested program.
    #[error("failed to start program: {0}")]
    SpawnFailed(String),

    /// Failed to read from the channel.
    #[error("read failed: {0}")]
    ReadFailed(String),

    /// Failed to write to the channel.
    #[error("write failed: {0}")]
    WriteFailed(String),

    /// Failed to resize the remote terminal.
    #[error("resize failed: {0}")]
    ResizeFailed(String),

    /// Graceful teardown was refused by the transport.
    #[error("close failed: {0}")]
    CloseFailed(String),

    /// The remote program terminated with a nonzero status.
    #[error("program exited with status {0}")]
    ProgramExited(u32),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for channel operations.
pub type Result<T> = std::result::Result<T, ChannelError>;
