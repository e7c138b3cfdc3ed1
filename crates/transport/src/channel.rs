//! The channel boundary: traits every transport implementation satisfies.
//!
//! A [`Transport`] produces connections, a [`Connection`] starts the remote
//! program and becomes a channel, and a [`Channel`] is the byte-oriented
//! duplex the session bridge consumes. Handshake, authentication, and wire
//! format all live behind these traits.

use std::future::Future;

use bytes::Bytes;

use crate::error::Result;
use crate::term::TermSize;

/// Factory for connections to a host.
#[allow(async_fn_in_trait)]
pub trait Transport: Send + Sync {
    /// Connection type produced by [`Transport::connect`].
    type Conn: Connection;

    /// Runs the transport-level connection and authentication handshake
    /// against `host`.
    async fn connect(&self, host: &str) -> Result<Self::Conn>;
}

/// An established connection that has not yet started a program.
#[allow(async_fn_in_trait)]
pub trait Connection: Send {
    /// Channel type produced by [`Connection::start_program`].
    type Chan: Channel + 'static;

    /// Starts `program` on the remote side with the given terminal type and
    /// size, consuming the connection.
    ///
    /// `None` selects the remote login shell.
    async fn start_program(
        self,
        program: Option<&str>,
        term_type: &str,
        size: TermSize,
    ) -> Result<Self::Chan>;
}

/// A byte-oriented duplex to a running remote program.
///
/// `read`, `write`, and `close` return `Send` futures because the session
/// bridge drives a channel from a spawned task.
pub trait Channel: Send {
    /// Waits for the next chunk of output from the remote program.
    ///
    /// Returns `Ok(None)` on clean EOF and `Err` on abnormal termination.
    /// Must be cancellation safe: the bridge selects over this future, and
    /// dropping it mid-wait must not lose buffered output.
    fn read(&mut self) -> impl Future<Output = Result<Option<Bytes>>> + Send;

    /// Writes `data` towards the remote program.
    ///
    /// Order is preserved relative to earlier writes on the same channel.
    fn write(&mut self, data: &[u8]) -> impl Future<Output = Result<()>> + Send;

    /// Requests a remote terminal size update.
    ///
    /// Does not suspend; repeating the same size is harmless.
    fn resize(&mut self, size: TermSize) -> Result<()>;

    /// Tears the channel down, releasing the remote program.
    fn close(&mut self) -> impl Future<Output = Result<()>> + Send;
}
