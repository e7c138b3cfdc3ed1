//! Session bridge.
//!
//! [`SessionChannel::open`] runs the transport handshake and hands back an
//! `Active` [`Session`]; a spawned bridge task then owns the channel for
//! the rest of its life, converting between the session's command queue and
//! the registry's fan-in event queue. Re-posting channel activity as
//! discrete events keeps all registry and session mutation on the
//! consumer's scheduler, so none of it needs locks.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use transport::{Channel, Connection, TermSize, Transport};
use uuid::Uuid;

use crate::error::ConnectError;
use crate::events::{SessionEvent, SessionPayload};
use crate::session::{ChannelCommand, Session, SessionId};

/// Host used when the caller does not name one.
pub const DEFAULT_HOST: &str = "localhost";

/// Terminal type reported to the remote side by default.
pub const DEFAULT_TERM_TYPE: &str = "xterm-color";

/// Parameters for opening a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Host to connect to.
    pub host: String,

    /// Program to start; `None` selects the remote login shell.
    pub program: Option<String>,

    /// Terminal type reported to the remote side.
    pub term_type: String,

    /// Initial terminal size.
    pub size: TermSize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            program: None,
            term_type: DEFAULT_TERM_TYPE.to_string(),
            size: TermSize::default(),
        }
    }
}

/// Bridge between one raw channel and the typed session interface.
pub struct SessionChannel;

impl SessionChannel {
    /// Establishes a channel and wraps it into an `Active` session.
    ///
    /// Suspends the caller through the transport handshake and program
    /// start; other sessions keep making progress meanwhile. Firing
    /// `cancel` while the handshake is in flight abandons the attempt
    /// before any channel is acquired and returns
    /// [`ConnectError::Cancelled`].
    pub async fn open<T: Transport>(
        transport: &T,
        options: &SessionOptions,
        events: mpsc::UnboundedSender<SessionEvent>,
        cancel: CancellationToken,
    ) -> Result<Session, ConnectError> {
        let id: SessionId = Uuid::new_v4().to_string();
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let mut session = Session::new(id.clone(), options.size, command_tx);

        let conn = tokio::select! {
            _ = cancel.cancelled() => return Err(ConnectError::Cancelled),
            conn = transport.connect(&options.host) => conn?,
        };
        let channel = tokio::select! {
            _ = cancel.cancelled() => return Err(ConnectError::Cancelled),
            channel = conn.start_program(
                options.program.as_deref(),
                &options.term_type,
                options.size,
            ) => channel?,
        };

        tokio::spawn(bridge(id.clone(), channel, command_rx, events));
        session.activate();

        tracing::info!(
            session_id = %id,
            host = %options.host,
            cols = options.size.cols,
            rows = options.size.rows,
            "session established"
        );
        Ok(session)
    }
}

/// Drives one channel until it closes.
///
/// The loop is the only owner of the channel; every exit path runs
/// best-effort teardown and emits exactly one `Closed` event before the
/// channel is released.
async fn bridge<C: Channel>(
    id: SessionId,
    mut channel: C,
    mut commands: mpsc::UnboundedReceiver<ChannelCommand>,
    events: mpsc::UnboundedSender<SessionEvent>,
) {
    let reason = loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(ChannelCommand::Send(data)) => {
                    if let Err(e) = channel.write(&data).await {
                        tracing::warn!(session_id = %id, error = %e, "write failed, tearing down");
                        break Some(e.to_string());
                    }
                }
                Some(ChannelCommand::Resize(size)) => {
                    if let Err(e) = channel.resize(size) {
                        tracing::warn!(session_id = %id, error = %e, "resize rejected");
                    }
                }
                // Local close, or every session handle dropped. Commands
                // still queued behind the close are discarded.
                Some(ChannelCommand::Close) | None => break None,
            },
            read = channel.read() => match read {
                Ok(Some(data)) => {
                    tracing::trace!(session_id = %id, len = data.len(), "data received");
                    let event = SessionEvent {
                        id: id.clone(),
                        payload: SessionPayload::Data(data),
                    };
                    if events.send(event).is_err() {
                        // Dispatcher gone; nobody is left to render this
                        // session.
                        break None;
                    }
                }
                Ok(None) => break None,
                Err(e) => break Some(e.to_string()),
            },
        }
    };

    // Teardown failures must not keep the session from reaching Closed.
    if let Err(e) = channel.close().await {
        tracing::warn!(session_id = %id, error = %e, "channel teardown failed");
    }
    drop(channel);

    let _ = events.send(SessionEvent {
        id: id.clone(),
        payload: SessionPayload::Closed { reason },
    });
    tracing::info!(session_id = %id, "session channel closed");
}
