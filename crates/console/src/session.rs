//! Session state object and lifecycle.
//!
//! A [`Session`] is the caller-facing half of one remote shell: identity,
//! current size, lifecycle state, and the command queue into its bridge
//! task. The channel itself is owned by the bridge; it exists exactly while
//! the session is `Active` or `Closing` and is released once, when the
//! bridge finishes teardown.

use bytes::Bytes;
use tokio::sync::mpsc;
use transport::TermSize;

use crate::error::SessionError;
use crate::events::DisplayHandle;

/// Unique identifier for a session, stable for the process lifetime.
pub type SessionId = String;

/// Lifecycle states of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Transport handshake in flight; no channel acquired yet.
    Connecting,

    /// Normal operation; data flows both directions.
    Active,

    /// Teardown in progress; input is discarded.
    Closing,

    /// Terminal. The channel has been released.
    Closed,
}

/// Commands accepted by a session's bridge task.
#[derive(Debug)]
pub(crate) enum ChannelCommand {
    /// Forward bytes to the remote program.
    Send(Bytes),

    /// Update the remote terminal size.
    Resize(TermSize),

    /// Tear the channel down.
    Close,
}

/// One interactive remote-shell session.
///
/// Sessions are created only through
/// [`SessionRegistry::create`](crate::registry::SessionRegistry::create) and
/// are destroyed by the registry when their channel confirms teardown.
pub struct Session {
    id: SessionId,
    state: SessionState,
    size: TermSize,
    display: Option<DisplayHandle>,
    commands: mpsc::UnboundedSender<ChannelCommand>,
}

impl Session {
    /// Creates a session in `Connecting` state.
    pub(crate) fn new(
        id: SessionId,
        size: TermSize,
        commands: mpsc::UnboundedSender<ChannelCommand>,
    ) -> Self {
        Self {
            id,
            state: SessionState::Connecting,
            size,
            display: None,
            commands,
        }
    }

    /// Returns the session id.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns the current terminal size.
    pub fn size(&self) -> TermSize {
        self.size
    }

    /// Returns the display token the shell attached, if any.
    pub fn display(&self) -> Option<DisplayHandle> {
        self.display
    }

    /// Attaches an opaque display token for the shell's own routing.
    pub fn set_display(&mut self, display: DisplayHandle) {
        self.display = Some(display);
    }

    /// Enqueues `data` for the remote program.
    ///
    /// Ordering is preserved relative to earlier sends on this session.
    /// While the session is `Closing` this is a logged no-op; bytes sent
    /// just before a close may be dropped.
    pub fn send(&self, data: &[u8]) -> Result<(), SessionError> {
        match self.state {
            SessionState::Connecting => Err(SessionError::NotReady(self.id.clone())),
            SessionState::Active => {
                let payload = Bytes::copy_from_slice(data);
                if self.commands.send(ChannelCommand::Send(payload)).is_err() {
                    // The bridge is already tearing down; the remote close
                    // event is on its way.
                    tracing::debug!(session_id = %self.id, "send dropped, channel gone");
                }
                Ok(())
            }
            SessionState::Closing => {
                tracing::debug!(session_id = %self.id, "send ignored while closing");
                Ok(())
            }
            SessionState::Closed => Err(SessionError::Closed(self.id.clone())),
        }
    }

    /// Requests a terminal size update and records it.
    ///
    /// Idempotent; ignored while the session is `Closing`.
    pub fn resize(&mut self, size: TermSize) -> Result<(), SessionError> {
        match self.state {
            SessionState::Connecting => Err(SessionError::NotReady(self.id.clone())),
            SessionState::Active => {
                if self.commands.send(ChannelCommand::Resize(size)).is_err() {
                    tracing::debug!(session_id = %self.id, "resize dropped, channel gone");
                }
                self.size = size;
                tracing::debug!(
                    session_id = %self.id,
                    cols = size.cols,
                    rows = size.rows,
                    "resized session"
                );
                Ok(())
            }
            SessionState::Closing => Ok(()),
            SessionState::Closed => Err(SessionError::Closed(self.id.clone())),
        }
    }

    /// Initiates teardown. Idempotent; does not wait for completion.
    ///
    /// The session reaches `Closed` when the registry processes the
    /// channel's terminal event.
    pub fn close(&mut self) {
        match self.state {
            SessionState::Connecting => {
                // No channel was ever acquired; nothing to tear down.
                self.state = SessionState::Closed;
            }
            SessionState::Active => {
                self.state = SessionState::Closing;
                if self.commands.send(ChannelCommand::Close).is_err() {
                    tracing::debug!(session_id = %self.id, "close raced channel teardown");
                }
                tracing::info!(session_id = %self.id, "session close requested");
            }
            SessionState::Closing | SessionState::Closed => {}
        }
    }

    /// Marks the handshake as complete.
    pub(crate) fn activate(&mut self) {
        debug_assert_eq!(self.state, SessionState::Connecting);
        self.state = SessionState::Active;
    }

    /// Records that teardown has started, if it had not already.
    pub(crate) fn mark_closing(&mut self) {
        if self.state == SessionState::Active {
            self.state = SessionState::Closing;
        }
    }

    /// Records that the channel confirmed teardown.
    pub(crate) fn mark_closed(&mut self) {
        self.state = SessionState::Closed;
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}
