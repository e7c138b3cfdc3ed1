//! Typed events flowing between bridge tasks, the registry, and the shell.
//!
//! Bridge tasks fan in [`SessionEvent`]s to the registry; the registry
//! applies them to its own state and fans out [`ShellEvent`]s for the UI
//! shell to render. Per session, both queues are strictly ordered; across
//! sessions, interleaving is unconstrained.

use bytes::Bytes;

use crate::session::SessionId;

/// Opaque token the UI shell may attach to a session.
///
/// The core never interprets it; it is echoed back on [`ShellEvent::Data`]
/// and [`ShellEvent::Closed`] so the shell can route events to whatever it
/// uses to render the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayHandle(pub u64);

/// Event emitted by a session's bridge task into the registry fan-in queue.
#[derive(Debug)]
pub struct SessionEvent {
    /// Session the event belongs to.
    pub id: SessionId,

    /// What happened.
    pub payload: SessionPayload,
}

/// Payload of a [`SessionEvent`].
#[derive(Debug)]
pub enum SessionPayload {
    /// Bytes received from the remote program, in transport order.
    Data(Bytes),

    /// The channel finished teardown. Fires exactly once per session;
    /// `reason` is `None` for a clean close.
    Closed { reason: Option<String> },
}

/// Notification delivered to the UI shell by
/// [`SessionRegistry::next_event`](crate::registry::SessionRegistry::next_event).
#[derive(Debug, Clone)]
pub enum ShellEvent {
    /// Output to render for a session.
    Data {
        /// Session the output belongs to.
        id: SessionId,
        /// Display token the shell attached, if any.
        display: Option<DisplayHandle>,
        /// The received bytes, in transport order.
        bytes: Bytes,
    },

    /// A session reached `Closed` and left the registry.
    Closed {
        /// The closed session.
        id: SessionId,
        /// Display token the shell attached, if any.
        display: Option<DisplayHandle>,
        /// `None` for a clean close, otherwise the captured failure.
        reason: Option<String>,
    },

    /// The active selection changed. `None` means no session is left.
    Selected {
        /// The newly selected session, if any.
        id: Option<SessionId>,
    },
}
