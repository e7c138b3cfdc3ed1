//! Session registry.
//!
//! The registry is the single source of truth for which sessions exist and
//! which one is selected. Insertion order is tab order. All mutation
//! happens inside `&mut self` methods on the owning task, run to
//! completion per event, so the registry needs no locking.

use std::collections::VecDeque;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use transport::Transport;

use crate::channel::{SessionChannel, SessionOptions};
use crate::error::{ConnectError, SessionError};
use crate::events::{SessionEvent, SessionPayload, ShellEvent};
use crate::session::{Session, SessionId};

/// Owns the set of live sessions and the current selection.
pub struct SessionRegistry<T: Transport> {
    transport: T,
    sessions: Vec<Session>,
    active: Option<SessionId>,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    events_rx: mpsc::UnboundedReceiver<SessionEvent>,

    /// Shell notifications not yet handed out by [`next_event`].
    ///
    /// [`next_event`]: SessionRegistry::next_event
    pending: VecDeque<ShellEvent>,
}

impl<T: Transport> SessionRegistry<T> {
    /// Creates an empty registry over `transport`.
    pub fn new(transport: T) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            transport,
            sessions: Vec::new(),
            active: None,
            events_tx,
            events_rx,
            pending: VecDeque::new(),
        }
    }

    /// Opens a new session and selects it.
    ///
    /// Suspends through the transport handshake. On failure the registry
    /// is left untouched; nothing is registered and no event is queued.
    pub async fn create(&mut self, options: &SessionOptions) -> Result<SessionId, ConnectError> {
        let session = SessionChannel::open(
            &self.transport,
            options,
            self.events_tx.clone(),
            CancellationToken::new(),
        )
        .await?;

        let id = session.id().clone();
        self.sessions.push(session);
        self.set_active(Some(id.clone()));
        tracing::info!(
            session_id = %id,
            sessions = self.sessions.len(),
            "session registered"
        );
        Ok(id)
    }

    /// Selects `id`.
    pub fn select(&mut self, id: &SessionId) -> Result<(), SessionError> {
        if !self.contains(id) {
            return Err(SessionError::NotFound(id.clone()));
        }
        self.set_active(Some(id.clone()));
        Ok(())
    }

    /// Removes `id` from the registry and returns it.
    ///
    /// If it was selected, the session following it in tab order is
    /// selected instead, falling back to the preceding one, then to no
    /// selection.
    pub fn remove(&mut self, id: &SessionId) -> Option<Session> {
        let (session, index) = self.take(id)?;
        self.reselect_after(id, index);
        tracing::info!(
            session_id = %id,
            sessions = self.sessions.len(),
            "session removed"
        );
        Some(session)
    }

    /// Closes `id` and waits until its channel confirms teardown and the
    /// session has left the registry.
    ///
    /// Idempotent: unknown ids return immediately. Shell notifications
    /// produced while waiting, including other sessions', are queued in
    /// order for [`next_event`](Self::next_event).
    pub async fn close(&mut self, id: &SessionId) {
        match self.get_mut(id) {
            Some(session) => session.close(),
            None => return,
        }
        while self.contains(id) {
            match self.events_rx.recv().await {
                Some(event) => self.apply(event),
                None => break,
            }
        }
    }

    /// Initiates teardown of every session, best-effort, without waiting.
    pub fn close_all(&mut self) {
        tracing::info!(sessions = self.sessions.len(), "closing all sessions");
        for session in &mut self.sessions {
            session.close();
        }
    }

    /// Returns the next shell notification, applying registry mutations
    /// that lead up to it.
    ///
    /// Returns `None` only if every event source is gone, which cannot
    /// happen while the registry itself is alive.
    pub async fn next_event(&mut self) -> Option<ShellEvent> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }
            let event = self.events_rx.recv().await?;
            self.apply(event);
        }
    }

    /// Returns the session with the given id.
    pub fn get(&self, id: &SessionId) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id() == id)
    }

    /// Returns the session with the given id, mutably.
    pub fn get_mut(&mut self, id: &SessionId) -> Option<&mut Session> {
        self.sessions.iter_mut().find(|s| s.id() == id)
    }

    /// Returns the selected session.
    pub fn active(&self) -> Option<&Session> {
        let id = self.active.as_ref()?;
        self.get(id)
    }

    /// Returns the selected session's id.
    pub fn active_id(&self) -> Option<&SessionId> {
        self.active.as_ref()
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions.iter().any(|s| s.id() == id)
    }

    /// Session ids in tab order.
    pub fn ids(&self) -> Vec<SessionId> {
        self.sessions.iter().map(|s| s.id().clone()).collect()
    }

    /// Number of registered sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether the registry holds no sessions.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Applies one bridge event to registry state and queues the resulting
    /// shell notifications. Runs to completion; never awaits.
    fn apply(&mut self, event: SessionEvent) {
        let SessionEvent { id, payload } = event;
        match payload {
            SessionPayload::Data(bytes) => {
                // Output racing a removal is dropped.
                let display = match self.get(&id) {
                    Some(session) => session.display(),
                    None => return,
                };
                self.pending.push_back(ShellEvent::Data { id, display, bytes });
            }
            SessionPayload::Closed { reason } => {
                let Some((mut session, index)) = self.take(&id) else {
                    return;
                };
                // The channel has been released; finish the lifecycle and
                // drop the registration in the same step.
                session.mark_closing();
                session.mark_closed();
                if let Some(reason) = &reason {
                    tracing::warn!(session_id = %id, reason = %reason, "session lost");
                }
                self.pending.push_back(ShellEvent::Closed {
                    id: id.clone(),
                    display: session.display(),
                    reason,
                });
                self.reselect_after(&id, index);
            }
        }
    }

    /// Removes `id` from the tab order without touching the selection.
    fn take(&mut self, id: &SessionId) -> Option<(Session, usize)> {
        let index = self.sessions.iter().position(|s| s.id() == id)?;
        Some((self.sessions.remove(index), index))
    }

    /// Repairs the selection after the session at `index` was removed.
    fn reselect_after(&mut self, removed: &SessionId, index: usize) {
        if self.active.as_ref() != Some(removed) {
            return;
        }
        // Prefer the session that followed the removed one in tab order,
        // then the one that preceded it.
        let replacement = self
            .sessions
            .get(index)
            .or_else(|| index.checked_sub(1).and_then(|i| self.sessions.get(i)))
            .map(|s| s.id().clone());
        self.set_active(replacement);
    }

    /// Records a new selection and queues the notification.
    fn set_active(&mut self, id: Option<SessionId>) {
        if self.active == id {
            return;
        }
        self.active = id.clone();
        tracing::debug!(active = ?id, "selection changed");
        self.pending.push_back(ShellEvent::Selected { id });
    }
}
