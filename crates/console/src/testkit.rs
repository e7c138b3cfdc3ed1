//! Scripted transport for unit tests.
//!
//! `MockTransport` hands out channels whose remote side is driven by the
//! test through a [`MockRemote`] handle: queue output, signal EOF or a
//! transport failure, and observe what the bridge wrote or resized.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use tokio::sync::mpsc;
use transport::{Channel, ChannelError, Connection, TermSize, Transport};

enum Behavior {
    Accept(MockChannel),
    Refuse(String),
    Hang,
}

enum RemoteAction {
    Output(Bytes),
    Eof,
    Fail(String),
}

/// Test-side handle to one scripted channel.
pub(crate) struct MockRemote {
    actions: mpsc::UnboundedSender<RemoteAction>,
    /// Everything the bridge wrote, in order.
    pub written: mpsc::UnboundedReceiver<Bytes>,
    /// Every resize the bridge requested, in order.
    pub resizes: mpsc::UnboundedReceiver<TermSize>,
    closed: Arc<AtomicBool>,
}

impl MockRemote {
    /// Queues output as if the remote program produced it.
    pub fn output(&self, data: &[u8]) {
        let _ = self
            .actions
            .send(RemoteAction::Output(Bytes::copy_from_slice(data)));
    }

    /// Ends the channel cleanly.
    pub fn eof(&self) {
        let _ = self.actions.send(RemoteAction::Eof);
    }

    /// Ends the channel abnormally with `reason`.
    pub fn fail(&self, reason: &str) {
        let _ = self.actions.send(RemoteAction::Fail(reason.to_string()));
    }

    /// Whether the bridge ran teardown on the channel.
    pub fn was_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Transport whose connections follow a script set up by the test.
#[derive(Clone, Default)]
pub(crate) struct MockTransport {
    queue: Arc<Mutex<VecDeque<Behavior>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the next connect to succeed; returns the remote-side handle.
    pub fn expect_session(&self) -> MockRemote {
        self.push_channel(false)
    }

    /// Like [`expect_session`](Self::expect_session), but teardown fails.
    pub fn expect_session_failing_close(&self) -> MockRemote {
        self.push_channel(true)
    }

    /// Scripts the next connect to fail with `reason`.
    pub fn refuse_next(&self, reason: &str) {
        self.queue
            .lock()
            .unwrap()
            .push_back(Behavior::Refuse(reason.to_string()));
    }

    /// Scripts the next connect to never complete.
    pub fn hang_next(&self) {
        self.queue.lock().unwrap().push_back(Behavior::Hang);
    }

    fn push_channel(&self, fail_close: bool) -> MockRemote {
        let (actions_tx, actions_rx) = mpsc::unbounded_channel();
        let (written_tx, written_rx) = mpsc::unbounded_channel();
        let (resizes_tx, resizes_rx) = mpsc::unbounded_channel();
        let closed = Arc::new(AtomicBool::new(false));

        let channel = MockChannel {
            actions: actions_rx,
            written: written_tx,
            resizes: resizes_tx,
            closed: Arc::clone(&closed),
            fail_close,
        };
        self.queue
            .lock()
            .unwrap()
            .push_back(Behavior::Accept(channel));

        MockRemote {
            actions: actions_tx,
            written: written_rx,
            resizes: resizes_rx,
            closed,
        }
    }
}

impl Transport for MockTransport {
    type Conn = MockConnection;

    async fn connect(&self, _host: &str) -> transport::Result<Self::Conn> {
        let behavior = self.queue.lock().unwrap().pop_front();
        match behavior {
            Some(Behavior::Accept(channel)) => Ok(MockConnection { channel }),
            Some(Behavior::Refuse(reason)) => Err(ChannelError::ConnectFailed(reason)),
            Some(Behavior::Hang) => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            None => Err(ChannelError::ConnectFailed(
                "no scripted session".to_string(),
            )),
        }
    }
}

pub(crate) struct MockConnection {
    channel: MockChannel,
}

impl Connection for MockConnection {
    type Chan = MockChannel;

    async fn start_program(
        self,
        _program: Option<&str>,
        _term_type: &str,
        _size: TermSize,
    ) -> transport::Result<Self::Chan> {
        Ok(self.channel)
    }
}

pub(crate) struct MockChannel {
    actions: mpsc::UnboundedReceiver<RemoteAction>,
    written: mpsc::UnboundedSender<Bytes>,
    resizes: mpsc::UnboundedSender<TermSize>,
    closed: Arc<AtomicBool>,
    fail_close: bool,
}

impl Channel for MockChannel {
    async fn read(&mut self) -> transport::Result<Option<Bytes>> {
        match self.actions.recv().await {
            Some(RemoteAction::Output(data)) => Ok(Some(data)),
            Some(RemoteAction::Eof) | None => Ok(None),
            Some(RemoteAction::Fail(reason)) => Err(ChannelError::ReadFailed(reason)),
        }
    }

    async fn write(&mut self, data: &[u8]) -> transport::Result<()> {
        self.written
            .send(Bytes::copy_from_slice(data))
            .map_err(|_| ChannelError::WriteFailed("mock observer dropped".to_string()))
    }

    fn resize(&mut self, size: TermSize) -> transport::Result<()> {
        let _ = self.resizes.send(size);
        Ok(())
    }

    async fn close(&mut self) -> transport::Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        if self.fail_close {
            return Err(ChannelError::CloseFailed("mock refuses teardown".to_string()));
        }
        Ok(())
    }
}
