//! Bundled local transport.
//!
//! Serves every connection from the local machine: the requested program is
//! spawned in a PTY and exposed through the [`Channel`] interface. The
//! `host` parameter is accepted and logged so that callers are written
//! against the full boundary, but no network is involved.

use std::io::{Read, Write};

use bytes::Bytes;
use portable_pty::{native_pty_system, Child, CommandBuilder, MasterPty, PtySize};
use tokio::sync::mpsc;

use crate::channel::{Channel, Connection, Transport};
use crate::error::{ChannelError, Result};
use crate::term::TermSize;

/// Buffer size for PTY reads.
const READ_BUFFER_SIZE: usize = 4096;

/// Capacity of the queue between the PTY reader and [`Channel::read`].
const OUTPUT_QUEUE_CAPACITY: usize = 256;

/// Transport that runs programs on the local machine.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTransport;

impl Transport for LocalTransport {
    type Conn = LocalConnection;

    async fn connect(&self, host: &str) -> Result<Self::Conn> {
        // There is no handshake to run locally; the host is recorded so a
        // future networked transport sees the same call shape.
        tracing::debug!(host = %host, "local transport connect");
        Ok(LocalConnection {
            host: host.to_string(),
        })
    }
}

/// A pending local connection, waiting for a program to start.
pub struct LocalConnection {
    host: String,
}

impl Connection for LocalConnection {
    type Chan = LocalChannel;

    async fn start_program(
        self,
        program: Option<&str>,
        term_type: &str,
        size: TermSize,
    ) -> Result<Self::Chan> {
        LocalChannel::spawn(&self.host, program, term_type, size)
    }
}

/// A program running in a local PTY, seen through the [`Channel`] interface.
pub struct LocalChannel {
    master: Box<dyn MasterPty + Send>,
    writer: Box<dyn Write + Send>,
    child: Box<dyn Child + Send + Sync>,
    output_rx: mpsc::Receiver<Bytes>,

    /// Exit status, cached once the child has been reaped.
    exit: Option<u32>,
}

impl LocalChannel {
    fn spawn(
        host: &str,
        program: Option<&str>,
        term_type: &str,
        size: TermSize,
    ) -> Result<Self> {
        let program = login_shell(program);

        let pty_system = native_pty_system();
        let pair = pty_system
            .openpty(PtySize {
                rows: size.rows,
                cols: size.cols,
                pixel_width: size.pixel_width,
                pixel_height: size.pixel_height,
            })
            .map_err(|e| ChannelError::SpawnFailed(e.to_string()))?;

        let mut cmd = CommandBuilder::new(&program);
        cmd.env("TERM", term_type);

        let child = pair
            .slave
            .spawn_command(cmd)
            .map_err(|e| ChannelError::SpawnFailed(e.to_string()))?;

        let writer = pair
            .master
            .take_writer()
            .map_err(|e| ChannelError::SpawnFailed(e.to_string()))?;

        let reader = pair
            .master
            .try_clone_reader()
            .map_err(|e| ChannelError::SpawnFailed(e.to_string()))?;

        let (output_tx, output_rx) = mpsc::channel(OUTPUT_QUEUE_CAPACITY);
        start_reader(reader, output_tx);

        tracing::info!(
            host = %host,
            program = %program,
            pid = child.process_id().unwrap_or(0),
            cols = size.cols,
            rows = size.rows,
            "spawned local program"
        );

        Ok(Self {
            master: pair.master,
            writer,
            child,
            output_rx,
            exit: None,
        })
    }

    /// Reaps the child, caching its exit status.
    fn reap(&mut self) -> Result<u32> {
        if let Some(code) = self.exit {
            return Ok(code);
        }
        let status = self
            .child
            .wait()
            .map_err(|e| ChannelError::CloseFailed(e.to_string()))?;
        let code = status.exit_code();
        self.exit = Some(code);
        Ok(code)
    }
}

impl Channel for LocalChannel {
    async fn read(&mut self) -> Result<Option<Bytes>> {
        match self.output_rx.recv().await {
            Some(data) => Ok(Some(data)),
            None => {
                // The reader saw EOF or an I/O error; either way the
                // program is gone, so the exit status decides between a
                // clean and an abnormal close.
                match self.reap()? {
                    0 => Ok(None),
                    code => Err(ChannelError::ProgramExited(code)),
                }
            }
        }
    }

    async fn write(&mut self, data: &[u8]) -> Result<()> {
        self.writer
            .write_all(data)
            .map_err(|e| ChannelError::WriteFailed(e.to_string()))?;
        self.writer
            .flush()
            .map_err(|e| ChannelError::WriteFailed(e.to_string()))?;
        Ok(())
    }

    fn resize(&mut self, size: TermSize) -> Result<()> {
        self.master
            .resize(PtySize {
                rows: size.rows,
                cols: size.cols,
                pixel_width: size.pixel_width,
                pixel_height: size.pixel_height,
            })
            .map_err(|e| ChannelError::ResizeFailed(e.to_string()))
    }

    async fn close(&mut self) -> Result<()> {
        if self.exit.is_some() {
            return Ok(());
        }
        // The program may have exited on its own between the last read and
        // this call; a failed kill is not an error.
        if let Err(e) = self.child.kill() {
            tracing::debug!(error = %e, "kill on teardown failed");
        }
        self.reap()?;
        Ok(())
    }
}

/// Reads PTY output on the blocking pool and queues it for [`Channel::read`].
///
/// The loop ends on EOF, on a read error, or once the channel side is gone.
fn start_reader(mut reader: Box<dyn Read + Send>, output_tx: mpsc::Sender<Bytes>) {
    tokio::task::spawn_blocking(move || {
        let mut buffer = vec![0u8; READ_BUFFER_SIZE];
        loop {
            match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => {
                    if output_tx
                        .blocking_send(Bytes::copy_from_slice(&buffer[..n]))
                        .is_err()
                    {
                        break;
                    }
                }
                Err(e) => {
                    // A PTY read fails with EIO once the child exits; the
                    // channel reports the exit status instead.
                    tracing::debug!(error = %e, "PTY read ended");
                    break;
                }
            }
        }
    });
}

/// Resolves the program to run.
///
/// Order of preference: the explicit program, `$SHELL`, `/bin/sh`.
fn login_shell(program: Option<&str>) -> String {
    match program {
        Some(p) => p.to_string(),
        None => std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string()),
    }
}
