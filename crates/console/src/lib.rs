//! # TabTerm Console Library
//!
//! This crate is the core of TabTerm: it turns raw asynchronous channels
//! into sessions with explicit lifecycles and tracks a dynamic set of them
//! under one cooperative scheduler.
//!
//! ## Overview
//!
//! - **Session bridge**: [`SessionChannel`] opens a channel through a
//!   [`Transport`](transport::Transport) and hands the channel to a bridge
//!   task that converts its reads, writes, and termination into a typed,
//!   per-session-ordered event stream.
//! - **Session**: [`Session`] carries identity, current size, and the
//!   `Connecting → Active → Closing → Closed` lifecycle, and exposes
//!   `send`/`resize`/`close`.
//! - **Session registry**: [`SessionRegistry`] owns the live sessions in
//!   tab order plus the current selection, and keeps both consistent
//!   through creation, removal, and remote closure.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                      UI shell (external)                │
//! │        create / select / close        render events     │
//! ├─────────────────────────────────────────────────────────┤
//! │                     SessionRegistry                     │
//! │   sessions (tab order) · active · fan-in event queue    │
//! ├──────────────┬──────────────────┬───────────────────────┤
//! │ bridge task  │   bridge task    │     bridge task       │
//! │  (Channel)   │    (Channel)     │      (Channel)        │
//! └──────────────┴──────────────────┴───────────────────────┘
//! ```
//!
//! Each bridge task exclusively owns one channel; the registry is mutated
//! only by its owning task, one event at a time, so no locks are involved.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use console::{SessionOptions, SessionRegistry, ShellEvent};
//! use transport::LocalTransport;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let mut registry = SessionRegistry::new(LocalTransport);
//!     let id = registry.create(&SessionOptions::default()).await?;
//!
//!     registry.get(&id).unwrap().send(b"echo hi\n")?;
//!     while let Some(event) = registry.next_event().await {
//!         if let ShellEvent::Data { bytes, .. } = event {
//!             print!("{}", String::from_utf8_lossy(&bytes));
//!             break;
//!         }
//!     }
//!
//!     registry.close(&id).await;
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`channel`]: the session bridge
//! - [`session`]: session state object and lifecycle
//! - [`registry`]: session set and selection
//! - [`events`]: typed event payloads
//! - [`config`]: TOML configuration
//! - [`error`]: error types

pub mod channel;
pub mod config;
pub mod error;
pub mod events;
pub mod registry;
pub mod session;

#[cfg(test)]
mod testkit;

// Re-export the boundary crate for convenience
pub use transport;

// Re-export core types for convenience
pub use channel::{SessionChannel, SessionOptions, DEFAULT_HOST, DEFAULT_TERM_TYPE};
pub use config::{Config, ConfigError};
pub use error::{ConnectError, SessionError};
pub use events::{DisplayHandle, SessionEvent, SessionPayload, ShellEvent};
pub use registry::SessionRegistry;
pub use session::{Session, SessionId, SessionState};
