//! # TabTerm Transport Library
//!
//! This crate defines the channel boundary between TabTerm's session core
//! and whatever transport carries the bytes of an interactive shell.
//!
//! ## Overview
//!
//! A transport is modeled as three stages, each consumed by the next:
//!
//! - [`Transport`]: connects to a host, producing a [`Connection`]
//! - [`Connection`]: starts the remote program, producing a [`Channel`]
//! - [`Channel`]: the byte-oriented duplex a session bridge reads from and
//!   writes to, with resize and teardown
//!
//! The wire protocol, authentication, and encryption behind these traits
//! are the transport implementation's own business; the session core never
//! sees them.
//!
//! ## Bundled transport
//!
//! [`LocalTransport`] serves every connection from the local machine by
//! spawning the requested program in a PTY. It is the default transport of
//! the `tabterm` binary and the workhorse of the integration tests. A
//! networked transport plugs in by implementing the three traits; nothing
//! in the session core changes.
//!
//! ## Modules
//!
//! - [`channel`]: the [`Transport`] / [`Connection`] / [`Channel`] traits
//! - [`local`]: the bundled PTY-backed transport
//! - [`term`]: terminal geometry
//! - [`error`]: error types

pub mod channel;
pub mod error;
pub mod local;
pub mod term;

pub use channel::{Channel, Connection, Transport};
pub use error::{ChannelError, Result};
pub use local::{LocalChannel, LocalConnection, LocalTransport};
pub use term::TermSize;
