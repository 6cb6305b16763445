//! Socket transport for the browser picker.
//!
//! Displays run in their own processes and reach the coordinator over a Unix
//! domain socket. Frames are newline-delimited JSON envelopes in both
//! directions.
//!
//! Connection lifecycle
//! - The first frame a display sends must be `startedDisplay`, tagged with
//!   the display's lane. That binds the connection to the lane and attaches
//!   it to the coordinator, which answers with a full snapshot.
//! - After that, every frame from the display is forwarded on the bound lane
//!   with its tag untouched, so a mis-tagged frame is dropped by the
//!   coordinator like any other.
//! - Undecodable frames are logged and skipped.
//! - A display that disconnects is pruned from the coordinator's registry on
//!   the next broadcast. Reconnecting repeats the handshake and resyncs.
//!
//! Public API
//! - [`Server`]: binds the socket and serves connections for a
//!   [`picker_engine::CoordinatorHandle`].
//! - [`Connection`]: the display side; [`Connection::into_link`] turns it into
//!   a [`picker_engine::DisplayLink`] for use with the display adapters.
//! - [`default_socket_path`]: the per-user socket location.

mod client;
mod error;
mod frame;
mod server;
mod socket;

pub use client::Connection;
pub use error::{Error, Result};
pub use server::Server;
pub use socket::{default_socket_path, validate_or_unlink_existing_socket};
