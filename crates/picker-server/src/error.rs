use std::{io::Error as IoError, result::Result as StdResult};

use picker_protocol::ipc::codec;
use thiserror::Error;

/// Errors from the socket transport.
#[derive(Error, Debug)]
pub enum Error {
    /// Socket path could not be prepared.
    #[error("Socket path error: {0}")]
    SocketPath(String),

    /// The first frame on a connection was not a display handshake.
    #[error("Handshake error: {0}")]
    Handshake(String),

    /// A frame could not be encoded or decoded.
    #[error("Frame error: {0}")]
    Frame(#[from] codec::Error),

    /// IO-related errors
    #[error("IO error: {0}")]
    Io(#[from] IoError),
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = StdResult<T, Error>;
