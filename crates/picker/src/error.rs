use std::{io::Error as IoError, path::PathBuf, result::Result as StdResult};

use thiserror::Error;

/// Errors surfaced by the `picker` binary.
#[derive(Error, Debug)]
pub enum Error {
    /// A settings or layout file could not be parsed.
    #[error("Invalid JSON in '{path}': {source}")]
    Json {
        /// File being read.
        path: PathBuf,
        /// Parser error.
        source: serde_json::Error,
    },

    /// Socket transport failure.
    #[error(transparent)]
    Server(#[from] picker_server::Error),

    /// Display wiring failure.
    #[error(transparent)]
    Display(#[from] picker_display::Error),

    /// IO-related errors
    #[error("IO error: {0}")]
    Io(#[from] IoError),
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = StdResult<T, Error>;
