use std::{io, result::Result as StdResult};

use thiserror::Error;

/// Convenient result type for the engine crate.
pub type Result<T> = StdResult<T, Error>;

/// Failures reported by collaborators when the coordinator hands them work.
///
/// These never cross a lane. The coordinator logs them and, for launches,
/// feeds them back as an informational action.
#[derive(Debug, Error)]
pub enum Error {
    /// The launch collaborator refused or could not start the request.
    #[error("Launch failed: {0}")]
    Launch(String),

    /// The persistence collaborator could not accept the settings.
    #[error("Persist failed: {0}")]
    Persist(String),

    /// The clipboard could not be written.
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    /// I/O failure inside a collaborator.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
