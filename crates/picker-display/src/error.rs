use picker_protocol::Lane;
use thiserror::Error;

/// Errors raised while wiring up a display.
#[derive(Error, Debug)]
pub enum Error {
    /// The outbox is bound to a lane other than the one the view sends on.
    #[error("display for lane {expected} given an outbox on lane {actual}")]
    WrongLane {
        /// Lane the projection sends on.
        expected: &'static str,
        /// Lane the outbox is bound to.
        actual: &'static str,
    },
}

/// Result alias for display operations.
pub type Result<T> = std::result::Result<T, Error>;
