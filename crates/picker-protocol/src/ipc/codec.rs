use thiserror::Error;

use crate::Envelope;

/// Errors from encoding/decoding envelopes.
#[derive(Debug, Error)]
pub enum Error {
    /// The line was blank.
    #[error("empty frame")]
    Empty,
    /// JSON (de)serialization failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Encode an envelope as a single JSON line, without the trailing newline.
pub fn envelope_to_line(envelope: &Envelope) -> Result<String, Error> {
    Ok(serde_json::to_string(envelope)?)
}

/// Decode one line (surrounding whitespace ignored) back into an envelope.
///
/// # Errors
/// Returns an error for blank lines and for anything that is not a valid
/// envelope, including unknown action kinds. Transports log and skip such
/// frames rather than tearing down the connection.
pub fn line_to_envelope(line: &str) -> Result<Envelope, Error> {
    let line = line.trim();
    if line.is_empty() {
        return Err(Error::Empty);
    }
    Ok(serde_json::from_str(line)?)
}
