//! Line framing over tokio streams.

use picker_protocol::{
    Envelope,
    ipc::codec::{self, envelope_to_line, line_to_envelope},
};
use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufWriter, Lines};
use tracing::warn;

use crate::Result;

/// Write one envelope and flush.
pub async fn write_envelope<W>(writer: &mut BufWriter<W>, envelope: &Envelope) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let line = envelope_to_line(envelope)?;
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

/// Read the next decodable envelope, skipping blank and malformed lines.
/// Lines that are not UTF-8 count as malformed.
///
/// Returns `None` at end of stream.
pub async fn read_envelope<R>(lines: &mut Lines<R>) -> Result<Option<Envelope>>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => return Ok(None),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                warn!(error = %e, "skipping frame that is not utf-8");
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        match line_to_envelope(&line) {
            Ok(envelope) => return Ok(Some(envelope)),
            Err(codec::Error::Empty) => {}
            Err(e) => warn!(error = %e, "skipping malformed frame"),
        }
    }
}
