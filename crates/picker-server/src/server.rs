//! Coordinator side of the socket transport.

use std::{
    io,
    path::{Path, PathBuf},
};

use picker_engine::CoordinatorHandle;
use picker_protocol::{Action, Envelope, Lane, ipc::broadcast_channel};
use tokio::{
    io::{AsyncBufReadExt, BufReader, BufWriter},
    net::{UnixListener, UnixStream},
};
use tracing::{debug, info, trace, warn};

use crate::{
    Error, Result,
    frame::{read_envelope, write_envelope},
    socket::{prepare_socket_dir, validate_or_unlink_existing_socket},
};

/// A bound listener serving displays for one coordinator.
pub struct Server {
    /// Socket path, unlinked on drop.
    path: PathBuf,
    /// Bound listener.
    listener: UnixListener,
    /// Coordinator the displays talk to.
    handle: CoordinatorHandle,
}

impl Server {
    /// Bind `path`. Displays may connect as soon as this returns.
    pub fn bind(path: impl Into<PathBuf>, handle: CoordinatorHandle) -> Result<Self> {
        let path = path.into();
        prepare_socket_dir(&path)?;
        // Never unlink a non-socket or another user's socket to make room.
        validate_or_unlink_existing_socket(&path)?;
        let listener = UnixListener::bind(&path).map_err(|e| {
            Error::SocketPath(format!("Failed to bind '{}': {}", path.display(), e))
        })?;
        info!(socket = %path.display(), "listening for displays");
        Ok(Self {
            path,
            listener,
            handle,
        })
    }

    /// Socket path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Accept connections until the listener fails. Each connection is served
    /// on its own task.
    pub async fn run(self) -> Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((stream, _addr)) => {
                    let handle = self.handle.clone();
                    tokio::spawn(async move {
                        if let Err(e) = serve_display(stream, handle).await {
                            debug!(error = %e, "display connection ended with error");
                        }
                    });
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        // Best-effort cleanup: only unlink if it still points to a socket owned by us.
        validate_or_unlink_existing_socket(&self.path).ok();
    }
}

/// Serve one display: handshake, attach, then pump both directions.
async fn serve_display(stream: UnixStream, handle: CoordinatorHandle) -> Result<()> {
    let (reader, writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();
    let mut writer = BufWriter::new(writer);

    let lane = handshake(read_envelope(&mut lines).await?)?;
    let (tx, mut rx) = broadcast_channel();
    if !handle.attach(lane, tx) {
        debug!(lane = lane.as_str(), "coordinator gone; closing display");
        return Ok(());
    }
    info!(lane = lane.as_str(), "display connected");
    let outbox = handle.lane_sender(lane);

    loop {
        tokio::select! {
            inbound = read_envelope(&mut lines) => match inbound? {
                Some(envelope) => {
                    trace!(lane = lane.as_str(), kind = envelope.action.kind(), "frame");
                    if !outbox.forward(envelope) {
                        break;
                    }
                }
                None => break,
            },
            outbound = rx.recv() => match outbound {
                Some(envelope) => write_envelope(&mut writer, &envelope).await?,
                None => break,
            },
        }
    }
    info!(lane = lane.as_str(), "display disconnected");
    Ok(())
}

/// Check the first frame and return the lane it binds.
fn handshake(first: Option<Envelope>) -> Result<Lane> {
    let Some(envelope) = first else {
        return Err(Error::Handshake("closed before handshake".into()));
    };
    let lane = envelope.lane_tag;
    if !lane.is_display() {
        warn!(lane = lane.as_str(), "handshake on broadcast lane");
        return Err(Error::Handshake(format!("lane {} is not a display lane", lane.as_str())));
    }
    if envelope.action != Action::StartedDisplay {
        return Err(Error::Handshake(format!(
            "expected startedDisplay, got {}",
            envelope.action.kind()
        )));
    }
    Ok(lane)
}

#[cfg(test)]
mod tests {
    use picker_protocol::add_channel_to_action;

    use super::*;

    #[test]
    fn handshake_binds_display_lanes() {
        let first = add_channel_to_action(Action::StartedDisplay, Lane::UrlBar);
        assert_eq!(handshake(Some(first)).unwrap(), Lane::UrlBar);
    }

    #[test]
    fn handshake_rejects_everything_else() {
        assert!(handshake(None).is_err());
        let main = add_channel_to_action(Action::StartedDisplay, Lane::Main);
        assert!(handshake(Some(main)).is_err());
        let click = add_channel_to_action(Action::clicked_app("a", false, false), Lane::Picker);
        assert!(matches!(handshake(Some(click)), Err(Error::Handshake(_))));
    }
}
