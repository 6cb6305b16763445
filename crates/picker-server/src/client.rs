//! Display side of the socket transport.

use std::path::Path;

use picker_engine::DisplayLink;
use picker_protocol::{
    Action, Envelope, Lane, LaneSender, add_channel_to_action,
    ipc::{broadcast_channel, intent_channel},
};
use tokio::{
    io::{AsyncBufReadExt, BufReader, BufWriter, Lines},
    net::{
        UnixStream,
        unix::{OwnedReadHalf, OwnedWriteHalf},
    },
};
use tracing::{debug, trace};

use crate::{
    Error, Result,
    frame::{read_envelope, write_envelope},
};

/// A display's connection to the coordinator socket.
#[derive(Debug)]
pub struct Connection {
    /// Lane bound by the handshake.
    lane: Lane,
    /// Broadcast frames.
    lines: Lines<BufReader<OwnedReadHalf>>,
    /// Intent frames.
    writer: BufWriter<OwnedWriteHalf>,
}

impl Connection {
    /// Connect to `path` as a display on `lane` and send the handshake.
    pub async fn connect(path: impl AsRef<Path>, lane: Lane) -> Result<Self> {
        if !lane.is_display() {
            return Err(Error::Handshake(format!(
                "lane {} is not a display lane",
                lane.as_str()
            )));
        }
        let stream = UnixStream::connect(path.as_ref()).await?;
        let (reader, writer) = stream.into_split();
        let mut conn = Self {
            lane,
            lines: BufReader::new(reader).lines(),
            writer: BufWriter::new(writer),
        };
        conn.send(Action::StartedDisplay).await?;
        debug!(lane = lane.as_str(), socket = %path.as_ref().display(), "connected");
        Ok(conn)
    }

    /// Lane this connection sends on.
    pub fn lane(&self) -> Lane {
        self.lane
    }

    /// Tag `action` for this lane and send it.
    pub async fn send(&mut self, action: Action) -> Result<()> {
        self.send_envelope(&add_channel_to_action(action, self.lane))
            .await
    }

    /// Send an already tagged envelope as is.
    pub async fn send_envelope(&mut self, envelope: &Envelope) -> Result<()> {
        write_envelope(&mut self.writer, envelope).await
    }

    /// Next broadcast frame, or `None` once the coordinator hangs up.
    pub async fn recv(&mut self) -> Result<Option<Envelope>> {
        read_envelope(&mut self.lines).await
    }

    /// Hand the connection to a pump task and return in-process channel ends,
    /// so a display adapter can use it exactly like an in-process link.
    ///
    /// The task ends when the socket closes or when every clone of the
    /// outbox is dropped.
    pub fn into_link(self) -> DisplayLink {
        let (intent_tx, mut intent_rx) = intent_channel();
        let (broadcast_tx, broadcast_rx) = broadcast_channel();
        let Self {
            lane,
            mut lines,
            mut writer,
        } = self;
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    inbound = read_envelope(&mut lines) => match inbound {
                        Ok(Some(envelope)) => {
                            if broadcast_tx.send(envelope).is_err() {
                                break;
                            }
                        }
                        Ok(None) => break,
                        Err(e) => {
                            debug!(error = %e, "socket read failed");
                            break;
                        }
                    },
                    outbound = intent_rx.recv() => match outbound {
                        Some(routed) => {
                            if let Err(e) = write_envelope(&mut writer, &routed.envelope).await {
                                debug!(error = %e, "socket write failed");
                                break;
                            }
                        }
                        None => break,
                    },
                }
            }
            trace!(lane = lane.as_str(), "display pump stopped");
        });
        DisplayLink {
            outbox: LaneSender::new(lane, intent_tx),
            inbox: broadcast_rx,
        }
    }
}
