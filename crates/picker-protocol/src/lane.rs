//! Lanes, envelopes and the tag check every receiver performs.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{Action, ipc::IntentTx};

/// A named, directional route between the coordinator and the displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Lane {
    /// Coordinator → every connected display.
    Main,
    /// Picker window → coordinator.
    Picker,
    /// URL bar → coordinator.
    UrlBar,
}

impl Lane {
    /// The display→coordinator lanes.
    pub const DISPLAYS: [Self; 2] = [Self::Picker, Self::UrlBar];

    /// Stable name, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Picker => "picker",
            Self::UrlBar => "urlBar",
        }
    }

    /// True for lanes that carry intents from a display.
    pub fn is_display(&self) -> bool {
        !matches!(self, Self::Main)
    }
}

/// An action tagged with the lane it is meant for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Lane the sender intended.
    pub lane_tag: Lane,
    /// Wrapped action, flattened so `type` and `payload` sit beside the tag.
    #[serde(flatten)]
    pub action: Action,
}

impl Envelope {
    /// Unwrap the action if it was tagged for `lane`; otherwise drop it.
    pub fn accept(self, lane: Lane) -> Option<Action> {
        if self.lane_tag == lane {
            Some(self.action)
        } else {
            trace!(
                expected = lane.as_str(),
                tagged = self.lane_tag.as_str(),
                kind = self.action.kind(),
                "dropping mis-tagged envelope"
            );
            None
        }
    }
}

/// Wrap `action` with its lane tag.
pub fn add_channel_to_action(action: Action, lane: Lane) -> Envelope {
    Envelope {
        lane_tag: lane,
        action,
    }
}

/// An envelope together with the lane it actually arrived on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routed {
    /// Lane the transport delivered on.
    pub lane: Lane,
    /// Envelope as sent.
    pub envelope: Envelope,
}

/// A display's handle for sending intents to the coordinator on its own lane.
#[derive(Debug, Clone)]
pub struct LaneSender {
    /// Lane this sender writes to.
    lane: Lane,
    /// Coordinator inbox.
    tx: IntentTx,
}

impl LaneSender {
    /// Bind a coordinator inbox to `lane`.
    pub fn new(lane: Lane, tx: IntentTx) -> Self {
        Self { lane, tx }
    }

    /// Lane this sender writes to.
    pub fn lane(&self) -> Lane {
        self.lane
    }

    /// Tag `action` for this lane and send it.
    ///
    /// Returns false when the coordinator is gone; the action is dropped.
    pub fn send(&self, action: Action) -> bool {
        self.forward(add_channel_to_action(action, self.lane))
    }

    /// Send an already tagged envelope on this lane. The tag is left as is, so
    /// the coordinator still sees (and rejects) a mismatch.
    pub fn forward(&self, envelope: Envelope) -> bool {
        let routed = Routed {
            lane: self.lane,
            envelope,
        };
        match self.tx.send(routed) {
            Ok(()) => true,
            Err(_) => {
                trace!(lane = self.lane.as_str(), "coordinator gone; intent dropped");
                false
            }
        }
    }
}
