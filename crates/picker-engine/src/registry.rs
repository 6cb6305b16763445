use picker_protocol::{
    Action, CanonicalState, Envelope, Lane, add_channel_to_action, ipc::BroadcastTx,
};
use tracing::{debug, trace};

/// One connected display's output channel.
#[derive(Debug)]
struct DisplaySlot {
    /// Lane the display sends intents on; identifies its role.
    lane: Lane,
    /// Broadcast sink for this display.
    tx: BroadcastTx,
}

/// Output channels of the connected displays.
///
/// Connecting and disconnecting only touch this registry, never canonical
/// state. A display whose channel has closed is pruned on the next send.
#[derive(Debug, Default)]
pub struct DisplayRegistry {
    /// Connected displays in connection order.
    slots: Vec<DisplaySlot>,
}

impl DisplayRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a display and send it `state` so it starts in sync.
    pub fn attach(&mut self, lane: Lane, tx: BroadcastTx, state: &CanonicalState) {
        if tx.send(snapshot(state)).is_err() {
            trace!(lane = lane.as_str(), "display closed before first snapshot");
            return;
        }
        debug!(lane = lane.as_str(), "display attached");
        self.slots.push(DisplaySlot { lane, tx });
    }

    /// Send `state` to every display. Returns the number still connected.
    pub fn broadcast(&mut self, state: &CanonicalState) -> usize {
        let env = snapshot(state);
        self.slots.retain(|slot| deliver(slot, &env));
        self.slots.len()
    }

    /// Send `state` only to displays on `lane`.
    pub fn resync(&mut self, lane: Lane, state: &CanonicalState) {
        let env = snapshot(state);
        self.slots
            .retain(|slot| slot.lane != lane || deliver(slot, &env));
    }

    /// Number of attached displays.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when no display is attached.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Send one envelope; false when the display has gone away.
fn deliver(slot: &DisplaySlot, env: &Envelope) -> bool {
    match slot.tx.send(env.clone()) {
        Ok(()) => true,
        Err(_) => {
            debug!(lane = slot.lane.as_str(), "dropping disconnected display");
            false
        }
    }
}

/// Wrap a snapshot for the broadcast lane.
fn snapshot(state: &CanonicalState) -> Envelope {
    add_channel_to_action(Action::SyncedState(Box::new(state.clone())), Lane::Main)
}
