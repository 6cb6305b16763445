//! The generic display adapter.

use picker_protocol::{Action, CanonicalState, Envelope, Lane, LaneSender, ipc::BroadcastRx};
use tracing::{debug, trace, warn};

use crate::{Error, Result};

/// Read-only view state folded from canonical snapshots.
pub trait Projection: Default {
    /// Lane this display sends intents on.
    const LANE: Lane;

    /// Replace the mirrored parts of the view with `state`.
    fn fold(&mut self, state: &CanonicalState);
}

/// One connected display: its projection plus its outbox.
#[derive(Debug)]
pub struct Display<P> {
    /// Local view.
    view: P,
    /// Intents to the coordinator.
    outbox: LaneSender,
    /// Whether any snapshot has arrived yet.
    synced: bool,
}

impl<P: Projection> Display<P> {
    /// Wrap an outbox. Fails if it is bound to another lane.
    pub fn new(outbox: LaneSender) -> Result<Self> {
        if outbox.lane() != P::LANE {
            return Err(Error::WrongLane {
                expected: P::LANE.as_str(),
                actual: outbox.lane().as_str(),
            });
        }
        Ok(Self {
            view: P::default(),
            outbox,
            synced: false,
        })
    }

    /// Current view.
    #[must_use]
    pub fn view(&self) -> &P {
        &self.view
    }

    /// Mutable view, for ephemeral local state only.
    pub fn view_mut(&mut self) -> &mut P {
        &mut self.view
    }

    /// True once the first snapshot has been folded in. Until then the view
    /// is the projection's default and should not be rendered as real data.
    #[must_use]
    pub fn is_synced(&self) -> bool {
        self.synced
    }

    /// Ask the coordinator for a fresh snapshot.
    pub fn request_sync(&self) -> bool {
        self.outbox.send(Action::StartedDisplay)
    }

    /// Fold a broadcast envelope. Returns true when the view changed.
    pub fn receive(&mut self, envelope: Envelope) -> bool {
        let Some(action) = envelope.accept(Lane::Main) else {
            return false;
        };
        match action {
            Action::SyncedState(state) => {
                self.view.fold(&state);
                self.synced = true;
                true
            }
            other => {
                trace!(lane = P::LANE.as_str(), kind = other.kind(), "ignoring broadcast");
                false
            }
        }
    }

    /// Send an intent. Non-intent actions are refused locally.
    pub fn send(&self, action: Action) -> bool {
        if !action.is_display_intent() {
            warn!(lane = P::LANE.as_str(), kind = action.kind(), "not a display intent");
            return false;
        }
        debug!(lane = P::LANE.as_str(), kind = action.kind(), "sending intent");
        self.outbox.send(action)
    }

    /// Send an intent if one was produced.
    pub fn send_opt(&self, action: Option<Action>) -> bool {
        action.is_some_and(|a| self.send(a))
    }

    /// Wait for the next broadcast that changes the view.
    ///
    /// Returns `None` once the coordinator has gone away.
    pub async fn next_update(&mut self, inbox: &mut BroadcastRx) -> Option<&P> {
        loop {
            let envelope = inbox.recv().await?;
            if self.receive(envelope) {
                return Some(&self.view);
            }
        }
    }

    /// Fold broadcasts until the inbox closes, calling `render` after each
    /// change.
    pub async fn run<F>(mut self, mut inbox: BroadcastRx, mut render: F)
    where
        F: FnMut(&P),
    {
        while let Some(view) = self.next_update(&mut inbox).await {
            render(view);
        }
        debug!(lane = P::LANE.as_str(), "display inbox closed");
    }
}

#[cfg(test)]
mod tests {
    use picker_protocol::{
        add_channel_to_action,
        ipc::{broadcast_channel, intent_channel},
    };

    use super::*;

    #[derive(Debug, Default)]
    struct UrlOnly(String);

    impl Projection for UrlOnly {
        const LANE: Lane = Lane::UrlBar;

        fn fold(&mut self, state: &CanonicalState) {
            self.0 = state.url.clone();
        }
    }

    fn synced(url: &str) -> Envelope {
        let state = CanonicalState {
            url: url.into(),
            ..CanonicalState::default()
        };
        add_channel_to_action(Action::SyncedState(Box::new(state)), Lane::Main)
    }

    #[test]
    fn outbox_lane_must_match() {
        let (tx, _rx) = intent_channel();
        assert!(Display::<UrlOnly>::new(LaneSender::new(Lane::Picker, tx.clone())).is_err());
        assert!(Display::<UrlOnly>::new(LaneSender::new(Lane::UrlBar, tx)).is_ok());
    }

    #[test]
    fn waits_for_first_broadcast() {
        let (tx, _rx) = intent_channel();
        let mut d = Display::<UrlOnly>::new(LaneSender::new(Lane::UrlBar, tx)).unwrap();
        assert!(!d.is_synced());
        assert!(d.receive(synced("http://a.com/")));
        assert!(d.is_synced());
        assert_eq!(d.view().0, "http://a.com/");
    }

    #[test]
    fn broadcasts_not_tagged_main_are_ignored() {
        let (tx, _rx) = intent_channel();
        let mut d = Display::<UrlOnly>::new(LaneSender::new(Lane::UrlBar, tx)).unwrap();
        let mut env = synced("http://a.com/");
        env.lane_tag = Lane::Picker;
        assert!(!d.receive(env));
        assert!(!d.is_synced());
        assert!(!d.receive(add_channel_to_action(Action::CompletedSetup, Lane::Main)));
    }

    #[test]
    fn sends_tagged_intents_only() {
        let (tx, mut rx) = intent_channel();
        let d = Display::<UrlOnly>::new(LaneSender::new(Lane::UrlBar, tx)).unwrap();
        assert!(!d.send(Action::OpenedUrl("http://a.com/".into())));
        assert!(d.send(Action::ClickedCopyUrl));
        let routed = rx.try_recv().unwrap();
        assert_eq!(routed.lane, Lane::UrlBar);
        assert_eq!(routed.envelope.lane_tag, Lane::UrlBar);
        assert_eq!(routed.envelope.action, Action::ClickedCopyUrl);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn run_renders_each_update() {
        let (tx, _rx) = intent_channel();
        let d = Display::<UrlOnly>::new(LaneSender::new(Lane::UrlBar, tx)).unwrap();
        let (btx, brx) = broadcast_channel();
        btx.send(synced("http://a.com/")).unwrap();
        btx.send(add_channel_to_action(Action::CompletedSetup, Lane::Main))
            .unwrap();
        btx.send(synced("http://b.com/")).unwrap();
        drop(btx);
        let mut seen = Vec::new();
        d.run(brx, |v| seen.push(v.0.clone())).await;
        assert_eq!(seen, ["http://a.com/", "http://b.com/"]);
    }
}
