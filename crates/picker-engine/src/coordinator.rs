//! The coordinator shell around [`CoordinatorState`].
//!
//! One task owns the state and processes inbound messages to completion, one
//! at a time, so no lock ever guards canonical state. Everything else talks to
//! it by message:
//!
//! - Collaborators push events through [`CoordinatorHandle::dispatch`].
//! - Displays attach an output channel ([`CoordinatorHandle::connect`] or
//!   [`CoordinatorHandle::attach`]) and send intents on their own lane through
//!   a [`LaneSender`].
//!
//! After every applied action the new snapshot is broadcast to all displays.

use picker_protocol::{
    Action, CanonicalState, Lane, LaneSender, LaunchFailure, Routed,
    ipc::{BroadcastRx, BroadcastTx, IntentRx, IntentTx, broadcast_channel, intent_channel},
};
use tokio::{
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender, WeakUnboundedSender},
    task::JoinHandle,
};
use tracing::{debug, info, trace, warn};

use crate::{Collaborators, CoordinatorState, DisplayRegistry, Effect, LaunchRequest};

/// Messages on the coordinator's control inbox.
#[derive(Debug)]
pub enum Control {
    /// An event from a collaborator.
    Dispatch(Action),
    /// Register a display's output channel.
    Attach {
        /// Lane the display sends on.
        lane: Lane,
        /// Where broadcasts for it go.
        tx: BroadcastTx,
    },
    /// Stop the run loop.
    Shutdown,
}

/// A connected display's two ends.
#[derive(Debug)]
pub struct DisplayLink {
    /// Intents to the coordinator, tagged for this display's lane.
    pub outbox: LaneSender,
    /// Broadcasts from the coordinator.
    pub inbox: BroadcastRx,
}

/// Cheap, cloneable handle for talking to a running coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorHandle {
    /// Control inbox.
    control: UnboundedSender<Control>,
    /// Intent inbox shared by all display lanes.
    intents: IntentTx,
}

impl CoordinatorHandle {
    /// Deliver a collaborator event. False when the coordinator has stopped.
    pub fn dispatch(&self, action: Action) -> bool {
        self.control.send(Control::Dispatch(action)).is_ok()
    }

    /// Register an output channel for a display on `lane`.
    pub fn attach(&self, lane: Lane, tx: BroadcastTx) -> bool {
        self.control.send(Control::Attach { lane, tx }).is_ok()
    }

    /// A sender that tags intents for `lane`.
    pub fn lane_sender(&self, lane: Lane) -> LaneSender {
        LaneSender::new(lane, self.intents.clone())
    }

    /// Connect an in-process display on `lane`. Its first broadcast is the
    /// current snapshot.
    pub fn connect(&self, lane: Lane) -> DisplayLink {
        let (tx, inbox) = broadcast_channel();
        self.attach(lane, tx);
        DisplayLink {
            outbox: self.lane_sender(lane),
            inbox,
        }
    }

    /// Ask the run loop to stop.
    pub fn shutdown(&self) -> bool {
        self.control.send(Control::Shutdown).is_ok()
    }
}

/// Owner of canonical state and of the display registry.
pub struct Coordinator<C> {
    /// The only copy of canonical state.
    state: CoordinatorState,
    /// Connected displays.
    displays: DisplayRegistry,
    /// Side-effect sinks.
    collaborators: C,
    /// Control inbox.
    control_rx: UnboundedReceiver<Control>,
    /// Intent inbox.
    intent_rx: IntentRx,
    /// Route for feeding collaborator failures back in; weak so it does not
    /// keep the control inbox open.
    feedback: WeakUnboundedSender<Control>,
}

impl<C: Collaborators> Coordinator<C> {
    /// Create a coordinator with empty state, plus a handle to it.
    pub fn new(collaborators: C) -> (Self, CoordinatorHandle) {
        Self::with_state(collaborators, CoordinatorState::new())
    }

    /// Create a coordinator starting from `state`.
    pub fn with_state(collaborators: C, state: CoordinatorState) -> (Self, CoordinatorHandle) {
        let (control_tx, control_rx) = mpsc::unbounded_channel();
        let (intent_tx, intent_rx) = intent_channel();
        let coordinator = Self {
            state,
            displays: DisplayRegistry::new(),
            collaborators,
            control_rx,
            intent_rx,
            feedback: control_tx.downgrade(),
        };
        let handle = CoordinatorHandle {
            control: control_tx,
            intents: intent_tx,
        };
        (coordinator, handle)
    }

    /// Current canonical snapshot.
    pub fn state(&self) -> &CanonicalState {
        self.state.canonical()
    }

    /// Number of attached displays.
    pub fn display_count(&self) -> usize {
        self.displays.len()
    }

    /// Process inbound messages until shutdown or until every sender is gone.
    pub async fn run(mut self) {
        let mut control_open = true;
        let mut intents_open = true;
        while control_open || intents_open {
            tokio::select! {
                biased;
                ctrl = self.control_rx.recv(), if control_open => match ctrl {
                    Some(Control::Shutdown) => {
                        debug!("coordinator shutdown requested");
                        break;
                    }
                    Some(ctrl) => self.handle_control(ctrl),
                    None => control_open = false,
                },
                routed = self.intent_rx.recv(), if intents_open => match routed {
                    Some(routed) => self.handle_intent(routed),
                    None => intents_open = false,
                },
            }
        }
        debug!("coordinator stopped");
    }

    /// Run on a Tokio task.
    pub fn spawn(self) -> JoinHandle<()>
    where
        C: 'static,
    {
        tokio::spawn(self.run())
    }

    /// Handle one control message. `Shutdown` is a no-op here.
    pub fn handle_control(&mut self, ctrl: Control) {
        match ctrl {
            Control::Dispatch(action) => self.process(action),
            Control::Attach { lane, tx } => {
                if lane.is_display() {
                    self.displays.attach(lane, tx, self.state.canonical());
                } else {
                    warn!(lane = lane.as_str(), "refusing display on broadcast lane");
                }
            }
            Control::Shutdown => {}
        }
    }

    /// Handle one envelope from a display.
    pub fn handle_intent(&mut self, routed: Routed) {
        let Routed { lane, envelope } = routed;
        if !lane.is_display() {
            trace!(lane = lane.as_str(), "intent on broadcast lane dropped");
            return;
        }
        let Some(action) = envelope.accept(lane) else {
            return;
        };
        if !action.is_display_intent() {
            debug!(lane = lane.as_str(), kind = action.kind(), "display sent a non-intent; dropped");
            return;
        }
        if matches!(action, Action::StartedDisplay) {
            debug!(lane = lane.as_str(), "display started; resyncing");
            self.displays.resync(lane, self.state.canonical());
            return;
        }
        self.process(action);
    }

    /// Apply, run effects, broadcast.
    fn process(&mut self, action: Action) {
        let kind = action.kind();
        let transition = self.state.apply(action);
        debug!(
            kind,
            changed = transition.changed,
            effects = transition.effects.len(),
            "applied"
        );
        for effect in transition.effects {
            self.run_effect(effect);
        }
        let remaining = self.displays.broadcast(self.state.canonical());
        trace!(displays = remaining, "broadcast");
    }

    /// Hand one effect to its collaborator.
    fn run_effect(&self, effect: Effect) {
        match effect {
            Effect::Launch(request) => self.launch(&request),
            Effect::Persist(storage) => {
                if let Err(e) = self.collaborators.persist(&storage) {
                    warn!(error = %e, "persist request failed");
                }
            }
            Effect::CopyToClipboard(text) => {
                if let Err(e) = self.collaborators.copy_to_clipboard(&text) {
                    warn!(error = %e, "clipboard request failed");
                }
            }
        }
    }

    /// Launch, feeding failures back as an informational action.
    fn launch(&self, request: &LaunchRequest) {
        info!(
            app_id = %request.app_id,
            is_alt = request.is_alt,
            is_shift = request.is_shift,
            virtual_key = ?request.virtual_key,
            "launching"
        );
        let Err(e) = self.collaborators.launch(request) else {
            return;
        };
        warn!(app_id = %request.app_id, error = %e, "launch request failed");
        if let Some(tx) = self.feedback.upgrade() {
            let failure = Action::ReportedLaunchFailure(LaunchFailure {
                app_id: request.app_id.clone(),
                message: e.to_string(),
            });
            tx.send(Control::Dispatch(failure)).ok();
        }
    }
}
