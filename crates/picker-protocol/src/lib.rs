//! Shared protocol types for the browser picker.
//!
//! The coordinator owns a [`CanonicalState`] and talks to display processes
//! (the picker window and the URL bar) exclusively through [`Action`] values
//! wrapped in an [`Envelope`] that names the [`Lane`] they travel on.
//!
//! - Lanes: `Lane::Main` fans out from the coordinator to every display;
//!   `Lane::Picker` and `Lane::UrlBar` carry intents from one display back to
//!   the coordinator.
//! - Receivers check the lane tag against the lane they listen on and drop
//!   anything that does not match. That check is the only authentication.
//! - Delivery is fire-and-forget. Nothing is retried or buffered for absent
//!   listeners; displays resynchronize from the full snapshot they receive on
//!   connect.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

mod action;
mod lane;

pub use action::{Action, AppClick, HotCodeUpdate, KeyPress, LaunchFailure, Reorder, StartupSignal};
pub use lane::{Envelope, Lane, LaneSender, Routed, add_channel_to_action};

/// Default picker window height in points, used until storage says otherwise.
pub const DEFAULT_WINDOW_HEIGHT: u32 = 200;

/// Physical key code (e.g. `KeyS`) to the character the active OS layout
/// produces for it. Replaced wholesale on every layout change.
pub type KeyboardLayoutMap = BTreeMap<String, String>;

/// A browser known to the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppEntry {
    /// Stable bundle/package identifier, unique within a list.
    pub id: String,
    /// True when the last installed-apps report contained this id.
    pub is_installed: bool,
    /// Physical key code bound to this app for one-press launch.
    #[serde(default)]
    pub hot_code: Option<String>,
}

impl AppEntry {
    /// An installed entry with no hot code.
    pub fn installed(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_installed: true,
            hot_code: None,
        }
    }
}

/// State of the "support this project" prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SupportMessage {
    /// Not shown.
    #[default]
    Hidden,
    /// Shown on the next picker appearance.
    Due,
    /// The user closed it; never shown again.
    Dismissed,
}

/// Persisted settings, as supplied at startup and as handed back to the
/// persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Storage {
    /// Persisted app order and hot codes.
    #[serde(default)]
    pub apps: Vec<AppEntry>,
    /// Picker window height.
    #[serde(default = "default_height")]
    pub height: u32,
    /// Whether first-run setup has been completed.
    #[serde(default)]
    pub is_setup: bool,
    /// Support prompt state.
    #[serde(default)]
    pub support_message: SupportMessage,
}

/// Serde default for [`Storage::height`].
fn default_height() -> u32 {
    DEFAULT_WINDOW_HEIGHT
}

impl Default for Storage {
    fn default() -> Self {
        Self {
            apps: Vec::new(),
            height: DEFAULT_WINDOW_HEIGHT,
            is_setup: false,
            support_message: SupportMessage::Hidden,
        }
    }
}

/// The coordinator's authoritative snapshot. Displays only ever mirror it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalState {
    /// Apps in user-visible order.
    pub apps: Vec<AppEntry>,
    /// URL in flight; empty when there is none.
    pub url: String,
    /// Whether first-run setup has been completed.
    pub is_setup: bool,
    /// Support prompt state.
    pub support_message: SupportMessage,
    /// Picker window height.
    pub window_height: u32,
}

impl Default for CanonicalState {
    fn default() -> Self {
        Self {
            apps: Vec::new(),
            url: String::new(),
            is_setup: false,
            support_message: SupportMessage::Hidden,
            window_height: DEFAULT_WINDOW_HEIGHT,
        }
    }
}

impl CanonicalState {
    /// Look up an entry by id.
    pub fn app(&self, id: &str) -> Option<&AppEntry> {
        self.apps.iter().find(|a| a.id == id)
    }

    /// Installed entries, in display order.
    pub fn installed_apps(&self) -> impl Iterator<Item = &AppEntry> {
        self.apps.iter().filter(|a| a.is_installed)
    }

    /// The persistable subset of this state.
    pub fn to_storage(&self) -> Storage {
        Storage {
            apps: self.apps.clone(),
            height: self.window_height,
            is_setup: self.is_setup,
            support_message: self.support_message,
        }
    }
}

/// Channel aliases and the line codec used by socket transports.
pub mod ipc {
    use tokio::sync::mpsc;

    use super::{Envelope, Routed};

    /// Coordinator→display sender (one per connected display).
    pub type BroadcastTx = mpsc::UnboundedSender<Envelope>;
    /// Coordinator→display receiver held by a display.
    pub type BroadcastRx = mpsc::UnboundedReceiver<Envelope>;
    /// Display→coordinator sender.
    pub type IntentTx = mpsc::UnboundedSender<Routed>;
    /// Display→coordinator receiver held by the coordinator.
    pub type IntentRx = mpsc::UnboundedReceiver<Routed>;

    /// Create a coordinator→display channel.
    pub fn broadcast_channel() -> (BroadcastTx, BroadcastRx) {
        mpsc::unbounded_channel::<Envelope>()
    }

    /// Create a display→coordinator channel.
    pub fn intent_channel() -> (IntentTx, IntentRx) {
        mpsc::unbounded_channel::<Routed>()
    }

    /// Newline-delimited JSON framing for envelopes.
    pub mod codec;
}
