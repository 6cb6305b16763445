//! The closed set of actions exchanged between the coordinator, its
//! collaborators and the displays.

use serde::{Deserialize, Serialize};

use crate::{CanonicalState, KeyboardLayoutMap, Storage};

/// Payload of [`Action::ClickedApp`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppClick {
    /// App to launch.
    pub app_id: String,
    /// Alt/Option was held.
    pub is_alt: bool,
    /// Shift was held.
    pub is_shift: bool,
}

/// Payload of [`Action::PressedKey`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPress {
    /// Layout-independent key code, e.g. `KeyS`.
    pub physical_key: String,
    /// Alt/Option was held.
    #[serde(default)]
    pub alt_key: bool,
    /// Shift was held.
    #[serde(default)]
    pub shift_key: bool,
    /// Command/Meta was held.
    #[serde(default)]
    pub meta_key: bool,
}

/// Payload of [`Action::ReorderedApp`]: move `source_id` onto `destination_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reorder {
    /// Dragged app.
    pub source_id: String,
    /// App the drag was dropped on.
    pub destination_id: String,
}

/// Payload of [`Action::UpdatedHotCode`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotCodeUpdate {
    /// App to bind.
    pub app_id: String,
    /// New physical key code, or `None` to unbind.
    pub hot_code: Option<String>,
}

/// Payload of [`Action::ReportedLaunchFailure`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchFailure {
    /// App that failed to open.
    pub app_id: String,
    /// Collaborator-provided reason.
    pub message: String,
}

/// Snapshot handed over by the persisted-settings collaborator at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StartupSignal {
    /// Persisted settings.
    pub storage: Storage,
}

/// A single message. Serialized as `{ "type": ..., "payload": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Action {
    // Collaborators → coordinator.
    /// Ids of the browsers currently installed (unordered snapshot).
    RetrievedInstalledApps(Vec<String>),
    /// Persisted settings loaded at startup.
    ReceivedStartupSignal(StartupSignal),
    /// The OS handed a URL to the application.
    OpenedUrl(String),
    /// The active keyboard layout changed.
    UpdatedKeyboardLayout(KeyboardLayoutMap),
    /// A launch request failed after the fact.
    ReportedLaunchFailure(LaunchFailure),

    // Displays → coordinator.
    /// A display connected and wants a full snapshot.
    StartedDisplay,
    /// An app tile was clicked.
    ClickedApp(AppClick),
    /// A key went down while the picker had focus.
    PressedKey(KeyPress),
    /// A drag gesture finished.
    ReorderedApp(Reorder),
    /// The URL bar backspace button was clicked.
    ClickedUrlBackspaceButton,
    /// The URL bar copy button was clicked.
    ClickedCopyUrl,
    /// A hot code was assigned or cleared.
    UpdatedHotCode(HotCodeUpdate),
    /// The picker window was resized.
    ResizedPicker(u32),
    /// First-run setup was completed.
    CompletedSetup,
    /// The support prompt was closed.
    DismissedSupportMessage,

    // Coordinator → displays.
    /// Full canonical snapshot after a transition.
    SyncedState(Box<CanonicalState>),
}

impl Action {
    /// Stable wire name of this action kind, used for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RetrievedInstalledApps(_) => "retrievedInstalledApps",
            Self::ReceivedStartupSignal(_) => "receivedStartupSignal",
            Self::OpenedUrl(_) => "openedUrl",
            Self::UpdatedKeyboardLayout(_) => "updatedKeyboardLayout",
            Self::ReportedLaunchFailure(_) => "reportedLaunchFailure",
            Self::StartedDisplay => "startedDisplay",
            Self::ClickedApp(_) => "clickedApp",
            Self::PressedKey(_) => "pressedKey",
            Self::ReorderedApp(_) => "reorderedApp",
            Self::ClickedUrlBackspaceButton => "clickedUrlBackspaceButton",
            Self::ClickedCopyUrl => "clickedCopyUrl",
            Self::UpdatedHotCode(_) => "updatedHotCode",
            Self::ResizedPicker(_) => "resizedPicker",
            Self::CompletedSetup => "completedSetup",
            Self::DismissedSupportMessage => "dismissedSupportMessage",
            Self::SyncedState(_) => "syncedState",
        }
    }

    /// True for kinds a display may send. Anything else arriving on a display
    /// lane is dropped by the coordinator.
    pub fn is_display_intent(&self) -> bool {
        matches!(
            self,
            Self::StartedDisplay
                | Self::ClickedApp(_)
                | Self::PressedKey(_)
                | Self::ReorderedApp(_)
                | Self::ClickedUrlBackspaceButton
                | Self::ClickedCopyUrl
                | Self::UpdatedHotCode(_)
                | Self::ResizedPicker(_)
                | Self::CompletedSetup
                | Self::DismissedSupportMessage
        )
    }

    /// Shorthand for a click intent.
    pub fn clicked_app(app_id: impl Into<String>, is_alt: bool, is_shift: bool) -> Self {
        Self::ClickedApp(AppClick {
            app_id: app_id.into(),
            is_alt,
            is_shift,
        })
    }

    /// Shorthand for a reorder intent.
    pub fn reordered_app(source_id: impl Into<String>, destination_id: impl Into<String>) -> Self {
        Self::ReorderedApp(Reorder {
            source_id: source_id.into(),
            destination_id: destination_id.into(),
        })
    }

    /// Shorthand for an installed-apps report.
    pub fn retrieved_installed_apps<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::RetrievedInstalledApps(ids.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn adjacently_tagged_shape() {
        let v = serde_json::to_value(Action::clicked_app("org.mozilla.firefox", false, true))
            .unwrap();
        assert_eq!(
            v,
            json!({
                "type": "clickedApp",
                "payload": {"appId": "org.mozilla.firefox", "isAlt": false, "isShift": true}
            })
        );
    }

    #[test]
    fn unit_variants_have_no_payload() {
        let v = serde_json::to_value(Action::ClickedUrlBackspaceButton).unwrap();
        assert_eq!(v, json!({"type": "clickedUrlBackspaceButton"}));
    }

    #[test]
    fn key_press_modifiers_default_to_false() {
        let a: Action =
            serde_json::from_value(json!({"type": "pressedKey", "payload": {"physicalKey": "KeyS"}}))
                .unwrap();
        assert_eq!(
            a,
            Action::PressedKey(KeyPress {
                physical_key: "KeyS".into(),
                alt_key: false,
                shift_key: false,
                meta_key: false,
            })
        );
    }

    #[test]
    fn collaborator_events_are_not_display_intents() {
        assert!(Action::clicked_app("a", false, false).is_display_intent());
        assert!(Action::StartedDisplay.is_display_intent());
        assert!(!Action::OpenedUrl("http://example.com".into()).is_display_intent());
        assert!(!Action::retrieved_installed_apps(["a"]).is_display_intent());
        assert!(!Action::SyncedState(Box::default()).is_display_intent());
    }

    #[test]
    fn kind_matches_wire_tag() {
        let samples = [
            Action::retrieved_installed_apps(["a"]),
            Action::OpenedUrl("http://example.com".into()),
            Action::reordered_app("a", "b"),
            Action::ResizedPicker(300),
            Action::DismissedSupportMessage,
            Action::SyncedState(Box::default()),
        ];
        for action in samples {
            let v = serde_json::to_value(&action).unwrap();
            assert_eq!(v["type"], action.kind());
        }
    }
}
