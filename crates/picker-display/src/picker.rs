//! The picker window: one tile per installed browser.

use picker_engine::{layout::resolve_virtual_key, ordering::move_to_anchor};
use picker_protocol::{
    Action, AppEntry, CanonicalState, DEFAULT_WINDOW_HEIGHT, HotCodeUpdate, KeyboardLayoutMap,
    Lane, SupportMessage,
};
use tracing::trace;

use crate::Projection;

/// Whether the picker has anything to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerStatus {
    /// No installed browser is known yet.
    Loading,
    /// At least one tile can be shown.
    Ready,
}

/// An in-progress drag. Local to the display and never broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragPreview {
    /// Tile being dragged.
    pub source_id: String,
    /// Tile currently under the pointer.
    pub over_id: Option<String>,
}

/// Mirror of the canonical state as the picker window needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerView {
    /// Every known app, in canonical order.
    apps: Vec<AppEntry>,
    /// URL waiting to be opened.
    url: String,
    /// First-run setup finished.
    is_setup: bool,
    /// Support prompt state.
    support_message: SupportMessage,
    /// Window height.
    window_height: u32,
    /// Ephemeral drag state.
    drag: Option<DragPreview>,
    /// Layout of the keyboard this display runs on. Only used for labels.
    layout: KeyboardLayoutMap,
}

impl Default for PickerView {
    fn default() -> Self {
        Self {
            apps: Vec::new(),
            url: String::new(),
            is_setup: false,
            support_message: SupportMessage::default(),
            window_height: DEFAULT_WINDOW_HEIGHT,
            drag: None,
            layout: KeyboardLayoutMap::default(),
        }
    }
}

impl Projection for PickerView {
    const LANE: Lane = Lane::Picker;

    fn fold(&mut self, state: &CanonicalState) {
        self.apps = state.apps.clone();
        self.url = state.url.clone();
        self.is_setup = state.is_setup;
        self.support_message = state.support_message;
        self.window_height = state.window_height;

        // A drag survives a snapshot only while its tiles still exist.
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        let alive = |id: &str| state.installed_apps().any(|a| a.id == id);
        if !alive(&drag.source_id) {
            trace!(source = %drag.source_id, "drag source vanished");
            self.drag = None;
        } else if drag.over_id.as_deref().is_some_and(|id| !alive(id)) {
            drag.over_id = None;
        }
    }
}

impl PickerView {
    /// Loading until at least one installed app is known.
    #[must_use]
    pub fn status(&self) -> PickerStatus {
        if self.installed().next().is_some() {
            PickerStatus::Ready
        } else {
            PickerStatus::Loading
        }
    }

    /// Installed apps in canonical order.
    fn installed(&self) -> impl Iterator<Item = &AppEntry> {
        self.apps.iter().filter(|a| a.is_installed)
    }

    /// Tiles to render: installed apps in canonical order, rearranged by the
    /// drag preview if one is hovering over another tile.
    #[must_use]
    pub fn tiles(&self) -> Vec<&AppEntry> {
        let mut tiles: Vec<&AppEntry> = self.installed().collect();
        if let Some(DragPreview {
            source_id,
            over_id: Some(over_id),
        }) = &self.drag
        {
            move_to_anchor(&mut tiles, source_id, over_id, |a| a.id.as_str());
        }
        tiles
    }

    /// Every known app, installed or not, in canonical order.
    #[must_use]
    pub fn apps(&self) -> &[AppEntry] {
        &self.apps
    }

    /// URL waiting to be opened; empty when none.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// First-run setup finished.
    #[must_use]
    pub fn is_setup(&self) -> bool {
        self.is_setup
    }

    /// Support prompt state.
    #[must_use]
    pub fn support_message(&self) -> SupportMessage {
        self.support_message
    }

    /// Mirrored window height.
    #[must_use]
    pub fn window_height(&self) -> u32 {
        self.window_height
    }

    /// Active drag, if any.
    #[must_use]
    pub fn drag(&self) -> Option<&DragPreview> {
        self.drag.as_ref()
    }

    /// Replace the local keyboard layout used for tile labels.
    pub fn set_layout(&mut self, layout: KeyboardLayoutMap) {
        self.layout = layout;
    }

    /// Key label shown on a tile with a hot code, resolved under the local
    /// layout.
    #[must_use]
    pub fn hot_key_label(&self, entry: &AppEntry) -> Option<String> {
        entry
            .hot_code
            .as_deref()
            .map(|code| resolve_virtual_key(code, &self.layout))
    }

    /// Click intent for a visible tile.
    #[must_use]
    pub fn click(&self, app_id: &str, is_alt: bool, is_shift: bool) -> Option<Action> {
        self.installed()
            .any(|a| a.id == app_id)
            .then(|| Action::clicked_app(app_id, is_alt, is_shift))
    }

    /// Bind or clear a hot code on a known app.
    #[must_use]
    pub fn assign_hot_code(&self, app_id: &str, hot_code: Option<&str>) -> Option<Action> {
        self.apps.iter().any(|a| a.id == app_id).then(|| {
            Action::UpdatedHotCode(HotCodeUpdate {
                app_id: app_id.to_string(),
                hot_code: hot_code.map(str::to_string),
            })
        })
    }

    /// Resize intent, skipped when the height is already current.
    #[must_use]
    pub fn resize(&self, height: u32) -> Option<Action> {
        (height != self.window_height).then_some(Action::ResizedPicker(height))
    }

    /// Setup intent, skipped when setup is already done.
    #[must_use]
    pub fn complete_setup(&self) -> Option<Action> {
        (!self.is_setup).then_some(Action::CompletedSetup)
    }

    /// Dismiss intent, only while the prompt is showing.
    #[must_use]
    pub fn dismiss_support_message(&self) -> Option<Action> {
        (self.support_message == SupportMessage::Due).then_some(Action::DismissedSupportMessage)
    }

    /// Start dragging a visible tile.
    pub fn begin_drag(&mut self, app_id: &str) -> bool {
        if !self.installed().any(|a| a.id == app_id) {
            return false;
        }
        self.drag = Some(DragPreview {
            source_id: app_id.to_string(),
            over_id: None,
        });
        true
    }

    /// The pointer moved over a tile.
    pub fn drag_over(&mut self, app_id: &str) -> bool {
        let visible = self.installed().any(|a| a.id == app_id);
        match self.drag.as_mut() {
            Some(drag) if visible => {
                drag.over_id = Some(app_id.to_string());
                true
            }
            _ => false,
        }
    }

    /// Abandon the drag; the tiles snap back to canonical order.
    pub fn cancel_drag(&mut self) {
        self.drag = None;
    }

    /// Finish the drag. The preview is cleared either way; the new order shows
    /// up only once the coordinator broadcasts it.
    pub fn drop_drag(&mut self) -> Option<Action> {
        let drag = self.drag.take()?;
        let over_id = drag.over_id?;
        (over_id != drag.source_id).then(|| Action::reordered_app(drag.source_id, over_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIREFOX: &str = "org.mozilla.firefox";
    const SAFARI: &str = "com.apple.Safari";
    const BRAVE: &str = "com.brave.Browser.nightly";

    fn view_of(apps: Vec<AppEntry>) -> PickerView {
        let mut view = PickerView::default();
        view.fold(&CanonicalState {
            apps,
            ..CanonicalState::default()
        });
        view
    }

    fn ids(view: &PickerView) -> Vec<&str> {
        view.tiles().into_iter().map(|a| a.id.as_str()).collect()
    }

    fn three() -> PickerView {
        view_of(vec![
            AppEntry::installed(FIREFOX),
            AppEntry::installed(SAFARI),
            AppEntry::installed(BRAVE),
        ])
    }

    #[test]
    fn loading_until_an_installed_app_exists() {
        assert_eq!(PickerView::default().status(), PickerStatus::Loading);
        let uninstalled = AppEntry {
            is_installed: false,
            ..AppEntry::installed(FIREFOX)
        };
        let view = view_of(vec![uninstalled]);
        assert_eq!(view.status(), PickerStatus::Loading);
        assert!(view.tiles().is_empty());
        assert_eq!(view.apps().len(), 1);
        assert_eq!(three().status(), PickerStatus::Ready);
    }

    #[test]
    fn tiles_skip_uninstalled_apps() {
        let view = view_of(vec![
            AppEntry::installed(FIREFOX),
            AppEntry {
                is_installed: false,
                ..AppEntry::installed(SAFARI)
            },
            AppEntry::installed(BRAVE),
        ]);
        assert_eq!(ids(&view), [FIREFOX, BRAVE]);
        assert_eq!(view.click(SAFARI, false, false), None);
    }

    #[test]
    fn drag_preview_rearranges_locally() {
        let mut view = three();
        assert!(view.begin_drag(BRAVE));
        assert_eq!(ids(&view), [FIREFOX, SAFARI, BRAVE]);
        assert!(view.drag_over(FIREFOX));
        assert_eq!(ids(&view), [BRAVE, FIREFOX, SAFARI]);
        // Mirrored order is untouched.
        assert_eq!(view.apps()[0].id, FIREFOX);

        assert_eq!(view.drop_drag(), Some(Action::reordered_app(BRAVE, FIREFOX)));
        assert_eq!(view.drag(), None);
        assert_eq!(ids(&view), [FIREFOX, SAFARI, BRAVE]);
    }

    #[test]
    fn cancelled_or_self_drops_send_nothing() {
        let mut view = three();
        view.begin_drag(SAFARI);
        view.drag_over(BRAVE);
        view.cancel_drag();
        assert_eq!(view.drop_drag(), None);

        view.begin_drag(SAFARI);
        view.drag_over(SAFARI);
        assert_eq!(view.drop_drag(), None);

        view.begin_drag(SAFARI);
        assert_eq!(view.drop_drag(), None);
    }

    #[test]
    fn drag_requires_visible_tiles() {
        let mut view = three();
        assert!(!view.begin_drag("com.example.Unknown"));
        assert!(!view.drag_over(FIREFOX));
        view.begin_drag(FIREFOX);
        assert!(!view.drag_over("com.example.Unknown"));
    }

    #[test]
    fn snapshot_without_drag_source_clears_preview() {
        let mut view = three();
        view.begin_drag(SAFARI);
        view.drag_over(FIREFOX);
        view.fold(&CanonicalState {
            apps: vec![AppEntry::installed(FIREFOX), AppEntry::installed(SAFARI)],
            ..CanonicalState::default()
        });
        assert!(view.drag().is_some());
        view.fold(&CanonicalState {
            apps: vec![AppEntry::installed(SAFARI)],
            ..CanonicalState::default()
        });
        assert_eq!(view.drag().unwrap().over_id, None);
        view.fold(&CanonicalState::default());
        assert_eq!(view.drag(), None);
    }

    #[test]
    fn intents_skip_redundant_requests() {
        let mut view = three();
        assert_eq!(view.resize(DEFAULT_WINDOW_HEIGHT), None);
        assert_eq!(view.resize(320), Some(Action::ResizedPicker(320)));
        assert_eq!(view.complete_setup(), Some(Action::CompletedSetup));
        assert_eq!(view.dismiss_support_message(), None);
        view.fold(&CanonicalState {
            is_setup: true,
            support_message: SupportMessage::Due,
            ..CanonicalState::default()
        });
        assert_eq!(view.complete_setup(), None);
        assert_eq!(
            view.dismiss_support_message(),
            Some(Action::DismissedSupportMessage)
        );
    }

    #[test]
    fn hot_code_intents_and_labels() {
        let view = three();
        assert_eq!(
            view.assign_hot_code(SAFARI, Some("KeyS")),
            Some(Action::UpdatedHotCode(HotCodeUpdate {
                app_id: SAFARI.into(),
                hot_code: Some("KeyS".into()),
            }))
        );
        assert_eq!(view.assign_hot_code("com.example.Unknown", None), None);
        let bound = AppEntry {
            hot_code: Some("Digit2".into()),
            ..AppEntry::installed(SAFARI)
        };
        assert_eq!(view.hot_key_label(&bound).as_deref(), Some("2"));
        assert_eq!(view.hot_key_label(&AppEntry::installed(FIREFOX)), None);
    }

    #[test]
    fn hot_key_labels_follow_local_layout() {
        let mut view = PickerView::default();
        let bound = AppEntry {
            hot_code: Some("KeyQ".into()),
            ..AppEntry::installed(SAFARI)
        };
        assert_eq!(view.hot_key_label(&bound).as_deref(), Some("q"));
        view.set_layout([("KeyQ".to_string(), "A".to_string())].into());
        assert_eq!(view.hot_key_label(&bound).as_deref(), Some("a"));
        // Snapshots never carry a layout, so folding one keeps it.
        view.fold(&CanonicalState::default());
        assert_eq!(view.hot_key_label(&bound).as_deref(), Some("a"));
    }
}
