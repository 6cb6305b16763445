//! The coordinator's state machine.
//!
//! [`CoordinatorState::apply`] is total over [`Action`]: every kind has a
//! deterministic handler and anything that makes no sense (unknown ids,
//! display-bound actions arriving inbound) is an identity transition. Side
//! effects are returned as [`Effect`] values for the shell to execute; the
//! reducer itself performs no I/O.

use std::{collections::BTreeSet, mem};

use picker_protocol::{
    Action, AppClick, AppEntry, CanonicalState, HotCodeUpdate, KeyPress, KeyboardLayoutMap,
    Reorder, Storage, SupportMessage,
};
use tracing::{debug, trace, warn};

use crate::{layout::resolve_virtual_key, ordering::reorder_apps, url_trim::truncate_url};

/// Virtual key that, with Meta held, copies the URL in flight.
const COPY_KEY: &str = "c";

/// A request for the launch collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    /// App to open.
    pub app_id: String,
    /// URL in flight at the time of the request (may be empty).
    pub url: String,
    /// Alt/Option was held.
    pub is_alt: bool,
    /// Shift was held.
    pub is_shift: bool,
    /// Resolved character when the launch came from a hot code.
    pub virtual_key: Option<String>,
}

/// Side effects decided by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Open a browser.
    Launch(LaunchRequest),
    /// Durably save settings.
    Persist(Storage),
    /// Put text on the clipboard.
    CopyToClipboard(String),
}

/// Outcome of applying one action.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Transition {
    /// Canonical state differs from before the action.
    pub changed: bool,
    /// Effects to run, in order.
    pub effects: Vec<Effect>,
}

/// Everything the coordinator knows: the canonical snapshot plus inputs that
/// never leave the coordinator.
#[derive(Debug, Clone, Default)]
pub struct CoordinatorState {
    /// Broadcast to displays after every transition.
    canonical: CanonicalState,
    /// Ids from the most recent installed-apps report; `None` until the first.
    installed: Option<BTreeSet<String>>,
    /// Active keyboard layout.
    layout: KeyboardLayoutMap,
    /// The startup snapshot has been merged. Persistence waits for it.
    started: bool,
}

impl CoordinatorState {
    /// Fresh state: no apps, no URL, default window height.
    pub fn new() -> Self {
        Self::default()
    }

    /// The canonical snapshot.
    pub fn canonical(&self) -> &CanonicalState {
        &self.canonical
    }

    /// The keyboard layout currently in effect.
    pub fn layout(&self) -> &KeyboardLayoutMap {
        &self.layout
    }

    /// Whether the startup snapshot has been merged.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Apply one action.
    pub fn apply(&mut self, action: Action) -> Transition {
        let before = self.canonical.clone();
        let effects = match action {
            Action::RetrievedInstalledApps(ids) => self.retrieved_installed_apps(ids),
            Action::ReceivedStartupSignal(signal) => self.received_startup_signal(signal.storage),
            Action::OpenedUrl(url) => {
                self.canonical.url = url;
                Vec::new()
            }
            Action::UpdatedKeyboardLayout(layout) => {
                self.layout = layout;
                Vec::new()
            }
            Action::ReportedLaunchFailure(failure) => {
                warn!(app_id = %failure.app_id, message = %failure.message, "launch failed");
                Vec::new()
            }
            Action::ClickedApp(click) => self.launch(click, None),
            Action::PressedKey(press) => self.pressed_key(&press),
            Action::ReorderedApp(reorder) => self.reordered_app(&reorder),
            Action::ClickedUrlBackspaceButton => {
                self.canonical.url = truncate_url(&self.canonical.url);
                Vec::new()
            }
            Action::ClickedCopyUrl => self.copy_url(),
            Action::UpdatedHotCode(update) => self.updated_hot_code(update),
            Action::ResizedPicker(height) => {
                self.canonical.window_height = height;
                self.persist_if_changed(&before)
            }
            Action::CompletedSetup => {
                self.canonical.is_setup = true;
                self.persist_if_changed(&before)
            }
            Action::DismissedSupportMessage => {
                self.canonical.support_message = SupportMessage::Dismissed;
                self.persist_if_changed(&before)
            }
            // Answered by the shell, or only meaningful on the way out.
            Action::StartedDisplay | Action::SyncedState(_) => Vec::new(),
        };
        let effects = if self.started {
            effects
        } else {
            hold_back_persist(effects)
        };
        Transition {
            changed: self.canonical != before,
            effects,
        }
    }

    /// Upsert reported ids, flag the rest as uninstalled, append new ids.
    fn retrieved_installed_apps(&mut self, ids: Vec<String>) -> Vec<Effect> {
        let before = self.canonical.apps.clone();
        let reported: BTreeSet<String> = ids.iter().cloned().collect();
        for app in &mut self.canonical.apps {
            app.is_installed = reported.contains(&app.id);
        }
        for id in ids {
            if self.canonical.app(&id).is_none() {
                self.canonical.apps.push(AppEntry::installed(id));
            }
        }
        self.installed = Some(reported);
        if self.canonical.apps == before {
            Vec::new()
        } else {
            vec![Effect::Persist(self.canonical.to_storage())]
        }
    }

    /// Lay persisted order and hot codes over what we know so far. Saves the
    /// merged view when it differs from what was stored.
    fn received_startup_signal(&mut self, storage: Storage) -> Vec<Effect> {
        if self.started {
            debug!("repeated startup signal");
        }
        let incoming = storage.clone();
        let mut seen = BTreeSet::new();
        let mut merged = Vec::with_capacity(storage.apps.len() + self.canonical.apps.len());
        for stored in storage.apps {
            if !seen.insert(stored.id.clone()) {
                continue;
            }
            let is_installed = match &self.installed {
                Some(reported) => reported.contains(&stored.id),
                None => stored.is_installed,
            };
            merged.push(AppEntry {
                id: stored.id,
                is_installed,
                hot_code: stored.hot_code,
            });
        }
        for app in mem::take(&mut self.canonical.apps) {
            if seen.insert(app.id.clone()) {
                merged.push(app);
            }
        }
        self.canonical.apps = merged;
        self.canonical.is_setup = storage.is_setup;
        self.canonical.support_message = storage.support_message;
        self.canonical.window_height = storage.height;
        self.started = true;
        let snapshot = self.canonical.to_storage();
        if snapshot == incoming {
            Vec::new()
        } else {
            vec![Effect::Persist(snapshot)]
        }
    }

    /// Ask for a launch and clear the URL in flight.
    fn launch(&mut self, click: AppClick, virtual_key: Option<String>) -> Vec<Effect> {
        match self.canonical.app(&click.app_id) {
            Some(app) if app.is_installed => {}
            Some(_) => {
                debug!(app_id = %click.app_id, "ignoring launch of uninstalled app");
                return Vec::new();
            }
            None => {
                debug!(app_id = %click.app_id, "ignoring launch of unknown app");
                return Vec::new();
            }
        }
        let url = mem::take(&mut self.canonical.url);
        vec![Effect::Launch(LaunchRequest {
            app_id: click.app_id,
            url,
            is_alt: click.is_alt,
            is_shift: click.is_shift,
            virtual_key,
        })]
    }

    /// Resolve the key under the current layout and launch its bound app.
    fn pressed_key(&mut self, press: &KeyPress) -> Vec<Effect> {
        let virtual_key = resolve_virtual_key(&press.physical_key, &self.layout);
        if press.meta_key && virtual_key == COPY_KEY {
            return self.copy_url();
        }
        let bound = self
            .canonical
            .installed_apps()
            .find(|a| a.hot_code.as_deref() == Some(press.physical_key.as_str()))
            .map(|a| a.id.clone());
        let Some(app_id) = bound else {
            trace!(physical = %press.physical_key, virtual_key = %virtual_key, "no hot code bound");
            return Vec::new();
        };
        debug!(physical = %press.physical_key, virtual_key = %virtual_key, app_id = %app_id, "hot code");
        let click = AppClick {
            app_id,
            is_alt: press.alt_key,
            is_shift: press.shift_key,
        };
        self.launch(click, Some(virtual_key))
    }

    /// Apply a drag gesture.
    fn reordered_app(&mut self, reorder: &Reorder) -> Vec<Effect> {
        if reorder_apps(
            &mut self.canonical.apps,
            &reorder.source_id,
            &reorder.destination_id,
        ) {
            vec![Effect::Persist(self.canonical.to_storage())]
        } else {
            debug!(
                source = %reorder.source_id,
                destination = %reorder.destination_id,
                "reorder is a no-op"
            );
            Vec::new()
        }
    }

    /// Bind or unbind a hot code. A code belongs to at most one app.
    fn updated_hot_code(&mut self, update: HotCodeUpdate) -> Vec<Effect> {
        if self.canonical.app(&update.app_id).is_none() {
            debug!(app_id = %update.app_id, "ignoring hot code for unknown app");
            return Vec::new();
        }
        let before = self.canonical.clone();
        let code = update.hot_code.filter(|c| !c.trim().is_empty());
        for app in &mut self.canonical.apps {
            if app.id == update.app_id {
                app.hot_code = code.clone();
            } else if code.is_some() && app.hot_code == code {
                app.hot_code = None;
            }
        }
        self.persist_if_changed(&before)
    }

    /// Hand the URL in flight to the clipboard.
    fn copy_url(&self) -> Vec<Effect> {
        if self.canonical.url.is_empty() {
            return Vec::new();
        }
        vec![Effect::CopyToClipboard(self.canonical.url.clone())]
    }

    /// A persist request if anything persisted moved since `before`.
    fn persist_if_changed(&self, before: &CanonicalState) -> Vec<Effect> {
        if before.to_storage() == self.canonical.to_storage() {
            Vec::new()
        } else {
            vec![Effect::Persist(self.canonical.to_storage())]
        }
    }
}

/// Drop persist requests made before the startup snapshot is merged.
fn hold_back_persist(effects: Vec<Effect>) -> Vec<Effect> {
    effects
        .into_iter()
        .filter(|e| {
            let persist = matches!(e, Effect::Persist(_));
            if persist {
                trace!("persist held until startup");
            }
            !persist
        })
        .collect()
}
