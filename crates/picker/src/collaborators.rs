//! OS-facing collaborators for the running coordinator.
//!
//! None of these block the coordinator: launches and clipboard writes spawn
//! a helper process and return, and persistence hands the snapshot to a
//! writer task.

use std::{path::PathBuf, process::Stdio};

use picker_engine::{Collaborators, Error as EngineError, LaunchRequest, Result as EngineResult};
use picker_protocol::Storage;
use tokio::{
    io::AsyncWriteExt,
    process::Command,
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::settings;

/// Launches through the platform opener, copies through the platform
/// clipboard helper, and saves settings to a JSON file.
#[derive(Debug)]
pub struct SystemCollaborators {
    /// Settings writer inbox.
    persist_tx: UnboundedSender<Storage>,
}

impl SystemCollaborators {
    /// Create collaborators and the writer task that owns `settings_path`.
    pub fn new(settings_path: PathBuf) -> (Self, JoinHandle<()>) {
        let (persist_tx, persist_rx) = mpsc::unbounded_channel();
        let writer = tokio::spawn(write_settings(settings_path, persist_rx));
        (Self { persist_tx }, writer)
    }
}

/// Save snapshots as they arrive, skipping ones already superseded.
async fn write_settings(path: PathBuf, mut rx: UnboundedReceiver<Storage>) {
    while let Some(mut storage) = rx.recv().await {
        while let Ok(newer) = rx.try_recv() {
            storage = newer;
        }
        match settings::save(&path, &storage).await {
            Ok(()) => debug!(path = %path.display(), apps = storage.apps.len(), "settings saved"),
            Err(e) => warn!(path = %path.display(), error = %e, "failed to save settings"),
        }
    }
}

/// Command that opens `request.url` in `request.app_id`.
fn launch_command(request: &LaunchRequest) -> Command {
    if cfg!(target_os = "macos") {
        let mut command = Command::new("open");
        if request.is_alt {
            // Leave the browser in the background.
            command.arg("-g");
        }
        command.arg("-b").arg(&request.app_id);
        if !request.url.is_empty() {
            command.arg(&request.url);
        }
        command
    } else {
        // Elsewhere app ids are executable names.
        let mut command = Command::new(&request.app_id);
        if !request.url.is_empty() {
            command.arg(&request.url);
        }
        command
    }
}

/// Command that reads clipboard text from stdin.
fn clipboard_command() -> Command {
    if cfg!(target_os = "macos") {
        Command::new("pbcopy")
    } else {
        let mut command = Command::new("xclip");
        command.args(["-selection", "clipboard"]);
        command
    }
}

impl Collaborators for SystemCollaborators {
    fn launch(&self, request: &LaunchRequest) -> EngineResult<()> {
        let mut child = launch_command(request)
            .stdin(Stdio::null())
            .spawn()
            .map_err(|e| EngineError::Launch(format!("{}: {}", request.app_id, e)))?;
        let app_id = request.app_id.clone();
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) if status.success() => {}
                Ok(status) => warn!(app_id = %app_id, %status, "opener exited unsuccessfully"),
                Err(e) => warn!(app_id = %app_id, error = %e, "failed to wait for opener"),
            }
        });
        info!(app_id = %request.app_id, is_shift = request.is_shift, "opener spawned");
        Ok(())
    }

    fn persist(&self, storage: &Storage) -> EngineResult<()> {
        self.persist_tx
            .send(storage.clone())
            .map_err(|_| EngineError::Persist("settings writer stopped".into()))
    }

    fn copy_to_clipboard(&self, text: &str) -> EngineResult<()> {
        let mut child = clipboard_command()
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|e| EngineError::Clipboard(e.to_string()))?;
        let Some(mut stdin) = child.stdin.take() else {
            return Err(EngineError::Clipboard("clipboard helper has no stdin".into()));
        };
        let text = text.to_string();
        tokio::spawn(async move {
            if let Err(e) = stdin.write_all(text.as_bytes()).await {
                warn!(error = %e, "failed to write clipboard text");
            }
            drop(stdin);
            if let Err(e) = child.wait().await {
                warn!(error = %e, "failed to wait for clipboard helper");
            }
        });
        Ok(())
    }
}
