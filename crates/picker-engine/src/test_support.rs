//! Test support utilities for picker-engine and downstream crates.
//! These helpers are public so integration tests in other crates can use
//! them via the `test-utils` feature.

use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;
use picker_protocol::{Action, CanonicalState, Lane, Storage, ipc::BroadcastRx};

use crate::{Collaborators, Error, LaunchRequest, Result};

/// Everything a [`MockCollaborators`] was asked to do.
#[derive(Debug, Default)]
struct Recorded {
    /// Launch requests, in order.
    launches: Vec<LaunchRequest>,
    /// Persisted snapshots, in order.
    persisted: Vec<Storage>,
    /// Clipboard writes, in order.
    clipboard: Vec<String>,
    /// When set, launches fail with this message.
    launch_error: Option<String>,
}

/// Recording collaborators for tests. Clones share one log.
#[derive(Debug, Clone, Default)]
pub struct MockCollaborators {
    /// Shared call log.
    inner: Arc<Mutex<Recorded>>,
}

impl MockCollaborators {
    /// Empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent launches fail with `message`.
    pub fn fail_launches(&self, message: impl Into<String>) {
        self.inner.lock().launch_error = Some(message.into());
    }

    /// Launch requests seen so far.
    pub fn launches(&self) -> Vec<LaunchRequest> {
        self.inner.lock().launches.clone()
    }

    /// Persisted snapshots seen so far.
    pub fn persisted(&self) -> Vec<Storage> {
        self.inner.lock().persisted.clone()
    }

    /// Clipboard writes seen so far.
    pub fn clipboard(&self) -> Vec<String> {
        self.inner.lock().clipboard.clone()
    }
}

impl Collaborators for MockCollaborators {
    fn launch(&self, request: &LaunchRequest) -> Result<()> {
        let mut rec = self.inner.lock();
        rec.launches.push(request.clone());
        match &rec.launch_error {
            Some(msg) => Err(Error::Launch(msg.clone())),
            None => Ok(()),
        }
    }

    fn persist(&self, storage: &Storage) -> Result<()> {
        self.inner.lock().persisted.push(storage.clone());
        Ok(())
    }

    fn copy_to_clipboard(&self, text: &str) -> Result<()> {
        self.inner.lock().clipboard.push(text.to_string());
        Ok(())
    }
}

/// Receive broadcasts until a snapshot satisfies `pred` or `timeout_ms` elapses.
///
/// Envelopes not tagged for `Lane::Main` and non-snapshot actions are skipped.
pub async fn recv_state_until<F>(
    rx: &mut BroadcastRx,
    timeout_ms: u64,
    mut pred: F,
) -> Option<CanonicalState>
where
    F: FnMut(&CanonicalState) -> bool,
{
    tokio::time::timeout(Duration::from_millis(timeout_ms), async {
        while let Some(env) = rx.recv().await {
            if let Some(Action::SyncedState(state)) = env.accept(Lane::Main)
                && pred(&state)
            {
                return Some(*state);
            }
        }
        None
    })
    .await
    .unwrap_or(None)
}

/// Poll `check` until it returns true or `timeout_ms` elapses.
pub async fn wait_until<F>(timeout_ms: u64, mut check: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_millis(timeout_ms);
    loop {
        if check() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
}
