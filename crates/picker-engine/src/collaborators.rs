use std::sync::Arc;

use picker_protocol::Storage;

use crate::{LaunchRequest, Result};

// ---- Collaborator abstraction ----

/// The out-of-process services the coordinator drives.
///
/// Calls are fire-and-forget: implementations must hand the work off and
/// return promptly. An `Err` only reports that the request could not be
/// handed off; later outcomes come back as new inbound actions.
pub trait Collaborators: Send {
    /// Open `request.app_id`, forwarding the URL and modifier flags.
    fn launch(&self, request: &LaunchRequest) -> Result<()>;
    /// Durably save settings.
    fn persist(&self, storage: &Storage) -> Result<()>;
    /// Put `text` on the system clipboard.
    fn copy_to_clipboard(&self, text: &str) -> Result<()>;
}

impl<T: Collaborators + Sync + ?Sized> Collaborators for Arc<T> {
    fn launch(&self, request: &LaunchRequest) -> Result<()> {
        (**self).launch(request)
    }
    fn persist(&self, storage: &Storage) -> Result<()> {
        (**self).persist(storage)
    }
    fn copy_to_clipboard(&self, text: &str) -> Result<()> {
        (**self).copy_to_clipboard(text)
    }
}
