//! Socket path selection and the guard around reusing a stale path.

use std::{
    env, fs, io,
    os::unix::fs::{FileTypeExt as _, MetadataExt as _, PermissionsExt as _},
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{Error, Result};

/// Directory holding the per-user socket.
///
/// Preference order:
/// - `$XDG_RUNTIME_DIR/picker`
/// - `~/.cache/picker/run`
fn socket_runtime_dir() -> PathBuf {
    if let Ok(xdg) = env::var("XDG_RUNTIME_DIR")
        && !xdg.is_empty()
    {
        return PathBuf::from(xdg).join("picker");
    }
    let home = env::var("HOME").unwrap_or_else(|_| "/tmp".into());
    PathBuf::from(home).join(".cache/picker/run")
}

/// Default socket path. One coordinator per user, so the path carries the UID.
pub fn default_socket_path() -> PathBuf {
    let uid = unsafe { libc::getuid() };
    socket_runtime_dir().join(format!("picker-{}.sock", uid))
}

/// Create the socket's parent directory and restrict it to the current user.
pub fn prepare_socket_dir(path: &Path) -> Result<()> {
    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };
    fs::create_dir_all(parent).map_err(|e| {
        Error::SocketPath(format!("Failed to create '{}': {}", parent.display(), e))
    })?;
    let mut perms = fs::metadata(parent)?.permissions();
    // 0o700: user-only access
    perms.set_mode(0o700);
    if let Err(e) = fs::set_permissions(parent, perms) {
        debug!(dir = %parent.display(), error = %e, "could not tighten socket dir permissions");
    }
    Ok(())
}

/// Make room for a new bind at `path`.
///
/// Absent paths are fine. An existing Unix socket owned by the current user is
/// unlinked. Anything else (a regular file, a symlink, another user's socket)
/// is refused and left in place.
pub fn validate_or_unlink_existing_socket(path: &Path) -> Result<()> {
    match fs::symlink_metadata(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::SocketPath(format!(
            "Failed to lstat existing path '{}': {}",
            path.display(),
            e
        ))),
        Ok(meta) => {
            let ft = meta.file_type();
            if !ft.is_socket() {
                return Err(Error::SocketPath(format!(
                    "Refusing to remove non-socket at '{}': {:?}",
                    path.display(),
                    ft
                )));
            }
            let uid = unsafe { libc::getuid() };
            if meta.uid() != uid {
                return Err(Error::SocketPath(format!(
                    "Socket at '{}' not owned by current user (uid {} != {})",
                    path.display(),
                    meta.uid(),
                    uid
                )));
            }
            fs::remove_file(path).map_err(|e| {
                Error::SocketPath(format!(
                    "Failed to remove pre-existing socket '{}': {}",
                    path.display(),
                    e
                ))
            })
        }
    }
}
