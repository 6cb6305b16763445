//! The persisted settings document and the keyboard layout file.
//!
//! Settings are the startup snapshot (`apps`, `height`, `isSetup`,
//! `supportMessage`) as camelCase JSON. A missing file is an empty snapshot.

use std::{
    env, io,
    path::{Path, PathBuf},
};

use picker_protocol::{KeyboardLayoutMap, Storage};
use serde_json::Value;
use tokio::fs;

use crate::{Error, Result};

/// `~/.config/picker/settings.json`, honouring `XDG_CONFIG_HOME`.
pub fn default_settings_path() -> PathBuf {
    let base = match env::var("XDG_CONFIG_HOME") {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => PathBuf::from(env::var("HOME").unwrap_or_else(|_| "/tmp".into())).join(".config"),
    };
    base.join("picker").join("settings.json")
}

/// Read and parse a JSON file, mapping parse errors to the path.
async fn read_json(path: &Path) -> Result<Option<Value>> {
    match fs::read(path).await {
        Ok(bytes) => serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| Error::Json {
                path: path.to_path_buf(),
                source,
            }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Load settings; a missing file yields defaults.
pub async fn load(path: &Path) -> Result<Storage> {
    let Some(value) = read_json(path).await? else {
        return Ok(Storage::default());
    };
    serde_json::from_value(value).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Write settings through a temp file so a crash never leaves half a document.
pub async fn save(path: &Path, storage: &Storage) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    let body = serde_json::to_vec_pretty(storage).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, body).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

/// Load a physical-key → character map. A missing file is an error here,
/// since the path was given explicitly.
pub async fn load_layout(path: &Path) -> Result<KeyboardLayoutMap> {
    let Some(value) = read_json(path).await? else {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("layout file '{}' not found", path.display()),
        )
        .into());
    };
    serde_json::from_value(value).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}
