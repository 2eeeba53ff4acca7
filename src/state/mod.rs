//! Persisted session state
//!
//! Three slots survive between runs: the last [`HealthModel`], the last
//! [`NarrativeResult`] and the access token. [`FileStateStore`] keeps one
//! file per slot under `{data_dir}/repolens/`; [`MemoryStateStore`] keeps
//! them in a map.
//!
//! [`HealthModel`]: crate::models::HealthModel
//! [`NarrativeResult`]: crate::models::NarrativeResult

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

/// Named persistence slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Model,
    Narrative,
    Token,
}

impl Slot {
    pub fn file_name(&self) -> &'static str {
        match self {
            Slot::Model => "last_model.json",
            Slot::Narrative => "last_narrative.json",
            Slot::Token => "token",
        }
    }
}

#[derive(Error, Debug)]
pub enum StateError {
    #[error("Could not determine a data directory; set REPOLENS_DATA_DIR")]
    NoDataDir,

    #[error("State I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt state in slot {slot}: {source}")]
    Corrupt {
        slot: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

pub type StateResult<T> = Result<T, StateError>;

/// Slot-addressed string storage
pub trait StateStore: Send + Sync {
    fn read(&self, slot: Slot) -> StateResult<Option<String>>;

    fn write(&self, slot: Slot, value: &str) -> StateResult<()>;

    /// Removing an absent slot is not an error
    fn remove(&self, slot: Slot) -> StateResult<()>;

    fn load_json<T: DeserializeOwned>(&self, slot: Slot) -> StateResult<Option<T>>
    where
        Self: Sized,
    {
        match self.read(slot)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| StateError::Corrupt {
                    slot: slot.file_name(),
                    source,
                }),
            None => Ok(None),
        }
    }

    fn save_json<T: Serialize>(&self, slot: Slot, value: &T) -> StateResult<()>
    where
        Self: Sized,
    {
        let raw = serde_json::to_string_pretty(value).map_err(|source| StateError::Corrupt {
            slot: slot.file_name(),
            source,
        })?;
        self.write(slot, &raw)
    }
}

/// One file per slot in a directory
#[derive(Debug, Clone)]
pub struct FileStateStore {
    dir: PathBuf,
}

impl FileStateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `$REPOLENS_DATA_DIR`, else `{data_dir}/repolens`
    pub fn open_default() -> StateResult<Self> {
        Self::default_dir()
            .map(Self::new)
            .ok_or(StateError::NoDataDir)
    }

    pub fn default_dir() -> Option<PathBuf> {
        if let Some(dir) = std::env::var_os("REPOLENS_DATA_DIR").filter(|d| !d.is_empty()) {
            return Some(PathBuf::from(dir));
        }
        dirs::data_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("share")))
            .map(|d| d.join("repolens"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, slot: Slot) -> PathBuf {
        self.dir.join(slot.file_name())
    }

    fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StateError + '_ {
        move |source| StateError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl StateStore for FileStateStore {
    fn read(&self, slot: Slot) -> StateResult<Option<String>> {
        let path = self.path(slot);
        match std::fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_error(&path)(e)),
        }
    }

    fn write(&self, slot: Slot, value: &str) -> StateResult<()> {
        std::fs::create_dir_all(&self.dir).map_err(Self::io_error(&self.dir))?;

        let path = self.path(slot);
        let written = if slot == Slot::Token {
            write_private(&path, value)
        } else {
            std::fs::write(&path, value)
        };
        written.map_err(Self::io_error(&path))?;

        tracing::debug!("Wrote {}", path.display());
        Ok(())
    }

    fn remove(&self, slot: Slot) -> StateResult<()> {
        let path = self.path(slot);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error(&path)(e)),
        }
    }
}

/// Owner-only file; an existing file is narrowed before it is truncated
#[cfg(unix)]
fn write_private(path: &Path, value: &str) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .mode(0o600)
        .open(path)?;
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    file.set_len(0)?;
    file.write_all(value.as_bytes())
}

#[cfg(not(unix))]
fn write_private(path: &Path, value: &str) -> std::io::Result<()> {
    std::fs::write(path, value)
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    slots: Mutex<HashMap<Slot, String>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, slot: Slot) -> bool {
        self.slots
            .lock()
            .map(|slots| slots.contains_key(&slot))
            .unwrap_or(false)
    }
}

impl StateStore for MemoryStateStore {
    fn read(&self, slot: Slot) -> StateResult<Option<String>> {
        let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        Ok(slots.get(&slot).cloned())
    }

    fn write(&self, slot: Slot, value: &str) -> StateResult<()> {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.insert(slot, value.to_string());
        Ok(())
    }

    fn remove(&self, slot: Slot) -> StateResult<()> {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.remove(&slot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_store_roundtrip_and_remove() {
        let tmp = tempdir().unwrap();
        let store = FileStateStore::new(tmp.path().join("nested"));

        assert!(store.read(Slot::Token).unwrap().is_none());
        store.write(Slot::Token, "ghp_abc").unwrap();
        assert_eq!(store.read(Slot::Token).unwrap().as_deref(), Some("ghp_abc"));
        assert!(tmp.path().join("nested/token").exists());

        store.remove(Slot::Token).unwrap();
        store.remove(Slot::Token).unwrap();
        assert!(store.read(Slot::Token).unwrap().is_none());
    }

    #[test]
    fn test_load_json_reports_corruption() {
        let store = MemoryStateStore::new();
        store.write(Slot::Model, "{ truncated").unwrap();
        let err = store.load_json::<serde_json::Value>(Slot::Model).unwrap_err();
        assert!(matches!(err, StateError::Corrupt { slot: "last_model.json", .. }));
    }

    #[test]
    fn test_save_and_load_json() {
        let tmp = tempdir().unwrap();
        let store = FileStateStore::new(tmp.path());
        store
            .save_json(Slot::Narrative, &serde_json::json!({"a": [1, 2]}))
            .unwrap();
        let loaded: serde_json::Value = store.load_json(Slot::Narrative).unwrap().unwrap();
        assert_eq!(loaded["a"][1], 2);
        assert!(tmp.path().join("last_narrative.json").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_token_file_is_private() {
        use std::os::unix::fs::PermissionsExt;
        let tmp = tempdir().unwrap();
        let store = FileStateStore::new(tmp.path());
        store.write(Slot::Token, "secret").unwrap();
        let mode = std::fs::metadata(store.path(Slot::Token)).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn test_existing_token_file_is_narrowed_and_replaced() {
        use std::os::unix::fs::PermissionsExt;
        let tmp = tempdir().unwrap();
        let store = FileStateStore::new(tmp.path());
        let path = store.path(Slot::Token);
        std::fs::write(&path, "a-much-longer-old-token").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        store.write(Slot::Token, "new").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(store.read(Slot::Token).unwrap().as_deref(), Some("new"));
    }
}
