//! Durable string key/value storage backing the session.

use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use parking_lot::RwLock;
use rest_client::ApiError;
use tempfile::NamedTempFile;

/// Minimal key/value contract the session needs. Values are opaque strings.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, ApiError>;

    fn set(&self, key: &str, value: &str) -> Result<(), ApiError>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), ApiError>;
}

/// Process-local store; contents vanish with the process.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, ApiError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ApiError> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ApiError> {
        self.entries.write().remove(key);
        Ok(())
    }
}

/// One file per key under a directory. Writes go to a temp file in the same
/// directory which is then renamed over the target, so readers never see a
/// half-written value.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create, if needed) the storage directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, ApiError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            ApiError::storage(format!("cannot create session dir {}: {e}", dir.display()))
        })?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, ApiError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(ApiError::storage(format!("invalid storage key '{key}'")));
        }
        Ok(self.dir.join(key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, ApiError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ApiError::storage(format!(
                "cannot read {}: {e}",
                path.display()
            ))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ApiError> {
        let path = self.path_for(key)?;
        let fail = |e: std::io::Error| {
            ApiError::storage(format!("cannot write {}: {e}", path.display()))
        };

        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(fail)?;
        tmp.write_all(value.as_bytes()).map_err(fail)?;
        tmp.as_file().sync_all().map_err(fail)?;
        tmp.persist(&path).map_err(|e| fail(e.error))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ApiError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ApiError::storage(format!(
                "cannot remove {}: {e}",
                path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn exercise(store: &dyn KeyValueStore) {
        assert_eq!(store.get("token").unwrap(), None);
        store.set("token", "abc").unwrap();
        assert_eq!(store.get("token").unwrap().as_deref(), Some("abc"));
        store.set("token", "def").unwrap();
        assert_eq!(store.get("token").unwrap().as_deref(), Some("def"));
        store.remove("token").unwrap();
        store.remove("token").unwrap();
        assert_eq!(store.get("token").unwrap(), None);
    }

    #[test]
    fn memory_store_basic_ops() {
        exercise(&MemoryStore::new());
    }

    #[test]
    fn file_store_basic_ops() {
        let tmp = TempDir::new().unwrap();
        exercise(&FileStore::open(tmp.path().join("session")).unwrap());
    }

    #[test]
    fn file_store_survives_reopen() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("session");
        FileStore::open(&dir).unwrap().set("user", "{}").unwrap();

        let reopened = FileStore::open(&dir).unwrap();
        assert_eq!(reopened.get("user").unwrap().as_deref(), Some("{}"));
        assert!(dir.join("user").is_file());
    }

    #[test]
    fn file_store_rejects_path_like_keys() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::open(tmp.path()).unwrap();
        for key in ["", "../token", "a/b", "tok en"] {
            let err = store.set(key, "x").unwrap_err();
            assert!(matches!(err, ApiError::Storage { .. }), "key {key:?}");
        }
    }
}
