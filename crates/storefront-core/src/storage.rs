// ── Local device storage ──
//
// A tiny string key/value store standing in for browser local storage.
// Holds only the device correlation id and the optional auth token.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use crate::error::CoreError;

pub const DEVICE_ID_KEY: &str = "deviceId";
pub const AUTH_TOKEN_KEY: &str = "authToken";

/// Best-effort string storage shared by the whole process.
pub trait LocalStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError>;

    fn remove(&self, key: &str) -> Result<(), CoreError>;

    /// Store `value` unless `key` already holds one, then return whatever
    /// is stored. Implementations should make this atomic.
    fn set_if_absent(&self, key: &str, value: &str) -> Result<String, CoreError> {
        if let Some(existing) = self.get(key)? {
            return Ok(existing);
        }
        self.set(key, value)?;
        Ok(self.get(key)?.unwrap_or_else(|| value.to_owned()))
    }
}

// ── In-memory ────────────────────────────────────────────────────────

/// Storage that lives and dies with the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.values
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl LocalStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        self.lock().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        self.lock().remove(key);
        Ok(())
    }

    fn set_if_absent(&self, key: &str, value: &str) -> Result<String, CoreError> {
        Ok(self
            .lock()
            .entry(key.to_owned())
            .or_insert_with(|| value.to_owned())
            .clone())
    }
}

// ── File-backed ──────────────────────────────────────────────────────

/// Storage persisted as a flat JSON object in one file.
///
/// Every operation re-reads the file so separate processes sharing the path
/// see each other's writes. Writes go to a sibling temp file first.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn load(&self) -> Result<BTreeMap<String, String>, CoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => serde_json::from_str(&raw).map_err(CoreError::storage),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(CoreError::storage(e)),
        }
    }

    fn save(&self, values: &BTreeMap<String, String>) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(CoreError::storage)?;
        }
        let body = serde_json::to_string_pretty(values).map_err(CoreError::storage)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, body).map_err(CoreError::storage)?;
        std::fs::rename(&tmp, &self.path).map_err(CoreError::storage)?;
        debug!(path = %self.path.display(), "local storage saved");
        Ok(())
    }
}

impl LocalStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        let _guard = self.guard();
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        let _guard = self.guard();
        let mut values = self.load()?;
        values.insert(key.to_owned(), value.to_owned());
        self.save(&values)
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        let _guard = self.guard();
        let mut values = self.load()?;
        if values.remove(key).is_some() {
            self.save(&values)?;
        }
        Ok(())
    }

    fn set_if_absent(&self, key: &str, value: &str) -> Result<String, CoreError> {
        let _guard = self.guard();
        let mut values = self.load()?;
        if let Some(existing) = values.get(key) {
            return Ok(existing.clone());
        }
        values.insert(key.to_owned(), value.to_owned());
        self.save(&values)?;
        // Read back: another process may have won the race on the file.
        Ok(self.load()?.remove(key).unwrap_or_else(|| value.to_owned()))
    }
}

// ── Device identity ──────────────────────────────────────────────────

/// Fresh correlation id: `device-<unix millis>-<13 random chars>`.
pub fn generate_device_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let random = uuid::Uuid::new_v4().simple().to_string();
    format!("device-{millis}-{}", &random[..13])
}

/// Stored device id, created on first use.
///
/// Checks storage before generating and returns the value that actually
/// landed, so racing initializers converge on one id.
pub fn device_id(storage: &dyn LocalStorage) -> Result<String, CoreError> {
    if let Some(existing) = storage.get(DEVICE_ID_KEY)? {
        return Ok(existing);
    }
    let candidate = generate_device_id();
    let stored = storage.set_if_absent(DEVICE_ID_KEY, &candidate)?;
    if stored == candidate {
        debug!(device_id = %stored, "generated device id");
    }
    Ok(stored)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn device_id_format() {
        let id = generate_device_id();
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "device");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 13);
    }

    #[test]
    fn device_id_is_stable() {
        let storage = MemoryStorage::new();
        let first = device_id(&storage).unwrap();
        assert_eq!(device_id(&storage).unwrap(), first);
        assert_eq!(storage.get(DEVICE_ID_KEY).unwrap(), Some(first));
    }

    #[test]
    fn racing_initializers_converge() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(FileStorage::new(dir.path().join("storage.json")));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let storage = Arc::clone(&storage);
                std::thread::spawn(move || device_id(storage.as_ref()).unwrap())
            })
            .collect();
        let ids: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(ids.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn file_storage_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let storage = FileStorage::new(&path);
        storage.set(AUTH_TOKEN_KEY, "jwt").unwrap();
        storage.set(DEVICE_ID_KEY, "device-1").unwrap();
        storage.remove(AUTH_TOKEN_KEY).unwrap();

        let reopened = FileStorage::new(&path);
        assert_eq!(reopened.get(AUTH_TOKEN_KEY).unwrap(), None);
        assert_eq!(reopened.get(DEVICE_ID_KEY).unwrap().as_deref(), Some("device-1"));
    }

    #[test]
    fn corrupt_file_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "not json").unwrap();

        let err = FileStorage::new(&path).get(DEVICE_ID_KEY).unwrap_err();
        assert!(matches!(err, CoreError::Storage { .. }));
    }
}
