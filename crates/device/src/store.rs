//! Local persistence of armed alarms.
//!
//! The on-disk shape is a flat string map (`"42" -> "1767254400000"`), the
//! same shape the host's key-value preferences use, so records survive an
//! app update unchanged. [`AlarmStore`] is the typed view over it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::error::DeviceError;
use crate::{AlarmId, EpochMillis};

/// A flat string-to-string store. Last write wins.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, DeviceError>;
    fn set(&self, key: &str, value: String) -> Result<(), DeviceError>;
    fn remove(&self, key: &str) -> Result<(), DeviceError>;
    fn entries(&self) -> Result<Vec<(String, String)>, DeviceError>;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// Volatile store, for tests and for hosts without a writable data dir.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, DeviceError> {
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), DeviceError> {
        lock(&self.entries).insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), DeviceError> {
        lock(&self.entries).remove(key);
        Ok(())
    }

    fn entries(&self) -> Result<Vec<(String, String)>, DeviceError> {
        Ok(lock(&self.entries)
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

// ---------------------------------------------------------------------------
// JsonFileStore
// ---------------------------------------------------------------------------

/// Store persisted as a single JSON object on disk.
///
/// The whole map is cached in memory and rewritten on every change through
/// a temporary file and a rename, so a crash mid-write leaves the previous
/// contents intact. The cache is only updated once the write succeeded.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DeviceError> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(path = %path.display(), "Opened alarm store");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), DeviceError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_string_pretty(entries)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, DeviceError> {
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), DeviceError> {
        let mut entries = lock(&self.entries);
        let mut next = entries.clone();
        next.insert(key.to_string(), value);
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), DeviceError> {
        let mut entries = lock(&self.entries);
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut next = entries.clone();
        next.remove(key);
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }

    fn entries(&self) -> Result<Vec<(String, String)>, DeviceError> {
        Ok(lock(&self.entries)
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

// ---------------------------------------------------------------------------
// AlarmStore
// ---------------------------------------------------------------------------

/// Typed table of armed alarms: id to fire time.
pub struct AlarmStore {
    kv: Box<dyn KeyValueStore>,
}

impl AlarmStore {
    pub fn new(kv: impl KeyValueStore + 'static) -> Self {
        Self { kv: Box::new(kv) }
    }

    /// An empty store that lives only in memory.
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::default())
    }

    pub fn put(&self, id: AlarmId, fire_at: EpochMillis) -> Result<(), DeviceError> {
        self.kv.set(&id.to_string(), fire_at.to_string())
    }

    /// Fire time recorded for `id`. Unparseable values read as absent.
    pub fn get(&self, id: AlarmId) -> Result<Option<EpochMillis>, DeviceError> {
        Ok(self
            .kv
            .get(&id.to_string())?
            .and_then(|v| v.parse().ok()))
    }

    pub fn remove(&self, id: AlarmId) -> Result<(), DeviceError> {
        self.kv.remove(&id.to_string())
    }

    /// Every well-formed record, ordered by fire time.
    ///
    /// Entries whose key or value is not an integer are skipped with a
    /// warning; they are left in place for inspection.
    pub fn all(&self) -> Result<Vec<(AlarmId, EpochMillis)>, DeviceError> {
        let mut records: Vec<(AlarmId, EpochMillis)> = self
            .kv
            .entries()?
            .into_iter()
            .filter_map(|(key, value)| match (key.parse(), value.parse()) {
                (Ok(id), Ok(at)) => Some((id, at)),
                _ => {
                    tracing::warn!(%key, %value, "Skipping malformed alarm record");
                    None
                }
            })
            .collect();
        records.sort_by_key(|&(id, at)| (at, id));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_get_remove() {
        let store = AlarmStore::in_memory();
        store.put(3, 1_000).unwrap();
        assert_eq!(store.get(3).unwrap(), Some(1_000));

        store.put(3, 2_000).unwrap();
        assert_eq!(store.get(3).unwrap(), Some(2_000));

        store.remove(3).unwrap();
        assert_eq!(store.get(3).unwrap(), None);
    }

    #[test]
    fn all_orders_by_fire_time_and_skips_garbage() {
        let kv = MemoryStore::default();
        kv.set("1", "300".into()).unwrap();
        kv.set("2", "100".into()).unwrap();
        kv.set("flutter.theme", "dark".into()).unwrap();
        let store = AlarmStore::new(kv);

        assert_eq!(store.all().unwrap(), vec![(2, 100), (1, 300)]);
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alarms.json");

        {
            let store = AlarmStore::new(JsonFileStore::open(&path).unwrap());
            store.put(10, 5_000).unwrap();
            store.put(11, 6_000).unwrap();
            store.remove(11).unwrap();
        }

        let reopened = AlarmStore::new(JsonFileStore::open(&path).unwrap());
        assert_eq!(reopened.all().unwrap(), vec![(10, 5_000)]);

        let raw: BTreeMap<String, String> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw.get("10").map(String::as_str), Some("5000"));
    }

    #[test]
    fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("nested/alarms.json")).unwrap();
        assert!(store.entries().unwrap().is_empty());
    }

    #[test]
    fn failed_write_leaves_cache_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alarms.json");
        let store = AlarmStore::new(JsonFileStore::open(&path).unwrap());
        store.put(1, 1_000).unwrap();

        // A directory in place of the temp file makes every write fail.
        std::fs::create_dir(path.with_extension("json.tmp")).unwrap();

        assert!(matches!(store.put(2, 2_000), Err(DeviceError::Io(_))));
        assert_eq!(store.get(2).unwrap(), None);

        assert!(matches!(store.remove(1), Err(DeviceError::Io(_))));
        assert_eq!(store.get(1).unwrap(), Some(1_000));

        let reopened = AlarmStore::new(JsonFileStore::open(&path).unwrap());
        assert_eq!(reopened.all().unwrap(), store.all().unwrap());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alarms.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            JsonFileStore::open(&path),
            Err(DeviceError::Json(_))
        ));
    }
}
