//! Flat string key-value persistence.
//!
//! Settings are stored as a single JSON object of string values. Writes are
//! staged in a [`Transaction`] and land on disk in one atomic rename, so a
//! crash mid-save leaves the previous file intact.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Errors from reading or writing the settings store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{path} is not a valid settings file: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A flat string-to-string store.
pub trait KeyValueStore {
    /// Read every stored entry. A store that has never been written is empty.
    fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError>;

    /// Replace the stored entries with `entries`.
    fn write_all(&mut self, entries: &BTreeMap<String, String>) -> Result<(), StoreError>;

    /// Start a scoped batch of writes against this store.
    fn transaction(&mut self) -> Result<Transaction<'_, Self>, StoreError>
    where
        Self: Sized,
    {
        Transaction::begin(self)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        (**self).read_all()
    }

    fn write_all(&mut self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        (**self).write_all(entries)
    }
}

/// Staged writes against a [`KeyValueStore`].
///
/// Nothing reaches the store until [`Transaction::commit`]. Dropping the
/// transaction without committing discards the staged values.
pub struct Transaction<'a, S: KeyValueStore + ?Sized> {
    store: &'a mut S,
    staged: BTreeMap<String, String>,
    dirty: bool,
}

impl<'a, S: KeyValueStore + ?Sized> Transaction<'a, S> {
    /// Stage on top of the current entries. A corrupt file is replaced
    /// rather than blocking every later save.
    pub fn begin(store: &'a mut S) -> Result<Self, StoreError> {
        let staged = match store.read_all() {
            Ok(entries) => entries,
            Err(StoreError::Corrupt { path, source }) => {
                tracing::warn!(
                    "discarding unreadable settings file {}: {}",
                    path.display(),
                    source
                );
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        Ok(Self {
            store,
            staged,
            dirty: false,
        })
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.staged.insert(key.into(), value.into());
        self.dirty = true;
        self
    }

    pub fn commit(self) -> Result<(), StoreError> {
        if !self.dirty {
            return Ok(());
        }
        self.store.write_all(&self.staged)
    }
}

/// Settings file in JSON form, e.g. `~/.config/my-llm/settings.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl KeyValueStore for JsonFileStore {
    fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn write_all(&mut self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(write_err)?;
        }
        let bytes = serde_json::to_vec_pretty(entries).map_err(|e| write_err(e.into()))?;
        let tmp = self.temp_path();
        fs::write(&tmp, bytes).map_err(write_err)?;
        fs::rename(&tmp, &self.path).map_err(write_err)?;
        tracing::debug!(path = %self.path.display(), "settings written");
        Ok(())
    }
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    /// Number of completed `write_all` calls.
    pub writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            writes: 0,
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        Ok(self.entries.clone())
    }

    fn write_all(&mut self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        self.entries = entries.clone();
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("settings.json"));
        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_commit_writes_and_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let mut store = JsonFileStore::new(&path);

        let mut tx = store.transaction().unwrap();
        tx.set("llmIpAddress", "10.0.0.2").set("verbose", "true");
        tx.commit().unwrap();

        assert!(path.exists());
        assert!(!dir.path().join("nested").join("settings.json.tmp").exists());
        let entries = store.read_all().unwrap();
        assert_eq!(entries["llmIpAddress"], "10.0.0.2");
        assert_eq!(entries["verbose"], "true");
    }

    #[test]
    fn test_transaction_keeps_unrelated_keys() {
        let mut store = MemoryStore::with_entries([("other", "kept")]);
        let mut tx = store.transaction().unwrap();
        tx.set("wakeWord", "jarvis");
        tx.commit().unwrap();

        let entries = store.read_all().unwrap();
        assert_eq!(entries["other"], "kept");
        assert_eq!(entries["wakeWord"], "jarvis");
    }

    #[test]
    fn test_dropped_transaction_discards_writes() {
        let mut store = MemoryStore::new();
        {
            let mut tx = store.transaction().unwrap();
            tx.set("darkMode", "true");
        }
        assert_eq!(store.writes, 0);
        assert!(!store.read_all().unwrap().contains_key("darkMode"));
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, b"{ not json").unwrap();

        let store = JsonFileStore::new(&path);
        let err = store.read_all().unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
        assert!(err.to_string().contains("settings.json"));
    }

    #[test]
    fn test_commit_replaces_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, b"{ not json").unwrap();

        let mut store = JsonFileStore::new(&path);
        let mut tx = store.transaction().unwrap();
        tx.set("llmIpAddress", "192.168.1.5");
        tx.commit().unwrap();

        let entries = store.read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries["llmIpAddress"], "192.168.1.5");
    }
}
