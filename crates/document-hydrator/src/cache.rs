//! # Raw Document Storage
//!
//! [`RawStorage`] keeps raw response text keyed by request URI. It runs in one of two modes:
//!
//! - **Durable**: entries go to a [`DurableStore`] under `namespace + uri`. Every write records
//!   a timestamp in an expiry index (a JSON object stored under its own key). On read, an
//!   entry older than the configured maximum age is removed and reported as absent. Expiry is
//!   only ever checked lazily, on read.
//! - **Memory**: a plain in-process map with no expiry. Used when no durable store is
//!   available.

use crate::config::StoreConfig;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Errors raised by the storage backends.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("Expiry index is not valid JSON: {0}")]
    Index(#[from] serde_json::Error),
}

/// A keyed string store that outlives the process.
pub trait DurableStore: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, CacheError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), CacheError>;
    fn remove_item(&self, key: &str) -> Result<(), CacheError>;
}

/// Durable store keeping one file per key in a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Opens (and creates, if needed) the store directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(URL_SAFE_NO_PAD.encode(key.as_bytes()))
    }
}

impl DurableStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, CacheError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), CacheError> {
        fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), CacheError> {
        match fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;
type ExpiryIndex = HashMap<String, DateTime<Utc>>;

/// Raw response text keyed by URI, durable with expiry or in-memory.
pub struct RawStorage {
    durable: Option<Box<dyn DurableStore>>,
    memory: Mutex<HashMap<String, String>>,
    // Serializes read-modify-write cycles of the expiry index.
    index_lock: Mutex<()>,
    config: StoreConfig,
    clock: Clock,
}

impl RawStorage {
    pub fn in_memory(config: StoreConfig) -> Self {
        Self::with_backend(None, config)
    }

    pub fn durable(store: impl DurableStore + 'static, config: StoreConfig) -> Self {
        Self::with_backend(Some(Box::new(store)), config)
    }

    /// Uses a [`FileStore`] in `config.cache_dir` when set and usable, memory otherwise.
    pub fn from_config(config: StoreConfig) -> Self {
        let Some(dir) = config.cache_dir.clone() else {
            return Self::in_memory(config);
        };
        match FileStore::open(&dir) {
            Ok(store) => Self::durable(store, config),
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Durable storage unavailable, falling back to memory");
                Self::in_memory(config)
            }
        }
    }

    fn with_backend(durable: Option<Box<dyn DurableStore>>, config: StoreConfig) -> Self {
        Self {
            durable,
            memory: Mutex::new(HashMap::new()),
            index_lock: Mutex::new(()),
            config,
            clock: Box::new(Utc::now),
        }
    }

    /// Replaces the time source used for expiry stamps and checks.
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn is_durable(&self) -> bool {
        self.durable.is_some()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn set_item(&self, key: &str, data: &str) -> Result<(), CacheError> {
        let Some(durable) = &self.durable else {
            self.memory.lock().insert(key.to_string(), data.to_string());
            return Ok(());
        };

        let storage_key = self.config.storage_key(key);
        durable.set_item(&storage_key, data)?;

        let _guard = self.index_lock.lock();
        let mut index = self.load_index(durable.as_ref())?;
        index.insert(storage_key, (self.clock)());
        self.save_index(durable.as_ref(), &index)
    }

    pub fn get_item(&self, key: &str) -> Result<Option<String>, CacheError> {
        let Some(durable) = &self.durable else {
            return Ok(self.memory.lock().get(key).cloned());
        };

        let storage_key = self.config.storage_key(key);
        let _guard = self.index_lock.lock();
        let mut index = self.load_index(durable.as_ref())?;
        if let Some(written) = index.get(&storage_key) {
            let age = (self.clock)() - *written;
            if age > self.config.max_age() {
                debug!(key, age_secs = age.num_seconds(), "Evicting stale entry");
                durable.remove_item(&storage_key)?;
                index.remove(&storage_key);
                self.save_index(durable.as_ref(), &index)?;
                return Ok(None);
            }
        }
        durable.get_item(&storage_key)
    }

    pub fn remove_item(&self, key: &str) -> Result<(), CacheError> {
        let Some(durable) = &self.durable else {
            self.memory.lock().remove(key);
            return Ok(());
        };

        let storage_key = self.config.storage_key(key);
        durable.remove_item(&storage_key)?;
        let _guard = self.index_lock.lock();
        let mut index = self.load_index(durable.as_ref())?;
        if index.remove(&storage_key).is_some() {
            self.save_index(durable.as_ref(), &index)?;
        }
        Ok(())
    }

    fn load_index(&self, durable: &dyn DurableStore) -> Result<ExpiryIndex, CacheError> {
        match durable.get_item(&self.config.expiry_index_key)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(ExpiryIndex::new()),
        }
    }

    fn save_index(&self, durable: &dyn DurableStore, index: &ExpiryIndex) -> Result<(), CacheError> {
        durable.set_item(&self.config.expiry_index_key, &serde_json::to_string(index)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use std::sync::Arc;

    fn clock_at(now: Arc<Mutex<DateTime<Utc>>>) -> impl Fn() -> DateTime<Utc> + Send + Sync + 'static {
        move || *now.lock()
    }

    #[test]
    fn test_memory_mode_round_trip() {
        let storage = RawStorage::in_memory(StoreConfig::default());
        assert!(!storage.is_durable());
        assert_eq!(storage.get_item("/posts").unwrap(), None);

        storage.set_item("/posts", "{}").unwrap();
        assert_eq!(storage.get_item("/posts").unwrap().as_deref(), Some("{}"));

        storage.remove_item("/posts").unwrap();
        assert_eq!(storage.get_item("/posts").unwrap(), None);
    }

    #[test]
    fn test_durable_mode_uses_namespace_and_index() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        let storage = RawStorage::durable(store.clone(), StoreConfig::default());

        storage.set_item("/posts", r#"{"posts":[]}"#).unwrap();

        assert_eq!(
            store.get_item("HydratorStorage:/posts").unwrap().as_deref(),
            Some(r#"{"posts":[]}"#)
        );
        let index: ExpiryIndex =
            serde_json::from_str(&store.get_item("hydrator.expiries").unwrap().unwrap()).unwrap();
        assert!(index.contains_key("HydratorStorage:/posts"));
        assert_eq!(storage.get_item("/posts").unwrap().as_deref(), Some(r#"{"posts":[]}"#));
    }

    #[test]
    fn test_stale_entry_is_evicted_on_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        let now = Arc::new(Mutex::new(Utc::now()));
        let storage = RawStorage::durable(store.clone(), StoreConfig::default()).with_clock(clock_at(now.clone()));

        storage.set_item("/posts", "cached").unwrap();

        *now.lock() += TimeDelta::seconds(299);
        assert_eq!(storage.get_item("/posts").unwrap().as_deref(), Some("cached"));

        *now.lock() += TimeDelta::seconds(2);
        assert_eq!(storage.get_item("/posts").unwrap(), None);
        assert_eq!(store.get_item("HydratorStorage:/posts").unwrap(), None);

        storage.set_item("/posts", "fresh").unwrap();
        assert_eq!(storage.get_item("/posts").unwrap().as_deref(), Some("fresh"));
    }

    #[test]
    fn test_entries_survive_a_new_storage_instance() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            cache_dir: Some(dir.path().to_path_buf()),
            ..StoreConfig::default()
        };

        RawStorage::from_config(config.clone()).set_item("/a", "one").unwrap();
        let reopened = RawStorage::from_config(config);
        assert!(reopened.is_durable());
        assert_eq!(reopened.get_item("/a").unwrap().as_deref(), Some("one"));
    }

    #[test]
    fn test_unusable_cache_dir_falls_back_to_memory() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "x").unwrap();

        let storage = RawStorage::from_config(StoreConfig {
            cache_dir: Some(blocker),
            ..StoreConfig::default()
        });
        assert!(!storage.is_durable());
        storage.set_item("/a", "one").unwrap();
        assert_eq!(storage.get_item("/a").unwrap().as_deref(), Some("one"));
    }

    #[test]
    fn test_corrupt_index_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.set_item("hydrator.expiries", "not json").unwrap();
        let storage = RawStorage::durable(store, StoreConfig::default());

        assert!(matches!(storage.get_item("/a"), Err(CacheError::Index(_))));
    }

    #[test]
    fn test_file_store_keys_with_slashes() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("nested")).unwrap();
        store.set_item("ns:/api/posts?page=2", "body").unwrap();
        assert_eq!(store.get_item("ns:/api/posts?page=2").unwrap().as_deref(), Some("body"));
        store.remove_item("ns:/api/posts?page=2").unwrap();
        store.remove_item("ns:/api/posts?page=2").unwrap();
        assert_eq!(store.get_item("ns:/api/posts?page=2").unwrap(), None);
    }
}
