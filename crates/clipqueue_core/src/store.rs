use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::io;

use thiserror::Error;

use crate::VideoRecord;

/// The two durable collections the queue works with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKey {
    /// Search results waiting to be downloaded.
    Pending,
    /// Videos already fetched to local storage.
    Downloaded,
}

impl fmt::Display for ListKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListKey::Pending => write!(f, "pending results"),
            ListKey::Downloaded => write!(f, "downloaded videos"),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error on {key} list: {source}")]
    Io {
        key: ListKey,
        #[source]
        source: io::Error,
    },
    #[error("malformed {key} list: {reason}")]
    Malformed { key: ListKey, reason: String },
    #[error("could not serialize {key} list: {reason}")]
    Serialize { key: ListKey, reason: String },
}

/// Checks what every stored record must hold: an absolute url and, when a
/// path is present, a non-empty one. Downloaded records must have a path.
pub fn validate_record(key: ListKey, record: &VideoRecord) -> Result<(), String> {
    if record.url.trim().is_empty() {
        return Err("empty url".to_string());
    }
    url::Url::parse(&record.url).map_err(|err| format!("invalid url {:?}: {err}", record.url))?;

    match (&record.path, key) {
        (Some(path), _) if path.as_os_str().is_empty() => Err("empty path".to_string()),
        (None, ListKey::Downloaded) => Err("downloaded record without path".to_string()),
        _ => Ok(()),
    }
}

/// Durable storage for the pending and downloaded lists.
///
/// `load` returns an empty list for a key that was never written. `save`
/// replaces the whole list; readers never observe a partial write.
pub trait ListStore {
    fn load(&self, key: ListKey) -> Result<Vec<VideoRecord>, StoreError>;
    fn save(&self, key: ListKey, records: &[VideoRecord]) -> Result<(), StoreError>;
}

impl<S: ListStore + ?Sized> ListStore for &S {
    fn load(&self, key: ListKey) -> Result<Vec<VideoRecord>, StoreError> {
        (**self).load(key)
    }

    fn save(&self, key: ListKey, records: &[VideoRecord]) -> Result<(), StoreError> {
        (**self).save(key, records)
    }
}

/// Non-durable store kept in memory; counts writes per key.
#[derive(Debug, Default)]
pub struct MemoryListStore {
    lists: RefCell<HashMap<ListKey, Vec<VideoRecord>>>,
    saves: RefCell<HashMap<ListKey, usize>>,
}

impl MemoryListStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a list without counting it as a save.
    pub fn with_list(self, key: ListKey, records: Vec<VideoRecord>) -> Self {
        self.lists.borrow_mut().insert(key, records);
        self
    }

    pub fn snapshot(&self, key: ListKey) -> Vec<VideoRecord> {
        self.lists.borrow().get(&key).cloned().unwrap_or_default()
    }

    pub fn save_count(&self, key: ListKey) -> usize {
        self.saves.borrow().get(&key).copied().unwrap_or(0)
    }
}

impl ListStore for MemoryListStore {
    fn load(&self, key: ListKey) -> Result<Vec<VideoRecord>, StoreError> {
        Ok(self.snapshot(key))
    }

    fn save(&self, key: ListKey, records: &[VideoRecord]) -> Result<(), StoreError> {
        self.lists.borrow_mut().insert(key, records.to_vec());
        *self.saves.borrow_mut().entry(key).or_insert(0) += 1;
        Ok(())
    }
}
