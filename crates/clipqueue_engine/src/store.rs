use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clipqueue_core::{validate_record, ListKey, ListStore, StoreError, VideoRecord};
use engine_logging::{engine_debug, engine_info};
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;

use crate::persist::AtomicFileWriter;

pub const PENDING_FILENAME: &str = "search_results.json";
pub const DOWNLOADED_FILENAME: &str = "downloaded_videos.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedRecord {
    title: String,
    url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    path: Option<PathBuf>,
}

/// Both lists as pretty-printed JSON arrays in one state directory.
#[derive(Debug, Clone)]
pub struct JsonListStore {
    writer: AtomicFileWriter,
}

impl JsonListStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            writer: AtomicFileWriter::new(dir.into()),
        }
    }

    pub fn dir(&self) -> &Path {
        self.writer.dir()
    }

    pub fn path_for(&self, key: ListKey) -> PathBuf {
        self.dir().join(filename(key))
    }
}

fn filename(key: ListKey) -> &'static str {
    match key {
        ListKey::Pending => PENDING_FILENAME,
        ListKey::Downloaded => DOWNLOADED_FILENAME,
    }
}

impl ListStore for JsonListStore {
    fn load(&self, key: ListKey) -> Result<Vec<VideoRecord>, StoreError> {
        let path = self.path_for(key);
        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                engine_debug!("No {} list at {:?}; starting empty", key, path);
                return Ok(Vec::new());
            }
            Err(source) => return Err(StoreError::Io { key, source }),
        };

        let persisted: Vec<PersistedRecord> =
            serde_json::from_str(&content).map_err(|err| StoreError::Malformed {
                key,
                reason: format!("{}: {err}", path.display()),
            })?;

        let records: Vec<VideoRecord> = persisted
            .into_iter()
            .map(|record| VideoRecord {
                title: record.title,
                url: record.url,
                path: record.path,
            })
            .collect();
        check_all(key, &records)?;

        engine_info!("Loaded {} {} records from {:?}", records.len(), key, path);
        Ok(records)
    }

    fn save(&self, key: ListKey, records: &[VideoRecord]) -> Result<(), StoreError> {
        // A list this store would refuse to load is never written.
        check_all(key, records)?;

        let persisted: Vec<PersistedRecord> = records
            .iter()
            .map(|record| PersistedRecord {
                title: record.title.clone(),
                url: record.url.clone(),
                path: record.path.clone(),
            })
            .collect();

        let mut content = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut content, formatter);
        persisted
            .serialize(&mut serializer)
            .map_err(|err| StoreError::Serialize {
                key,
                reason: err.to_string(),
            })?;
        content.push(b'\n');

        let target = self
            .writer
            .write(filename(key), &content)
            .map_err(|err| StoreError::Io {
                key,
                source: err.into(),
            })?;
        engine_info!("Saved {} {} records to {:?}", records.len(), key, target);
        Ok(())
    }
}

fn check_all(key: ListKey, records: &[VideoRecord]) -> Result<(), StoreError> {
    for (index, record) in records.iter().enumerate() {
        validate_record(key, record).map_err(|reason| StoreError::Malformed {
            key,
            reason: format!("record {index}: {reason}"),
        })?;
    }
    Ok(())
}
