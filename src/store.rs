use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{alarm::Alarm, error::PersistenceError};

/// key value style storage for the whole alarm list as one blob
pub trait BlobStore {
    /// `None` when nothing was saved yet
    fn load(&self) -> Result<Option<String>, PersistenceError>;
    fn save(&mut self, blob: &str) -> Result<(), PersistenceError>;
}

/// blob in a single file
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl BlobStore for FileStore {
    fn load(&self) -> Result<Option<String>, PersistenceError> {
        match std::fs::read_to_string(&self.path) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, blob: &str) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, blob)?;
        Ok(())
    }
}

/// blob kept in memory, for sessions that shouldn't touch the disk
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blob: Option<String>,
}

impl MemoryStore {
    #[must_use]
    pub const fn new() -> Self {
        Self { blob: None }
    }

    #[must_use]
    pub fn blob(&self) -> Option<&str> {
        self.blob.as_deref()
    }
}

impl BlobStore for MemoryStore {
    fn load(&self) -> Result<Option<String>, PersistenceError> {
        Ok(self.blob.clone())
    }

    fn save(&mut self, blob: &str) -> Result<(), PersistenceError> {
        self.blob = Some(blob.to_string());
        Ok(())
    }
}

// toml documents need a table at the top
#[derive(Serialize)]
struct AlarmListRef<'a> {
    alarms: &'a [Alarm],
}

#[derive(Deserialize)]
struct AlarmList {
    #[serde(default)]
    alarms: Vec<Alarm>,
}

pub fn encode(alarms: &[Alarm]) -> Result<String, PersistenceError> {
    Ok(toml::to_string(&AlarmListRef { alarms })?)
}

pub fn decode(blob: &str) -> Result<Vec<Alarm>, PersistenceError> {
    Ok(toml::from_str::<AlarmList>(blob)?.alarms)
}

/// loads the saved list, `Ok(vec![])` when nothing was saved yet
pub fn load_alarms(store: &impl BlobStore) -> Result<Vec<Alarm>, PersistenceError> {
    store.load()?.map_or_else(|| Ok(Vec::new()), |blob| decode(&blob))
}

pub fn save_alarms(store: &mut impl BlobStore, alarms: &[Alarm]) -> Result<(), PersistenceError> {
    store.save(&encode(alarms)?)
}
