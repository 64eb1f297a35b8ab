//! Persistence backends for scenarios.
//!
//! - **ScenarioStore**: repository trait the service is generic over
//! - **MemoryScenarioStore**: in-process map, the default for tests
//! - **JsonFileScenarioStore**: whole-collection JSON document on disk

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info};

use crate::error::WaterfallError;
use crate::waterfall::WaterfallScenario;
use crate::EngineResult;

/// Keyed scenario persistence. Ids are opaque strings.
pub trait ScenarioStore: Send + Sync {
    fn get(&self, id: &str) -> EngineResult<Option<WaterfallScenario>>;

    fn list(&self) -> EngineResult<Vec<WaterfallScenario>>;

    /// Insert or replace by `scenario.id`.
    fn put(&self, scenario: WaterfallScenario) -> EngineResult<()>;

    /// Remove a scenario; `false` if the id was not stored.
    fn delete(&self, id: &str) -> EngineResult<bool>;

    /// Store name for logging
    fn name(&self) -> &str;
}

fn poisoned(store: &str) -> WaterfallError {
    WaterfallError::Storage(format!("{store} store lock poisoned"))
}

fn read_guard<'a, T>(lock: &'a RwLock<T>, store: &str) -> EngineResult<RwLockReadGuard<'a, T>> {
    lock.read().map_err(|_| poisoned(store))
}

fn write_guard<'a, T>(lock: &'a RwLock<T>, store: &str) -> EngineResult<RwLockWriteGuard<'a, T>> {
    lock.write().map_err(|_| poisoned(store))
}

// ---------------------------------------------------------------------------
// Memory
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MemoryScenarioStore {
    data: RwLock<HashMap<String, WaterfallScenario>>,
}

impl MemoryScenarioStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScenarioStore for MemoryScenarioStore {
    fn get(&self, id: &str) -> EngineResult<Option<WaterfallScenario>> {
        Ok(read_guard(&self.data, self.name())?.get(id).cloned())
    }

    fn list(&self) -> EngineResult<Vec<WaterfallScenario>> {
        Ok(read_guard(&self.data, self.name())?.values().cloned().collect())
    }

    fn put(&self, scenario: WaterfallScenario) -> EngineResult<()> {
        write_guard(&self.data, self.name())?.insert(scenario.id.clone(), scenario);
        Ok(())
    }

    fn delete(&self, id: &str) -> EngineResult<bool> {
        Ok(write_guard(&self.data, self.name())?.remove(id).is_some())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

// ---------------------------------------------------------------------------
// JSON file
// ---------------------------------------------------------------------------

/// File-backed store. The whole collection is one JSON object keyed by id,
/// rewritten after every mutation while the write lock is held. The
/// in-memory copy only changes once the write has succeeded.
#[derive(Debug)]
pub struct JsonFileScenarioStore {
    path: PathBuf,
    data: RwLock<BTreeMap<String, WaterfallScenario>>,
}

impl JsonFileScenarioStore {
    /// Open an existing document, or start empty if the file is absent.
    pub fn open(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref().to_path_buf();

        let data = if path.exists() {
            let contents = std::fs::read_to_string(&path).map_err(|e| {
                WaterfallError::Storage(format!("Failed to read {}: {e}", path.display()))
            })?;
            if contents.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&contents)?
            }
        } else {
            BTreeMap::new()
        };

        info!(path = %path.display(), scenarios = data.len(), "scenario file store opened");

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, data: &BTreeMap<String, WaterfallScenario>) -> EngineResult<()> {
        let contents = serde_json::to_string_pretty(data)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    WaterfallError::Storage(format!("Failed to create {}: {e}", parent.display()))
                })?;
            }
        }

        std::fs::write(&self.path, contents).map_err(|e| {
            WaterfallError::Storage(format!("Failed to write {}: {e}", self.path.display()))
        })?;

        debug!(path = %self.path.display(), scenarios = data.len(), "scenario file store flushed");
        Ok(())
    }
}

impl ScenarioStore for JsonFileScenarioStore {
    fn get(&self, id: &str) -> EngineResult<Option<WaterfallScenario>> {
        Ok(read_guard(&self.data, self.name())?.get(id).cloned())
    }

    fn list(&self) -> EngineResult<Vec<WaterfallScenario>> {
        Ok(read_guard(&self.data, self.name())?.values().cloned().collect())
    }

    fn put(&self, scenario: WaterfallScenario) -> EngineResult<()> {
        let mut data = write_guard(&self.data, self.name())?;
        let mut next = data.clone();
        next.insert(scenario.id.clone(), scenario);
        self.flush(&next)?;
        *data = next;
        Ok(())
    }

    fn delete(&self, id: &str) -> EngineResult<bool> {
        let mut data = write_guard(&self.data, self.name())?;
        if !data.contains_key(id) {
            return Ok(false);
        }
        let mut next = data.clone();
        next.remove(id);
        self.flush(&next)?;
        *data = next;
        Ok(true)
    }

    fn name(&self) -> &str {
        "json-file"
    }
}
