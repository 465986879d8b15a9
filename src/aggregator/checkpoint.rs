//! Resume position persistence
//!
//! Single writer only: two aggregators sharing one checkpoint would overwrite
//! each other's position.

use crate::error::{MovecastError, Result};
use crate::models::Checkpoint;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

pub trait CheckpointStore: Send + Sync {
    /// `None` means "start from scratch"
    fn load(&self) -> Result<Option<Checkpoint>>;

    fn save(&self, checkpoint: &Checkpoint) -> Result<()>;

    /// Called once the whole enumeration has been committed
    fn clear(&self) -> Result<()>;
}

/// JSON file `{min_year, max_year, branch, category, month, day}`
pub struct FileCheckpointStore {
    path: PathBuf,
}

impl FileCheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CheckpointStore for FileCheckpointStore {
    fn load(&self) -> Result<Option<Checkpoint>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => {
                let checkpoint = serde_json::from_str(&raw).map_err(|e| {
                    MovecastError::Checkpoint(format!(
                        "Corrupt checkpoint {}: {}",
                        self.path.display(),
                        e
                    ))
                })?;
                Ok(Some(checkpoint))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, checkpoint: &Checkpoint) -> Result<()> {
        // Readers never see a partially written file
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec(checkpoint)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Keeps the checkpoint in memory and records every save
#[derive(Default)]
pub struct MemoryCheckpointStore {
    current: Mutex<Option<Checkpoint>>,
    history: Mutex<Vec<Checkpoint>>,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(checkpoint: Checkpoint) -> Self {
        Self {
            current: Mutex::new(Some(checkpoint)),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Every checkpoint saved so far, oldest first
    pub fn history(&self) -> Vec<Checkpoint> {
        self.history
            .lock()
            .map(|h| h.clone())
            .unwrap_or_default()
    }
}

fn poisoned<T>(_: T) -> MovecastError {
    MovecastError::Checkpoint("checkpoint lock poisoned".into())
}

impl CheckpointStore for MemoryCheckpointStore {
    fn load(&self) -> Result<Option<Checkpoint>> {
        Ok(self.current.lock().map_err(poisoned)?.clone())
    }

    fn save(&self, checkpoint: &Checkpoint) -> Result<()> {
        *self.current.lock().map_err(poisoned)? = Some(checkpoint.clone());
        self.history.lock().map_err(poisoned)?.push(checkpoint.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.current.lock().map_err(poisoned)? = None;
        Ok(())
    }
}
