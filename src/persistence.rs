//! Best-score persistence
//!
//! The only state that outlives a session is a single best-score integer.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Persistence errors
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("best score I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed best score file {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Read/write contract for the best score
pub trait BestScoreStore: Send {
    /// Stored best score, 0 when nothing was stored yet
    fn load(&self) -> Result<u32, PersistenceError>;
    fn save(&self, score: u32) -> Result<(), PersistenceError>;
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryScoreStore {
    best: Mutex<Option<u32>>,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_score(score: u32) -> Self {
        Self {
            best: Mutex::new(Some(score)),
        }
    }

    /// Last saved value, if any
    pub fn stored(&self) -> Option<u32> {
        *self.best.lock()
    }
}

impl BestScoreStore for MemoryScoreStore {
    fn load(&self) -> Result<u32, PersistenceError> {
        Ok(self.best.lock().unwrap_or(0))
    }

    fn save(&self, score: u32) -> Result<(), PersistenceError> {
        *self.best.lock() = Some(score);
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ScoreFile {
    best_score: u32,
}

/// JSON file store: `{"best_score": N}`
#[derive(Debug, Clone)]
pub struct JsonFileScoreStore {
    path: PathBuf,
}

impl JsonFileScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl BestScoreStore for JsonFileScoreStore {
    fn load(&self) -> Result<u32, PersistenceError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No best score at {}, starting from 0", self.path.display());
                return Ok(0);
            }
            Err(e) => return Err(self.io_error(e)),
        };
        let file: ScoreFile =
            serde_json::from_str(&raw).map_err(|source| PersistenceError::Malformed {
                path: self.path.clone(),
                source,
            })?;
        Ok(file.best_score)
    }

    fn save(&self, score: u32) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let body = serde_json::to_string(&ScoreFile { best_score: score }).map_err(|source| {
            PersistenceError::Malformed {
                path: self.path.clone(),
                source,
            }
        })?;
        fs::write(&self.path, body).map_err(|e| self.io_error(e))
    }
}
