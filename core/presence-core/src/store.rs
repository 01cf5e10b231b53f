//! File-backed persistence for the subject history mapping.
//!
//! The engine owns the in-memory mapping; this module only serializes
//! snapshots of it on command and reads them back at startup. It is a
//! write-through ledger, not a log.
//!
//! # File Format
//!
//! ```json
//! {
//!   "version": 1,
//!   "subjects": {
//!     "subject-id": { ... HistoryRecord fields ... }
//!   }
//! }
//! ```
//!
//! # Defensive Design
//!
//! Loading handles:
//! - Missing file (empty mapping)
//! - Empty file (empty mapping)
//! - Corrupt JSON (empty mapping, warning logged)
//! - Version mismatches (empty mapping for unsupported versions)
//! - Missing record fields (serde defaults)
//!
//! # Atomic Writes
//!
//! Uses temp file + rename so a reader never observes a partially-written
//! snapshot.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use fs_err as fs;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::warn;

use crate::error::{HistoryError, Result};
use crate::types::HistoryRecord;

const STORE_VERSION: u32 = 1;

/// The on-disk JSON structure for the snapshot file.
#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    /// Schema version. We only load files with version == 1.
    version: u32,
    /// Subject ID → record map.
    subjects: HashMap<String, HistoryRecord>,
}

/// Snapshot reader/writer for the subject→history mapping.
///
/// Create with [`HistoryStore::new`] pointing at the snapshot file, or
/// [`HistoryStore::new_in_memory`] for tests (saves become no-ops).
#[derive(Debug, Clone)]
pub struct HistoryStore {
    file_path: Option<PathBuf>,
}

impl HistoryStore {
    pub fn new(file_path: &Path) -> Self {
        HistoryStore {
            file_path: Some(file_path.to_path_buf()),
        }
    }

    pub fn new_in_memory() -> Self {
        HistoryStore { file_path: None }
    }

    /// Reads the full snapshot, degrading to an empty mapping on anything
    /// short of an I/O failure.
    pub fn load(&self) -> Result<HashMap<String, HistoryRecord>> {
        let file_path = match self.file_path.as_ref() {
            Some(path) => path,
            None => return Ok(HashMap::new()),
        };

        if !file_path.exists() {
            return Ok(HashMap::new());
        }

        let content = fs::read_to_string(file_path).map_err(|e| HistoryError::Io {
            context: format!("reading snapshot {}", file_path.display()),
            source: e,
        })?;

        if content.trim().is_empty() {
            warn!(path = %file_path.display(), "Empty snapshot file, starting with an empty mapping");
            return Ok(HashMap::new());
        }

        match serde_json::from_str::<StoreFile>(&content) {
            Ok(store_file) if store_file.version == STORE_VERSION => Ok(store_file.subjects),
            Ok(store_file) => {
                warn!(
                    version = store_file.version,
                    expected = STORE_VERSION,
                    "Unsupported snapshot version, starting with an empty mapping"
                );
                Ok(HashMap::new())
            }
            Err(e) => {
                warn!(
                    path = %file_path.display(),
                    error = %e,
                    "Failed to parse snapshot, starting with an empty mapping"
                );
                Ok(HashMap::new())
            }
        }
    }

    /// Writes a full snapshot over the backing file.
    ///
    /// The write goes through a temp file in the same directory and is
    /// renamed into place, so concurrent readers see either the old or the
    /// new snapshot, never a partial one.
    pub fn save(&self, subjects: &HashMap<String, HistoryRecord>) -> Result<()> {
        let file_path = match self.file_path.as_ref() {
            Some(path) => path,
            // In-memory store: write-through is a no-op by design.
            None => return Ok(()),
        };

        let store_file = StoreFile {
            version: STORE_VERSION,
            subjects: subjects.clone(),
        };

        let content = serde_json::to_string_pretty(&store_file).map_err(|e| HistoryError::Json {
            context: "serializing snapshot".to_string(),
            source: e,
        })?;

        let parent_dir = file_path.parent().ok_or(HistoryError::NoStorePath)?;
        fs::create_dir_all(parent_dir).map_err(|e| HistoryError::Io {
            context: format!("creating snapshot directory {}", parent_dir.display()),
            source: e,
        })?;

        let mut temp_file =
            NamedTempFile::new_in(parent_dir).map_err(|e| HistoryError::Io {
                context: format!("creating temp file in {}", parent_dir.display()),
                source: e,
            })?;
        temp_file
            .write_all(content.as_bytes())
            .map_err(|e| HistoryError::Io {
                context: "writing temp snapshot".to_string(),
                source: e,
            })?;
        temp_file.flush().map_err(|e| HistoryError::Io {
            context: "flushing temp snapshot".to_string(),
            source: e,
        })?;
        temp_file
            .persist(file_path)
            .map_err(|e| HistoryError::Io {
                context: format!("replacing snapshot {}", file_path.display()),
                source: e.error,
            })?;

        Ok(())
    }

    /// Path of the backing snapshot file, if any.
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }
}
