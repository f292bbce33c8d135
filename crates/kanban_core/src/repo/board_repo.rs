//! Persistence gateway between the board and local key-value storage.
//!
//! # Responsibility
//! - Read the stored board tolerantly (missing, corrupt, legacy payloads).
//! - Write full board snapshots stamped with version and `savedAt`.
//!
//! # Invariants
//! - `load` never fails: a present but unusable payload is reported as
//!   [`LoadOutcome::Rejected`] and left in storage untouched.
//! - `save` writes the whole board, never a diff.
//! - Log lines carry ids/sizes only, never task text.

use super::payload::{decode_stored, SavedBoard, STORAGE_KEY};
use crate::model::board::Board;
use crate::model::column::Column;
use crate::storage::{KeyValueStore, StorageError};
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Errors from writing the board snapshot.
#[derive(Debug)]
pub enum SaveError {
    /// Snapshot could not be serialized.
    Encode(serde_json::Error),
    /// Storage rejected the write.
    Storage(StorageError),
}

impl Display for SaveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode(err) => write!(f, "failed to encode board: {err}"),
            Self::Storage(err) => write!(f, "failed to store board: {err}"),
        }
    }
}

impl Error for SaveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode(err) => Some(err),
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for SaveError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

impl From<StorageError> for SaveError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Metadata about the stored payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageInfo {
    /// Size of the stored JSON text in bytes.
    pub size: usize,
    pub saved_at: Option<String>,
    pub version: Option<String>,
    pub columns_count: usize,
    pub tasks_count: usize,
}

/// What [`BoardRepository::load`] found under the board key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing stored yet.
    Missing,
    Loaded(Board),
    /// Something is stored (or storage failed to answer) but no board could
    /// be read from it.
    Rejected,
}

impl LoadOutcome {
    pub fn into_board(self) -> Option<Board> {
        match self {
            Self::Loaded(board) => Some(board),
            Self::Missing | Self::Rejected => None,
        }
    }
}

/// Board persistence over any [`KeyValueStore`].
pub struct BoardRepository<S: KeyValueStore> {
    storage: S,
    key: String,
}

impl<S: KeyValueStore> BoardRepository<S> {
    /// Uses the default [`STORAGE_KEY`].
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, STORAGE_KEY)
    }

    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Loads the stored board.
    ///
    /// Legacy payloads are migrated in memory; the stored text is only
    /// rewritten by the next [`BoardRepository::save`].
    pub fn load(&self, now: DateTime<Utc>) -> LoadOutcome {
        let raw = match self.storage.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("event=board_load module=persist status=skipped reason=missing_key");
                return LoadOutcome::Missing;
            }
            Err(err) => {
                error!(
                    "event=board_load module=persist status=error error_code=storage_read_failed error={err}"
                );
                return LoadOutcome::Rejected;
            }
        };

        match decode_stored(&raw, now) {
            Ok(decoded) => {
                if decoded.needs_migration() {
                    info!(
                        "event=board_migrate module=persist status=ok from_version={} columns={}",
                        decoded.version.as_deref().unwrap_or("none"),
                        decoded.board.columns().len()
                    );
                }
                info!(
                    "event=board_load module=persist status=ok bytes={} columns={}",
                    raw.len(),
                    decoded.board.columns().len()
                );
                LoadOutcome::Loaded(decoded.board)
            }
            Err(err) => {
                warn!(
                    "event=board_load module=persist status=error error_code=payload_invalid bytes={} error={err}",
                    raw.len()
                );
                LoadOutcome::Rejected
            }
        }
    }

    /// Writes the full board snapshot.
    pub fn save(&mut self, columns: &[Column], now: DateTime<Utc>) -> Result<(), SaveError> {
        let started_at = Instant::now();
        let result = serde_json::to_string(&SavedBoard::new(columns, now))
            .map_err(SaveError::from)
            .and_then(|json| {
                self.storage.set(&self.key, &json)?;
                Ok(json.len())
            });

        match result {
            Ok(bytes) => {
                debug!(
                    "event=board_save module=persist status=ok bytes={bytes} columns={} duration_ms={}",
                    columns.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=board_save module=persist status=error duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                Err(err)
            }
        }
    }

    /// Removes the stored board.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.storage.remove(&self.key)?;
        info!("event=board_clear module=persist status=ok");
        Ok(())
    }

    /// Describes the stored payload without decoding it into a board.
    pub fn storage_info(&self) -> Option<StorageInfo> {
        let raw = self.storage.get(&self.key).ok().flatten()?;
        let value: Value = serde_json::from_str(&raw).ok()?;
        let columns = value
            .get("columns")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let tasks_count = columns
            .iter()
            .filter_map(|column| column.get("tasks").and_then(Value::as_array))
            .map(Vec::len)
            .sum();
        let text_field = |name: &str| value.get(name).and_then(Value::as_str).map(str::to_string);

        Some(StorageInfo {
            size: raw.len(),
            saved_at: text_field("savedAt"),
            version: text_field("version"),
            columns_count: columns.len(),
            tasks_count,
        })
    }
}
