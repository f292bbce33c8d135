//! Stored/exported board wire format and lenient decoding.
//!
//! # Responsibility
//! - Encode the `{columns, version, savedAt}` storage payload and the
//!   `{columns, exportedAt, version}` export artifact.
//! - Decode stored payloads of any known vintage into a board.
//! - Decode import payloads strictly.
//!
//! # Invariants
//! - Decoding is all-or-nothing: one bad record rejects the payload.
//! - Stored payloads are rejected only for shape or id problems; over-limit
//!   fields are kept as written.
//! - Imported boards pass the same field limits as interactive edits.

use crate::model::board::{Board, BoardError};
use crate::model::column::{Column, DEFAULT_COLUMN_COLOR};
use crate::model::ids::{ColumnId, TaskId};
use crate::model::task::{Priority, Task};
use crate::model::validation::clean_tags;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage key holding the whole board.
pub const STORAGE_KEY: &str = "kanban-board-data";
/// Version stamped on every saved or exported payload.
pub const STORAGE_VERSION: &str = "1.0.0";

/// Errors from decoding stored or imported payloads.
#[derive(Debug)]
pub enum PayloadError {
    /// Text is not valid JSON or records have the wrong shape.
    Json(serde_json::Error),
    /// Payload has no `columns` array.
    MissingColumns,
    /// Records violate board-level invariants.
    Board(BoardError),
}

impl Display for PayloadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid board json: {err}"),
            Self::MissingColumns => write!(f, "payload has no `columns` array"),
            Self::Board(err) => write!(f, "invalid board: {err}"),
        }
    }
}

impl Error for PayloadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::MissingColumns => None,
            Self::Board(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for PayloadError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<BoardError> for PayloadError {
    fn from(value: BoardError) -> Self {
        Self::Board(value)
    }
}

/// Payload written under [`STORAGE_KEY`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedBoard<'a> {
    pub columns: &'a [Column],
    pub version: &'a str,
    pub saved_at: DateTime<Utc>,
}

impl<'a> SavedBoard<'a> {
    pub fn new(columns: &'a [Column], saved_at: DateTime<Utc>) -> Self {
        Self {
            columns,
            version: STORAGE_VERSION,
            saved_at,
        }
    }
}

/// Downloadable export artifact.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardExport<'a> {
    pub columns: &'a [Column],
    pub exported_at: DateTime<Utc>,
    pub version: &'a str,
}

impl<'a> BoardExport<'a> {
    pub fn new(columns: &'a [Column], exported_at: DateTime<Utc>) -> Self {
        Self {
            columns,
            exported_at,
            version: STORAGE_VERSION,
        }
    }
}

/// Result of decoding a stored payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedBoard {
    pub board: Board,
    /// Version found in the payload; `None` for pre-versioned data.
    pub version: Option<String>,
}

impl DecodedBoard {
    /// Whether the payload was written by a different format version.
    pub fn needs_migration(&self) -> bool {
        self.version.as_deref() != Some(STORAGE_VERSION)
    }
}

/// Decodes a stored payload, migrating older shapes.
///
/// - current version: `columns` field
/// - no `version`: top-level `columns`, or the whole payload if it is an array
/// - other versions: `columns` field as-is
pub fn decode_stored(raw: &str, now: DateTime<Utc>) -> Result<DecodedBoard, PayloadError> {
    let value: Value = serde_json::from_str(raw)?;
    let (columns, version) = match value {
        Value::Array(items) => (Value::Array(items), None),
        Value::Object(mut object) => {
            let version = object
                .get("version")
                .and_then(Value::as_str)
                .map(str::to_string);
            let columns = object.remove("columns").ok_or(PayloadError::MissingColumns)?;
            (columns, version)
        }
        _ => return Err(PayloadError::MissingColumns),
    };
    let board = Board::from_stored(decode_columns(columns, now)?)?;
    Ok(DecodedBoard { board, version })
}

/// Decodes an import payload: an object with a `columns` array whose
/// records pass field validation.
pub fn decode_import(value: Value, now: DateTime<Utc>) -> Result<Board, PayloadError> {
    let Value::Object(mut object) = value else {
        return Err(PayloadError::MissingColumns);
    };
    match object.remove("columns") {
        Some(columns @ Value::Array(_)) => Ok(Board::new(decode_columns(columns, now)?)?),
        _ => Err(PayloadError::MissingColumns),
    }
}

fn decode_columns(columns: Value, now: DateTime<Utc>) -> Result<Vec<Column>, PayloadError> {
    if !columns.is_array() {
        return Err(PayloadError::MissingColumns);
    }
    let records: Vec<ColumnRecord> = serde_json::from_value(columns)?;
    Ok(records
        .into_iter()
        .map(|record| record.into_column(now))
        .collect())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ColumnRecord {
    id: ColumnId,
    title: String,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    tasks: Option<Vec<TaskRecord>>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl ColumnRecord {
    fn into_column(self, now: DateTime<Utc>) -> Column {
        let tasks = self
            .tasks
            .unwrap_or_default()
            .into_iter()
            .map(|record| record.into_task(now))
            .collect();
        Column {
            id: self.id,
            title: self.title,
            color: self
                .color
                .filter(|color| !color.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_COLUMN_COLOR.to_string()),
            tasks,
            created_at: self.created_at.unwrap_or(now),
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskRecord {
    id: TaskId,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    priority: Option<Priority>,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default)]
    completed: Option<bool>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl TaskRecord {
    fn into_task(self, now: DateTime<Utc>) -> Task {
        let created_at = self.created_at.unwrap_or(now);
        Task {
            id: self.id,
            title: self.title,
            description: self.description.unwrap_or_default(),
            priority: self.priority.unwrap_or_default(),
            tags: clean_tags(self.tags.unwrap_or_default()),
            completed: self.completed.unwrap_or(false),
            created_at,
            updated_at: self.updated_at.unwrap_or(created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn unversioned_array_payload_is_treated_as_columns() {
        let raw = json!([{ "id": "todo", "title": "To Do", "tasks": [] }]).to_string();
        let decoded = decode_stored(&raw, now()).unwrap();
        assert_eq!(decoded.version, None);
        assert!(decoded.needs_migration());
        assert_eq!(decoded.board.columns()[0].color, DEFAULT_COLUMN_COLOR);
        assert_eq!(decoded.board.columns()[0].created_at, now());
    }

    #[test]
    fn task_defaults_fill_missing_fields() {
        let raw = json!({
            "columns": [{
                "id": "todo",
                "title": "To Do",
                "color": "blue",
                "createdAt": "2024-01-15T00:00:00.000Z",
                "tasks": [{ "id": "task-1", "title": "Alpha", "createdAt": "2024-01-16T10:00:00Z" }]
            }]
        })
        .to_string();
        let decoded = decode_stored(&raw, now()).unwrap();
        let task = &decoded.board.columns()[0].tasks[0];
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.description, "");
        assert!(task.tags.is_empty());
        assert!(!task.completed);
        assert_eq!(task.updated_at, task.created_at);
    }

    #[test]
    fn duplicate_task_ids_reject_whole_payload() {
        let raw = json!({
            "version": STORAGE_VERSION,
            "columns": [
                { "id": "a", "title": "A", "tasks": [{ "id": "t", "title": "one" }] },
                { "id": "b", "title": "B", "tasks": [{ "id": "t", "title": "two" }] }
            ]
        })
        .to_string();
        let err = decode_stored(&raw, now()).unwrap_err();
        assert!(matches!(err, PayloadError::Board(BoardError::DuplicateTaskId(_))));
    }

    #[test]
    fn stored_payload_keeps_over_limit_fields() {
        let tags: Vec<String> = (0..12).map(|i| format!("tag-{i}")).collect();
        let raw = json!({
            "version": STORAGE_VERSION,
            "columns": [{
                "id": "mine",
                "title": "x".repeat(60),
                "tasks": [{ "id": "t-keep", "title": "keep", "description": "d".repeat(600), "tags": tags }]
            }]
        })
        .to_string();
        let decoded = decode_stored(&raw, now()).unwrap();
        let column = &decoded.board.columns()[0];
        assert_eq!(column.title.chars().count(), 60);
        assert_eq!(column.tasks[0].tags.len(), 12);
        assert_eq!(column.tasks[0].description.len(), 600);
    }

    #[test]
    fn stored_payload_with_blank_id_is_rejected() {
        let raw = json!({ "columns": [{ "id": " ", "title": "A" }] }).to_string();
        let err = decode_stored(&raw, now()).unwrap_err();
        assert!(matches!(err, PayloadError::Board(BoardError::Validation(_))));
    }

    #[test]
    fn import_enforces_field_limits() {
        let value = json!({ "columns": [{ "id": "mine", "title": "x".repeat(60) }] });
        let err = decode_import(value, now()).unwrap_err();
        assert!(matches!(err, PayloadError::Board(BoardError::Validation(_))));
    }

    #[test]
    fn import_requires_columns_array() {
        let err = decode_import(json!({ "columns": "nope" }), now()).unwrap_err();
        assert!(matches!(err, PayloadError::MissingColumns));
        let err = decode_import(json!([]), now()).unwrap_err();
        assert!(matches!(err, PayloadError::MissingColumns));
    }
}
