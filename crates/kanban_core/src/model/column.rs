//! Column record: a titled, ordered bucket of tasks.
//!
//! # Invariants
//! - `tasks` order is board position, top to bottom.
//! - `id` and `created_at` never change after creation.
//! - `color` is presentational and never validated beyond defaulting.

use super::ids::{ColumnId, TaskId};
use super::task::Task;
use super::validation::{normalize_title, Field, ModelValidationError, MAX_COLUMN_TITLE_CHARS};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_COLUMN_COLOR: &str = "gray";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: ColumnId,
    pub title: String,
    pub color: String,
    pub tasks: Vec<Task>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Partial update for a column. Task membership is not patchable here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnPatch {
    pub title: Option<String>,
    pub color: Option<String>,
}

impl Column {
    /// Creates an empty column with a generated id.
    pub fn create(
        title: &str,
        color: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Self, ModelValidationError> {
        Self::create_with_id(ColumnId::generate(), title, color, now)
    }

    pub fn create_with_id(
        id: ColumnId,
        title: &str,
        color: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Self, ModelValidationError> {
        if id.is_blank() {
            return Err(ModelValidationError::BlankId);
        }
        Ok(Self {
            id,
            title: normalize_title(title, Field::ColumnTitle, MAX_COLUMN_TITLE_CHARS)?,
            color: normalize_color(color),
            tasks: Vec::new(),
            created_at: now,
            updated_at: None,
        })
    }

    /// Merges `patch`; nothing changes when the new title is invalid.
    pub fn apply_patch(
        &mut self,
        patch: ColumnPatch,
        now: DateTime<Utc>,
    ) -> Result<(), ModelValidationError> {
        let title = patch
            .title
            .map(|value| normalize_title(&value, Field::ColumnTitle, MAX_COLUMN_TITLE_CHARS))
            .transpose()?;
        if let Some(title) = title {
            self.title = title;
        }
        if let Some(color) = patch.color {
            self.color = normalize_color(Some(color.as_str()));
        }
        self.updated_at = Some(now);
        Ok(())
    }

    pub fn task_index(&self, task_id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| &task.id == task_id)
    }

    pub fn task(&self, task_id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == task_id)
    }

    pub(crate) fn task_mut(&mut self, task_id: &TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| &task.id == task_id)
    }

    /// Checks column fields and every owned task.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.id.is_blank() {
            return Err(ModelValidationError::BlankId);
        }
        normalize_title(&self.title, Field::ColumnTitle, MAX_COLUMN_TITLE_CHARS)?;
        self.tasks.iter().try_for_each(Task::validate)
    }
}

fn normalize_color(color: Option<&str>) -> String {
    match color.map(str::trim) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => DEFAULT_COLUMN_COLOR.to_string(),
    }
}
