//! Task record and its create/patch inputs.
//!
//! # Invariants
//! - `id` and `created_at` never change after creation.
//! - Every field mutation sets `updated_at`.
//! - A stored task always passes [`Task::validate`].

use super::ids::TaskId;
use super::validation::{
    normalize_description, normalize_tags, normalize_title, Field, ModelValidationError,
    MAX_TASK_TITLE_CHARS,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Task urgency bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!(
                "unsupported priority `{other}`; expected low|medium|high"
            )),
        }
    }
}

/// One work item owned by exactly one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    /// Ordered, duplicate-free.
    pub tags: Vec<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task. Unset optional fields take defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub tags: Option<Vec<String>>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }
}

/// Partial update for an existing task. `None` keeps the current value.
///
/// There is deliberately no way to express `id` or `created_at` here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub tags: Option<Vec<String>>,
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.tags.is_none()
            && self.completed.is_none()
    }
}

impl Task {
    /// Creates a pending task with a generated id.
    ///
    /// # Errors
    /// - Blank or overlong title, overlong description, invalid tags.
    pub fn create(input: NewTask, now: DateTime<Utc>) -> Result<Self, ModelValidationError> {
        Self::create_with_id(TaskId::generate(), input, now)
    }

    /// Creates a pending task with a caller-provided id.
    pub fn create_with_id(
        id: TaskId,
        input: NewTask,
        now: DateTime<Utc>,
    ) -> Result<Self, ModelValidationError> {
        if id.is_blank() {
            return Err(ModelValidationError::BlankId);
        }
        Ok(Self {
            id,
            title: normalize_title(&input.title, Field::TaskTitle, MAX_TASK_TITLE_CHARS)?,
            description: normalize_description(input.description.as_deref().unwrap_or(""))?,
            priority: input.priority.unwrap_or_default(),
            tags: normalize_tags(input.tags.unwrap_or_default())?,
            completed: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Merges `patch` into this task.
    ///
    /// The patch is validated as a whole; on error nothing is modified.
    pub fn apply_patch(
        &mut self,
        patch: TaskPatch,
        now: DateTime<Utc>,
    ) -> Result<(), ModelValidationError> {
        let title = patch
            .title
            .map(|value| normalize_title(&value, Field::TaskTitle, MAX_TASK_TITLE_CHARS))
            .transpose()?;
        let description = patch
            .description
            .map(|value| normalize_description(&value))
            .transpose()?;
        let tags = patch.tags.map(|tags| normalize_tags(tags)).transpose()?;

        if let Some(title) = title {
            self.title = title;
        }
        if let Some(description) = description {
            self.description = description;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(tags) = tags {
            self.tags = tags;
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        self.updated_at = now;
        Ok(())
    }

    /// Flips completion state and returns the new value.
    pub fn toggle_completed(&mut self, now: DateTime<Utc>) -> bool {
        self.completed = !self.completed;
        self.updated_at = now;
        self.completed
    }

    /// Checks a task that did not come through [`Task::create`] (import/load).
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.id.is_blank() {
            return Err(ModelValidationError::BlankId);
        }
        normalize_title(&self.title, Field::TaskTitle, MAX_TASK_TITLE_CHARS)?;
        normalize_description(&self.description)?;
        normalize_tags(&self.tags)?;
        Ok(())
    }
}
