//! Search and category filtering over the board.
//!
//! # Responsibility
//! - Produce the visible subset of columns and tasks for one render pass.
//!
//! # Invariants
//! - Read-only: nothing here mutates the board.
//! - Task order inside a column is preserved.
//! - Category filters never hide a column; an active search hides columns
//!   with zero matches.

use crate::model::column::Column;
use crate::model::task::{Priority, Task};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Category filter applied before search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TaskFilter {
    #[default]
    All,
    Completed,
    Pending,
    Priority(Priority),
}

impl TaskFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Completed => "completed",
            Self::Pending => "pending",
            Self::Priority(priority) => priority.as_str(),
        }
    }

    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Completed => task.completed,
            Self::Pending => !task.completed,
            Self::Priority(priority) => task.priority == priority,
        }
    }
}

impl Display for TaskFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskFilter {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "completed" => Ok(Self::Completed),
            "pending" => Ok(Self::Pending),
            other => other.parse::<Priority>().map(Self::Priority).map_err(|_| {
                format!(
                    "unsupported filter `{other}`; expected all|completed|pending|high|medium|low"
                )
            }),
        }
    }
}

/// Case-insensitive substring search over title, description and tags.
///
/// A blank term returns every task.
pub fn search_tasks<'a>(tasks: &'a [Task], term: &str) -> Vec<&'a Task> {
    let needle = normalize_term(term);
    tasks
        .iter()
        .filter(|task| matches_term(task, needle.as_deref()))
        .collect()
}

pub fn filter_tasks(tasks: &[Task], filter: TaskFilter) -> Vec<&Task> {
    tasks.iter().filter(|task| filter.matches(task)).collect()
}

/// View-state inputs for [`project_board`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardQuery {
    pub search: String,
    pub filter: TaskFilter,
}

impl BoardQuery {
    pub fn new(search: impl Into<String>, filter: TaskFilter) -> Self {
        Self {
            search: search.into(),
            filter,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.filter == TaskFilter::All && normalize_term(&self.search).is_none()
    }
}

/// One visible column with its visible tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnView<'a> {
    pub column: &'a Column,
    pub tasks: Vec<&'a Task>,
}

impl Serialize for ColumnView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ColumnView", 5)?;
        state.serialize_field("id", &self.column.id)?;
        state.serialize_field("title", &self.column.title)?;
        state.serialize_field("color", &self.column.color)?;
        state.serialize_field("totalTasks", &self.column.tasks.len())?;
        state.serialize_field("tasks", &self.tasks)?;
        state.end()
    }
}

/// Applies filter then search to every column.
pub fn project_board<'a>(columns: &'a [Column], query: &BoardQuery) -> Vec<ColumnView<'a>> {
    let needle = normalize_term(&query.search);
    columns
        .iter()
        .map(|column| ColumnView {
            column,
            tasks: column
                .tasks
                .iter()
                .filter(|task| query.filter.matches(task))
                .filter(|task| matches_term(task, needle.as_deref()))
                .collect(),
        })
        .filter(|view| needle.is_none() || !view.tasks.is_empty())
        .collect()
}

fn normalize_term(term: &str) -> Option<String> {
    let trimmed = term.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
}

fn matches_term(task: &Task, needle: Option<&str>) -> bool {
    let Some(needle) = needle else {
        return true;
    };
    task.title.to_lowercase().contains(needle)
        || task.description.to_lowercase().contains(needle)
        || task.tags.iter().any(|tag| tag.to_lowercase().contains(needle))
}
