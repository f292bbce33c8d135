//! Board aggregate: the ordered column list and every structural mutation.
//!
//! # Responsibility
//! - Apply column/task mutations atomically on the in-memory column list.
//! - Report precise failure reasons as [`BoardError`].
//!
//! # Invariants
//! - Column ids are unique.
//! - Every task id appears exactly once across all columns.
//! - A failed mutation leaves the board untouched.

use super::column::{Column, ColumnPatch};
use super::ids::{ColumnId, TaskId};
use super::task::{NewTask, Priority, Task, TaskPatch};
use super::validation::ModelValidationError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type for board mutations.
pub type BoardResult<T> = Result<T, BoardError>;

/// Errors from board mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// Field validation failed.
    Validation(ModelValidationError),
    /// Target column does not exist.
    ColumnNotFound(ColumnId),
    /// Target task does not exist in the given column.
    TaskNotFound {
        column_id: ColumnId,
        task_id: TaskId,
    },
    /// Position is outside the current sequence.
    IndexOutOfRange { index: usize, len: usize },
    /// Two columns share one id.
    DuplicateColumnId(ColumnId),
    /// One task id appears more than once on the board.
    DuplicateTaskId(TaskId),
}

impl Display for BoardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::ColumnNotFound(id) => write!(f, "column not found: {id}"),
            Self::TaskNotFound { column_id, task_id } => {
                write!(f, "task {task_id} not found in column {column_id}")
            }
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range for length {len}")
            }
            Self::DuplicateColumnId(id) => write!(f, "duplicate column id: {id}"),
            Self::DuplicateTaskId(id) => write!(f, "duplicate task id: {id}"),
        }
    }
}

impl Error for BoardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ModelValidationError> for BoardError {
    fn from(value: ModelValidationError) -> Self {
        Self::Validation(value)
    }
}

impl BoardError {
    /// Short machine-friendly reason used in log lines.
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::ColumnNotFound(_) => "column_not_found",
            Self::TaskNotFound { .. } => "task_not_found",
            Self::IndexOutOfRange { .. } => "index_out_of_range",
            Self::DuplicateColumnId(_) => "duplicate_column_id",
            Self::DuplicateTaskId(_) => "duplicate_task_id",
        }
    }
}

/// Per-priority task counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PriorityStats {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

/// Derived board statistics, computed fresh on every call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardStats {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub pending_tasks: usize,
    /// Rounded percentage in `0..=100`; `0` for an empty board.
    pub completion_rate: u8,
    pub total_columns: usize,
    pub priority_stats: PriorityStats,
}

/// Position of one task on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPosition {
    pub column_id: ColumnId,
    pub index: usize,
}

/// Task annotated with its owning column, as returned by [`Board::all_tasks`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskEntry<'a> {
    #[serde(flatten)]
    pub task: &'a Task,
    pub column_id: &'a ColumnId,
    pub column_title: &'a str,
}

/// The ordered column list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Board {
    columns: Vec<Column>,
}

impl Board {
    /// Creates a board after checking field validity and id uniqueness.
    pub fn new(columns: Vec<Column>) -> BoardResult<Self> {
        validate_columns(&columns)?;
        Ok(Self { columns })
    }

    /// Adopts previously persisted columns.
    ///
    /// Only ids are checked: field limits apply to edits, and data written
    /// before a limit existed must still load.
    pub fn from_stored(columns: Vec<Column>) -> BoardResult<Self> {
        validate_ids(&columns)?;
        Ok(Self { columns })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Default board shown on first start.
    pub fn seed(now: DateTime<Utc>) -> Self {
        let seed_task = |id: &str, title: &str, description: &str, day: u32, priority, tags: &[&str]| {
            let created_at = seed_date(2024, 1, day).unwrap_or(now);
            Task {
                id: TaskId::from(id),
                title: title.to_string(),
                description: description.to_string(),
                priority,
                tags: tags.iter().map(|tag| tag.to_string()).collect(),
                completed: false,
                created_at,
                updated_at: created_at,
            }
        };
        let seed_column = |id: &str, title: &str, color: &str, tasks: Vec<Task>| Column {
            id: ColumnId::from(id),
            title: title.to_string(),
            color: color.to_string(),
            tasks,
            created_at: now,
            updated_at: None,
        };

        let mut setup = seed_task(
            "task-4",
            "Project Setup",
            "Initialize the project skeleton and required dependencies",
            10,
            Priority::Low,
            &["setup"],
        );
        setup.completed = true;

        Self {
            columns: vec![
                seed_column(
                    "todo",
                    "To Do",
                    "blue",
                    vec![
                        seed_task(
                            "task-1",
                            "Design Homepage",
                            "Create wireframes and mockups for the homepage",
                            15,
                            Priority::High,
                            &["design", "ui"],
                        ),
                        seed_task(
                            "task-2",
                            "Setup Database",
                            "Configure the database and run initial migrations",
                            16,
                            Priority::Medium,
                            &["backend", "database"],
                        ),
                    ],
                ),
                seed_column(
                    "progress",
                    "In Progress",
                    "yellow",
                    vec![seed_task(
                        "task-3",
                        "User Authentication",
                        "Implement login, signup, and password reset functionality",
                        14,
                        Priority::High,
                        &["auth", "security"],
                    )],
                ),
                seed_column("done", "Done", "green", vec![setup]),
            ],
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    pub fn column(&self, column_id: &ColumnId) -> Option<&Column> {
        self.columns.iter().find(|column| &column.id == column_id)
    }

    pub fn column_index(&self, column_id: &ColumnId) -> Option<usize> {
        self.columns.iter().position(|column| &column.id == column_id)
    }

    /// Finds the column and index currently holding `task_id`.
    pub fn locate_task(&self, task_id: &TaskId) -> Option<TaskPosition> {
        self.columns.iter().find_map(|column| {
            column.task_index(task_id).map(|index| TaskPosition {
                column_id: column.id.clone(),
                index,
            })
        })
    }

    pub fn task_count(&self) -> usize {
        self.columns.iter().map(|column| column.tasks.len()).sum()
    }

    /// Flattened task list in board order.
    pub fn all_tasks(&self) -> Vec<TaskEntry<'_>> {
        self.columns
            .iter()
            .flat_map(|column| {
                column.tasks.iter().map(move |task| TaskEntry {
                    task,
                    column_id: &column.id,
                    column_title: column.title.as_str(),
                })
            })
            .collect()
    }

    pub fn stats(&self) -> BoardStats {
        let mut stats = BoardStats {
            total_columns: self.columns.len(),
            ..BoardStats::default()
        };
        for task in self.columns.iter().flat_map(|column| column.tasks.iter()) {
            stats.total_tasks += 1;
            if task.completed {
                stats.completed_tasks += 1;
            }
            match task.priority {
                Priority::High => stats.priority_stats.high += 1,
                Priority::Medium => stats.priority_stats.medium += 1,
                Priority::Low => stats.priority_stats.low += 1,
            }
        }
        stats.pending_tasks = stats.total_tasks - stats.completed_tasks;
        stats.completion_rate = completion_rate(stats.completed_tasks, stats.total_tasks);
        stats
    }

    /// Appends a new empty column.
    pub fn try_add_column(
        &mut self,
        title: &str,
        color: Option<&str>,
        now: DateTime<Utc>,
    ) -> BoardResult<Column> {
        let column = Column::create(title, color, now)?;
        self.columns.push(column.clone());
        Ok(column)
    }

    pub fn try_update_column(
        &mut self,
        column_id: &ColumnId,
        patch: ColumnPatch,
        now: DateTime<Utc>,
    ) -> BoardResult<()> {
        let column = self.column_mut(column_id)?;
        column.apply_patch(patch, now)?;
        Ok(())
    }

    /// Removes a column together with all of its tasks.
    pub fn try_delete_column(&mut self, column_id: &ColumnId) -> BoardResult<Column> {
        let index = self
            .column_index(column_id)
            .ok_or_else(|| BoardError::ColumnNotFound(column_id.clone()))?;
        Ok(self.columns.remove(index))
    }

    /// Appends a new task to the end of `column_id`.
    pub fn try_add_task(
        &mut self,
        column_id: &ColumnId,
        input: NewTask,
        now: DateTime<Utc>,
    ) -> BoardResult<Task> {
        let column = self.column_mut(column_id)?;
        let task = Task::create(input, now)?;
        column.tasks.push(task.clone());
        Ok(task)
    }

    pub fn try_update_task(
        &mut self,
        column_id: &ColumnId,
        task_id: &TaskId,
        patch: TaskPatch,
        now: DateTime<Utc>,
    ) -> BoardResult<()> {
        let task = self.task_mut(column_id, task_id)?;
        task.apply_patch(patch, now)?;
        Ok(())
    }

    pub fn try_delete_task(
        &mut self,
        column_id: &ColumnId,
        task_id: &TaskId,
    ) -> BoardResult<Task> {
        let column = self.column_mut(column_id)?;
        let index = column
            .task_index(task_id)
            .ok_or_else(|| task_not_found(column_id, task_id))?;
        Ok(column.tasks.remove(index))
    }

    /// Flips completion; returns the new `completed` value.
    pub fn try_toggle_task(
        &mut self,
        column_id: &ColumnId,
        task_id: &TaskId,
        now: DateTime<Utc>,
    ) -> BoardResult<bool> {
        Ok(self.task_mut(column_id, task_id)?.toggle_completed(now))
    }

    /// Moves `task_id` from `source` into `destination` at `dest_index`.
    ///
    /// The task's `updated_at` is left as is; only content edits and
    /// completion toggles count as updates.
    ///
    /// `dest_index` is clamped to the destination length. When both columns
    /// are the same this is a reorder with the index clamped to the last
    /// position. Returns whether the board changed.
    pub fn try_move_task(
        &mut self,
        source: &ColumnId,
        destination: &ColumnId,
        task_id: &TaskId,
        dest_index: usize,
    ) -> BoardResult<bool> {
        let source_index = self
            .column_index(source)
            .ok_or_else(|| BoardError::ColumnNotFound(source.clone()))?;
        let dest_column_index = self
            .column_index(destination)
            .ok_or_else(|| BoardError::ColumnNotFound(destination.clone()))?;
        let from = self.columns[source_index]
            .task_index(task_id)
            .ok_or_else(|| task_not_found(source, task_id))?;

        if source_index == dest_column_index {
            let last = self.columns[source_index].tasks.len() - 1;
            return self.try_reorder_task(source, from, dest_index.min(last));
        }

        let task = self.columns[source_index].tasks.remove(from);
        let dest_tasks = &mut self.columns[dest_column_index].tasks;
        let at = dest_index.min(dest_tasks.len());
        dest_tasks.insert(at, task);
        Ok(true)
    }

    /// Relocates the task at `from` to `to` within one column.
    pub fn try_reorder_task(
        &mut self,
        column_id: &ColumnId,
        from: usize,
        to: usize,
    ) -> BoardResult<bool> {
        let column = self.column_mut(column_id)?;
        relocate(&mut column.tasks, from, to)
    }

    /// Relocates the column at `from` to `to` in board order.
    pub fn try_reorder_column(&mut self, from: usize, to: usize) -> BoardResult<bool> {
        relocate(&mut self.columns, from, to)
    }

    pub fn clear(&mut self) {
        self.columns.clear();
    }

    fn column_mut(&mut self, column_id: &ColumnId) -> BoardResult<&mut Column> {
        self.columns
            .iter_mut()
            .find(|column| &column.id == column_id)
            .ok_or_else(|| BoardError::ColumnNotFound(column_id.clone()))
    }

    fn task_mut(&mut self, column_id: &ColumnId, task_id: &TaskId) -> BoardResult<&mut Task> {
        self.column_mut(column_id)?
            .task_mut(task_id)
            .ok_or_else(|| task_not_found(column_id, task_id))
    }
}

/// Checks field validity plus column/task id uniqueness.
pub fn validate_columns(columns: &[Column]) -> BoardResult<()> {
    columns.iter().try_for_each(Column::validate)?;
    validate_ids(columns)
}

/// Checks that every id is non-blank and unique on the board.
pub fn validate_ids(columns: &[Column]) -> BoardResult<()> {
    let mut column_ids = HashSet::new();
    let mut task_ids = HashSet::new();
    for column in columns {
        if column.id.is_blank() {
            return Err(ModelValidationError::BlankId.into());
        }
        if !column_ids.insert(&column.id) {
            return Err(BoardError::DuplicateColumnId(column.id.clone()));
        }
        for task in &column.tasks {
            if task.id.is_blank() {
                return Err(ModelValidationError::BlankId.into());
            }
            if !task_ids.insert(&task.id) {
                return Err(BoardError::DuplicateTaskId(task.id.clone()));
            }
        }
    }
    Ok(())
}

/// Rounded (half-up) percentage of `completed` over `total`.
pub fn completion_rate(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let rate = (200 * completed + total) / (2 * total);
    rate.min(100) as u8
}

fn relocate<T>(items: &mut Vec<T>, from: usize, to: usize) -> BoardResult<bool> {
    let len = items.len();
    for index in [from, to] {
        if index >= len {
            return Err(BoardError::IndexOutOfRange { index, len });
        }
    }
    if from == to {
        return Ok(false);
    }
    let item = items.remove(from);
    items.insert(to, item);
    Ok(true)
}

fn task_not_found(column_id: &ColumnId, task_id: &TaskId) -> BoardError {
    BoardError::TaskNotFound {
        column_id: column_id.clone(),
        task_id: task_id.clone(),
    }
}

fn seed_date(year: i32, month: u32, day: u32) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
