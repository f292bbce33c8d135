//! Drag descriptors and the drop resolution table.
//!
//! # Responsibility
//! - Describe what is being dragged and what it was dropped on.
//! - Resolve one completed gesture into at most one [`DragIntent`].
//!
//! # Invariants
//! - Resolution is pure: it reads the board as it is at drop time and never
//!   mutates it.
//! - Source locations are looked up on the current board, not the snapshot
//!   taken at drag start.

use crate::model::board::Board;
use crate::model::column::Column;
use crate::model::ids::{ColumnId, TaskId};
use crate::model::task::Task;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Id prefix the UI uses for empty-column drop targets.
pub const DROPZONE_ID_PREFIX: &str = "column-dropzone-";

/// Draggable entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    Column,
    Task,
}

impl DragKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Column => "column",
            Self::Task => "task",
        }
    }
}

impl Display for DragKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown draggable or drop-target kind string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKind(pub String);

impl Display for UnknownKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown drag kind `{}`", self.0)
    }
}

impl std::error::Error for UnknownKind {}

impl FromStr for DragKind {
    type Err = UnknownKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "column" => Ok(Self::Column),
            "task" => Ok(Self::Task),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

/// The element a drag is currently over, or was dropped on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// A column as a sortable item.
    Column(ColumnId),
    /// A task as a sortable item.
    Task(TaskId),
    /// The placeholder target rendered inside an empty column.
    ColumnDropzone(ColumnId),
}

impl DropTarget {
    /// Builds a target from the adapter's `(kind, id)` pair.
    ///
    /// Dropzone ids may be given raw (`column-dropzone-<id>`) or as the bare
    /// column id.
    pub fn parse(kind: &str, id: &str) -> Result<Self, UnknownKind> {
        let id = id.trim();
        match kind.trim() {
            "column" => Ok(Self::Column(ColumnId::new(id))),
            "task" => Ok(Self::Task(TaskId::new(id))),
            "dropzone" => Ok(Self::ColumnDropzone(ColumnId::new(
                id.strip_prefix(DROPZONE_ID_PREFIX).unwrap_or(id),
            ))),
            other => Err(UnknownKind(other.to_string())),
        }
    }

    /// Column highlighted while hovering this target, if it is column-level.
    pub fn hovered_column(&self) -> Option<&ColumnId> {
        match self {
            Self::Column(column_id) | Self::ColumnDropzone(column_id) => Some(column_id),
            Self::Task(_) => None,
        }
    }
}

/// Snapshot of the dragged entity taken at drag start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragPayload {
    Column(Column),
    Task { task: Task, column_id: ColumnId },
}

impl DragPayload {
    /// Snapshots `active_id` from the board, or `None` when it is unknown.
    pub fn capture(board: &Board, kind: DragKind, active_id: &str) -> Option<Self> {
        match kind {
            DragKind::Column => board
                .column(&ColumnId::new(active_id))
                .cloned()
                .map(Self::Column),
            DragKind::Task => {
                let task_id = TaskId::new(active_id);
                let position = board.locate_task(&task_id)?;
                let task = board.column(&position.column_id)?.task(&task_id)?.clone();
                Some(Self::Task {
                    task,
                    column_id: position.column_id,
                })
            }
        }
    }

    pub fn kind(&self) -> DragKind {
        match self {
            Self::Column(_) => DragKind::Column,
            Self::Task { .. } => DragKind::Task,
        }
    }

    pub fn active_id(&self) -> &str {
        match self {
            Self::Column(column) => column.id.as_str(),
            Self::Task { task, .. } => task.id.as_str(),
        }
    }
}

/// Mutation implied by a completed drag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragIntent {
    ReorderColumns {
        from: usize,
        to: usize,
    },
    MoveTask {
        source: ColumnId,
        destination: ColumnId,
        task_id: TaskId,
        index: usize,
    },
    ReorderTask {
        column_id: ColumnId,
        from: usize,
        to: usize,
    },
}

/// Resolves a drop into an intent against the current board.
///
/// Returns `None` for drops onto nothing, onto the dragged item itself, onto
/// the item's own position, and for ids no longer on the board.
pub fn resolve_intent(
    board: &Board,
    active: &DragPayload,
    target: Option<&DropTarget>,
) -> Option<DragIntent> {
    let target = target?;
    match (active, target) {
        (DragPayload::Column(column), DropTarget::Column(over_id)) => {
            if &column.id == over_id {
                return None;
            }
            let from = board.column_index(&column.id)?;
            let to = board.column_index(over_id)?;
            (from != to).then_some(DragIntent::ReorderColumns { from, to })
        }
        (DragPayload::Task { task, .. }, DropTarget::Column(over_id)) => {
            let source = board.locate_task(&task.id)?.column_id;
            let destination = board.column(over_id)?;
            if source == destination.id {
                return None;
            }
            Some(DragIntent::MoveTask {
                source,
                destination: destination.id.clone(),
                task_id: task.id.clone(),
                index: destination.tasks.len(),
            })
        }
        (DragPayload::Task { task, .. }, DropTarget::Task(over_id)) => {
            if &task.id == over_id {
                return None;
            }
            let source = board.locate_task(&task.id)?;
            let over = board.locate_task(over_id)?;
            if source.column_id == over.column_id {
                (source.index != over.index).then_some(DragIntent::ReorderTask {
                    column_id: source.column_id,
                    from: source.index,
                    to: over.index,
                })
            } else {
                Some(DragIntent::MoveTask {
                    source: source.column_id,
                    destination: over.column_id,
                    task_id: task.id.clone(),
                    index: over.index,
                })
            }
        }
        (DragPayload::Task { task, .. }, DropTarget::ColumnDropzone(column_id)) => {
            let source = board.locate_task(&task.id)?.column_id;
            let destination = board.column(column_id)?;
            Some(DragIntent::MoveTask {
                source,
                destination: destination.id.clone(),
                task_id: task.id.clone(),
                index: destination.tasks.len(),
            })
        }
        (DragPayload::Column(_), DropTarget::Task(_) | DropTarget::ColumnDropzone(_)) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{DragKind, DropTarget, DROPZONE_ID_PREFIX};
    use crate::model::ids::{ColumnId, TaskId};

    #[test]
    fn parses_target_kinds() {
        assert_eq!(
            DropTarget::parse("column", "todo"),
            Ok(DropTarget::Column(ColumnId::new("todo")))
        );
        assert_eq!(
            DropTarget::parse("task", " task-1 "),
            Ok(DropTarget::Task(TaskId::new("task-1")))
        );
        assert!(DropTarget::parse("board", "x").is_err());
    }

    #[test]
    fn dropzone_accepts_prefixed_and_bare_ids() {
        let prefixed = format!("{DROPZONE_ID_PREFIX}done");
        assert_eq!(
            DropTarget::parse("dropzone", &prefixed),
            Ok(DropTarget::ColumnDropzone(ColumnId::new("done")))
        );
        assert_eq!(
            DropTarget::parse("dropzone", "done"),
            Ok(DropTarget::ColumnDropzone(ColumnId::new("done")))
        );
    }

    #[test]
    fn only_column_level_targets_highlight() {
        let dropzone = DropTarget::ColumnDropzone(ColumnId::new("done"));
        assert_eq!(dropzone.hovered_column(), Some(&ColumnId::new("done")));
        assert_eq!(DropTarget::Task(TaskId::new("task-1")).hovered_column(), None);
    }

    #[test]
    fn drag_kind_round_trips_through_str() {
        for kind in [DragKind::Column, DragKind::Task] {
            assert_eq!(kind.as_str().parse::<DragKind>(), Ok(kind));
        }
        assert!("dropzone".parse::<DragKind>().is_err());
    }
}
