//! Core domain logic for the local kanban board.
//! This crate owns every board invariant; UI layers only call into it.

pub mod clock;
pub mod config;
pub mod db;
pub mod dnd;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{BoardConfig, ConfigError};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use dnd::intent::{resolve_intent, DragIntent, DragKind, DragPayload, DropTarget};
pub use dnd::session::{CursorState, DragCoordinator, DragState, PointerCapture};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::board::{Board, BoardError, BoardResult, BoardStats, TaskEntry, TaskPosition};
pub use model::column::{Column, ColumnPatch};
pub use model::ids::{ColumnId, TaskId};
pub use model::task::{NewTask, Priority, Task, TaskPatch};
pub use model::validation::ModelValidationError;
pub use repo::board_repo::{BoardRepository, LoadOutcome, SaveError, StorageInfo};
pub use repo::payload::{PayloadError, STORAGE_KEY, STORAGE_VERSION};
pub use repo::transfer::ExportError;
pub use search::projection::{
    filter_tasks, project_board, search_tasks, BoardQuery, ColumnView, TaskFilter,
};
pub use service::board_service::BoardStore;
pub use service::persist_schedule::DEFAULT_SAVE_DEBOUNCE;
pub use storage::memory_kv::MemoryKeyValueStore;
pub use storage::sqlite_kv::SqliteKeyValueStore;
pub use storage::{KeyValueStore, StorageError, StorageResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
