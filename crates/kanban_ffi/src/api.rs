//! FFI board API for the Flutter UI.
//!
//! # Responsibility
//! - Expose the board session to Dart via FRB as one opaque handle.
//! - Exchange plain strings, ids and small envelopes; board snapshots travel
//!   as JSON.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Rejected input is reported through `ok=false` envelopes, not errors.
//! - One handle owns one board store and one drag coordinator.

use flutter_rust_bridge::frb;
use kanban_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    project_board, BoardConfig, BoardQuery, BoardRepository, BoardStore, ColumnId, ColumnPatch,
    DragCoordinator, DragIntent, DragKind, DropTarget, LogLevel, NewTask, Priority,
    SqliteKeyValueStore, SystemClock, TaskFilter, TaskId, TaskPatch,
};
use log::warn;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

#[frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes core logging once per process.
///
/// `level` is one of `trace|debug|info|warn|error`, or blank for the
/// `KANBAN_LOG_LEVEL` setting; `log_dir` must be an absolute directory. Returns an empty string on success and the error
/// message otherwise. Repeating the same call is a no-op.
#[frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    let level = if level.trim().is_empty() {
        match BoardConfig::from_env() {
            Ok(config) => config.log_level,
            Err(err) => return err.to_string(),
        }
    } else {
        match level.parse::<LogLevel>() {
            Ok(level) => level,
            Err(err) => return err.to_string(),
        }
    };
    match init_logging_inner(level, Path::new(log_dir.trim())) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Result envelope for board commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardActionResponse {
    pub ok: bool,
    /// Id of the created entity, or path of a written file.
    pub id: Option<String>,
    /// Human-readable message for diagnostics/UI.
    pub message: String,
}

impl BoardActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            id: None,
            message: message.into(),
        }
    }

    fn created(message: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            ok: true,
            id: Some(id.into()),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: None,
            message: message.into(),
        }
    }

    fn from_changed(changed: bool, ok_message: &str, rejected: &str) -> Self {
        if changed {
            Self::success(ok_message)
        } else {
            Self::failure(rejected)
        }
    }
}

/// Export artifact ready to be saved by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardExportResponse {
    pub ok: bool,
    pub file_name: String,
    pub json: String,
    pub message: String,
}

struct BoardSession {
    store: BoardStore<SqliteKeyValueStore>,
    drag: DragCoordinator,
    query: BoardQuery,
}

/// Opaque handle to one open board.
#[frb(opaque)]
pub struct BoardHandle {
    session: Mutex<BoardSession>,
}

impl BoardHandle {
    /// Opens the board stored at `db_path`, or at the configured path when
    /// `None`.
    ///
    /// # Errors
    /// Returns a message when configuration is invalid or the database
    /// cannot be opened.
    #[frb(sync)]
    pub fn open(db_path: Option<String>) -> Result<BoardHandle, String> {
        let config = BoardConfig::from_env().map_err(|err| err.to_string())?;
        let path = db_path
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(PathBuf::from)
            .unwrap_or(config.db_path);
        let storage = SqliteKeyValueStore::open(&path)
            .map_err(|err| format!("board open failed at `{}`: {err}", path.display()))?;
        Ok(Self::from_storage(
            storage,
            &config.storage_key,
            config.save_debounce,
        ))
    }

    /// Opens a throwaway board backed by in-memory SQLite.
    #[frb(sync)]
    pub fn open_in_memory() -> Result<BoardHandle, String> {
        let config = BoardConfig::default();
        let storage = SqliteKeyValueStore::open_in_memory()
            .map_err(|err| format!("board open failed: {err}"))?;
        Ok(Self::from_storage(
            storage,
            &config.storage_key,
            config.save_debounce,
        ))
    }

    fn from_storage(storage: SqliteKeyValueStore, key: &str, debounce: Duration) -> Self {
        let repo = BoardRepository::with_key(storage, key);
        let store = BoardStore::open(repo, Box::new(SystemClock), debounce);
        Self {
            session: Mutex::new(BoardSession {
                store,
                drag: DragCoordinator::default(),
                query: BoardQuery::default(),
            }),
        }
    }

    /// Full board as a JSON array of columns.
    #[frb(sync)]
    pub fn board_json(&self) -> String {
        let session = self.lock();
        to_json(session.store.columns(), "[]")
    }

    /// Board narrowed by the current search term and filter, as JSON.
    #[frb(sync)]
    pub fn visible_board_json(&self) -> String {
        let session = self.lock();
        let views = project_board(session.store.columns(), &session.query);
        to_json(&views, "[]")
    }

    #[frb(sync)]
    pub fn stats_json(&self) -> String {
        to_json(&self.lock().store.stats(), "{}")
    }

    #[frb(sync)]
    pub fn storage_info_json(&self) -> Option<String> {
        let info = self.lock().store.storage_info()?;
        Some(to_json(&info, "{}"))
    }

    #[frb(sync)]
    pub fn set_search(&self, term: String) {
        self.lock().query.search = term;
    }

    /// Sets the category filter (`all|completed|pending|high|medium|low`).
    #[frb(sync)]
    pub fn set_filter(&self, filter: String) -> BoardActionResponse {
        match filter.parse::<TaskFilter>() {
            Ok(filter) => {
                self.lock().query.filter = filter;
                BoardActionResponse::success("Filter applied.")
            }
            Err(err) => BoardActionResponse::failure(err),
        }
    }

    #[frb(sync)]
    pub fn add_column(&self, title: String, color: Option<String>) -> BoardActionResponse {
        match self.lock().store.add_column(&title, color.as_deref()) {
            Some(column) => BoardActionResponse::created("Column created.", column.id.as_str()),
            None => BoardActionResponse::failure("Column title is empty or too long."),
        }
    }

    #[frb(sync)]
    pub fn update_column(
        &self,
        column_id: String,
        title: Option<String>,
        color: Option<String>,
    ) -> BoardActionResponse {
        let changed = self
            .lock()
            .store
            .update_column(&ColumnId::new(column_id), ColumnPatch { title, color });
        BoardActionResponse::from_changed(changed, "Column updated.", "Column update rejected.")
    }

    /// Deletes a column and its tasks. The UI confirms before calling.
    #[frb(sync)]
    pub fn delete_column(&self, column_id: String) -> BoardActionResponse {
        let changed = self.lock().store.delete_column(&ColumnId::new(column_id));
        BoardActionResponse::from_changed(changed, "Column deleted.", "Column not found.")
    }

    #[frb(sync)]
    pub fn add_task(
        &self,
        column_id: String,
        title: String,
        description: Option<String>,
        priority: Option<String>,
        tags: Vec<String>,
    ) -> BoardActionResponse {
        let priority = match parse_priority(priority) {
            Ok(priority) => priority.unwrap_or_default(),
            Err(err) => return BoardActionResponse::failure(err),
        };
        let input = NewTask::new(title)
            .with_description(description.unwrap_or_default())
            .with_priority(priority)
            .with_tags(tags);
        match self.lock().store.add_task(&ColumnId::new(column_id), input) {
            Some(task) => BoardActionResponse::created("Task created.", task.id.as_str()),
            None => BoardActionResponse::failure("Task rejected: check title, limits and column."),
        }
    }

    #[allow(clippy::too_many_arguments)]
    #[frb(sync)]
    pub fn update_task(
        &self,
        column_id: String,
        task_id: String,
        title: Option<String>,
        description: Option<String>,
        priority: Option<String>,
        tags: Option<Vec<String>>,
        completed: Option<bool>,
    ) -> BoardActionResponse {
        let priority = match parse_priority(priority) {
            Ok(priority) => priority,
            Err(err) => return BoardActionResponse::failure(err),
        };
        let patch = TaskPatch {
            title,
            description,
            priority,
            tags,
            completed,
        };
        let changed = self.lock().store.update_task(
            &ColumnId::new(column_id),
            &TaskId::new(task_id),
            patch,
        );
        BoardActionResponse::from_changed(changed, "Task updated.", "Task update rejected.")
    }

    #[frb(sync)]
    pub fn delete_task(&self, column_id: String, task_id: String) -> BoardActionResponse {
        let changed = self
            .lock()
            .store
            .delete_task(&ColumnId::new(column_id), &TaskId::new(task_id));
        BoardActionResponse::from_changed(changed, "Task deleted.", "Task not found.")
    }

    #[frb(sync)]
    pub fn toggle_task_completion(&self, column_id: String, task_id: String) -> BoardActionResponse {
        let changed = self
            .lock()
            .store
            .toggle_task_completion(&ColumnId::new(column_id), &TaskId::new(task_id));
        BoardActionResponse::from_changed(changed, "Task toggled.", "Task not found.")
    }

    /// Moves a task; returns whether the board changed.
    #[frb(sync)]
    pub fn move_task(
        &self,
        source_column_id: String,
        dest_column_id: String,
        task_id: String,
        dest_index: u32,
    ) -> bool {
        self.lock().store.move_task(
            &ColumnId::new(source_column_id),
            &ColumnId::new(dest_column_id),
            &TaskId::new(task_id),
            dest_index as usize,
        )
    }

    #[frb(sync)]
    pub fn reorder_task(&self, column_id: String, from: u32, to: u32) -> bool {
        self.lock()
            .store
            .reorder_task(&ColumnId::new(column_id), from as usize, to as usize)
    }

    #[frb(sync)]
    pub fn reorder_column(&self, from: u32, to: u32) -> bool {
        self.lock().store.reorder_column(from as usize, to as usize)
    }

    /// Starts a drag of `active_id` (`kind` is `column` or `task`).
    #[frb(sync)]
    pub fn drag_start(&self, active_id: String, kind: String) -> bool {
        let Ok(kind) = kind.parse::<DragKind>() else {
            warn!("event=drag_start module=ffi status=skipped reason=unknown_kind");
            return false;
        };
        let mut session = self.lock();
        let BoardSession { store, drag, .. } = &mut *session;
        drag.drag_start(store.board(), &active_id, kind)
    }

    /// Reports the element under the pointer (`column|task|dropzone`).
    #[frb(sync)]
    pub fn drag_over(&self, over_kind: Option<String>, over_id: Option<String>) {
        let target = parse_target(over_kind, over_id);
        self.lock().drag.drag_over(target.as_ref());
    }

    /// Completes the drag. `ok` is true when a mutation was dispatched.
    #[frb(sync)]
    pub fn drag_end(&self, over_kind: Option<String>, over_id: Option<String>) -> BoardActionResponse {
        let target = parse_target(over_kind, over_id);
        let mut session = self.lock();
        let BoardSession { store, drag, .. } = &mut *session;
        match drag.drag_end(store, target.as_ref()) {
            Some(intent) => BoardActionResponse::success(describe_intent(&intent)),
            None => BoardActionResponse::failure("No change."),
        }
    }

    #[frb(sync)]
    pub fn drag_cancel(&self) {
        self.lock().drag.drag_cancel();
    }

    /// Column to highlight during a drag.
    #[frb(sync)]
    pub fn hovered_column(&self) -> Option<String> {
        self.lock()
            .drag
            .hovered_column()
            .map(|column_id| column_id.as_str().to_string())
    }

    /// Whether the UI should show the grabbing cursor.
    #[frb(sync)]
    pub fn is_grabbing(&self) -> bool {
        self.lock().drag.pointer().is_grabbing()
    }

    #[frb(sync)]
    pub fn export_board(&self) -> BoardExportResponse {
        let session = self.lock();
        let file_name = session.store.export_file_name();
        match session.store.export_json() {
            Ok(json) => BoardExportResponse {
                ok: true,
                file_name,
                json,
                message: "Board exported.".to_string(),
            },
            Err(err) => BoardExportResponse {
                ok: false,
                file_name,
                json: String::new(),
                message: format!("export failed: {err}"),
            },
        }
    }

    /// Writes the export file into `dir`; `id` carries the written path.
    #[frb(sync)]
    pub fn export_to_dir(&self, dir: String) -> BoardActionResponse {
        match self.lock().store.export_to_dir(Path::new(dir.trim())) {
            Ok(path) => BoardActionResponse::created("Board exported.", path.display().to_string()),
            Err(err) => BoardActionResponse::failure(format!("export failed: {err}")),
        }
    }

    /// Replaces the board with an exported JSON document.
    #[frb(sync)]
    pub fn import_json(&self, text: String) -> BoardActionResponse {
        match self.lock().store.import_json(&text) {
            Ok(()) => BoardActionResponse::success("Board imported."),
            Err(err) => BoardActionResponse::failure(format!("import failed: {err}")),
        }
    }

    /// Empties the board and its stored copy. The UI confirms before calling.
    #[frb(sync)]
    pub fn reset(&self) {
        self.lock().store.reset();
    }

    /// Adopts a board written elsewhere to the same storage key.
    #[frb(sync)]
    pub fn apply_storage_event(&self, key: String, new_value: Option<String>) -> bool {
        self.lock()
            .store
            .apply_storage_event(&key, new_value.as_deref())
    }

    /// Saves if the debounce delay has elapsed. Call from a UI timer.
    #[frb(sync)]
    pub fn tick(&self) -> bool {
        self.lock().store.tick()
    }

    /// Saves immediately, e.g. when the app is backgrounded.
    #[frb(sync)]
    pub fn flush(&self) -> bool {
        self.lock().store.flush()
    }

    #[frb(sync)]
    pub fn has_pending_save(&self) -> bool {
        self.lock().store.has_pending_save()
    }

    fn lock(&self) -> MutexGuard<'_, BoardSession> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn parse_priority(raw: Option<String>) -> Result<Option<Priority>, String> {
    raw.filter(|value| !value.trim().is_empty())
        .map(|value| value.parse::<Priority>())
        .transpose()
}

fn parse_target(kind: Option<String>, id: Option<String>) -> Option<DropTarget> {
    let (kind, id) = (kind?, id?);
    match DropTarget::parse(&kind, &id) {
        Ok(target) => Some(target),
        Err(err) => {
            warn!("event=drag_target module=ffi status=skipped error={err}");
            None
        }
    }
}

fn describe_intent(intent: &DragIntent) -> String {
    match intent {
        DragIntent::ReorderColumns { from, to } => format!("Column moved from {from} to {to}."),
        DragIntent::MoveTask {
            destination, index, ..
        } => format!("Task moved to {destination} at {index}."),
        DragIntent::ReorderTask { from, to, .. } => format!("Task moved from {from} to {to}."),
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T, fallback: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|err| {
        warn!("event=encode module=ffi status=error error={err}");
        fallback.to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::{core_version, init_logging, ping, BoardHandle};
    use serde_json::Value;

    fn handle() -> BoardHandle {
        BoardHandle::open_in_memory().expect("in-memory board should open")
    }

    fn column_task_ids(handle: &BoardHandle, column_id: &str) -> Vec<String> {
        let board: Value = serde_json::from_str(&handle.board_json()).unwrap();
        board
            .as_array()
            .unwrap()
            .iter()
            .find(|column| column["id"] == column_id)
            .map(|column| {
                column["tasks"]
                    .as_array()
                    .unwrap()
                    .iter()
                    .map(|task| task["id"].as_str().unwrap().to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "/tmp/kanban-logs".to_string());
        assert!(error.contains("unsupported log level"));
    }

    #[test]
    fn init_logging_blank_level_uses_configured_level() {
        let error = init_logging("  ".to_string(), "tmp/logs".to_string());
        assert!(!error.contains("unsupported log level"));
        assert!(error.contains("invalid log directory"));
    }

    #[test]
    fn init_logging_rejects_relative_dir() {
        let error = init_logging("info".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn new_board_starts_from_seed() {
        let handle = handle();
        assert_eq!(column_task_ids(&handle, "todo"), vec!["task-1", "task-2"]);
        let stats: Value = serde_json::from_str(&handle.stats_json()).unwrap();
        assert_eq!(stats["totalTasks"], 4);
        assert_eq!(stats["completionRate"], 25);
    }

    #[test]
    fn add_task_reports_created_id_and_rejects_bad_priority() {
        let handle = handle();
        let created = handle.add_task(
            "todo".to_string(),
            "Write docs".to_string(),
            None,
            Some("high".to_string()),
            vec!["docs".to_string()],
        );
        assert!(created.ok, "{}", created.message);
        let id = created.id.expect("created task id");
        assert_eq!(column_task_ids(&handle, "todo").last(), Some(&id));

        let rejected = handle.add_task(
            "todo".to_string(),
            "Other".to_string(),
            None,
            Some("urgent".to_string()),
            Vec::new(),
        );
        assert!(!rejected.ok);
        assert!(rejected.message.contains("unsupported priority"));
    }

    #[test]
    fn blank_task_title_is_rejected_without_change() {
        let handle = handle();
        let before = handle.board_json();
        let response = handle.add_task(
            "todo".to_string(),
            "   ".to_string(),
            None,
            None,
            Vec::new(),
        );
        assert!(!response.ok);
        assert_eq!(handle.board_json(), before);
    }

    #[test]
    fn drag_task_onto_column_appends_and_releases_cursor() {
        let handle = handle();
        assert!(handle.drag_start("task-1".to_string(), "task".to_string()));
        assert!(handle.is_grabbing());

        handle.drag_over(Some("column".to_string()), Some("done".to_string()));
        assert_eq!(handle.hovered_column().as_deref(), Some("done"));

        let response = handle.drag_end(Some("column".to_string()), Some("done".to_string()));
        assert!(response.ok, "{}", response.message);
        assert!(!handle.is_grabbing());
        assert_eq!(column_task_ids(&handle, "done"), vec!["task-4", "task-1"]);
        assert_eq!(column_task_ids(&handle, "todo"), vec!["task-2"]);
    }

    #[test]
    fn drag_cancel_leaves_board_untouched() {
        let handle = handle();
        let before = handle.board_json();
        handle.drag_start("task-2".to_string(), "task".to_string());
        handle.drag_cancel();
        assert!(!handle.is_grabbing());
        assert_eq!(handle.hovered_column(), None);
        assert_eq!(handle.board_json(), before);
    }

    #[test]
    fn filter_and_search_narrow_visible_board() {
        let handle = handle();
        assert!(!handle.set_filter("someday".to_string()).ok);

        handle.set_search("database".to_string());
        let visible: Value = serde_json::from_str(&handle.visible_board_json()).unwrap();
        let columns = visible.as_array().unwrap();
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0]["id"], "todo");

        handle.set_search(String::new());
        assert!(handle.set_filter("completed".to_string()).ok);
        let visible: Value = serde_json::from_str(&handle.visible_board_json()).unwrap();
        assert_eq!(visible.as_array().unwrap().len(), 3);
    }

    #[test]
    fn export_then_import_round_trips_board() {
        let source = handle();
        let exported = source.export_board();
        assert!(exported.ok, "{}", exported.message);
        assert!(exported.file_name.starts_with("kanban-board-"));

        let target = handle();
        target.reset();
        assert_eq!(target.board_json(), "[]");
        let imported = target.import_json(exported.json);
        assert!(imported.ok, "{}", imported.message);
        assert_eq!(target.board_json(), source.board_json());

        let rejected = target.import_json("{\"columns\": 3}".to_string());
        assert!(!rejected.ok);
        assert_eq!(target.board_json(), source.board_json());
    }

    #[test]
    fn file_backed_board_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("board.sqlite3").display().to_string();

        let first = BoardHandle::open(Some(db_path.clone())).unwrap();
        let created = first.add_column("Review".to_string(), Some("purple".to_string()));
        assert!(created.ok);
        assert!(first.flush());
        drop(first);

        let second = BoardHandle::open(Some(db_path)).unwrap();
        let board: Value = serde_json::from_str(&second.board_json()).unwrap();
        let titles: Vec<&str> = board
            .as_array()
            .unwrap()
            .iter()
            .map(|column| column["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, vec!["To Do", "In Progress", "Done", "Review"]);
    }
}
