//! Board state store.
//!
//! # Responsibility
//! - Hold the single in-memory [`Board`] and expose its mutation set.
//! - Keep the fail-soft contract: rejected input is logged and reported as
//!   `None`/`false`, never as an error the UI must handle.
//! - Debounce persistence through [`PersistSchedule`] and flush on shutdown.
//!
//! # Invariants
//! - Every successful mutation re-arms the save deadline; no-ops do not.
//! - A failed save keeps the schedule dirty so the next tick retries.
//! - Import replaces the whole board or nothing.

use super::persist_schedule::PersistSchedule;
use crate::clock::Clock;
use crate::dnd::intent::DragIntent;
use crate::model::board::{Board, BoardResult, BoardStats, TaskEntry, TaskPosition};
use crate::model::column::{Column, ColumnPatch};
use crate::model::ids::{ColumnId, TaskId};
use crate::model::task::{NewTask, Task, TaskPatch};
use crate::repo::board_repo::{BoardRepository, LoadOutcome, StorageInfo};
use crate::repo::payload::{decode_import, decode_stored, PayloadError};
use crate::repo::transfer::{encode_export, export_file_name, write_export, ExportError};
use crate::storage::KeyValueStore;
use log::{debug, info, warn};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Single owner of the board for one application session.
pub struct BoardStore<S: KeyValueStore> {
    board: Board,
    repo: BoardRepository<S>,
    clock: Box<dyn Clock>,
    schedule: PersistSchedule,
}

impl<S: KeyValueStore> BoardStore<S> {
    /// Loads the stored board, falling back to the seed board.
    ///
    /// A seed replacing a missing key is scheduled for saving. A seed
    /// replacing an unreadable payload is not, so the stored text survives
    /// until the user changes the board.
    pub fn open(repo: BoardRepository<S>, clock: Box<dyn Clock>, save_debounce: Duration) -> Self {
        let now = clock.now();
        let mut schedule = PersistSchedule::new(save_debounce);
        let board = match repo.load(now) {
            LoadOutcome::Loaded(board) => board,
            LoadOutcome::Missing => {
                info!("event=board_open module=board status=ok source=seed");
                schedule.mark_dirty(now);
                Board::seed(now)
            }
            LoadOutcome::Rejected => {
                warn!("event=board_open module=board status=degraded source=seed reason=stored_payload_rejected");
                Board::seed(now)
            }
        };
        info!(
            "event=board_open module=board status=ok columns={} tasks={}",
            board.columns().len(),
            board.task_count()
        );
        Self {
            board,
            repo,
            clock,
            schedule,
        }
    }

    /// Wraps an explicit board without reading storage.
    pub fn with_board(
        board: Board,
        repo: BoardRepository<S>,
        clock: Box<dyn Clock>,
        save_debounce: Duration,
    ) -> Self {
        Self {
            board,
            repo,
            clock,
            schedule: PersistSchedule::new(save_debounce),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn columns(&self) -> &[Column] {
        self.board.columns()
    }

    pub fn repository(&self) -> &BoardRepository<S> {
        &self.repo
    }

    pub fn repository_mut(&mut self) -> &mut BoardRepository<S> {
        &mut self.repo
    }

    pub fn find_task(&self, task_id: &TaskId) -> Option<TaskPosition> {
        self.board.locate_task(task_id)
    }

    pub fn all_tasks(&self) -> Vec<TaskEntry<'_>> {
        self.board.all_tasks()
    }

    pub fn stats(&self) -> BoardStats {
        self.board.stats()
    }

    pub fn storage_info(&self) -> Option<StorageInfo> {
        self.repo.storage_info()
    }

    /// Appends a column; `None` when the title is blank or too long.
    pub fn add_column(&mut self, title: &str, color: Option<&str>) -> Option<Column> {
        let now = self.clock.now();
        let result = self.board.try_add_column(title, color, now);
        self.settle("column_add", result)
    }

    pub fn update_column(&mut self, column_id: &ColumnId, patch: ColumnPatch) -> bool {
        let now = self.clock.now();
        let result = self.board.try_update_column(column_id, patch, now);
        self.settle("column_update", result).is_some()
    }

    /// Removes a column and its tasks. Confirmation is the caller's job.
    pub fn delete_column(&mut self, column_id: &ColumnId) -> bool {
        let result = self.board.try_delete_column(column_id);
        self.settle("column_delete", result).is_some()
    }

    /// Appends a task; `None` when validation fails or the column is missing.
    pub fn add_task(&mut self, column_id: &ColumnId, input: NewTask) -> Option<Task> {
        let now = self.clock.now();
        let result = self.board.try_add_task(column_id, input, now);
        self.settle("task_add", result)
    }

    pub fn update_task(&mut self, column_id: &ColumnId, task_id: &TaskId, patch: TaskPatch) -> bool {
        let now = self.clock.now();
        let result = self.board.try_update_task(column_id, task_id, patch, now);
        self.settle("task_update", result).is_some()
    }

    pub fn delete_task(&mut self, column_id: &ColumnId, task_id: &TaskId) -> bool {
        let result = self.board.try_delete_task(column_id, task_id);
        self.settle("task_delete", result).is_some()
    }

    pub fn toggle_task_completion(&mut self, column_id: &ColumnId, task_id: &TaskId) -> bool {
        let now = self.clock.now();
        let result = self.board.try_toggle_task(column_id, task_id, now);
        self.settle("task_toggle", result).is_some()
    }

    /// Moves a task between columns; same-column moves reorder.
    ///
    /// Returns whether the board changed.
    pub fn move_task(
        &mut self,
        source: &ColumnId,
        destination: &ColumnId,
        task_id: &TaskId,
        dest_index: usize,
    ) -> bool {
        let result = self
            .board
            .try_move_task(source, destination, task_id, dest_index);
        self.settle_change("task_move", result)
    }

    pub fn reorder_task(&mut self, column_id: &ColumnId, from: usize, to: usize) -> bool {
        let result = self.board.try_reorder_task(column_id, from, to);
        self.settle_change("task_reorder", result)
    }

    pub fn reorder_column(&mut self, from: usize, to: usize) -> bool {
        let result = self.board.try_reorder_column(from, to);
        self.settle_change("column_reorder", result)
    }

    /// Applies one resolved drag intent.
    pub fn apply_intent(&mut self, intent: &DragIntent) -> bool {
        match intent {
            DragIntent::ReorderColumns { from, to } => self.reorder_column(*from, *to),
            DragIntent::MoveTask {
                source,
                destination,
                task_id,
                index,
            } => self.move_task(source, destination, task_id, *index),
            DragIntent::ReorderTask {
                column_id,
                from,
                to,
            } => self.reorder_task(column_id, *from, *to),
        }
    }

    /// Empties the board and removes the stored payload.
    ///
    /// The empty board is then saved on the next due tick, so a restart shows
    /// an empty board rather than the seed.
    pub fn reset(&mut self) {
        if let Err(err) = self.repo.clear() {
            warn!("event=board_reset module=board status=error error={err}");
        }
        self.board.clear();
        self.schedule.mark_dirty(self.clock.now());
        info!("event=board_reset module=board status=ok");
    }

    /// Pretty JSON export artifact of the current board.
    pub fn export_json(&self) -> Result<String, ExportError> {
        encode_export(self.board.columns(), self.clock.now())
    }

    /// File name the export artifact should be saved under today.
    pub fn export_file_name(&self) -> String {
        export_file_name(self.clock.now().date_naive())
    }

    /// Writes the export artifact into `dir`.
    pub fn export_to_dir(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        write_export(dir, self.board.columns(), self.clock.now())
    }

    /// Replaces the board from import text.
    pub fn import_json(&mut self, text: &str) -> Result<(), PayloadError> {
        let value = serde_json::from_str(text).map_err(|err| {
            warn!("event=board_import module=board status=error error_code=invalid_json error={err}");
            PayloadError::from(err)
        })?;
        self.import_value(value)
    }

    /// Replaces the board from a parsed import payload and saves at once.
    pub fn import_value(&mut self, value: Value) -> Result<(), PayloadError> {
        let now = self.clock.now();
        self.board = decode_import(value, now).map_err(|err| {
            warn!("event=board_import module=board status=error error={err}");
            err
        })?;
        info!(
            "event=board_import module=board status=ok columns={} tasks={}",
            self.board.columns().len(),
            self.board.task_count()
        );
        self.schedule.mark_dirty(now);
        self.flush();
        Ok(())
    }

    /// Adopts a board written by another session to the same storage key.
    ///
    /// Returns whether the in-memory board was replaced. Never writes back.
    pub fn apply_storage_event(&mut self, key: &str, new_value: Option<&str>) -> bool {
        if key != self.repo.key() {
            return false;
        }
        let Some(raw) = new_value else {
            return false;
        };
        let decoded = match decode_stored(raw, self.clock.now()) {
            Ok(decoded) => decoded,
            Err(err) => {
                warn!("event=storage_sync module=board status=error error={err}");
                return false;
            }
        };
        if decoded.board == self.board {
            return false;
        }
        self.board = decoded.board;
        self.schedule.clear();
        info!(
            "event=storage_sync module=board status=ok columns={}",
            self.board.columns().len()
        );
        true
    }

    pub fn has_pending_save(&self) -> bool {
        self.schedule.is_dirty()
    }

    /// Saves when the debounce deadline has passed. Returns whether a save
    /// happened.
    pub fn tick(&mut self) -> bool {
        if !self.schedule.is_due(self.clock.now()) {
            return false;
        }
        self.flush()
    }

    /// Saves immediately if anything is pending. Returns whether a save
    /// succeeded.
    pub fn flush(&mut self) -> bool {
        if !self.schedule.is_dirty() {
            return false;
        }
        match self.repo.save(self.board.columns(), self.clock.now()) {
            Ok(()) => {
                self.schedule.clear();
                true
            }
            Err(err) => {
                warn!("event=board_flush module=board status=error retry=next_tick error={err}");
                false
            }
        }
    }

    /// Final flush at application exit.
    pub fn shutdown(mut self) -> bool {
        let saved = self.flush();
        info!("event=board_shutdown module=board status=ok saved={saved}");
        saved
    }

    fn settle<T>(&mut self, event: &'static str, result: BoardResult<T>) -> Option<T> {
        let value = self.log_rejection(event, result)?;
        self.schedule.mark_dirty(self.clock.now());
        debug!("event={event} module=board status=ok");
        Some(value)
    }

    /// Like [`Self::settle`] for operations that may legitimately be no-ops.
    fn settle_change(&mut self, event: &'static str, result: BoardResult<bool>) -> bool {
        match self.log_rejection(event, result) {
            Some(true) => {
                self.schedule.mark_dirty(self.clock.now());
                debug!("event={event} module=board status=ok");
                true
            }
            Some(false) => {
                debug!("event={event} module=board status=skipped reason=no_change");
                false
            }
            None => false,
        }
    }

    fn log_rejection<T>(&self, event: &'static str, result: BoardResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(
                    "event={event} module=board status=skipped reason={} error={err}",
                    err.reason_code()
                );
                None
            }
        }
    }
}

impl<S: KeyValueStore> Drop for BoardStore<S> {
    fn drop(&mut self) {
        if self.schedule.is_dirty() {
            self.flush();
        }
    }
}
