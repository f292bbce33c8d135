//! Drag gesture lifecycle.
//!
//! # Responsibility
//! - Track one drag at a time through `start -> over* -> end | cancel`.
//! - Dispatch at most one store mutation per completed drag.
//! - Own the global pointer-capture side effect for task drags.
//!
//! # Invariants
//! - `drag_end` and `drag_cancel` always return to idle and release the
//!   pointer, whatever the drop outcome.
//! - The hovered column is advisory only and never consulted on drop.

use super::intent::{resolve_intent, DragIntent, DragKind, DragPayload, DropTarget};
use crate::model::board::Board;
use crate::model::ids::ColumnId;
use crate::service::board_service::BoardStore;
use crate::storage::KeyValueStore;
use log::{debug, info};

/// Global pointer feedback during a drag (the "grabbing" cursor).
pub trait PointerCapture {
    fn grab(&mut self);
    fn release(&mut self);
}

/// In-process cursor flag for adapters that render the cursor themselves.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CursorState {
    grabbing: bool,
}

impl CursorState {
    pub fn is_grabbing(&self) -> bool {
        self.grabbing
    }
}

impl PointerCapture for CursorState {
    fn grab(&mut self) {
        self.grabbing = true;
    }

    fn release(&mut self) {
        self.grabbing = false;
    }
}

/// State of an in-flight drag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveDrag {
    pub payload: DragPayload,
    pub hovered_column: Option<ColumnId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragState {
    Idle,
    Dragging(ActiveDrag),
}

/// Drives one board's drag gestures.
#[derive(Debug)]
pub struct DragCoordinator<P: PointerCapture = CursorState> {
    state: DragState,
    pointer: P,
}

impl Default for DragCoordinator<CursorState> {
    fn default() -> Self {
        Self::new(CursorState::default())
    }
}

impl<P: PointerCapture> DragCoordinator<P> {
    pub fn new(pointer: P) -> Self {
        Self {
            state: DragState::Idle,
            pointer,
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    pub fn active(&self) -> Option<&DragPayload> {
        match &self.state {
            DragState::Dragging(drag) => Some(&drag.payload),
            DragState::Idle => None,
        }
    }

    pub fn hovered_column(&self) -> Option<&ColumnId> {
        match &self.state {
            DragState::Dragging(drag) => drag.hovered_column.as_ref(),
            DragState::Idle => None,
        }
    }

    pub fn pointer(&self) -> &P {
        &self.pointer
    }

    /// Starts dragging `active_id`.
    ///
    /// Returns `false` and stays idle when the id is not on the board. A drag
    /// already in flight is abandoned first.
    pub fn drag_start(&mut self, board: &Board, active_id: &str, kind: DragKind) -> bool {
        if self.is_dragging() {
            self.drag_cancel();
        }
        let Some(payload) = DragPayload::capture(board, kind, active_id) else {
            debug!("event=drag_start module=dnd status=skipped reason=unknown_id kind={kind}");
            return false;
        };
        if kind == DragKind::Task {
            self.pointer.grab();
        }
        debug!("event=drag_start module=dnd status=ok kind={kind} active_id={active_id}");
        self.state = DragState::Dragging(ActiveDrag {
            payload,
            hovered_column: None,
        });
        true
    }

    /// Records the hovered column for highlighting; cleared for non-column
    /// targets.
    pub fn drag_over(&mut self, target: Option<&DropTarget>) {
        if let DragState::Dragging(drag) = &mut self.state {
            drag.hovered_column = target.and_then(DropTarget::hovered_column).cloned();
        }
    }

    /// Completes the drag and dispatches the resolved intent to `store`.
    ///
    /// Returns the dispatched intent, or `None` when the drop resolves to
    /// nothing. Store-side rejections are absorbed by the store.
    pub fn drag_end<S: KeyValueStore>(
        &mut self,
        store: &mut BoardStore<S>,
        target: Option<&DropTarget>,
    ) -> Option<DragIntent> {
        let state = std::mem::replace(&mut self.state, DragState::Idle);
        self.pointer.release();
        let DragState::Dragging(drag) = state else {
            return None;
        };

        let Some(intent) = resolve_intent(store.board(), &drag.payload, target) else {
            debug!(
                "event=drag_end module=dnd status=skipped kind={} active_id={}",
                drag.payload.kind(),
                drag.payload.active_id()
            );
            return None;
        };
        let changed = store.apply_intent(&intent);
        info!(
            "event=drag_end module=dnd status=ok kind={} active_id={} changed={changed}",
            drag.payload.kind(),
            drag.payload.active_id()
        );
        Some(intent)
    }

    /// Abandons the drag without touching the board.
    pub fn drag_cancel(&mut self) {
        let was_dragging = self.is_dragging();
        self.state = DragState::Idle;
        self.pointer.release();
        if was_dragging {
            debug!("event=drag_cancel module=dnd status=ok");
        }
    }
}
