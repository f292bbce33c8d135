//! Drag-and-drop coordination.
//!
//! # Responsibility
//! - Turn an adapter-neutral gesture contract into board mutations.
//! - Keep resolution (`intent`) separate from lifecycle state (`session`).

pub mod intent;
pub mod session;
