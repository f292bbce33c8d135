//! Board domain model.
//!
//! # Responsibility
//! - Define the canonical column/task records shared by store, drag and
//!   projection layers.
//! - Enforce field-level validation and board-level identity invariants.
//!
//! # Invariants
//! - Ids and `created_at` are immutable after creation.
//! - A task id appears in exactly one column, at most once.
//! - Column ids are unique across the board.

pub mod board;
pub mod column;
pub mod ids;
pub mod task;
pub mod validation;
