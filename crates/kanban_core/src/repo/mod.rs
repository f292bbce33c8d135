//! Persistence gateway for the board.
//!
//! # Responsibility
//! - Own the stored payload format and its version migration.
//! - Translate between board snapshots and key-value storage entries.
//! - Produce export artifacts and decode import payloads.
//!
//! # Invariants
//! - Storage failures never propagate as panics; callers get typed errors or
//!   `None` and the in-memory board stays authoritative.

pub mod board_repo;
pub mod payload;
pub mod transfer;
