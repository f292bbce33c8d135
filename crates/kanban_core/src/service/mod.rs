//! Board use-case services.
//!
//! # Responsibility
//! - Own the canonical board and route every mutation through one object.
//! - Schedule debounced persistence after each change.
//!
//! # Invariants
//! - UI layers never mutate the board directly.

pub mod board_service;
pub mod persist_schedule;
