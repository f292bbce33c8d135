//! FFI surface of the kanban board core.

pub mod api;
