//! Read-only view projections.
//!
//! # Responsibility
//! - Narrow the board to what the UI should render for the current search
//!   term and category filter.

pub mod projection;
