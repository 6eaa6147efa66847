//! Domain model for prioritized tasks.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep the quadrant rule next to the record it derives from.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId`.
//! - Deletion is a hard delete; there are no tombstones or history rows.

pub mod task;
