//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the persistence contract the task store is written against.
//! - Isolate SQLite query details from store orchestration.
//!
//! # Invariants
//! - Repositories never classify or validate input; they only store `Task`
//!   values whose invariants already hold.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod task_repo;
