//! Core use-case services.
//!
//! # Responsibility
//! - Own the task collection behind a validated, serialized API.
//! - Decode external request payloads into typed inputs.
//! - Keep CLI and other callers decoupled from storage details.

pub mod payload;
pub mod task_store;
