//! Core domain logic for quadrant task prioritization.
//! This crate is the single source of truth for classification and
//! task persistence invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod report;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LoggingStatus};
pub use model::task::{
    classify, parse_task_id, Category, FieldIssue, IssueKind, NewTask, RatingBand, Task,
    TaskField, TaskId, TaskPatch, TaskValidationError, HIGH_VALUE_THRESHOLD, MAX_RATING,
    MIN_RATING, QUICK_THRESHOLD,
};
pub use report::{group_by_category, render_text_report, CategoryGroup, CategorySummary};
pub use repo::task_repo::{RepoError, RepoResult, SqliteTaskRepository, TaskRepository};
pub use service::payload::{parse_new_task, parse_task_patch};
pub use service::task_store::{StoreError, StoreResult, TaskStore};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
