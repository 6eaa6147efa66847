//! Task store: the single mutator of the task collection.
//!
//! # Responsibility
//! - Validate caller input, classify, and persist through the repository.
//! - Serialize every operation so callers never observe half-written rows.
//! - Translate persistence failures into `StoreError` without masking them.
//!
//! # Invariants
//! - Validation runs before classification; the classifier only ever sees
//!   in-range ratings.
//! - Updates merge the patch onto the current row and re-derive the
//!   category from the merged pair inside one write transaction.
//! - A failed create or update leaves the collection unchanged.
//! - Log lines carry ids, categories and counts only, never task text.
//!
//! # See also
//! - `crate::repo::task_repo` for the persistence contract.

use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::task::{Category, NewTask, Task, TaskId, TaskPatch, TaskValidationError};
use crate::repo::task_repo::{RepoError, SqliteTaskRepository, TaskRepository};
use log::{debug, error, info, warn};
use parking_lot::Mutex;
use rusqlite::{Connection, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Instant;
use uuid::Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

/// Error surfaced by every store operation.
#[derive(Debug)]
pub enum StoreError {
    /// Input rejected; nothing was written.
    Validation(TaskValidationError),
    /// Referenced task does not exist.
    NotFound(TaskId),
    /// Storage medium failed or returned invalid data.
    Storage(RepoError),
}

impl StoreError {
    /// Stable short code for logs and CLI output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_failed",
            Self::NotFound(_) => "not_found",
            Self::Storage(_) => "storage_failed",
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::Storage(err) => write!(f, "storage failure: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<TaskValidationError> for StoreError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            other => Self::Storage(other),
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Storage(RepoError::Db(value))
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage(RepoError::from(value))
    }
}

/// Owner of the canonical task collection.
///
/// One mutex around the connection is the serialization point for the
/// whole collection; share the store across threads with `Arc<TaskStore>`.
pub struct TaskStore {
    conn: Mutex<Connection>,
}

impl TaskStore {
    /// Opens (or creates) a file-backed store.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::from_connection(open_db(path)?)
    }

    /// Creates an empty, process-private store.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(open_db_in_memory()?)
    }

    /// Wraps an already migrated connection.
    ///
    /// # Errors
    /// - `Storage` when the connection schema is not the one this binary
    ///   writes (see `SqliteTaskRepository::try_new`).
    pub fn from_connection(conn: Connection) -> StoreResult<Self> {
        SqliteTaskRepository::try_new(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Validates, classifies and persists a new task.
    ///
    /// Any `category` the caller had in mind is irrelevant: `NewTask` has
    /// no such field and the stored category is always derived.
    pub fn create_task(&self, input: NewTask) -> StoreResult<Task> {
        let started_at = Instant::now();
        let task = match Task::create(Uuid::new_v4(), &input) {
            Ok(task) => task,
            Err(err) => return Err(rejected("task_create", None, err)),
        };

        let result = self.write(|repo| {
            repo.create_task(&task)?;
            repo.get_task(task.id())?.ok_or_else(|| {
                StoreError::Storage(RepoError::InvalidData(format!(
                    "created task {} not found in read-back",
                    task.id()
                )))
            })
        });

        log_outcome("task_create", Some(task.id()), started_at, &result);
        result
    }

    /// Returns the task, or `None` when no task has `id`.
    pub fn get_task(&self, id: TaskId) -> StoreResult<Option<Task>> {
        self.read(|repo| Ok(repo.get_task(id)?))
    }

    /// Returns every task in insertion order.
    pub fn list_tasks(&self) -> StoreResult<Vec<Task>> {
        self.read(|repo| Ok(repo.list_tasks()?))
    }

    /// Returns tasks of one quadrant in insertion order.
    pub fn list_tasks_in_category(&self, category: Category) -> StoreResult<Vec<Task>> {
        self.read(|repo| Ok(repo.list_tasks_in_category(category)?))
    }

    /// Returns per-category counts in `Category::ALL` order.
    pub fn category_counts(&self) -> StoreResult<[usize; 4]> {
        self.read(|repo| Ok(repo.count_by_category()?))
    }

    /// Applies a partial update and returns the full updated record.
    ///
    /// # Errors
    /// - `Validation` when any supplied field is invalid; checked before
    ///   the lookup so bad input is reported even for unknown ids.
    /// - `NotFound` when no task has `id`.
    pub fn update_task(&self, id: TaskId, patch: TaskPatch) -> StoreResult<Task> {
        let started_at = Instant::now();
        if let Err(err) = patch.validate() {
            return Err(rejected("task_update", Some(id), err));
        }

        let result = self.write(|repo| {
            let current = repo.get_task(id)?.ok_or(StoreError::NotFound(id))?;
            let updated = current.apply_patch(&patch)?;
            if updated != current {
                repo.update_task(&updated)?;
            }
            Ok(updated)
        });

        log_outcome("task_update", Some(id), started_at, &result);
        result
    }

    /// Deletes one task. Returns `false` when it did not exist.
    pub fn delete_task(&self, id: TaskId) -> StoreResult<bool> {
        let started_at = Instant::now();
        let result = self.write(|repo| match repo.delete_task(id) {
            Ok(()) => Ok(true),
            Err(RepoError::NotFound(_)) => Ok(false),
            Err(err) => Err(err.into()),
        });

        log_outcome("task_delete", Some(id), started_at, &result);
        result
    }

    /// Deletes every task and returns how many were removed.
    pub fn clear_tasks(&self) -> StoreResult<usize> {
        let started_at = Instant::now();
        let result = self.write(|repo| Ok(repo.clear_tasks()?));

        match &result {
            Ok(removed) => info!(
                "event=task_clear module=store status=ok removed={} duration_ms={}",
                removed,
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=task_clear module=store status=error error_code={} error={}",
                err.code(),
                err
            ),
        }
        result
    }

    fn read<T>(&self, op: impl FnOnce(&dyn TaskRepository) -> StoreResult<T>) -> StoreResult<T> {
        let conn = self.conn.lock();
        let repo = SqliteTaskRepository::new_unchecked(&conn);
        op(&repo)
    }

    /// Runs `op` inside an immediate transaction; commits only on `Ok`.
    fn write<T>(&self, op: impl FnOnce(&dyn TaskRepository) -> StoreResult<T>) -> StoreResult<T> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = {
            let repo = SqliteTaskRepository::new_unchecked(&tx);
            op(&repo)?
        };
        tx.commit()?;
        Ok(value)
    }
}

/// Metadata-only rendering of an operation result for log lines.
trait LogSummary {
    fn log_summary(&self) -> String;
}

impl LogSummary for Task {
    fn log_summary(&self) -> String {
        format!(
            "category={} time_rating={} value_rating={}",
            self.category(),
            self.time_rating(),
            self.value_rating()
        )
    }
}

impl LogSummary for bool {
    fn log_summary(&self) -> String {
        format!("removed={self}")
    }
}

fn display_id(id: Option<TaskId>) -> String {
    id.map_or_else(|| "-".to_string(), |id| id.to_string())
}

fn rejected(event: &str, id: Option<TaskId>, err: TaskValidationError) -> StoreError {
    warn!(
        "event={} module=store status=rejected task_id={} issue_count={} fields={}",
        event,
        display_id(id),
        err.issues().len(),
        err.issues()
            .iter()
            .map(|issue| issue.field.as_str())
            .collect::<Vec<_>>()
            .join(",")
    );
    StoreError::Validation(err)
}

fn log_outcome<T: LogSummary>(
    event: &str,
    id: Option<TaskId>,
    started_at: Instant,
    result: &StoreResult<T>,
) {
    let duration_ms = started_at.elapsed().as_millis();
    match result {
        Ok(value) => info!(
            "event={} module=store status=ok task_id={} {} duration_ms={}",
            event,
            display_id(id),
            value.log_summary(),
            duration_ms
        ),
        Err(StoreError::NotFound(_)) => debug!(
            "event={} module=store status=not_found task_id={} duration_ms={}",
            event,
            display_id(id),
            duration_ms
        ),
        Err(StoreError::Validation(err)) => warn!(
            "event={} module=store status=rejected task_id={} issue_count={} duration_ms={}",
            event,
            display_id(id),
            err.issues().len(),
            duration_ms
        ),
        Err(err) => error!(
            "event={} module=store status=error task_id={} error_code={} duration_ms={} error={}",
            event,
            display_id(id),
            err.code(),
            duration_ms,
            err
        ),
    }
}
