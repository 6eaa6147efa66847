//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD primitives over the canonical `tasks` table.
//! - Keep SQL and row mapping inside the persistence boundary.
//!
//! # Invariants
//! - Repositories persist `Task` values as given; validation and
//!   classification happen before a `Task` can exist.
//! - Read paths reject rows that violate model invariants (including a
//!   category that disagrees with the stored ratings) instead of masking them.
//! - Listing order is insertion order (`seq ASC`).

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::task::{Category, Task, TaskId};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const TASK_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    description,
    time_rating,
    value_rating,
    category
FROM tasks";

const REQUIRED_TASK_COLUMNS: &[&str] = &[
    "seq",
    "uuid",
    "name",
    "description",
    "time_rating",
    "value_rating",
    "category",
    "created_at",
    "updated_at",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for task persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(TaskId),
    /// Persisted row cannot be converted into a valid `Task`.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "task repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "task repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "task repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence contract for tasks.
pub trait TaskRepository {
    fn create_task(&self, task: &Task) -> RepoResult<()>;
    /// Overwrites every mutable column of an existing task.
    fn update_task(&self, task: &Task) -> RepoResult<()>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    fn list_tasks(&self) -> RepoResult<Vec<Task>>;
    fn list_tasks_in_category(&self, category: Category) -> RepoResult<Vec<Task>>;
    /// Per-category row counts in `Category::ALL` order.
    fn count_by_category(&self) -> RepoResult<[usize; 4]>;
    fn delete_task(&self, id: TaskId) -> RepoResult<()>;
    /// Deletes every task and returns how many rows were removed.
    fn clear_tasks(&self) -> RepoResult<usize>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Creates a repository after checking the connection is migrated.
    ///
    /// # Errors
    /// - `UninitializedConnection` when `user_version` differs from the
    ///   latest migration.
    /// - `MissingRequiredTable`/`MissingRequiredColumn` for foreign schemas.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_task_connection_ready(conn)?;
        Ok(Self { conn })
    }

    /// Skips schema checks; callers must have run `try_new` on the same
    /// database before.
    pub(crate) fn new_unchecked(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, task: &Task) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO tasks (
                uuid,
                name,
                description,
                time_rating,
                value_rating,
                category
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                task.id().to_string(),
                task.name(),
                task.description(),
                task.time_rating(),
                task.value_rating(),
                task.category().as_str(),
            ],
        )?;
        Ok(())
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                name = ?1,
                description = ?2,
                time_rating = ?3,
                value_rating = ?4,
                category = ?5,
                updated_at = (CAST(strftime('%s', 'now') AS INTEGER) * 1000)
             WHERE uuid = ?6;",
            params![
                task.name(),
                task.description(),
                task.time_rating(),
                task.value_rating(),
                task.category().as_str(),
                task.id().to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(task.id()));
        }
        Ok(())
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("{TASK_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }
        Ok(None)
    }

    fn list_tasks(&self) -> RepoResult<Vec<Task>> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("{TASK_SELECT_SQL} ORDER BY seq ASC;"))?;
        let mut rows = stmt.query([])?;
        collect_tasks(&mut rows)
    }

    fn list_tasks_in_category(&self, category: Category) -> RepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare_cached(&format!(
            "{TASK_SELECT_SQL} WHERE category = ?1 ORDER BY seq ASC;"
        ))?;
        let mut rows = stmt.query([category.as_str()])?;
        collect_tasks(&mut rows)
    }

    fn count_by_category(&self) -> RepoResult<[usize; 4]> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT category, COUNT(*) FROM tasks GROUP BY category;")?;
        let mut rows = stmt.query([])?;
        let mut counts = [0_usize; 4];

        while let Some(row) = rows.next()? {
            let label: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            let category = Category::parse(&label).ok_or_else(|| {
                RepoError::InvalidData(format!("invalid category `{label}` in tasks.category"))
            })?;
            counts[category.index()] = usize::try_from(count).map_err(|_| {
                RepoError::InvalidData(format!("invalid row count `{count}` for category"))
            })?;
        }

        Ok(counts)
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn clear_tasks(&self) -> RepoResult<usize> {
        let removed = self.conn.execute("DELETE FROM tasks;", [])?;
        Ok(removed)
    }
}

fn collect_tasks(rows: &mut rusqlite::Rows<'_>) -> RepoResult<Vec<Task>> {
    let mut tasks = Vec::new();
    while let Some(row) = rows.next()? {
        tasks.push(parse_task_row(row)?);
    }
    Ok(tasks)
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in tasks.uuid"))
    })?;

    let category_text: String = row.get("category")?;
    let category = Category::parse(&category_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid category `{category_text}` in tasks.category"
        ))
    })?;

    let name: String = row.get("name")?;
    let description: Option<String> = row.get("description")?;
    let time_rating: i64 = row.get("time_rating")?;
    let value_rating: i64 = row.get("value_rating")?;

    Task::restore(
        id,
        &name,
        description.as_deref(),
        time_rating,
        value_rating,
        category,
    )
    .map_err(|err| RepoError::InvalidData(format!("task {id}: {err}")))
}

fn ensure_task_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "tasks")? {
        return Err(RepoError::MissingRequiredTable("tasks"));
    }

    let columns = table_columns(conn, "tasks")?;
    for &column in REQUIRED_TASK_COLUMNS {
        if !columns.iter().any(|existing| existing == column) {
            return Err(RepoError::MissingRequiredColumn {
                table: "tasks",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        columns.push(row.get::<_, String>(1)?);
    }
    Ok(columns)
}
