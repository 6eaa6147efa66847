//! Embedded schema history for the task database.
//!
//! # Responsibility
//! - List the `.sql` schema steps shipped with this binary.
//! - Bring a connection from its recorded version up to the latest step.
//!
//! # Invariants
//! - Step versions start at 1 and increase by exactly one.
//! - All pending steps run in one transaction; a failing step leaves the
//!   database at its previous version.
//! - The highest applied step is recorded in `PRAGMA user_version`.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::{Connection, Transaction};
use std::cmp::Ordering;

struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        name: "tasks",
        sql: include_str!("0001_tasks.sql"),
    },
    SchemaStep {
        version: 2,
        name: "task_category_index",
        sql: include_str!("0002_task_category_index.sql"),
    },
];

/// Schema version written by the newest step.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Runs every step newer than the connection's recorded version.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file was written by a newer
///   binary; nothing is touched.
/// - `Migration` naming the step whose SQL failed.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from_version = schema_version(conn)?;
    let target = latest_version();

    match from_version.cmp(&target) {
        Ordering::Greater => {
            return Err(DbError::UnsupportedSchemaVersion {
                db_version: from_version,
                latest_supported: target,
            })
        }
        Ordering::Equal => {
            debug!(
                "event=db_migrate module=db status=up_to_date version={}",
                from_version
            );
            return Ok(());
        }
        Ordering::Less => {}
    }

    let tx = conn.transaction()?;
    let mut applied = 0_usize;
    for step in pending_steps(from_version) {
        run_step(&tx, step)?;
        applied += 1;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={} steps={}",
        from_version, target, applied
    );
    Ok(())
}

fn pending_steps(after: u32) -> impl Iterator<Item = &'static SchemaStep> {
    SCHEMA_STEPS.iter().filter(move |step| step.version > after)
}

fn run_step(tx: &Transaction<'_>, step: &SchemaStep) -> DbResult<()> {
    let wrap = |source| DbError::Migration {
        version: step.version,
        name: step.name,
        source,
    };
    tx.execute_batch(step.sql).map_err(wrap)?;
    tx.pragma_update(None, "user_version", step.version)
        .map_err(wrap)?;
    debug!(
        "event=db_migrate_step module=db status=ok version={} name={}",
        step.version, step.name
    );
    Ok(())
}

fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}
