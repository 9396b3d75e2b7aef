//! Ordered schema steps for the clinic record store.
//!
//! Doctors land before patients so the patient table can index its
//! `doctor_uuid` column from the first release. The store's schema level is
//! kept in `PRAGMA user_version`; step numbers only ever grow.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    level: u32,
    name: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[
    SchemaStep {
        level: 1,
        name: "doctors",
        sql: include_str!("0001_doctors.sql"),
    },
    SchemaStep {
        level: 2,
        name: "patients",
        sql: include_str!("0002_patients.sql"),
    },
];

/// Highest schema level this build can create or read.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.level)
}

/// Brings the store up to [`latest_version`] inside one transaction.
///
/// A store already written by a newer build is refused rather than touched.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let stored_level = current_user_version(conn)?;
    let target_level = latest_version();

    if stored_level > target_level {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: stored_level,
            latest_supported: target_level,
        });
    }

    let pending = SCHEMA_STEPS
        .iter()
        .filter(|step| step.level > stored_level)
        .collect::<Vec<_>>();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in &pending {
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.level)?;
    }
    tx.commit()?;

    for step in pending {
        info!(
            "event=schema_step module=db status=ok level={} name={}",
            step.level, step.name
        );
    }
    Ok(())
}

/// Schema level recorded in the store; `0` for a fresh file.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let level = conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?;
    Ok(level)
}
