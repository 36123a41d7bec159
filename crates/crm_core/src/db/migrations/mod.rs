//! CRM schema versions and the upgrade runner.
//!
//! # Invariants
//! - `STEPS` is ordered by strictly increasing version.
//! - Pending steps run in one transaction; `user_version` moves with them.

use crate::db::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;

struct SchemaStep {
    version: u32,
    sql: &'static str,
}

/// Customers, products, orders and the order/product link table.
const STEPS: &[SchemaStep] = &[SchemaStep {
    version: 1,
    sql: include_str!("0001_init.sql"),
}];

/// Schema versions before and after one `apply_migrations` run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaUpgrade {
    pub from: u32,
    pub to: u32,
}

impl SchemaUpgrade {
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }
}

/// Highest schema version this build can create and read.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |step| step.version)
}

/// Reads the schema version recorded in the store.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?)
}

/// Upgrades the CRM schema to `latest_version()`.
///
/// # Errors
/// - `SchemaTooNew` when the store is ahead of this build.
/// - `Migration` when a step fails; no step of this run is kept.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<SchemaUpgrade> {
    let upgrade = SchemaUpgrade {
        from: schema_version(conn)?,
        to: latest_version(),
    };

    if upgrade.from > upgrade.to {
        let err = DbError::SchemaTooNew {
            found: upgrade.from,
            supported: upgrade.to,
        };
        error!(
            "event=db_migrate module=db status=error from_version={} to_version={} error_code={}",
            upgrade.from,
            upgrade.to,
            err.code()
        );
        return Err(err);
    }

    if upgrade.is_noop() {
        info!(
            "event=db_migrate module=db status=skipped schema_version={}",
            upgrade.to
        );
        return Ok(upgrade);
    }

    let tx = conn.transaction()?;
    for step in STEPS.iter().filter(|step| step.version > upgrade.from) {
        tx.execute_batch(step.sql)
            .and_then(|()| tx.pragma_update(None, "user_version", step.version))
            .map_err(|source| DbError::Migration {
                version: step.version,
                source,
            })?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={}",
        upgrade.from, upgrade.to
    );
    Ok(upgrade)
}
