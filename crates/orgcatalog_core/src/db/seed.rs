//! Demo catalog used by the CLI `seed` command and integration tests.
//!
//! # Invariants
//! - Seeding runs in one transaction.
//! - Re-seeding is a no-op for rows that already exist (`INSERT OR IGNORE`).

use super::DbResult;
use log::info;
use rusqlite::Connection;

const SEED_DEMO_SQL: &str = include_str!("seed_demo.sql");

/// Inserts the demo buildings, activity taxonomy, organizations, phones and
/// activity assignments.
pub fn seed_demo_data(conn: &mut Connection) -> DbResult<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(SEED_DEMO_SQL)?;
    tx.commit()?;
    info!("event=db_seed module=db status=ok dataset=demo");
    Ok(())
}
