//! Schema version management using `PRAGMA user_version`.

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Current schema version.
const CURRENT_VERSION: u32 = 2;

/// Runs database migrations up to `CURRENT_VERSION`.
///
/// # Errors
///
/// Returns an error if any SQL statement fails.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let version: u32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .context("failed to read user_version")?;

    if version < 1 {
        migrate_v1(conn).context("migration to v1 failed")?;
    }
    if version < 2 {
        migrate_v2(conn).context("migration to v2 failed")?;
    }

    conn.pragma_update(None, "user_version", CURRENT_VERSION)
        .context("failed to update user_version")?;

    Ok(())
}

/// Migration to v1: create `channels` and `programmes` tables.
fn migrate_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS channels (
            channel_id    TEXT PRIMARY KEY,
            display_name  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS programmes (
            position      INTEGER PRIMARY KEY,
            channel_id    TEXT NOT NULL,
            channel_name  TEXT NOT NULL,
            title         TEXT NOT NULL,
            start_utc     TEXT NOT NULL,
            stop_utc      TEXT NOT NULL
        );",
    )
    .context("failed to create tables")?;

    Ok(())
}

/// Migration to v2: add lookup indexes and a stored `duration_min` column.
fn migrate_v2(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_programmes_channel_id ON programmes(channel_id);
         CREATE INDEX IF NOT EXISTS idx_programmes_start_utc ON programmes(start_utc);
         ALTER TABLE programmes ADD COLUMN duration_min INTEGER;
         UPDATE programmes SET duration_min = CAST(ROUND((julianday(stop_utc) - julianday(start_utc)) * 24 * 60) AS INTEGER);",
    )
    .context("failed to add indexes and duration_min column")?;

    Ok(())
}
