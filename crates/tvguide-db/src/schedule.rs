//! Schedule entry persistence.
//!
//! Timestamps are stored as RFC 3339 text in UTC, so `ORDER BY start_utc`
//! is chronological. The insertion position is kept as the primary key to
//! preserve the index's tie-breaking order across a round trip.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tvguide_xmltv::ScheduleEntry;

/// Replaces the whole stored schedule with `entries`.
///
/// The store mirrors the core lifecycle: a schedule is rebuilt wholesale
/// on re-ingestion, so there is no partial upsert path.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn replace_schedule(conn: &Connection, entries: &[ScheduleEntry]) -> Result<()> {
    let tx = conn
        .unchecked_transaction()
        .context("failed to begin transaction")?;

    tx.execute("DELETE FROM programmes", [])
        .context("failed to clear programmes")?;

    let mut stmt = tx
        .prepare(
            "INSERT INTO programmes (
                position, channel_id, channel_name, title, start_utc, stop_utc, duration_min
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6,
                CAST(ROUND((julianday(?6) - julianday(?5)) * 24 * 60) AS INTEGER))",
        )
        .context("failed to prepare programmes insert")?;

    for (position, entry) in entries.iter().enumerate() {
        stmt.execute(rusqlite::params![
            position,
            entry.channel_id,
            entry.channel_name,
            entry.title,
            entry.start.to_rfc3339(),
            entry.stop.to_rfc3339(),
        ])
        .with_context(|| format!("failed to insert programme {:?}", entry.title))?;
    }

    drop(stmt);
    tx.commit().context("failed to commit programmes")?;

    tracing::debug!(programmes = entries.len(), "schedule stored");
    Ok(())
}

/// Loads the stored schedule, ordered by start time then insertion position.
///
/// # Errors
///
/// Returns an error if the database query fails or a stored timestamp does
/// not parse as RFC 3339.
pub fn load_schedule(conn: &Connection) -> Result<Vec<ScheduleEntry>> {
    let mut stmt = conn
        .prepare(
            "SELECT channel_id, channel_name, title, start_utc, stop_utc
             FROM programmes ORDER BY start_utc, position",
        )
        .context("failed to prepare programmes query")?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })
        .context("failed to query programmes")?;

    let raw = rows
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("failed to read programmes rows")?;

    raw.into_iter()
        .map(|(channel_id, channel_name, title, start_utc, stop_utc)| {
            Ok(ScheduleEntry {
                start: parse_stored_instant(&start_utc)?,
                stop: parse_stored_instant(&stop_utc)?,
                title,
                channel_id,
                channel_name,
            })
        })
        .collect()
}

/// Parses a stored RFC 3339 timestamp back into a UTC instant.
fn parse_stored_instant(text: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|instant| instant.with_timezone(&Utc))
        .with_context(|| format!("stored timestamp {text:?} is not RFC 3339"))
}
