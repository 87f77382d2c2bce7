//! Channel directory persistence.

use anyhow::{Context, Result};
use rusqlite::Connection;

/// A stored channel directory row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredChannel {
    /// Channel identifier from the source document.
    pub channel_id: String,
    /// Resolved display name.
    pub display_name: String,
}

/// Replaces all channels in the store.
///
/// # Errors
///
/// Returns an error if the database operation fails.
#[allow(clippy::module_name_repetitions)]
pub fn replace_channels(conn: &Connection, channels: &[StoredChannel]) -> Result<()> {
    let tx = conn
        .unchecked_transaction()
        .context("failed to begin transaction")?;

    tx.execute("DELETE FROM channels", [])
        .context("failed to clear channels")?;

    let mut stmt = tx
        .prepare("INSERT INTO channels (channel_id, display_name) VALUES (?1, ?2)")
        .context("failed to prepare channels insert")?;

    for ch in channels {
        stmt.execute(rusqlite::params![ch.channel_id, ch.display_name])
            .with_context(|| format!("failed to insert channel {}", ch.channel_id))?;
    }

    drop(stmt);
    tx.commit().context("failed to commit channels")?;
    Ok(())
}

/// Loads all channels from the store, ordered by `channel_id`.
///
/// # Errors
///
/// Returns an error if the database query fails.
#[allow(clippy::module_name_repetitions)]
pub fn load_channels(conn: &Connection) -> Result<Vec<StoredChannel>> {
    let mut stmt = conn
        .prepare("SELECT channel_id, display_name FROM channels ORDER BY channel_id")
        .context("failed to prepare channels query")?;

    let rows = stmt
        .query_map([], |row| {
            Ok(StoredChannel {
                channel_id: row.get(0)?,
                display_name: row.get(1)?,
            })
        })
        .context("failed to query channels")?;

    rows.collect::<std::result::Result<Vec<_>, _>>()
        .context("failed to read channels rows")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use super::*;
    use crate::connection::open_db;

    fn setup_db() -> (Connection, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let conn = open_db(Some(&dir.path().to_path_buf())).unwrap();
        (conn, dir)
    }

    #[test]
    fn test_replace_and_load_channels() {
        // Arrange
        let (conn, _dir) = setup_db();
        let channels = vec![
            StoredChannel {
                channel_id: String::from("bbc2.example.co.uk"),
                display_name: String::from("BBC Two"),
            },
            StoredChannel {
                channel_id: String::from("bbc1.example.co.uk"),
                display_name: String::from("BBC One"),
            },
        ];

        // Act
        replace_channels(&conn, &channels).unwrap();
        let loaded = load_channels(&conn).unwrap();

        // Assert (ordered by channel_id)
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].channel_id, "bbc1.example.co.uk");
        assert_eq!(loaded[0].display_name, "BBC One");
        assert_eq!(loaded[1].channel_id, "bbc2.example.co.uk");
    }

    #[test]
    fn test_replace_discards_previous_rows() {
        // Arrange
        let (conn, _dir) = setup_db();
        replace_channels(
            &conn,
            &[StoredChannel {
                channel_id: String::from("old.example"),
                display_name: String::from("Old"),
            }],
        )
        .unwrap();

        // Act
        replace_channels(
            &conn,
            &[StoredChannel {
                channel_id: String::from("new.example"),
                display_name: String::from("New"),
            }],
        )
        .unwrap();
        let loaded = load_channels(&conn).unwrap();

        // Assert
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].channel_id, "new.example");
    }

    #[test]
    fn test_load_empty_table() {
        // Arrange
        let (conn, _dir) = setup_db();

        // Act
        let loaded = load_channels(&conn).unwrap();

        // Assert
        assert!(loaded.is_empty());
    }
}
