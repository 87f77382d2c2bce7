//! SQLite persistence for normalized schedules.
//!
//! Uses `rusqlite` (bundled `SQLite`) to store the channel directory and
//! the schedule entries produced by `tvguide-xmltv`. The store mirrors the
//! core lifecycle: whole-schedule replacement only, no partial updates.

/// Channel directory persistence.
pub mod channels;
mod connection;
mod migrations;
/// Schedule entry persistence.
pub mod schedule;

#[allow(clippy::module_name_repetitions)]
pub use channels::{StoredChannel, load_channels, replace_channels};
pub use connection::open_db;
pub use schedule::{load_schedule, replace_schedule};
