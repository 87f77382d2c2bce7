//! Error taxonomy for schedule normalization.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors produced while normalizing an XMLTV document.
///
/// Every failure identifies the offending record; a build either completes
/// or returns exactly one of these, never a partial result.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// The XML document itself could not be deserialized.
    #[error("failed to parse XMLTV document")]
    Document(#[from] quick_xml::DeError),

    /// A timestamp string could not be decomposed into datetime and offset.
    #[error("malformed timestamp {raw:?}: {reason}")]
    MalformedTimestamp {
        /// The raw timestamp string as it appeared in the document.
        raw: String,
        /// What made the string unparseable.
        reason: &'static str,
    },

    /// A programme record lacks a required field.
    #[error("programme record #{index} is missing required field `{field}`")]
    MalformedProgramme {
        /// Zero-based position of the record in document order.
        index: usize,
        /// Name of the missing field.
        field: &'static str,
    },

    /// A channel record lacks a required field.
    #[error("channel record #{index} is missing required field `{field}`")]
    MalformedChannel {
        /// Zero-based position of the record in document order.
        index: usize,
        /// Name of the missing field.
        field: &'static str,
    },

    /// A programme stops before it starts.
    #[error("programme {title:?} stops at {stop} before it starts at {start}")]
    InvalidInterval {
        /// Title of the offending programme.
        title: String,
        /// Parsed start instant.
        start: DateTime<Utc>,
        /// Parsed stop instant.
        stop: DateTime<Utc>,
    },

    /// A programme references a channel id with no directory entry.
    #[error("unknown channel id {channel_id:?}")]
    UnknownChannel {
        /// The unresolvable channel id.
        channel_id: String,
    },

    /// Two channel records share the same id.
    #[error("duplicate channel id {channel_id:?}")]
    DuplicateChannel {
        /// The id that appeared more than once.
        channel_id: String,
    },

    /// The caller cancelled the build between programme records.
    #[error("schedule build cancelled")]
    Cancelled,
}
