//! XMLTV schedule normalization engine.
//!
//! Turns an XMLTV television guide document into a normalized, queryable
//! list of upcoming broadcasts: timestamps with their embedded UTC offsets
//! become absolute UTC instants, programmes that have already ended are
//! discarded, channel ids resolve to display names through a directory
//! built once per document, and the result is sorted by start time and
//! queryable per channel.

mod channels;
mod document;
mod error;
mod schedule;
mod timestamp;

pub use channels::ChannelDirectory;
pub use document::{ChannelRecord, ProgrammeRecord, TvDocument};
pub use error::ScheduleError;
pub use schedule::{
    CancelToken, ScheduleEntry, ScheduleIndex, build_schedule, build_schedule_with_cancel,
};
pub use timestamp::{format_timestamp, parse_timestamp};
