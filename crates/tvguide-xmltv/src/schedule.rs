//! Schedule construction and the queryable index.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Duration, Utc};

use crate::channels::ChannelDirectory;
use crate::document::TvDocument;
use crate::error::ScheduleError;
use crate::timestamp::parse_timestamp;

/// One normalized broadcast, resolved to UTC.
///
/// Entries are created only by [`build_schedule`], are immutable once
/// constructed, and are rebuilt wholesale when the source document is
/// re-ingested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEntry {
    /// Broadcast start, UTC.
    pub start: DateTime<Utc>,
    /// Broadcast end, UTC; never before `start`.
    pub stop: DateTime<Utc>,
    /// Programme title.
    pub title: String,
    /// Channel id as it appears in the document.
    pub channel_id: String,
    /// Display name resolved through the channel directory.
    pub channel_name: String,
}

impl ScheduleEntry {
    /// Broadcast length, `stop - start`. Non-negative by construction.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.stop - self.start
    }
}

/// Cooperative cancellation flag for a long ingestion pass.
///
/// Clone the token, hand one clone to the builder, and call
/// [`CancelToken::cancel`] from another thread; the builder checks the flag
/// between programme records and returns [`ScheduleError::Cancelled`] rather
/// than a silently truncated index.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates an unset token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of the build holding this token.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Builds the normalized schedule from a document.
///
/// Walks every programme record in document order, converts its timestamps
/// to UTC, discards programmes whose stop time is before `now` (a hard
/// filter against the single `now` snapshot, consistent across the whole
/// pass), resolves channel names through the directory, and returns the
/// sorted index. Convenience wrapper over [`build_schedule_with_cancel`]
/// with a token that never fires.
///
/// # Errors
///
/// See [`build_schedule_with_cancel`].
pub fn build_schedule(
    document: &TvDocument,
    channels: &ChannelDirectory,
    now: DateTime<Utc>,
) -> Result<ScheduleIndex, ScheduleError> {
    build_schedule_with_cancel(document, channels, now, &CancelToken::new())
}

/// Builds the normalized schedule, checking `cancel` between records.
///
/// # Errors
///
/// The whole build aborts on the first offending record; no partial index
/// is ever returned.
///
/// - [`ScheduleError::MalformedProgramme`] if a record lacks title,
///   channel, start, or stop.
/// - [`ScheduleError::MalformedTimestamp`] if a start or stop string does
///   not parse.
/// - [`ScheduleError::InvalidInterval`] if a programme stops before it
///   starts.
/// - [`ScheduleError::UnknownChannel`] if a record references a channel
///   the directory does not know.
/// - [`ScheduleError::Cancelled`] if `cancel` fired.
pub fn build_schedule_with_cancel(
    document: &TvDocument,
    channels: &ChannelDirectory,
    now: DateTime<Utc>,
    cancel: &CancelToken,
) -> Result<ScheduleIndex, ScheduleError> {
    let mut entries = Vec::new();
    let mut ended: usize = 0;

    for (index, record) in document.programmes.iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(ScheduleError::Cancelled);
        }

        let missing = |field: &'static str| ScheduleError::MalformedProgramme { index, field };
        let title = record.title.as_deref().ok_or_else(|| missing("title"))?;
        let channel_id = record.channel.as_deref().ok_or_else(|| missing("channel"))?;
        let raw_start = record.start.as_deref().ok_or_else(|| missing("start"))?;
        let raw_stop = record.stop.as_deref().ok_or_else(|| missing("stop"))?;

        // Stop time first: a programme that has already ended needs neither
        // its start parsed nor its channel resolved.
        let stop = parse_timestamp(raw_stop)?;
        if stop < now {
            ended = ended.saturating_add(1);
            continue;
        }

        let start = parse_timestamp(raw_start)?;
        if stop < start {
            return Err(ScheduleError::InvalidInterval {
                title: String::from(title),
                start,
                stop,
            });
        }

        let channel_name = channels.display_name(channel_id)?;
        entries.push(ScheduleEntry {
            start,
            stop,
            title: String::from(title),
            channel_id: String::from(channel_id),
            channel_name: String::from(channel_name),
        });
    }

    tracing::debug!(kept = entries.len(), ended, "schedule built");
    Ok(ScheduleIndex::from_entries(entries))
}

/// Ordered, queryable collection of schedule entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleIndex {
    entries: Vec<ScheduleEntry>,
}

impl ScheduleIndex {
    /// Sorts entries by start time ascending; the sort is stable, so ties
    /// keep their original document order.
    #[must_use]
    pub fn from_entries(mut entries: Vec<ScheduleEntry>) -> Self {
        entries.sort_by_key(|entry| entry.start);
        Self { entries }
    }

    /// All entries, start-time ascending.
    #[must_use]
    pub fn all(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    /// The subsequence for one channel, preserving start-time order.
    #[must_use]
    pub fn by_channel(&self, channel_id: &str) -> Vec<&ScheduleEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.channel_id == channel_id)
            .collect()
    }

    /// Number of entries in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use chrono::TimeZone;

    use super::*;

    /// `now` used across the fixture-based tests: 2009-06-15T12:00:00Z.
    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2009, 6, 15, 12, 0, 0).unwrap()
    }

    fn fixture() -> (TvDocument, ChannelDirectory) {
        let document: TvDocument = include_str!("../../../fixtures/tv_basic.xml")
            .parse()
            .unwrap();
        let directory = ChannelDirectory::build(&document).unwrap();
        (document, directory)
    }

    #[test]
    fn test_ended_programmes_are_discarded() {
        // Arrange: "Breakfast" stops 11:00+0100 = 10:00Z, before noon
        let (document, directory) = fixture();

        // Act
        let index = build_schedule(&document, &directory, noon()).unwrap();

        // Assert
        assert_eq!(index.len(), 2);
        assert!(index.all().iter().all(|entry| entry.title != "Breakfast"));
    }

    #[test]
    fn test_entries_are_sorted_by_start_and_resolved() {
        // Arrange
        let (document, directory) = fixture();

        // Act
        let index = build_schedule(&document, &directory, noon()).unwrap();

        // Assert: "Gardening Hour" starts 13:00+0100 = 12:00Z,
        // "Afternoon News" starts 14:00Z
        let all = index.all();
        assert_eq!(all[0].title, "Gardening Hour");
        assert_eq!(all[0].channel_name, "BBC Two");
        assert_eq!(all[0].start.to_rfc3339(), "2009-06-15T12:00:00+00:00");
        assert_eq!(all[1].title, "Afternoon News");
        assert_eq!(all[1].duration(), Duration::hours(1));
    }

    #[test]
    fn test_stop_exactly_at_now_is_kept() {
        // Arrange: the filter is `stop < now`, not `stop <= now`
        let document: TvDocument = r#"<tv>
            <channel id="c1"><display-name>One</display-name></channel>
            <programme channel="c1" start="20090615110000 +0000" stop="20090615120000 +0000">
                <title>Ends At Noon</title>
            </programme>
        </tv>"#
            .parse()
            .unwrap();
        let directory = ChannelDirectory::build(&document).unwrap();

        // Act
        let index = build_schedule(&document, &directory, noon()).unwrap();

        // Assert
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_by_channel_is_order_preserving_subsequence() {
        // Arrange
        let (document, directory) = fixture();
        let index = build_schedule(&document, &directory, Utc.timestamp_opt(0, 0).unwrap()).unwrap();

        // Act
        let subset = index.by_channel("bbc1.example.co.uk");

        // Assert: every entry matches the channel and relative order is
        // the same as in `all()`
        assert!(!subset.is_empty());
        assert!(
            subset
                .iter()
                .all(|entry| entry.channel_id == "bbc1.example.co.uk")
        );
        let positions: Vec<usize> = subset
            .iter()
            .map(|entry| {
                index
                    .all()
                    .iter()
                    .position(|candidate| candidate == *entry)
                    .unwrap()
            })
            .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_stable_sort_keeps_document_order_on_ties() {
        // Arrange: two programmes with identical start times
        let document: TvDocument = r#"<tv>
            <channel id="c1"><display-name>One</display-name></channel>
            <programme channel="c1" start="20090615130000 +0000" stop="20090615140000 +0000">
                <title>First In Document</title>
            </programme>
            <programme channel="c1" start="20090615130000 +0000" stop="20090615150000 +0000">
                <title>Second In Document</title>
            </programme>
        </tv>"#
            .parse()
            .unwrap();
        let directory = ChannelDirectory::build(&document).unwrap();

        // Act
        let index = build_schedule(&document, &directory, noon()).unwrap();

        // Assert
        assert_eq!(index.all()[0].title, "First In Document");
        assert_eq!(index.all()[1].title, "Second In Document");
    }

    #[test]
    fn test_malformed_stop_aborts_whole_build() {
        // Arrange
        let document: TvDocument = include_str!("../../../fixtures/tv_bad_timestamp.xml")
            .parse()
            .unwrap();
        let directory = ChannelDirectory::build(&document).unwrap();

        // Act
        let result = build_schedule(&document, &directory, noon());

        // Assert: terminal failure, no entries constructed
        assert!(matches!(
            result,
            Err(ScheduleError::MalformedTimestamp { .. })
        ));
    }

    #[test]
    fn test_missing_title_fails_with_record_index() {
        // Arrange
        let document: TvDocument = r#"<tv>
            <channel id="c1"><display-name>One</display-name></channel>
            <programme channel="c1" start="20090615130000 +0000" stop="20090615140000 +0000">
            </programme>
        </tv>"#
            .parse()
            .unwrap();
        let directory = ChannelDirectory::build(&document).unwrap();

        // Act
        let result = build_schedule(&document, &directory, noon());

        // Assert
        assert!(matches!(
            result,
            Err(ScheduleError::MalformedProgramme {
                index: 0,
                field: "title"
            })
        ));
    }

    #[test]
    fn test_stop_before_start_is_invalid_interval() {
        // Arrange
        let document: TvDocument = r#"<tv>
            <channel id="c1"><display-name>One</display-name></channel>
            <programme channel="c1" start="20090615150000 +0000" stop="20090615140000 +0000">
                <title>Backwards</title>
            </programme>
        </tv>"#
            .parse()
            .unwrap();
        let directory = ChannelDirectory::build(&document).unwrap();

        // Act
        let result = build_schedule(&document, &directory, noon());

        // Assert
        assert!(matches!(
            result,
            Err(ScheduleError::InvalidInterval { title, .. }) if title == "Backwards"
        ));
    }

    #[test]
    fn test_unresolvable_channel_aborts_build() {
        // Arrange: programme references a channel with no record
        let document: TvDocument = r#"<tv>
            <channel id="c1"><display-name>One</display-name></channel>
            <programme channel="ghost" start="20090615130000 +0000" stop="20090615140000 +0000">
                <title>Orphan</title>
            </programme>
        </tv>"#
            .parse()
            .unwrap();
        let directory = ChannelDirectory::build(&document).unwrap();

        // Act
        let result = build_schedule(&document, &directory, noon());

        // Assert: never silently swallowed into an empty name
        assert!(matches!(
            result,
            Err(ScheduleError::UnknownChannel { channel_id }) if channel_id == "ghost"
        ));
    }

    #[test]
    fn test_cancelled_token_aborts_before_first_record() {
        // Arrange
        let (document, directory) = fixture();
        let token = CancelToken::new();
        token.cancel();

        // Act
        let result = build_schedule_with_cancel(&document, &directory, noon(), &token);

        // Assert
        assert!(matches!(result, Err(ScheduleError::Cancelled)));
    }

    #[test]
    fn test_unset_token_does_not_interfere() {
        // Arrange
        let (document, directory) = fixture();
        let token = CancelToken::new();

        // Act
        let index = build_schedule_with_cancel(&document, &directory, noon(), &token).unwrap();

        // Assert
        assert_eq!(index.len(), 2);
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_empty_document_builds_empty_index() {
        // Arrange
        let document: TvDocument = "<tv></tv>".parse().unwrap();
        let directory = ChannelDirectory::build(&document).unwrap();

        // Act
        let index = build_schedule(&document, &directory, noon()).unwrap();

        // Assert
        assert!(index.is_empty());
        assert!(index.by_channel("c1").is_empty());
    }
}
