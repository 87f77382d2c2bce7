//! Channel directory: id to display-name resolution.

use std::collections::HashMap;

use crate::document::TvDocument;
use crate::error::ScheduleError;

/// Immutable map from channel id to display name.
///
/// Built once per document load by scanning the channel records exactly
/// once. Lookups afterwards are map hits against the cached names and never
/// touch the source document, so resolving names while building thousands
/// of schedule entries stays linear in programme count. Read-only after
/// construction; safe to share across threads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelDirectory {
    names: HashMap<String, String>,
}

impl ChannelDirectory {
    /// Builds the directory from the document's channel records, in
    /// document order.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::DuplicateChannel`] if two records share an
    /// id (construction fails loudly rather than silently picking one), or
    /// [`ScheduleError::MalformedChannel`] if a record lacks an id or a
    /// display name.
    pub fn build(document: &TvDocument) -> Result<Self, ScheduleError> {
        let mut names = HashMap::with_capacity(document.channels.len());

        for (index, record) in document.channels.iter().enumerate() {
            let id = record
                .id
                .as_deref()
                .ok_or(ScheduleError::MalformedChannel { index, field: "id" })?;
            let display_name =
                record
                    .display_name
                    .as_deref()
                    .ok_or(ScheduleError::MalformedChannel {
                        index,
                        field: "display-name",
                    })?;

            if names
                .insert(String::from(id), String::from(display_name))
                .is_some()
            {
                return Err(ScheduleError::DuplicateChannel {
                    channel_id: String::from(id),
                });
            }
        }

        tracing::debug!(channels = names.len(), "channel directory built");
        Ok(Self { names })
    }

    /// Resolves a channel id to its cached display name.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::UnknownChannel`] when no channel record
    /// carried the id.
    pub fn display_name(&self, channel_id: &str) -> Result<&str, ScheduleError> {
        self.names
            .get(channel_id)
            .map(String::as_str)
            .ok_or_else(|| ScheduleError::UnknownChannel {
                channel_id: String::from(channel_id),
            })
    }

    /// Whether the directory has an entry for the id.
    #[must_use]
    pub fn contains(&self, channel_id: &str) -> bool {
        self.names.contains_key(channel_id)
    }

    /// Iterates `(id, display name)` pairs in unspecified order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.names.iter().map(|(id, name)| (id.as_str(), name.as_str()))
    }

    /// Number of channels in the directory.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the directory holds no channels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
