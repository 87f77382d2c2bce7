//! Serde model of the XMLTV source document.
//!
//! Record fields deserialize leniently (`Option<String>`, empty string as
//! `None`) so that a missing or blank field surfaces as a record-level
//! error during directory or schedule construction instead of failing the
//! whole document parse with an opaque serde message.

use std::str::FromStr;

use serde::de::Error;
use serde::{Deserialize, Deserializer};

use crate::error::ScheduleError;

/// Deserializes empty strings as `None` (for `String` fields).
fn deserialize_empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let result = Option::deserialize(deserializer);
    let s: Option<String> = result.map_err(D::Error::custom)?;
    Ok(s.filter(|s| !s.is_empty()))
}

/// A parsed XMLTV document: the immutable input handle for directory and
/// schedule construction.
#[derive(Debug, Deserialize)]
#[serde(rename = "tv")]
pub struct TvDocument {
    /// `<channel>` elements, in document order.
    #[serde(rename = "channel", default)]
    pub channels: Vec<ChannelRecord>,
    /// `<programme>` elements, in document order.
    #[serde(rename = "programme", default)]
    pub programmes: Vec<ProgrammeRecord>,
}

/// One `<channel>` element.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelRecord {
    /// `id` attribute.
    #[serde(
        rename = "@id",
        deserialize_with = "deserialize_empty_string_as_none",
        default
    )]
    pub id: Option<String>,
    /// `<display-name>` child text.
    #[serde(
        rename = "display-name",
        deserialize_with = "deserialize_empty_string_as_none",
        default
    )]
    pub display_name: Option<String>,
}

/// One `<programme>` element.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgrammeRecord {
    /// `channel` attribute referencing a [`ChannelRecord`] id.
    #[serde(
        rename = "@channel",
        deserialize_with = "deserialize_empty_string_as_none",
        default
    )]
    pub channel: Option<String>,
    /// `start` attribute, raw `YYYYMMDDHHMMSS ±HHMM` timestamp.
    #[serde(
        rename = "@start",
        deserialize_with = "deserialize_empty_string_as_none",
        default
    )]
    pub start: Option<String>,
    /// `stop` attribute, raw `YYYYMMDDHHMMSS ±HHMM` timestamp.
    #[serde(
        rename = "@stop",
        deserialize_with = "deserialize_empty_string_as_none",
        default
    )]
    pub stop: Option<String>,
    /// `<title>` child text.
    #[serde(
        rename = "title",
        deserialize_with = "deserialize_empty_string_as_none",
        default
    )]
    pub title: Option<String>,
}

impl FromStr for TvDocument {
    type Err = ScheduleError;

    fn from_str(xml: &str) -> Result<Self, Self::Err> {
        let document: Self = quick_xml::de::from_str(xml)?;
        tracing::debug!(
            channels = document.channels.len(),
            programmes = document.programmes.len(),
            "XMLTV document parsed"
        );
        Ok(document)
    }
}
