//! XMLTV timestamp parsing.
//!
//! An XMLTV timestamp carries a wall-clock datetime and a literal UTC
//! offset in a single string, e.g. `"20090615120000 +0100"`. The offset is
//! not a named timezone; no tz database or DST rule is consulted.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};

use crate::error::ScheduleError;

/// Fixed layout of the wall-clock part: no separators, no fractional seconds.
const WALL_CLOCK_FORMAT: &str = "%Y%m%d%H%M%S";

fn malformed(raw: &str, reason: &'static str) -> ScheduleError {
    ScheduleError::MalformedTimestamp {
        raw: String::from(raw),
        reason,
    }
}

/// Converts one XMLTV timestamp string into an absolute UTC instant.
///
/// The wall clock is interpreted as local time at the embedded offset, so
/// the UTC result is the wall clock minus the offset: `+0100` noon becomes
/// `11:00Z`, `-0500` noon becomes `17:00Z`.
///
/// # Errors
///
/// Returns [`ScheduleError::MalformedTimestamp`] if the string cannot be
/// split into a datetime and a five-character signed offset, if the
/// datetime has a non-numeric field or an invalid calendar value, or if
/// the offset digits are not numeric.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ScheduleError> {
    let (wall_clock_part, offset_part) = raw
        .split_once(' ')
        .ok_or_else(|| malformed(raw, "expected `<datetime> <offset>`"))?;

    let wall_clock = NaiveDateTime::parse_from_str(wall_clock_part, WALL_CLOCK_FORMAT)
        .map_err(|_| malformed(raw, "invalid wall-clock datetime"))?;

    let offset_minutes = parse_offset_minutes(raw, offset_part)?;

    let utc = wall_clock
        .checked_sub_signed(Duration::minutes(offset_minutes))
        .ok_or_else(|| malformed(raw, "datetime out of range"))?;
    Ok(Utc.from_utc_datetime(&utc))
}

/// Parses a `±HHMM` offset into signed total minutes.
#[allow(clippy::arithmetic_side_effects)] // components are bounded at two digits each
fn parse_offset_minutes(raw: &str, offset_part: &str) -> Result<i64, ScheduleError> {
    if offset_part.len() != 5 {
        return Err(malformed(raw, "offset must be a sign and four digits"));
    }

    let mut chars = offset_part.chars();
    let sign: i64 = match chars.next() {
        Some('+') => 1,
        Some('-') => -1,
        _ => return Err(malformed(raw, "offset must begin with `+` or `-`")),
    };

    let digits = chars.as_str();
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed(raw, "offset digits must be numeric"));
    }

    let (hours_part, minutes_part) = digits.split_at(2);
    let hours: i64 = hours_part
        .parse()
        .map_err(|_| malformed(raw, "invalid offset hours"))?;
    let minutes: i64 = minutes_part
        .parse()
        .map_err(|_| malformed(raw, "invalid offset minutes"))?;

    Ok(sign * (hours * 60 + minutes))
}

/// Formats a UTC instant back into the `YYYYMMDDHHMMSS ±HHMM` layout at the
/// given offset, reconstructing the original wall-clock fields.
#[must_use]
#[allow(clippy::arithmetic_side_effects)] // offset magnitude is bounded
pub fn format_timestamp(instant: DateTime<Utc>, offset_minutes: i32) -> String {
    let shifted = instant.naive_utc() + Duration::minutes(i64::from(offset_minutes));
    let sign = if offset_minutes < 0 { '-' } else { '+' };
    let magnitude = offset_minutes.unsigned_abs();
    format!(
        "{} {}{:02}{:02}",
        shifted.format(WALL_CLOCK_FORMAT),
        sign,
        magnitude / 60,
        magnitude % 60,
    )
}
