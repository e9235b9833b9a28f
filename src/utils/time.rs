use std::ops::RangeInclusive;

use chrono::{Duration, NaiveDate, NaiveTime};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeError {
    #[error("Time '{0}' is not in a supported format (HH:MM or HH:MM:SS)")]
    InvalidFormat(String),
}

/// This is the standard way of converting a date to a string in mytimes.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Reads a `YYYY-MM-DD` date.
pub fn parse_date(text: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
}

/// Canonical form of a time of day. Stored times always use it, so that text ordering in the
/// database matches chronological ordering.
pub fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}

/// Parses `HH:MM` or `HH:MM:SS`. Hours may be written with one digit, minutes and seconds always
/// take two.
pub fn parse_time(text: &str) -> Result<NaiveTime, TimeError> {
    let trimmed = text.trim();
    let invalid = || TimeError::InvalidFormat(trimmed.to_string());

    let mut parts = trimmed.split(':');
    let hour = parts
        .next()
        .and_then(|v| parse_field(v, 1..=2))
        .ok_or_else(invalid)?;
    let minute = parts
        .next()
        .and_then(|v| parse_field(v, 2..=2))
        .ok_or_else(invalid)?;
    let second = match parts.next() {
        Some(v) => parse_field(v, 2..=2).ok_or_else(invalid)?,
        None => 0,
    };
    if parts.next().is_some() {
        return Err(invalid());
    }

    NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(invalid)
}

fn parse_field(value: &str, digits: RangeInclusive<usize>) -> Option<u32> {
    if !digits.contains(&value.len()) || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

/// Time between two moments of a day. An end before the start is taken to be on the next day.
pub fn elapsed(start: NaiveTime, end: NaiveTime) -> Duration {
    let delta = end - start;
    if delta < Duration::zero() {
        delta + Duration::days(1)
    } else {
        delta
    }
}

/// Duration between two user supplied times, formatted as `HH:MM:SS`.
pub fn compute_duration(start: &str, end: &str) -> Result<String, TimeError> {
    let start = parse_time(start)?;
    let end = parse_time(end)?;
    Ok(format_duration(elapsed(start, end)))
}

/// Zero padded `HH:MM:SS`. Hours are not wrapped at a day.
pub fn format_duration(duration: Duration) -> String {
    format_seconds(duration.num_seconds().into())
}

/// Same layout as [format_duration] for a plain number of seconds. A negative amount gets a
/// leading `-` in front of its magnitude.
pub fn format_seconds(total: i128) -> String {
    let sign = if total < 0 { "-" } else { "" };
    let total = total.unsigned_abs();
    let (hours, rem) = (total / 3600, total % 3600);
    let (minutes, seconds) = (rem / 60, rem % 60);
    format!("{sign}{hours:02}:{minutes:02}:{seconds:02}")
}

/// Reads back a stored `HH:MM:SS` duration as seconds. Any three integers separated by colons are
/// accepted, signed or not, and of any size an `i64` holds.
pub fn parse_duration(text: &str) -> Option<i128> {
    let parts = text
        .split(':')
        .map(|v| v.trim().parse::<i64>().ok())
        .collect::<Option<Vec<_>>>()?;
    let [hours, minutes, seconds] = parts[..] else {
        return None;
    };
    Some(i128::from(hours) * 3600 + i128::from(minutes) * 60 + i128::from(seconds))
}

/// Adds up durations in seconds, skipping values that can't be read.
pub fn total_duration<S: AsRef<str>>(durations: impl IntoIterator<Item = S>) -> i128 {
    durations
        .into_iter()
        .filter_map(|v| parse_duration(v.as_ref()))
        .fold(0, i128::saturating_add)
}

pub fn sum_durations<S: AsRef<str>>(durations: impl IntoIterator<Item = S>) -> String {
    format_seconds(total_duration(durations))
}
