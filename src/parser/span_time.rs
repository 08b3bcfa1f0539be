//! Span timestamps from tabular rows.
//!
//! Rows carry `Span.Start` / `Span.End` as RFC 3339 strings. These helpers
//! are the only place timestamps are parsed; the interval accumulator works
//! on the resulting `DateTime<Utc>` values.

use super::rows::Row;
use crate::intervals::Interval;
use crate::utils::config::{SPAN_END_KEY, SPAN_START_KEY};
use crate::utils::error::ParseError;
use chrono::{DateTime, Duration, Utc};

/// Parse an RFC 3339 timestamp from a named row field
pub fn parse_time(row: &Row, field: &str) -> Result<DateTime<Utc>, ParseError> {
    let value = row
        .get(field)
        .ok_or_else(|| ParseError::MissingField(field.to_string()))?;

    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|source| ParseError::Timestamp {
            field: field.to_string(),
            value: value.clone(),
            source,
        })
}

pub fn span_start(row: &Row) -> Result<DateTime<Utc>, ParseError> {
    parse_time(row, SPAN_START_KEY)
}

pub fn span_end(row: &Row) -> Result<DateTime<Utc>, ParseError> {
    parse_time(row, SPAN_END_KEY)
}

/// The span's `[start, end]`, not checked for ordering
pub fn span_interval(row: &Row) -> Result<Interval<DateTime<Utc>>, ParseError> {
    Ok(Interval::new(span_start(row)?, span_end(row)?))
}

/// Raw `end - start`, which may be negative for malformed spans
pub fn span_duration(row: &Row) -> Result<Duration, ParseError> {
    let interval = span_interval(row)?;
    Ok(interval.end.signed_duration_since(interval.start))
}

/// Render a duration as whole milliseconds, truncated toward zero
pub fn ms(duration: Duration) -> String {
    duration.num_milliseconds().to_string()
}
