// SPDX-FileCopyrightText: 2026 Tagtimer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inclusive date ranges for statistics queries.
//!
//! Query bounds arrive either as `datetime-local` form values
//! (`2026-01-31T23:59`, interpreted in the server's local time zone) or as
//! RFC 3339 timestamps. When both bounds are absent the range defaults to
//! the current local day.

use chrono::{DateTime, Days, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TagTimerError;

/// `datetime-local` input format.
pub const LOCAL_INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// An inclusive `[start, end]` interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, TagTimerError> {
        if start > end {
            return Err(TagTimerError::Validation(format!(
                "range start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Local midnight to the last millisecond of the local day containing `now`.
    pub fn local_day(now: DateTime<Utc>) -> Result<Self, TagTimerError> {
        let date = now.with_timezone(&Local).date_naive();
        let start = local_midnight(date)?;
        let next = date
            .checked_add_days(Days::new(1))
            .ok_or_else(|| TagTimerError::Internal(format!("no day after {date}")))?;
        let end = local_midnight(next)? - chrono::Duration::milliseconds(1);
        Self::new(start, end)
    }

    /// Build a range from optional query bounds.
    ///
    /// Both absent selects the local day of `now`; otherwise both must be present.
    pub fn from_query(
        start: Option<&str>,
        end: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Self, TagTimerError> {
        let start = start.map(str::trim).filter(|s| !s.is_empty());
        let end = end.map(str::trim).filter(|s| !s.is_empty());
        match (start, end) {
            (None, None) => Self::local_day(now),
            (Some(start), Some(end)) => Self::new(parse_bound(start)?, parse_bound(end)?),
            (Some(_), None) => Err(TagTimerError::Validation(
                "`end` is required when `start` is given".to_string(),
            )),
            (None, Some(_)) => Err(TagTimerError::Validation(
                "`start` is required when `end` is given".to_string(),
            )),
        }
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t <= self.end
    }
}

fn local_midnight(date: NaiveDate) -> Result<DateTime<Utc>, TagTimerError> {
    local_to_utc(date.and_time(NaiveTime::MIN))
}

fn local_to_utc(naive: NaiveDateTime) -> Result<DateTime<Utc>, TagTimerError> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|t| t.with_timezone(&Utc))
        .ok_or_else(|| {
            TagTimerError::Validation(format!("`{naive}` does not exist in the local time zone"))
        })
}

/// Parse one range bound.
pub fn parse_bound(raw: &str) -> Result<DateTime<Utc>, TagTimerError> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, LOCAL_INPUT_FORMAT) {
        return local_to_utc(naive);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            TagTimerError::Validation(format!(
                "invalid date `{raw}`: expected YYYY-MM-DDTHH:MM or RFC 3339 ({e})"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn rfc3339_bounds_parse() {
        let range = DateRange::from_query(
            Some("2026-01-01T00:00:00Z"),
            Some("2026-01-31T23:59:59Z"),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(range.start, utc("2026-01-01T00:00:00Z"));
        assert_eq!(range.end, utc("2026-01-31T23:59:59Z"));
        assert!(range.contains(utc("2026-01-15T12:00:00Z")));
        assert!(range.contains(range.start));
        assert!(range.contains(range.end));
        assert!(!range.contains(utc("2026-02-01T00:00:00Z")));
    }

    #[test]
    fn datetime_local_bounds_use_local_zone() {
        let range =
            DateRange::from_query(Some("2026-01-01T08:30"), Some("2026-01-01T09:45"), Utc::now())
                .unwrap();
        let expected_start = Local
            .with_ymd_and_hms(2026, 1, 1, 8, 30, 0)
            .earliest()
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(range.start, expected_start);
        assert_eq!((range.end - range.start).num_minutes(), 75);
    }

    #[test]
    fn missing_bounds_default_to_local_day() {
        let now = utc("2026-03-10T12:00:00Z");
        let range = DateRange::from_query(None, Some("  "), now).unwrap();
        assert!(range.contains(now));
        let span = range.end - range.start;
        // 24h minus one millisecond, give or take a DST shift.
        assert!(span.num_hours() >= 22 && span.num_hours() <= 24);
        assert_eq!(range.start.with_timezone(&Local).time(), NaiveTime::MIN);
    }

    #[test]
    fn single_bound_is_rejected() {
        let err = DateRange::from_query(Some("2026-01-01T00:00"), None, Utc::now()).unwrap_err();
        assert!(matches!(err, TagTimerError::Validation(_)));
        let err = DateRange::from_query(None, Some("2026-01-01T00:00"), Utc::now()).unwrap_err();
        assert!(matches!(err, TagTimerError::Validation(_)));
    }

    #[test]
    fn malformed_bound_is_rejected() {
        let err =
            DateRange::from_query(Some("yesterday"), Some("2026-01-01T00:00"), Utc::now())
                .unwrap_err();
        assert!(err.to_string().contains("yesterday"));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = DateRange::new(utc("2026-02-01T00:00:00Z"), utc("2026-01-01T00:00:00Z"))
            .unwrap_err();
        assert!(matches!(err, TagTimerError::Validation(_)));
    }
}
