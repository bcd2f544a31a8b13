//! Day-boundary arithmetic in the fixed reporting timezone.
//!
//! Stored timestamps are UTC, but every user-facing date (filters, report
//! windows, chart buckets) is a calendar day in São Paulo time. All
//! conversions between the two go through this module.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// The single timezone used for all calendar arithmetic.
pub const REPORTING_TZ: Tz = chrono_tz::America::Sao_Paulo;

/// An inclusive, day-aligned time window `[start, end]` in UTC.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// Builds the window spanning `start..=end` as whole local days.
    #[must_use]
    pub fn days(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: day_start(start),
            end: day_end(end),
        }
    }

    /// Builds the window covering a single local day.
    #[must_use]
    pub fn single_day(date: NaiveDate) -> Self {
        Self::days(date, date)
    }
}

/// 00:00:00.000 local time of `date`, as UTC.
#[must_use]
pub fn day_start(date: NaiveDate) -> DateTime<Utc> {
    to_utc(date.and_time(NaiveTime::MIN))
}

/// 23:59:59.999 local time of `date`, as UTC.
#[must_use]
pub fn day_end(date: NaiveDate) -> DateTime<Utc> {
    let end = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    to_utc(date.and_time(end))
}

/// The local calendar date of a UTC instant.
#[must_use]
pub fn local_date(at: DateTime<Utc>) -> NaiveDate {
    at.with_timezone(&REPORTING_TZ).date_naive()
}

fn to_utc(local: NaiveDateTime) -> DateTime<Utc> {
    match REPORTING_TZ.from_local_datetime(&local) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        // Spring-forward gap: the wall-clock time does not exist locally.
        LocalResult::None => match REPORTING_TZ.from_local_datetime(&(local + Duration::hours(1))) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
            LocalResult::None => Utc.from_utc_datetime(&local),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_bounds_are_utc_shifted() {
        // São Paulo is UTC-3 year round since 2019.
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let start = day_start(date);
        let end = day_end(date);
        assert_eq!(start.to_rfc3339(), "2024-03-10T03:00:00+00:00");
        assert!(end > start);
        assert_eq!(local_date(start), date);
        assert_eq!(local_date(end), date);
    }

    #[test]
    fn range_covers_whole_days() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let range = DateRange::days(start, end);
        assert_eq!(range.start, day_start(start));
        assert_eq!(range.end, day_end(end));
    }
}
