//! Calendar bucketing for the reporting charts.
//!
//! A period selector expands into an ordered sequence of labeled,
//! day-aligned sub-ranges of the current week/month/year. `Today` expands
//! to no buckets at all: callers report over their own single window
//! instead of a per-bucket chart.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    EngineError,
    tz::{self, DateRange},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Today,
    Week,
    Month,
    Year,
}

impl Period {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

impl TryFrom<&str> for Period {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "today" => Ok(Self::Today),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            other => Err(EngineError::InvalidValue(format!(
                "invalid period: {other}"
            ))),
        }
    }
}

/// One labeled chart bucket.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeriodBucket {
    pub label: String,
    pub range: DateRange,
}

const WEEK_LABELS: [&str; 7] = [
    "Domingo", "Segunda", "Terça", "Quarta", "Quinta", "Sexta", "Sábado",
];

const MONTH_LABELS: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

/// Expands a period selector into its ordered bucket sequence, relative to
/// `now` in the reporting timezone.
#[must_use]
pub fn buckets(period: Period, now: DateTime<Utc>) -> Vec<PeriodBucket> {
    let today = tz::local_date(now);
    match period {
        Period::Today => Vec::new(),
        Period::Week => week_buckets(today),
        Period::Month => month_buckets(today),
        Period::Year => year_buckets(today),
    }
}

/// Seven one-day buckets, Sunday through Saturday, for the Sunday-aligned
/// week containing `today`.
fn week_buckets(today: NaiveDate) -> Vec<PeriodBucket> {
    let sunday = today - Duration::days(i64::from(today.weekday().num_days_from_sunday()));
    (0..7)
        .map(|offset| {
            let day = sunday + Duration::days(offset);
            PeriodBucket {
                label: WEEK_LABELS[offset as usize].to_string(),
                range: DateRange::single_day(day),
            }
        })
        .collect()
}

/// Consecutive chunks of the current month. Each chunk closes at the next
/// Sunday or at the month's last day, whichever comes first; generation
/// continues until the month is exhausted.
fn month_buckets(today: NaiveDate) -> Vec<PeriodBucket> {
    let last = month_end(today.year(), today.month());
    let mut cursor = month_start(today.year(), today.month());

    let mut buckets = Vec::new();
    while cursor <= last {
        let days_until_sunday = 7 - i64::from(cursor.weekday().number_from_monday());
        let chunk_end = (cursor + Duration::days(days_until_sunday)).min(last);
        buckets.push(PeriodBucket {
            label: format!("Semana {}", buckets.len() + 1),
            range: DateRange::days(cursor, chunk_end),
        });
        cursor = chunk_end + Duration::days(1);
    }
    buckets
}

/// Twelve buckets, one per calendar month of the current year.
fn year_buckets(today: NaiveDate) -> Vec<PeriodBucket> {
    (0..12usize)
        .map(|index| {
            let month = index as u32 + 1;
            PeriodBucket {
                label: MONTH_LABELS[index].to_string(),
                range: DateRange::days(
                    month_start(today.year(), month),
                    month_end(today.year(), month),
                ),
            }
        })
        .collect()
}

fn month_start(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or_default()
}

fn month_end(year: i32, month: u32) -> NaiveDate {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    month_start(next_year, next_month) - Duration::days(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn noon(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        let date = NaiveDate::from_ymd_opt(year, month, day).unwrap();
        tz::day_start(date) + Duration::hours(12)
    }

    /// Asserts the ranges tile `[first, last]` with no gaps or overlaps.
    fn assert_contiguous(buckets: &[PeriodBucket], first: NaiveDate, last: NaiveDate) {
        assert_eq!(tz::local_date(buckets[0].range.start), first);
        assert_eq!(
            tz::local_date(buckets[buckets.len() - 1].range.end),
            last
        );
        for pair in buckets.windows(2) {
            let end = tz::local_date(pair[0].range.end);
            let next_start = tz::local_date(pair[1].range.start);
            assert_eq!(next_start, end + Duration::days(1));
        }
    }

    #[test]
    fn today_yields_no_buckets() {
        assert!(buckets(Period::Today, noon(2024, 3, 10)).is_empty());
    }

    #[test]
    fn week_is_sunday_through_saturday() {
        // 2024-03-13 is a Wednesday; its week runs Mar 10 (Sun) - Mar 16 (Sat).
        let week = buckets(Period::Week, noon(2024, 3, 13));
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].label, "Domingo");
        assert_eq!(week[6].label, "Sábado");
        assert_eq!(
            tz::local_date(week[0].range.start),
            NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
        );
        assert_eq!(
            tz::local_date(week[6].range.end),
            NaiveDate::from_ymd_opt(2024, 3, 16).unwrap()
        );
    }

    #[test]
    fn week_on_a_sunday_starts_today() {
        let week = buckets(Period::Week, noon(2024, 3, 10));
        assert_eq!(
            tz::local_date(week[0].range.start),
            NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
        );
    }

    #[test]
    fn month_chunks_close_on_sundays() {
        // January 2025 starts on a Wednesday and has 31 days.
        let month = buckets(Period::Month, noon(2025, 1, 15));
        assert_eq!(month.len(), 5);
        assert_eq!(month[0].label, "Semana 1");
        assert_eq!(month[4].label, "Semana 5");
        assert_contiguous(
            &month,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
        );
        // First chunk closes on the first Sunday, Jan 5.
        assert_eq!(
            tz::local_date(month[0].range.end),
            NaiveDate::from_ymd_opt(2025, 1, 5).unwrap()
        );
        assert_eq!(
            tz::local_date(month[0].range.start).weekday(),
            Weekday::Wed
        );
    }

    #[test]
    fn month_starting_on_sunday_still_covers_every_day() {
        // June 2025 starts on a Sunday; the first chunk is that single day
        // and the tail of the month must not be dropped.
        let month = buckets(Period::Month, noon(2025, 6, 10));
        assert_contiguous(
            &month,
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
        );
        assert_eq!(
            tz::local_date(month[0].range.end),
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
        );
    }

    #[test]
    fn february_leap_year_is_covered() {
        let month = buckets(Period::Month, noon(2024, 2, 10));
        assert_contiguous(
            &month,
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
        );
    }

    #[test]
    fn year_partitions_into_twelve_months() {
        let year = buckets(Period::Year, noon(2024, 7, 4));
        assert_eq!(year.len(), 12);
        assert_eq!(year[0].label, "Janeiro");
        assert_eq!(year[11].label, "Dezembro");
        assert_contiguous(
            &year,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        );
        // Leap February.
        assert_eq!(
            tz::local_date(year[1].range.end),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }
}
