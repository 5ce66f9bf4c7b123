//! Calendar utility.
//!
//! Calendar dates are [`NaiveDate`] values and serialize as `YYYY-MM-DD`,
//! which sorts lexicographically in calendar order. Day arithmetic and weekday
//! extraction only ever look at the naive date. A timezone is consulted in
//! exactly one place: turning the current instant into "today".

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::error::ValidationError;

/// Zone used when neither the config nor the environment names a valid one.
pub const FALLBACK_ZONE: Tz = chrono_tz::UTC;

/// Canonical textual form of a calendar date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Resolve the reference timezone.
///
/// Order: the configured name, then the `TZ` environment variable, then
/// [`FALLBACK_ZONE`]. Blank or unknown names are skipped.
pub fn resolve_zone(configured: Option<&str>) -> Tz {
    if let Some(name) = configured.map(str::trim).filter(|n| !n.is_empty()) {
        match name.parse::<Tz>() {
            Ok(tz) => return tz,
            Err(_) => tracing::warn!(zone = name, "unknown configured timezone, ignoring"),
        }
    }
    if let Ok(name) = std::env::var("TZ") {
        let name = name.trim().trim_start_matches(':');
        if let Ok(tz) = name.parse::<Tz>() {
            return tz;
        }
    }
    FALLBACK_ZONE
}

/// Calendar date of `now` in `zone`.
pub fn today_in(zone: Tz, now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&zone).date_naive()
}

/// The date `delta` whole days after (or before, when negative) `date`.
///
/// Pure calendar arithmetic: daylight-saving transitions cannot shift the
/// result. Saturates at the representable range.
pub fn add_days(date: NaiveDate, delta: i64) -> NaiveDate {
    let days = Days::new(delta.unsigned_abs());
    let shifted = if delta >= 0 {
        date.checked_add_days(days)
    } else {
        date.checked_sub_days(days)
    };
    shifted.unwrap_or(if delta >= 0 {
        NaiveDate::MAX
    } else {
        NaiveDate::MIN
    })
}

/// Weekday of `date`, 0 = Sunday .. 6 = Saturday.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// Every date of the month containing `date`, 1st through last, in order.
pub fn month_range(date: NaiveDate) -> Vec<NaiveDate> {
    let Some(first) = date.with_day(1) else {
        return Vec::new();
    };
    let month = first.month();
    first
        .iter_days()
        .take_while(|d| d.month() == month)
        .collect()
}

/// Start of the week containing `date`.
///
/// `week_start` is the first day of the week, 0 = Sunday .. 6 = Saturday;
/// larger values wrap.
pub fn start_of_week(date: NaiveDate, week_start: u8) -> NaiveDate {
    let offset = (weekday_index(date) + 7 - week_start % 7) % 7;
    add_days(date, -i64::from(offset))
}

/// The seven dates of the week containing `date`.
pub fn week_range(date: NaiveDate, week_start: u8) -> Vec<NaiveDate> {
    let start = start_of_week(date, week_start);
    (0..7).map(|i| add_days(start, i)).collect()
}

/// Parse a strict `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(s.to_string()))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Reference zone plus first day of week.
///
/// Cheap to copy; build one from [`Config::calendar`](crate::Config::calendar)
/// at startup and pass it to whatever needs "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    zone: Tz,
    week_start: u8,
}

impl Calendar {
    pub fn new(zone: Tz, week_start: u8) -> Self {
        Self {
            zone,
            week_start: week_start % 7,
        }
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    pub fn week_start(&self) -> u8 {
        self.week_start
    }

    /// Today's date in the reference zone.
    pub fn today(&self) -> NaiveDate {
        self.today_at(Utc::now())
    }

    /// The date of `now` in the reference zone.
    pub fn today_at(&self, now: DateTime<Utc>) -> NaiveDate {
        today_in(self.zone, now)
    }

    pub fn start_of_week(&self, date: NaiveDate) -> NaiveDate {
        start_of_week(date, self.week_start)
    }

    pub fn week_range(&self, date: NaiveDate) -> Vec<NaiveDate> {
        week_range(date, self.week_start)
    }
}

impl Default for Calendar {
    fn default() -> Self {
        Self::new(FALLBACK_ZONE, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn month_range_leap_february() {
        let days = month_range(d("2024-02-10"));
        assert_eq!(days.len(), 29);
        assert_eq!(days.first().copied(), Some(d("2024-02-01")));
        assert_eq!(days.last().copied(), Some(d("2024-02-29")));
    }

    #[test]
    fn month_range_lengths() {
        assert_eq!(month_range(d("2023-02-28")).len(), 28);
        assert_eq!(month_range(d("2024-04-30")).len(), 30);
        assert_eq!(month_range(d("2024-12-01")).len(), 31);
    }

    #[test]
    fn add_days_crosses_month_and_year() {
        assert_eq!(add_days(d("2024-01-01"), -1), d("2023-12-31"));
        assert_eq!(add_days(d("2024-02-28"), 1), d("2024-02-29"));
        assert_eq!(add_days(d("2024-03-01"), -1), d("2024-02-29"));
        assert_eq!(add_days(d("2024-01-05"), 0), d("2024-01-05"));
    }

    #[test]
    fn add_days_ignores_dst_transitions() {
        // US spring-forward and fall-back weekends.
        assert_eq!(add_days(d("2024-03-09"), 1), d("2024-03-10"));
        assert_eq!(add_days(d("2024-03-10"), 1), d("2024-03-11"));
        assert_eq!(add_days(d("2024-11-04"), -1), d("2024-11-03"));
    }

    #[test]
    fn add_days_saturates() {
        assert_eq!(add_days(NaiveDate::MIN, -1), NaiveDate::MIN);
        assert_eq!(add_days(NaiveDate::MAX, 1), NaiveDate::MAX);
    }

    #[test]
    fn weekday_index_sunday_is_zero() {
        assert_eq!(weekday_index(d("2024-01-07")), 0);
        assert_eq!(weekday_index(d("2024-01-08")), 1);
        assert_eq!(weekday_index(d("2024-01-06")), 6);
    }

    #[test]
    fn start_of_week_respects_first_day() {
        // Wednesday 2024-01-10
        assert_eq!(start_of_week(d("2024-01-10"), 0), d("2024-01-07"));
        assert_eq!(start_of_week(d("2024-01-10"), 1), d("2024-01-08"));
        assert_eq!(start_of_week(d("2024-01-10"), 3), d("2024-01-10"));
        assert_eq!(start_of_week(d("2024-01-10"), 4), d("2024-01-04"));
        assert_eq!(start_of_week(d("2024-01-10"), 8), d("2024-01-08"));
    }

    #[test]
    fn week_range_is_seven_consecutive_days() {
        let week = week_range(d("2024-02-29"), 1);
        assert_eq!(week.len(), 7);
        assert_eq!(week[0], d("2024-02-26"));
        assert_eq!(week[6], d("2024-03-03"));
    }

    #[test]
    fn today_in_negative_offset_zone() {
        // 03:00 UTC on Jan 2 is still Jan 1 on the US west coast.
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 0, 0).unwrap();
        assert_eq!(today_in(chrono_tz::America::Los_Angeles, now), d("2024-01-01"));
        assert_eq!(today_in(chrono_tz::UTC, now), d("2024-01-02"));
        assert_eq!(today_in(chrono_tz::Asia::Tokyo, now), d("2024-01-02"));
    }

    #[test]
    fn day_arithmetic_stays_in_zone_west_of_utc() {
        let cal = Calendar::new(chrono_tz::America::Los_Angeles, 0);
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 7, 30, 0).unwrap();
        let today = cal.today_at(now);
        assert_eq!(today, d("2024-03-09"));
        assert_eq!(add_days(today, -1), d("2024-03-08"));
        assert_eq!(add_days(today, 1), d("2024-03-10"));
    }

    #[test]
    fn resolve_zone_prefers_configured_name() {
        assert_eq!(
            resolve_zone(Some("America/New_York")),
            chrono_tz::America::New_York
        );
    }

    #[test]
    fn parse_date_rejects_garbage() {
        assert!(parse_date("2024-13-01").is_err());
        assert!(parse_date("yesterday").is_err());
        assert_eq!(format_date(d("2024-03-05")), "2024-03-05");
    }

    #[test]
    fn date_strings_sort_like_dates() {
        let mut dates = vec![d("2024-10-01"), d("2023-12-31"), d("2024-02-01")];
        let mut strings: Vec<String> = dates.iter().copied().map(format_date).collect();
        dates.sort();
        strings.sort();
        assert_eq!(strings, dates.into_iter().map(format_date).collect::<Vec<_>>());
    }
}
