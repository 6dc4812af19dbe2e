//! Base-calendar generation.
//!
//! A generated month classifies each day with a single rule: holiday if the
//! day number is in the supplied holiday list, weekend if the date falls on
//! Saturday or Sunday, working otherwise. Attendance is never pre-filled.

use chrono::{Datelike, NaiveDate, Weekday};
use tracing::debug;

use crate::calendar::types::{Calendar, DayEntry, DayType};
use crate::calendar::validate::{days_in_month, parse_year_month};
use crate::error::{CalendarError, Result};

/// Generate a base calendar for a year-month.
///
/// `holidays` lists day numbers to classify as holidays; anything out of the
/// month's range is ignored. The returned calendar carries template
/// provenance (`base-{year}-{month}`) and the supplied region.
pub fn generate_base_calendar(
    year: &str,
    month: &str,
    region: &str,
    template_version: &str,
    holidays: &[u32],
) -> Result<Calendar> {
    let (y, m) = parse_year_month(year, month)?;
    let month_days = days_in_month(y, m)?;

    let mut days = Vec::with_capacity(month_days as usize);
    for day in 1..=month_days {
        let date = NaiveDate::from_ymd_opt(y, m, day).ok_or_else(|| {
            CalendarError::InvalidArgument(format!("Invalid date {year}-{month}-{day:02}"))
        })?;

        let day_type = if holidays.contains(&day) {
            DayType::Holiday
        } else if is_weekend(date.weekday()) {
            DayType::Weekend
        } else {
            DayType::Working
        };

        days.push(DayEntry::new(day, day_type, None));
    }

    debug!(year, month, days = days.len(), "generated base calendar");

    Ok(Calendar::with_days(year, month, days)
        .with_region(region)
        .with_template(format!("base-{year}-{month}"), template_version))
}

fn is_weekend(weekday: Weekday) -> bool {
    weekday == Weekday::Sat || weekday == Weekday::Sun
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::types::Calendar;

    #[test]
    fn test_february_2025_classification() {
        // Feb 1 2025 is a Saturday, Feb 3 a Monday.
        let calendar =
            generate_base_calendar("2025", "02", Calendar::DEFAULT_REGION, "1.0", &[]).unwrap();

        assert_eq!(calendar.days.len(), 28);
        assert_eq!(calendar.day_entry(1).unwrap().day_type, DayType::Weekend);
        assert_eq!(calendar.day_entry(2).unwrap().day_type, DayType::Weekend);
        assert_eq!(calendar.day_entry(3).unwrap().day_type, DayType::Working);

        for entry in &calendar.days {
            let weekday = NaiveDate::from_ymd_opt(2025, 2, entry.day)
                .unwrap()
                .weekday();
            let expected = if is_weekend(weekday) {
                DayType::Weekend
            } else {
                DayType::Working
            };
            assert_eq!(entry.day_type, expected, "day {}", entry.day);
            assert_eq!(entry.attendance, None);
        }
    }

    #[test]
    fn test_holiday_list_wins_over_weekday() {
        let calendar =
            generate_base_calendar("2025", "02", "default", "1.0", &[3, 14, 99]).unwrap();

        assert_eq!(calendar.day_entry(3).unwrap().day_type, DayType::Holiday);
        assert_eq!(calendar.day_entry(14).unwrap().day_type, DayType::Holiday);
        // Out-of-range holiday numbers are ignored.
        assert!(calendar.day_entry(99).is_none());
    }

    #[test]
    fn test_leap_february() {
        let calendar = generate_base_calendar("2024", "02", "default", "1.0", &[]).unwrap();
        assert_eq!(calendar.days.len(), 29);
    }

    #[test]
    fn test_template_provenance() {
        let calendar = generate_base_calendar("2025", "06", "apac", "2.1", &[]).unwrap();
        assert_eq!(calendar.template_id.as_deref(), Some("base-2025-06"));
        assert_eq!(calendar.template_version, "2.1");
        assert_eq!(calendar.region, "apac");
    }

    #[test]
    fn test_rejects_malformed_month() {
        assert!(generate_base_calendar("2025", "13", "default", "1.0", &[]).is_err());
    }
}
