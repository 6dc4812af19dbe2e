//! Validation rules for calendars and their day entries.
//!
//! This is the single owner of all business-rule validation. Boundary layers
//! are expected to do structural decoding only; every format and invariant
//! check lives here so there is exactly one copy of each rule.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::calendar::types::{Calendar, DayEntry, DayType};
use crate::error::{CalendarError, Result};

static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}$").expect("Invalid regex"));

static MONTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(0[1-9]|1[0-2])$").expect("Invalid regex"));

/// Validate a 4-digit year string.
pub fn validate_year(year: &str) -> Result<()> {
    if !YEAR_RE.is_match(year) {
        return Err(CalendarError::InvalidArgument(format!(
            "Year must be 4 digits, got '{year}'"
        ))
        .into());
    }
    Ok(())
}

/// Validate a 2-digit month string (`01`-`12`).
pub fn validate_month(month: &str) -> Result<()> {
    if !MONTH_RE.is_match(month) {
        return Err(CalendarError::InvalidArgument(format!(
            "Month must be 01-12, got '{month}'"
        ))
        .into());
    }
    Ok(())
}

/// Validate a year-month pair.
pub fn validate_year_month(year: &str, month: &str) -> Result<()> {
    validate_year(year)?;
    validate_month(month)
}

/// Validate a region code.
pub fn validate_region(region: &str) -> Result<()> {
    if region.trim().is_empty() {
        return Err(
            CalendarError::InvalidArgument("Region code cannot be empty".to_string()).into(),
        );
    }
    Ok(())
}

/// Number of days in a month. Rejects month numbers outside 1-12.
pub fn days_in_month(year: i32, month: u32) -> Result<u32> {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => Ok(31),
        4 | 6 | 9 | 11 => Ok(30),
        2 => {
            if (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0) {
                Ok(29)
            } else {
                Ok(28)
            }
        }
        _ => Err(CalendarError::InvalidArgument(format!(
            "Month {month} out of range 1-12"
        ))
        .into()),
    }
}

/// Parse validated year/month strings into numeric form.
pub fn parse_year_month(year: &str, month: &str) -> Result<(i32, u32)> {
    validate_year_month(year, month)?;
    let y: i32 = year
        .parse()
        .map_err(|_| CalendarError::InvalidArgument(format!("Year '{year}' is not numeric")))?;
    let m: u32 = month
        .parse()
        .map_err(|_| CalendarError::InvalidArgument(format!("Month '{month}' is not numeric")))?;
    Ok((y, m))
}

/// Validate a single day entry against the month's actual length.
pub fn validate_day_entry(entry: &DayEntry, month_days: u32) -> Result<()> {
    if entry.day < 1 || entry.day > month_days {
        return Err(CalendarError::InvalidArgument(format!(
            "Day {} out of range 1-{month_days}",
            entry.day
        ))
        .into());
    }

    if entry.day_type != DayType::Working && entry.attendance.is_some() {
        return Err(CalendarError::InvalidArgument(format!(
            "Attendance can only be set for working days (day {} is {})",
            entry.day, entry.day_type
        ))
        .into());
    }

    Ok(())
}

/// Strict, all-or-nothing validation of a full calendar.
///
/// Runs before any persistence write: year/month formats, day numbers within
/// the month's actual length, unique day numbers, and the attendance-only-on-
/// working-days invariant. Any violation rejects the whole calendar.
pub fn validate_calendar(calendar: &Calendar) -> Result<()> {
    let (year, month) = parse_year_month(&calendar.year, &calendar.month)?;
    let month_days = days_in_month(year, month)?;

    let mut seen = HashSet::new();
    for entry in &calendar.days {
        validate_day_entry(entry, month_days)?;
        if !seen.insert(entry.day) {
            return Err(CalendarError::InvalidArgument(format!(
                "Duplicate day {} in calendar {}-{}",
                entry.day, calendar.year, calendar.month
            ))
            .into());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::types::Attendance;
    use crate::error::RollcallError;

    fn assert_invalid(result: Result<()>) {
        match result {
            Err(RollcallError::Calendar(CalendarError::InvalidArgument(_))) => {}
            other => panic!("expected InvalidArgument, got {other:?}"),
        }
    }

    #[test]
    fn test_year_format() {
        assert!(validate_year("2025").is_ok());
        assert_invalid(validate_year("25"));
        assert_invalid(validate_year("20251"));
        assert_invalid(validate_year("2a25"));
    }

    #[test]
    fn test_month_format() {
        assert!(validate_month("01").is_ok());
        assert!(validate_month("12").is_ok());
        assert_invalid(validate_month("1"));
        assert_invalid(validate_month("13"));
        assert_invalid(validate_month("00"));
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2025, 1).unwrap(), 31);
        assert_eq!(days_in_month(2025, 2).unwrap(), 28);
        assert_eq!(days_in_month(2024, 2).unwrap(), 29);
        assert_eq!(days_in_month(2100, 2).unwrap(), 28);
        assert_eq!(days_in_month(2000, 2).unwrap(), 29);
        assert_eq!(days_in_month(2025, 4).unwrap(), 30);
    }

    #[test]
    fn test_days_in_month_rejects_out_of_range() {
        assert_invalid(days_in_month(2025, 0).map(|_| ()));
        assert_invalid(days_in_month(2025, 13).map(|_| ()));
    }

    #[test]
    fn test_day_out_of_month_range() {
        // Feb 2025 has 28 days; day 30 is structurally valid but out of range.
        let calendar = Calendar::with_days(
            "2025",
            "02",
            vec![DayEntry::new(30, DayType::Working, None)],
        );
        assert_invalid(validate_calendar(&calendar));
    }

    #[test]
    fn test_duplicate_days_rejected() {
        let calendar = Calendar::with_days(
            "2025",
            "01",
            vec![
                DayEntry::new(1, DayType::Working, None),
                DayEntry::new(1, DayType::Holiday, None),
            ],
        );
        assert_invalid(validate_calendar(&calendar));
    }

    #[test]
    fn test_attendance_on_non_working_day_rejected() {
        let calendar = Calendar::with_days(
            "2025",
            "01",
            vec![DayEntry {
                attendance: Some(Attendance::Office),
                ..DayEntry::new(1, DayType::Holiday, None)
            }],
        );
        assert_invalid(validate_calendar(&calendar));
    }

    #[test]
    fn test_valid_calendar_accepted() {
        let calendar = Calendar::with_days(
            "2025",
            "01",
            vec![
                DayEntry::new(1, DayType::Holiday, None),
                DayEntry::new(2, DayType::Working, Some(Attendance::Office)),
            ],
        );
        assert!(validate_calendar(&calendar).is_ok());
    }

    #[test]
    fn test_region_validation() {
        assert!(validate_region("emea").is_ok());
        assert_invalid(validate_region("  "));
    }
}
