//! Rollcall: Monthly Attendance Calendar Backend
//!
//! A backend for tracking monthly attendance calendars: one document per
//! year-month, day entries classified as working/holiday/weekend/leave, and
//! optional office/remote attendance on working days, with derived
//! statistics computed on demand.

pub mod calendar;
pub mod config;
pub mod error;
pub mod store;

pub use calendar::{
    generate_base_calendar, Attendance, AttendanceStatus, Calendar, CalendarDefaults,
    CalendarService, CalendarStats, DayEntry, DayStatus, DayType, OverallStats, YearlyStats,
};
pub use config::Config;
pub use error::{CalendarError, ConfigError, Result, RollcallError, StorageError};
pub use store::{CalendarStore, EmbeddedCalendarStore};
