//! Monthly attendance calendars.
//!
//! This module is the domain core of rollcall:
//!
//! - **Types**: the [`Calendar`] aggregate and its [`DayEntry`] items, with
//!   invariant-preserving mutation operations and on-demand statistics
//! - **Template**: base-month generation classifying each date as
//!   holiday/weekend/working
//! - **Validation**: the single owner of format and invariant checks
//! - **Service**: lifecycle orchestration over a [`crate::store::CalendarStore`]
//!
//! # Usage
//!
//! ```ignore
//! use rollcall::{Attendance, CalendarService, DayType, EmbeddedCalendarStore};
//! use std::sync::Arc;
//! use tokio::sync::RwLock;
//!
//! let store = Arc::new(RwLock::new(EmbeddedCalendarStore::new()));
//! let service = CalendarService::new(store);
//!
//! // Generate February 2025 and record attendance for Monday the 3rd.
//! let calendar = service.get_or_create_calendar("2025", "02").await?;
//! service.update_attendance("2025", "02", 3, Some(Attendance::Office)).await?;
//!
//! // Mark a leave day and pull the month's statistics.
//! service.update_day_type("2025", "02", 4, DayType::Leave).await?;
//! let stats = service.calendar_statistics("2025", "02").await?;
//! ```

pub mod service;
pub mod template;
pub mod types;
pub mod validate;

pub use service::{CalendarDefaults, CalendarService};
pub use template::generate_base_calendar;
pub use types::{
    Attendance, AttendanceStatus, Calendar, CalendarStats, DayEntry, DayStatus, DayType,
    OverallStats, YearlyStats,
};
