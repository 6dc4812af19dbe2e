//! Core types for monthly attendance calendars.
//!
//! This module defines the calendar aggregate: one document per year-month,
//! broken into day entries classified as working/holiday/weekend/leave, with
//! optional office/remote attendance on working days. All mutations go
//! through the aggregate's own operations so the attendance invariant
//! (attendance only on working days) and the update-tracking fields stay
//! consistent.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

// ============================================================================
// Day Classification Types
// ============================================================================

/// Classification of a calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DayType {
    /// A day eligible to carry attendance.
    Working,
    /// An explicit holiday.
    Holiday,
    /// A Saturday or Sunday.
    Weekend,
    /// A leave day.
    Leave,
}

impl DayType {
    /// Parse from the wire representation (`working`, `holiday`, `weekend`, `leave`).
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "working" => Some(DayType::Working),
            "holiday" => Some(DayType::Holiday),
            "weekend" => Some(DayType::Weekend),
            "leave" => Some(DayType::Leave),
            _ => None,
        }
    }

    /// The wire representation of this day type.
    pub fn as_str(&self) -> &'static str {
        match self {
            DayType::Working => "working",
            DayType::Holiday => "holiday",
            DayType::Weekend => "weekend",
            DayType::Leave => "leave",
        }
    }
}

impl std::fmt::Display for DayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attendance designation for a working day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Attendance {
    /// Worked from the office.
    #[serde(rename = "wfoffice")]
    Office,
    /// Worked from home.
    #[serde(rename = "wfh")]
    Remote,
}

impl Attendance {
    /// Parse from the wire representation (`wfoffice`, `wfh`).
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "wfoffice" => Some(Attendance::Office),
            "wfh" => Some(Attendance::Remote),
            _ => None,
        }
    }

    /// The wire representation of this attendance value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Attendance::Office => "wfoffice",
            Attendance::Remote => "wfh",
        }
    }
}

impl std::fmt::Display for Attendance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Day Entry
// ============================================================================

/// One calendar day's classification and optional attendance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DayEntry {
    /// Day of the month (1-31, bounded by the month's actual length).
    pub day: u32,
    /// Day classification.
    #[serde(rename = "type")]
    pub day_type: DayType,
    /// Attendance value. Invariant: `Some` only when `day_type` is `Working`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendance: Option<Attendance>,
    /// True once any field differs from its template-assigned value.
    #[serde(default)]
    pub is_updated: bool,
    /// Classification assigned at creation, kept for audit comparison.
    pub original_type: DayType,
    /// Attendance assigned at creation, kept for audit comparison.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_attendance: Option<Attendance>,
    /// When this entry was last mutated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    /// Who made the last mutation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    /// Free-form notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl DayEntry {
    /// Create a new day entry, snapshotting the original values.
    pub fn new(day: u32, day_type: DayType, attendance: Option<Attendance>) -> Self {
        Self {
            day,
            day_type,
            attendance,
            is_updated: false,
            original_type: day_type,
            original_attendance: attendance,
            last_updated: None,
            updated_by: None,
            description: None,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set who recorded this entry.
    pub fn with_updated_by(mut self, user: impl Into<String>) -> Self {
        self.updated_by = Some(user.into());
        self
    }
}

// ============================================================================
// Calendar Aggregate
// ============================================================================

/// One year-month attendance record composed of day entries.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Calendar {
    /// Document id, assigned by the store on first save.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// 4-digit year.
    pub year: String,
    /// 2-digit month (`01`-`12`).
    pub month: String,
    /// Day entries, unique by `day`.
    #[serde(default)]
    pub days: Vec<DayEntry>,
    /// Template this calendar was generated from, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    /// Version of the generating template.
    pub template_version: String,
    /// Region partition key.
    pub region: String,
    /// Organization partition key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    /// Set by the store on first save.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Set by the store on every save.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Calendar {
    /// Default region applied when none is given.
    pub const DEFAULT_REGION: &'static str = "default";
    /// Default template version.
    pub const DEFAULT_TEMPLATE_VERSION: &'static str = "1.0";

    /// Create an empty calendar for a year-month.
    pub fn new(year: impl Into<String>, month: impl Into<String>) -> Self {
        Self {
            id: None,
            year: year.into(),
            month: month.into(),
            days: Vec::new(),
            template_id: None,
            template_version: Self::DEFAULT_TEMPLATE_VERSION.to_string(),
            region: Self::DEFAULT_REGION.to_string(),
            organization_id: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Create a calendar with a full day list.
    pub fn with_days(year: impl Into<String>, month: impl Into<String>, days: Vec<DayEntry>) -> Self {
        Self {
            days,
            ..Self::new(year, month)
        }
    }

    /// Set the region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Set the organization.
    pub fn with_organization(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = Some(organization_id.into());
        self
    }

    /// Set template provenance.
    pub fn with_template(
        mut self,
        template_id: impl Into<String>,
        template_version: impl Into<String>,
    ) -> Self {
        self.template_id = Some(template_id.into());
        self.template_version = template_version.into();
        self
    }

    /// The `year-month` key of this calendar.
    pub fn key(&self) -> String {
        format!("{}-{}", self.year, self.month)
    }

    // ========================================================================
    // Day Entry Access and Mutation
    // ========================================================================

    /// Look up the entry for a day of the month.
    pub fn day_entry(&self, day: u32) -> Option<&DayEntry> {
        self.days.iter().find(|d| d.day == day)
    }

    fn day_entry_mut(&mut self, day: u32) -> Option<&mut DayEntry> {
        self.days.iter_mut().find(|d| d.day == day)
    }

    /// Insert a day entry, replacing any existing entry for the same day.
    pub fn add_day_entry(&mut self, entry: DayEntry) {
        self.days.retain(|d| d.day != entry.day);
        debug!(day = entry.day, calendar = %self.key(), "added day entry");
        self.days.push(entry);
    }

    /// Update attendance for a working day.
    ///
    /// Returns `false` when the day is missing or is not a working day.
    /// Passing `None` clears attendance. Setting the value it already holds
    /// is a no-op: no dirty flag, no timestamp churn.
    pub fn update_attendance(&mut self, day: u32, attendance: Option<Attendance>) -> bool {
        let key = self.key();
        let Some(entry) = self.day_entry_mut(day) else {
            warn!(day, calendar = %key, "day not found");
            return false;
        };

        if entry.day_type != DayType::Working {
            warn!(day, calendar = %key, "cannot set attendance for non-working day");
            return false;
        }

        if entry.attendance != attendance {
            entry.attendance = attendance;
            entry.is_updated = true;
            entry.last_updated = Some(Utc::now());
            debug!(day, calendar = %key, ?attendance, "updated attendance");
        }

        true
    }

    /// Update the classification of a day.
    ///
    /// Returns `false` when the day is missing. Changing the type away from
    /// `Working` unconditionally clears attendance; setting the type it
    /// already holds is a no-op.
    pub fn update_day_type(&mut self, day: u32, day_type: DayType) -> bool {
        let key = self.key();
        let Some(entry) = self.day_entry_mut(day) else {
            warn!(day, calendar = %key, "day not found");
            return false;
        };

        if entry.day_type != day_type {
            entry.day_type = day_type;
            entry.is_updated = true;
            entry.last_updated = Some(Utc::now());

            if day_type != DayType::Working {
                entry.attendance = None;
            }

            debug!(day, calendar = %key, %day_type, "updated day type");
        }

        true
    }

    /// Combined type/attendance/description update.
    ///
    /// The type change is applied first; attendance is then applied only if
    /// the resulting type is `Working`. A non-working result clears
    /// attendance regardless of what was requested. The description, when
    /// provided, is always overwritten without dirty-tracking.
    pub fn update_day_status(
        &mut self,
        day: u32,
        day_type: Option<DayType>,
        attendance: Option<Attendance>,
        description: Option<&str>,
    ) -> bool {
        let key = self.key();
        let Some(entry) = self.day_entry_mut(day) else {
            warn!(day, calendar = %key, "day not found");
            return false;
        };

        if let Some(new_type) = day_type {
            if entry.day_type != new_type {
                entry.day_type = new_type;
                entry.is_updated = true;
                entry.last_updated = Some(Utc::now());
            }
        }

        if entry.day_type == DayType::Working {
            if let Some(new_attendance) = attendance {
                if entry.attendance != Some(new_attendance) {
                    entry.attendance = Some(new_attendance);
                    entry.is_updated = true;
                    entry.last_updated = Some(Utc::now());
                }
            }
        } else {
            entry.attendance = None;
        }

        if let Some(description) = description {
            entry.description = Some(description.to_string());
        }

        true
    }

    // ========================================================================
    // Derived Counts
    //
    // All counts are recomputed from `days` on every call. There is no
    // cached aggregate to invalidate.
    // ========================================================================

    /// Number of working days.
    pub fn working_days_count(&self) -> u64 {
        self.count_by_type(DayType::Working)
    }

    /// Number of holidays.
    pub fn holidays_count(&self) -> u64 {
        self.count_by_type(DayType::Holiday)
    }

    /// Number of weekend days.
    pub fn weekends_count(&self) -> u64 {
        self.count_by_type(DayType::Weekend)
    }

    /// Number of leave days.
    pub fn leave_days_count(&self) -> u64 {
        self.count_by_type(DayType::Leave)
    }

    fn count_by_type(&self, day_type: DayType) -> u64 {
        self.days.iter().filter(|d| d.day_type == day_type).count() as u64
    }

    /// Number of days with office attendance.
    pub fn office_attendance_count(&self) -> u64 {
        self.count_by_attendance(Attendance::Office)
    }

    /// Number of days with work-from-home attendance.
    pub fn wfh_attendance_count(&self) -> u64 {
        self.count_by_attendance(Attendance::Remote)
    }

    fn count_by_attendance(&self, attendance: Attendance) -> u64 {
        self.days
            .iter()
            .filter(|d| d.attendance == Some(attendance))
            .count() as u64
    }

    /// Number of days with any attendance recorded.
    pub fn attendance_days_count(&self) -> u64 {
        self.days.iter().filter(|d| d.attendance.is_some()).count() as u64
    }

    /// Number of working days with no attendance recorded.
    pub fn working_days_without_attendance(&self) -> u64 {
        self.days
            .iter()
            .filter(|d| d.day_type == DayType::Working && d.attendance.is_none())
            .count() as u64
    }

    /// Number of days mutated away from their template values.
    pub fn updated_days_count(&self) -> u64 {
        self.days.iter().filter(|d| d.is_updated).count() as u64
    }

    /// Recorded attendance as a share of working days.
    ///
    /// Returns 0.0 when the calendar has no working days.
    pub fn attendance_rate(&self) -> f64 {
        let working = self.working_days_count();
        if working == 0 {
            return 0.0;
        }
        self.attendance_days_count() as f64 / working as f64
    }

    /// Office attendance as a share of *recorded* attendance.
    ///
    /// The denominator is attendance-days, not working days. Returns 0.0
    /// when no attendance is recorded.
    pub fn office_attendance_rate(&self) -> f64 {
        let recorded = self.attendance_days_count();
        if recorded == 0 {
            return 0.0;
        }
        self.office_attendance_count() as f64 / recorded as f64
    }

    /// Work-from-home attendance as a share of *recorded* attendance.
    ///
    /// Returns 0.0 when no attendance is recorded.
    pub fn wfh_attendance_rate(&self) -> f64 {
        let recorded = self.attendance_days_count();
        if recorded == 0 {
            return 0.0;
        }
        self.wfh_attendance_count() as f64 / recorded as f64
    }

    /// Full per-calendar statistics.
    pub fn statistics(&self) -> CalendarStats {
        CalendarStats {
            total_days: self.days.len() as u64,
            working_days: self.working_days_count(),
            holidays: self.holidays_count(),
            weekends: self.weekends_count(),
            leave_days: self.leave_days_count(),
            office_attendance: self.office_attendance_count(),
            wfh_attendance: self.wfh_attendance_count(),
            total_attendance: self.attendance_days_count(),
            working_days_without_attendance: self.working_days_without_attendance(),
            updated_days: self.updated_days_count(),
            attendance_rate: self.attendance_rate(),
            office_attendance_rate: self.office_attendance_rate(),
            wfh_attendance_rate: self.wfh_attendance_rate(),
        }
    }

    /// Status report for a single day.
    pub fn day_status(&self, day: u32) -> Option<DayStatus> {
        let entry = self.day_entry(day)?;

        let attendance = if entry.day_type == DayType::Working {
            match entry.attendance {
                Some(Attendance::Office) => AttendanceStatus::Office,
                Some(Attendance::Remote) => AttendanceStatus::Remote,
                None => AttendanceStatus::NotSet,
            }
        } else {
            AttendanceStatus::NotApplicable
        };

        Some(DayStatus {
            day: entry.day,
            day_type: entry.day_type,
            is_updated: entry.is_updated,
            attendance,
            description: entry.description.clone(),
        })
    }
}

// ============================================================================
// Statistics Types
// ============================================================================

/// Derived statistics for one calendar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CalendarStats {
    /// Total day entries.
    pub total_days: u64,
    /// Working days.
    pub working_days: u64,
    /// Holidays.
    pub holidays: u64,
    /// Weekend days.
    pub weekends: u64,
    /// Leave days.
    pub leave_days: u64,
    /// Days with office attendance.
    pub office_attendance: u64,
    /// Days with work-from-home attendance.
    pub wfh_attendance: u64,
    /// Days with any attendance recorded.
    pub total_attendance: u64,
    /// Working days missing attendance.
    pub working_days_without_attendance: u64,
    /// Days mutated away from their template values.
    pub updated_days: u64,
    /// Attendance-days over working days (0.0 when no working days).
    pub attendance_rate: f64,
    /// Office days over attendance-days (0.0 when none recorded).
    pub office_attendance_rate: f64,
    /// WFH days over attendance-days (0.0 when none recorded).
    pub wfh_attendance_rate: f64,
}

/// Summed statistics across a set of calendars.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OverallStats {
    /// Calendars in the set.
    pub total_calendars: u64,
    /// Working days across the set.
    pub total_working_days: u64,
    /// Holidays across the set.
    pub total_holidays: u64,
    /// Weekend days across the set.
    pub total_weekends: u64,
    /// Office attendance days across the set.
    pub total_office_attendance: u64,
    /// WFH attendance days across the set.
    pub total_wfh_attendance: u64,
}

impl OverallStats {
    /// Sum counts across calendars. Always a fresh scan, never memoized.
    pub fn from_calendars(calendars: &[Calendar]) -> Self {
        Self {
            total_calendars: calendars.len() as u64,
            total_working_days: calendars.iter().map(Calendar::working_days_count).sum(),
            total_holidays: calendars.iter().map(Calendar::holidays_count).sum(),
            total_weekends: calendars.iter().map(Calendar::weekends_count).sum(),
            total_office_attendance: calendars.iter().map(Calendar::office_attendance_count).sum(),
            total_wfh_attendance: calendars.iter().map(Calendar::wfh_attendance_count).sum(),
        }
    }
}

/// Summed statistics for all calendars of one year.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct YearlyStats {
    /// The year the roll-up covers.
    pub year: String,
    /// Totals for that year's calendars.
    #[serde(flatten)]
    pub totals: OverallStats,
}

// ============================================================================
// Day Status Types
// ============================================================================

/// Observed attendance state of one day, as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// Office attendance recorded.
    #[serde(rename = "wfoffice")]
    Office,
    /// Work-from-home attendance recorded.
    #[serde(rename = "wfh")]
    Remote,
    /// Working day without recorded attendance.
    NotSet,
    /// Non-working day; attendance does not apply.
    NotApplicable,
}

/// Status report for one day of a calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DayStatus {
    /// Day of the month.
    pub day: u32,
    /// Day classification.
    #[serde(rename = "type")]
    pub day_type: DayType,
    /// Whether the day was mutated away from its template values.
    pub is_updated: bool,
    /// Observed attendance state.
    pub attendance: AttendanceStatus,
    /// Free-form notes, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ============================================================================
// Tests
// ============================================================================
