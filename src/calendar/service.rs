//! Calendar service: lifecycle orchestration over a calendar store.
//!
//! The service is the write path for everything calendar-shaped: it
//! validates input before any store call, loads or generates the aggregate,
//! delegates the mutation to the aggregate's own operations, and persists
//! the result. Statistics roll-ups are always fresh scans over the matching
//! calendars. Processing is stateless per call; concurrent writers to the
//! same year-month are last-write-wins.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::calendar::template::generate_base_calendar;
use crate::calendar::types::{
    Attendance, Calendar, CalendarStats, DayEntry, DayStatus, DayType, OverallStats, YearlyStats,
};
use crate::calendar::validate;
use crate::config::Config;
use crate::error::{CalendarError, Result};
use crate::store::{CalendarStore, EmbeddedCalendarStore};

// ============================================================================
// Calendar Service
// ============================================================================

/// Construction-time defaults applied when a calendar is generated.
#[derive(Debug, Clone)]
pub struct CalendarDefaults {
    /// Region applied to generated calendars.
    pub region: String,
    /// Template version stamped on generated calendars.
    pub template_version: String,
}

impl Default for CalendarDefaults {
    fn default() -> Self {
        Self {
            region: Calendar::DEFAULT_REGION.to_string(),
            template_version: Calendar::DEFAULT_TEMPLATE_VERSION.to_string(),
        }
    }
}

/// Service for calendar lifecycle, mutation, and statistics.
pub struct CalendarService<S: CalendarStore> {
    /// The underlying calendar store.
    store: Arc<RwLock<S>>,
    defaults: CalendarDefaults,
}

impl CalendarService<EmbeddedCalendarStore> {
    /// Build a service with an embedded store configured from `config`.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let store = match config.storage.data_dir() {
            Some(dir) => EmbeddedCalendarStore::with_persistence(&dir).await?,
            None => EmbeddedCalendarStore::new(),
        };

        Ok(Self::new(Arc::new(RwLock::new(store))).with_defaults(CalendarDefaults {
            region: config.calendar.default_region.clone(),
            template_version: config.calendar.template_version.clone(),
        }))
    }
}

impl<S: CalendarStore> CalendarService<S> {
    /// Create a new service over the given store.
    pub fn new(store: Arc<RwLock<S>>) -> Self {
        Self {
            store,
            defaults: CalendarDefaults::default(),
        }
    }

    /// Set the defaults applied to generated calendars.
    pub fn with_defaults(mut self, defaults: CalendarDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    // ========================================================================
    // Calendar Access with Auto-Generation
    // ========================================================================

    /// Load the calendar for a year-month, generating and persisting a base
    /// calendar when none exists.
    pub async fn get_or_create_calendar(&self, year: &str, month: &str) -> Result<Calendar> {
        self.get_or_create(year, month, None).await
    }

    /// Like [`get_or_create_calendar`](Self::get_or_create_calendar), but a
    /// newly generated calendar carries the given region.
    ///
    /// An existing calendar is returned as-is even when its region differs
    /// from the requested one; there is no region fork.
    pub async fn get_or_create_calendar_in_region(
        &self,
        year: &str,
        month: &str,
        region: &str,
    ) -> Result<Calendar> {
        validate::validate_region(region)?;
        self.get_or_create(year, month, Some(region)).await
    }

    async fn get_or_create(
        &self,
        year: &str,
        month: &str,
        region: Option<&str>,
    ) -> Result<Calendar> {
        validate::validate_year_month(year, month)?;
        debug!(year, month, "getting or creating calendar");

        let store = self.store.read().await;
        if let Some(existing) = store.find_one(year, month).await? {
            return Ok(existing);
        }

        let base = generate_base_calendar(
            year,
            month,
            region.unwrap_or(&self.defaults.region),
            &self.defaults.template_version,
            &[],
        )?;
        let saved = store.save(base).await?;
        info!(year, month, "created new calendar");
        Ok(saved)
    }

    // ========================================================================
    // Create / Generate
    // ========================================================================

    /// Create a calendar from a caller-supplied day list.
    ///
    /// Fails with [`CalendarError::Conflict`] when a calendar already exists
    /// for the year-month; the existing document is never overwritten.
    pub async fn create_calendar(&self, calendar: Calendar) -> Result<Calendar> {
        debug!(year = %calendar.year, month = %calendar.month, "creating calendar");
        validate::validate_calendar(&calendar)?;

        let store = self.store.read().await;
        if store.exists(&calendar.year, &calendar.month).await? {
            return Err(CalendarError::Conflict {
                year: calendar.year,
                month: calendar.month,
            }
            .into());
        }

        store.save(calendar).await
    }

    /// Generate a calendar from the template rule and persist it.
    ///
    /// Day numbers in `holidays` are promoted to holiday after base
    /// generation; days that are already holidays are left alone, and nothing
    /// is ever demoted.
    pub async fn generate_calendar(
        &self,
        year: &str,
        month: &str,
        holidays: &[u32],
    ) -> Result<Calendar> {
        debug!(year, month, ?holidays, "generating calendar");
        validate::validate_year_month(year, month)?;

        let store = self.store.read().await;
        if store.exists(year, month).await? {
            return Err(CalendarError::Conflict {
                year: year.to_string(),
                month: month.to_string(),
            }
            .into());
        }

        let mut calendar = generate_base_calendar(
            year,
            month,
            &self.defaults.region,
            &self.defaults.template_version,
            &[],
        )?;

        for &day in holidays {
            if let Some(entry) = calendar.day_entry(day) {
                if entry.day_type != DayType::Holiday {
                    calendar.update_day_type(day, DayType::Holiday);
                }
            }
        }

        store.save(calendar).await
    }

    // ========================================================================
    // Update / Delete
    // ========================================================================

    /// Replace the day list, region, and organization of an existing
    /// calendar.
    ///
    /// Fails with [`CalendarError::NotFound`] when no calendar exists for the
    /// year-month; creation goes through `create_calendar` or the
    /// get-or-create path, never through update.
    pub async fn update_calendar(
        &self,
        year: &str,
        month: &str,
        calendar: Calendar,
    ) -> Result<Calendar> {
        debug!(year, month, "updating calendar");
        validate::validate_year_month(year, month)?;

        // The replacement body must target the same month it will be stored
        // under, otherwise its days would be validated against the wrong
        // month length.
        if calendar.year != year || calendar.month != month {
            return Err(CalendarError::InvalidArgument(format!(
                "Calendar body is for {}-{}, expected {year}-{month}",
                calendar.year, calendar.month
            ))
            .into());
        }
        validate::validate_calendar(&calendar)?;

        let store = self.store.read().await;
        let mut existing = store
            .find_one(year, month)
            .await?
            .ok_or_else(|| not_found(year, month))?;

        existing.days = calendar.days;
        existing.region = calendar.region;
        existing.organization_id = calendar.organization_id;

        store.save(existing).await
    }

    /// Delete the calendar for a year-month.
    pub async fn delete_calendar(&self, year: &str, month: &str) -> Result<()> {
        debug!(year, month, "deleting calendar");
        validate::validate_year_month(year, month)?;

        let store = self.store.read().await;
        if !store.delete_one(year, month).await? {
            return Err(not_found(year, month).into());
        }

        info!(year, month, "deleted calendar");
        Ok(())
    }

    // ========================================================================
    // Day Mutations
    // ========================================================================

    /// Combined type/attendance/description update for one day.
    pub async fn update_day_status(
        &self,
        year: &str,
        month: &str,
        day: u32,
        day_type: Option<DayType>,
        attendance: Option<Attendance>,
        description: Option<&str>,
    ) -> Result<Calendar> {
        debug!(year, month, day, ?day_type, ?attendance, "updating day status");

        // Reject contradictory requests before touching the aggregate.
        if let Some(requested) = day_type {
            if requested != DayType::Working && attendance.is_some() {
                return Err(CalendarError::InvalidArgument(
                    "Attendance can only be set for working days".to_string(),
                )
                .into());
            }
        }

        let mut calendar = self.get_or_create_calendar(year, month).await?;
        if !calendar.update_day_status(day, day_type, attendance, description) {
            return Err(day_not_found(year, month, day).into());
        }

        self.store.read().await.save(calendar).await
    }

    /// Update attendance for a working day. `None` clears attendance.
    pub async fn update_attendance(
        &self,
        year: &str,
        month: &str,
        day: u32,
        attendance: Option<Attendance>,
    ) -> Result<Calendar> {
        debug!(year, month, day, ?attendance, "updating attendance");

        let mut calendar = self.get_or_create_calendar(year, month).await?;
        if !calendar.update_attendance(day, attendance) {
            // The aggregate refuses both missing days and non-working days;
            // report which one it was.
            return Err(match calendar.day_entry(day) {
                None => day_not_found(year, month, day).into(),
                Some(_) => CalendarError::InvalidArgument(format!(
                    "Cannot set attendance for non-working day {day}"
                ))
                .into(),
            });
        }

        self.store.read().await.save(calendar).await
    }

    /// Clear attendance for a day without deleting the entry.
    pub async fn clear_attendance(&self, year: &str, month: &str, day: u32) -> Result<Calendar> {
        self.update_attendance(year, month, day, None).await
    }

    /// Update the classification of a day.
    pub async fn update_day_type(
        &self,
        year: &str,
        month: &str,
        day: u32,
        day_type: DayType,
    ) -> Result<Calendar> {
        debug!(year, month, day, %day_type, "updating day type");

        let mut calendar = self.get_or_create_calendar(year, month).await?;
        if !calendar.update_day_type(day, day_type) {
            return Err(day_not_found(year, month, day).into());
        }

        self.store.read().await.save(calendar).await
    }

    /// Insert or replace a single day entry.
    pub async fn add_day_entry(
        &self,
        year: &str,
        month: &str,
        entry: DayEntry,
    ) -> Result<Calendar> {
        debug!(year, month, day = entry.day, "adding day entry");

        let (y, m) = validate::parse_year_month(year, month)?;
        validate::validate_day_entry(&entry, validate::days_in_month(y, m)?)?;

        let mut calendar = self.get_or_create_calendar(year, month).await?;
        calendar.add_day_entry(entry);

        self.store.read().await.save(calendar).await
    }

    // ========================================================================
    // Bulk Operations
    //
    // Bulk updates are per-item tolerant: an invalid value for one day is
    // logged and skipped, the rest of the batch still applies, and the saved
    // calendar is returned as a whole.
    // ========================================================================

    /// Bulk-update attendance, one entry per day. `None` clears a day's
    /// attendance; unparseable values and non-working targets are skipped.
    pub async fn bulk_update_attendance(
        &self,
        year: &str,
        month: &str,
        updates: &BTreeMap<u32, Option<String>>,
    ) -> Result<Calendar> {
        debug!(year, month, entries = updates.len(), "bulk updating attendance");

        if updates.is_empty() {
            return Err(
                CalendarError::InvalidArgument("Attendance map cannot be empty".to_string())
                    .into(),
            );
        }

        let mut calendar = self.get_or_create_calendar(year, month).await?;

        for (&day, value) in updates {
            let attendance = match value.as_deref() {
                None => None,
                Some(raw) => match Attendance::parse(raw) {
                    Some(parsed) => Some(parsed),
                    None => {
                        warn!(day, value = raw, "invalid attendance value, skipping");
                        continue;
                    }
                },
            };

            calendar.update_attendance(day, attendance);
        }

        self.store.read().await.save(calendar).await
    }

    /// Bulk-update day classifications, one entry per day; unparseable
    /// values and missing days are skipped.
    pub async fn bulk_update_day_types(
        &self,
        year: &str,
        month: &str,
        updates: &BTreeMap<u32, String>,
    ) -> Result<Calendar> {
        debug!(year, month, entries = updates.len(), "bulk updating day types");

        if updates.is_empty() {
            return Err(
                CalendarError::InvalidArgument("Day type map cannot be empty".to_string()).into(),
            );
        }

        let mut calendar = self.get_or_create_calendar(year, month).await?;

        for (&day, value) in updates {
            let Some(day_type) = DayType::parse(value) else {
                warn!(day, value = %value, "invalid day type, skipping");
                continue;
            };

            calendar.update_day_type(day, day_type);
        }

        self.store.read().await.save(calendar).await
    }

    // ========================================================================
    // Read-Only Operations
    // ========================================================================

    /// Load a calendar without auto-creation.
    pub async fn get_calendar(&self, year: &str, month: &str) -> Result<Option<Calendar>> {
        validate::validate_year_month(year, month)?;
        self.store.read().await.find_one(year, month).await
    }

    /// All calendars, ordered by (year, month).
    pub async fn all_calendars(&self) -> Result<Vec<Calendar>> {
        self.store.read().await.find_all().await
    }

    /// Status report for a single day.
    pub async fn day_status(&self, year: &str, month: &str, day: u32) -> Result<DayStatus> {
        let calendar = self.get_or_create_calendar(year, month).await?;
        calendar
            .day_status(day)
            .ok_or_else(|| day_not_found(year, month, day).into())
    }

    // ========================================================================
    // Statistics
    //
    // Roll-ups are fresh scans over the matching calendars on every call.
    // ========================================================================

    /// Derived statistics for one calendar.
    pub async fn calendar_statistics(&self, year: &str, month: &str) -> Result<CalendarStats> {
        debug!(year, month, "calculating statistics");
        let calendar = self.get_or_create_calendar(year, month).await?;
        Ok(calendar.statistics())
    }

    /// Summed statistics across every stored calendar.
    pub async fn overall_statistics(&self) -> Result<OverallStats> {
        debug!("calculating overall statistics");
        let calendars = self.store.read().await.find_all().await?;
        Ok(OverallStats::from_calendars(&calendars))
    }

    /// Summed statistics across one year's calendars.
    pub async fn yearly_statistics(&self, year: &str) -> Result<YearlyStats> {
        debug!(year, "calculating yearly statistics");
        validate::validate_year(year)?;
        let calendars = self.store.read().await.find_by_year(year).await?;
        Ok(YearlyStats {
            year: year.to_string(),
            totals: OverallStats::from_calendars(&calendars),
        })
    }

    // ========================================================================
    // Query Pass-Throughs
    // ========================================================================

    /// Calendars for one year.
    pub async fn calendars_by_year(&self, year: &str) -> Result<Vec<Calendar>> {
        validate::validate_year(year)?;
        self.store.read().await.find_by_year(year).await
    }

    /// Calendars containing at least one holiday.
    pub async fn calendars_with_holidays(&self) -> Result<Vec<Calendar>> {
        self.store.read().await.find_with_day_type(DayType::Holiday).await
    }

    /// Calendars containing at least one weekend day.
    pub async fn calendars_with_weekends(&self) -> Result<Vec<Calendar>> {
        self.store.read().await.find_with_day_type(DayType::Weekend).await
    }

    /// Calendars containing at least one working day.
    pub async fn calendars_with_working_days(&self) -> Result<Vec<Calendar>> {
        self.store.read().await.find_with_day_type(DayType::Working).await
    }

    /// Calendars with any attendance recorded.
    pub async fn calendars_with_attendance(&self) -> Result<Vec<Calendar>> {
        self.store.read().await.find_with_any_attendance().await
    }

    /// Calendars with at least one office day.
    pub async fn calendars_with_office_attendance(&self) -> Result<Vec<Calendar>> {
        self.store
            .read()
            .await
            .find_with_attendance_value(Attendance::Office)
            .await
    }

    /// Calendars with at least one work-from-home day.
    pub async fn calendars_with_wfh_attendance(&self) -> Result<Vec<Calendar>> {
        self.store
            .read()
            .await
            .find_with_attendance_value(Attendance::Remote)
            .await
    }

    /// Calendars containing both office and work-from-home days.
    pub async fn calendars_with_mixed_attendance(&self) -> Result<Vec<Calendar>> {
        self.store.read().await.find_with_mixed_attendance().await
    }

    /// Calendars with at least one working day missing attendance.
    pub async fn calendars_with_incomplete_attendance(&self) -> Result<Vec<Calendar>> {
        self.store.read().await.find_with_incomplete_attendance().await
    }

    /// Calendars where every working day has attendance recorded.
    pub async fn calendars_with_full_attendance(&self) -> Result<Vec<Calendar>> {
        self.store.read().await.find_with_full_attendance().await
    }

    /// Calendars within an inclusive (year, month) range.
    pub async fn calendars_by_date_range(
        &self,
        start_year: &str,
        start_month: &str,
        end_year: &str,
        end_month: &str,
    ) -> Result<Vec<Calendar>> {
        validate::validate_year_month(start_year, start_month)?;
        validate::validate_year_month(end_year, end_month)?;
        self.store
            .read()
            .await
            .find_by_date_range(start_year, start_month, end_year, end_month)
            .await
    }

    // ========================================================================
    // Utilities
    // ========================================================================

    /// Whether a calendar exists for a year-month.
    pub async fn calendar_exists(&self, year: &str, month: &str) -> Result<bool> {
        validate::validate_year_month(year, month)?;
        self.store.read().await.exists(year, month).await
    }

    /// Total number of stored calendars.
    pub async fn total_calendars_count(&self) -> Result<u64> {
        self.store.read().await.count().await
    }

    /// Number of calendars for one year.
    pub async fn calendar_count_by_year(&self, year: &str) -> Result<u64> {
        validate::validate_year(year)?;
        self.store.read().await.count_by_year(year).await
    }

    /// Distinct years present in the store, sorted.
    pub async fn distinct_years(&self) -> Result<Vec<String>> {
        self.store.read().await.distinct_years().await
    }

    /// Number of calendars containing at least one day of the given type.
    pub async fn calendars_containing_day_type(&self, day_type: DayType) -> Result<u64> {
        self.store
            .read()
            .await
            .count_containing_day_type(day_type)
            .await
    }

    /// Number of calendars containing the given attendance value.
    pub async fn calendars_containing_attendance(&self, attendance: Attendance) -> Result<u64> {
        self.store
            .read()
            .await
            .count_containing_attendance(attendance)
            .await
    }
}

fn not_found(year: &str, month: &str) -> CalendarError {
    CalendarError::NotFound {
        year: year.to_string(),
        month: month.to_string(),
    }
}

fn day_not_found(year: &str, month: &str, day: u32) -> CalendarError {
    CalendarError::DayNotFound {
        year: year.to_string(),
        month: month.to_string(),
        day,
    }
}

// ============================================================================
// Tests
// ============================================================================
