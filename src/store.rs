//! Calendar storage trait and embedded implementation.
//!
//! The [`CalendarStore`] trait is the persistence collaborator the service
//! layer talks to: point lookups by year-month, existence checks, upserting
//! saves, and the filtered scans the query surface needs. The embedded
//! implementation keeps calendars in memory behind a `RwLock` with side
//! indexes, with optional JSON file persistence.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex as AsyncMutex, RwLock};

use crate::calendar::types::{Attendance, Calendar, DayType};
use crate::error::{Result, RollcallError, StorageError};

// ============================================================================
// CalendarStore Trait
// ============================================================================

/// Trait for calendar storage backends.
///
/// Implementations must enforce the unique (year, month) constraint: at most
/// one calendar per pair. `save` is an upsert by document id and owns the
/// audit timestamps, stamping `created_at` on first persist and `updated_at`
/// on every persist.
#[async_trait]
pub trait CalendarStore: Send + Sync {
    /// Find the calendar for a year-month.
    async fn find_one(&self, year: &str, month: &str) -> Result<Option<Calendar>>;

    /// Check whether a calendar exists for a year-month.
    async fn exists(&self, year: &str, month: &str) -> Result<bool>;

    /// Delete the calendar for a year-month. Returns whether one was removed.
    async fn delete_one(&self, year: &str, month: &str) -> Result<bool>;

    /// Upsert a calendar by id, assigning an id and timestamps as needed.
    async fn save(&self, calendar: Calendar) -> Result<Calendar>;

    /// All calendars, ordered by (year, month).
    async fn find_all(&self) -> Result<Vec<Calendar>>;

    /// All calendars for a year, ordered by month.
    async fn find_by_year(&self, year: &str) -> Result<Vec<Calendar>>;

    /// Calendars within an inclusive (year, month) range, ordered.
    async fn find_by_date_range(
        &self,
        start_year: &str,
        start_month: &str,
        end_year: &str,
        end_month: &str,
    ) -> Result<Vec<Calendar>>;

    /// Calendars containing at least one day of the given type.
    async fn find_with_day_type(&self, day_type: DayType) -> Result<Vec<Calendar>>;

    /// Calendars containing at least one day with the given attendance value.
    async fn find_with_attendance_value(&self, attendance: Attendance) -> Result<Vec<Calendar>>;

    /// Calendars containing at least one day with any attendance recorded.
    async fn find_with_any_attendance(&self) -> Result<Vec<Calendar>>;

    /// Calendars containing both office and work-from-home days.
    async fn find_with_mixed_attendance(&self) -> Result<Vec<Calendar>>;

    /// Calendars with at least one working day missing attendance.
    async fn find_with_incomplete_attendance(&self) -> Result<Vec<Calendar>>;

    /// Calendars where every working day has attendance recorded.
    async fn find_with_full_attendance(&self) -> Result<Vec<Calendar>>;

    /// Total number of calendars.
    async fn count(&self) -> Result<u64>;

    /// Number of calendars for a year.
    async fn count_by_year(&self, year: &str) -> Result<u64>;

    /// Distinct years present in the store, sorted.
    async fn distinct_years(&self) -> Result<Vec<String>>;

    /// Number of calendars containing at least one day of the given type.
    async fn count_containing_day_type(&self, day_type: DayType) -> Result<u64>;

    /// Number of calendars containing at least one day with the given
    /// attendance value.
    async fn count_containing_attendance(&self, attendance: Attendance) -> Result<u64>;
}

// ============================================================================
// Internal Data Structure
// ============================================================================

/// Internal data storage structure.
#[derive(Debug, Default)]
struct CalendarData {
    /// Calendars indexed by document id.
    calendars: HashMap<String, Calendar>,
    /// Index: (year, month) -> document id. Enforces uniqueness.
    by_year_month: HashMap<(String, String), String>,
    /// Index: year -> document ids.
    by_year: HashMap<String, Vec<String>>,
}

impl CalendarData {
    fn index(&mut self, id: &str, calendar: &Calendar) {
        self.by_year_month.insert(
            (calendar.year.clone(), calendar.month.clone()),
            id.to_string(),
        );
        self.by_year
            .entry(calendar.year.clone())
            .or_default()
            .push(id.to_string());
    }

    fn unindex(&mut self, calendar: &Calendar) {
        self.by_year_month
            .remove(&(calendar.year.clone(), calendar.month.clone()));
        if let Some(ids) = self.by_year.get_mut(&calendar.year) {
            ids.retain(|id| Some(id) != calendar.id.as_ref());
        }
    }

    fn sorted(&self, mut calendars: Vec<Calendar>) -> Vec<Calendar> {
        calendars.sort_by(|a, b| (&a.year, &a.month).cmp(&(&b.year, &b.month)));
        calendars
    }

    fn filtered<F>(&self, predicate: F) -> Vec<Calendar>
    where
        F: Fn(&Calendar) -> bool,
    {
        let matching = self
            .calendars
            .values()
            .filter(|c| predicate(c))
            .cloned()
            .collect();
        self.sorted(matching)
    }
}

// ============================================================================
// Embedded Implementation
// ============================================================================

/// On-disk representation of the embedded store.
#[derive(Serialize, Deserialize)]
struct PersistenceData {
    version: u32,
    calendars: Vec<Calendar>,
}

/// In-memory calendar store with optional JSON file persistence.
pub struct EmbeddedCalendarStore {
    /// All data protected by a single RwLock for consistent access.
    data: RwLock<CalendarData>,
    /// Optional persistence file path.
    persistence_path: Option<std::path::PathBuf>,
    /// Mutex for persistence operations.
    persist_lock: AsyncMutex<()>,
}

impl EmbeddedCalendarStore {
    /// Create a new in-memory store without persistence.
    pub fn new() -> Self {
        Self {
            data: RwLock::new(CalendarData::default()),
            persistence_path: None,
            persist_lock: AsyncMutex::new(()),
        }
    }

    /// Create a store with file persistence under `data_dir`.
    pub async fn with_persistence(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir).map_err(StorageError::Io)?;

        let persistence_path = data_dir.join("calendars.json");
        let store = Self {
            data: RwLock::new(CalendarData::default()),
            persistence_path: Some(persistence_path.clone()),
            persist_lock: AsyncMutex::new(()),
        };

        if persistence_path.exists() {
            store.load_from_file(&persistence_path).await?;
        }

        Ok(store)
    }

    /// Load data from a JSON file.
    async fn load_from_file(&self, path: &Path) -> Result<()> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(RollcallError::Io)?;

        let persisted: PersistenceData =
            serde_json::from_str(&content).map_err(RollcallError::Serialization)?;

        let mut data = self.data.write().await;
        for calendar in persisted.calendars {
            let Some(id) = calendar.id.clone() else {
                continue;
            };
            let key = (calendar.year.clone(), calendar.month.clone());
            if data.by_year_month.contains_key(&key) {
                tracing::warn!(
                    year = %calendar.year,
                    month = %calendar.month,
                    "duplicate calendar in persistence file, skipping"
                );
                continue;
            }
            data.index(&id, &calendar);
            data.calendars.insert(id, calendar);
        }

        tracing::info!(
            "Loaded {} calendars from {}",
            data.calendars.len(),
            path.display()
        );

        Ok(())
    }

    /// Persist data to file if persistence is enabled.
    async fn persist(&self) -> Result<()> {
        let Some(ref path) = self.persistence_path else {
            return Ok(());
        };

        let _lock = self.persist_lock.lock().await;

        let data = self.data.read().await;
        let calendars: Vec<Calendar> = data.calendars.values().cloned().collect();
        drop(data);

        let persisted = PersistenceData {
            version: 1,
            calendars,
        };

        let content =
            serde_json::to_string_pretty(&persisted).map_err(RollcallError::Serialization)?;

        // Write to temp file first, then rename for atomicity
        let temp_path = path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, content)
            .await
            .map_err(RollcallError::Io)?;
        tokio::fs::rename(&temp_path, path)
            .await
            .map_err(RollcallError::Io)?;

        Ok(())
    }

    /// Remove all calendars from the store.
    pub async fn clear(&self) -> Result<()> {
        let mut data = self.data.write().await;
        *data = CalendarData::default();
        drop(data);
        self.persist().await
    }
}

impl Default for EmbeddedCalendarStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CalendarStore for EmbeddedCalendarStore {
    async fn find_one(&self, year: &str, month: &str) -> Result<Option<Calendar>> {
        let data = self.data.read().await;
        let id = data
            .by_year_month
            .get(&(year.to_string(), month.to_string()));
        Ok(id.and_then(|id| data.calendars.get(id)).cloned())
    }

    async fn exists(&self, year: &str, month: &str) -> Result<bool> {
        let data = self.data.read().await;
        Ok(data
            .by_year_month
            .contains_key(&(year.to_string(), month.to_string())))
    }

    async fn delete_one(&self, year: &str, month: &str) -> Result<bool> {
        let mut data = self.data.write().await;

        let Some(id) = data
            .by_year_month
            .get(&(year.to_string(), month.to_string()))
            .cloned()
        else {
            return Ok(false);
        };

        if let Some(calendar) = data.calendars.remove(&id) {
            data.unindex(&calendar);
        }

        drop(data);
        self.persist().await?;
        Ok(true)
    }

    async fn save(&self, mut calendar: Calendar) -> Result<Calendar> {
        let mut data = self.data.write().await;

        // Unique (year, month): reject a save whose key is already held by a
        // different document.
        let key = (calendar.year.clone(), calendar.month.clone());
        if let Some(existing_id) = data.by_year_month.get(&key) {
            if calendar.id.as_ref() != Some(existing_id) {
                return Err(StorageError::DuplicateKey(format!(
                    "Calendar already stored for {}-{}",
                    calendar.year, calendar.month
                ))
                .into());
            }
        }

        let id = match calendar.id.clone() {
            Some(id) => id,
            None => {
                let id = uuid::Uuid::new_v4().to_string();
                calendar.id = Some(id.clone());
                id
            }
        };

        let now = Utc::now();
        if calendar.created_at.is_none() {
            calendar.created_at = Some(now);
        }
        calendar.updated_at = Some(now);

        // Re-index: the previous version of this document may sit under a
        // different (year, month).
        if let Some(previous) = data.calendars.remove(&id) {
            data.unindex(&previous);
        }
        data.index(&id, &calendar);
        data.calendars.insert(id, calendar.clone());

        drop(data);
        self.persist().await?;
        Ok(calendar)
    }

    async fn find_all(&self) -> Result<Vec<Calendar>> {
        let data = self.data.read().await;
        Ok(data.sorted(data.calendars.values().cloned().collect()))
    }

    async fn find_by_year(&self, year: &str) -> Result<Vec<Calendar>> {
        let data = self.data.read().await;
        let calendars = data
            .by_year
            .get(year)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| data.calendars.get(id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(data.sorted(calendars))
    }

    async fn find_by_date_range(
        &self,
        start_year: &str,
        start_month: &str,
        end_year: &str,
        end_month: &str,
    ) -> Result<Vec<Calendar>> {
        let start = (start_year.to_string(), start_month.to_string());
        let end = (end_year.to_string(), end_month.to_string());
        let data = self.data.read().await;
        // Zero-padded year/month strings compare lexicographically in
        // chronological order, so a tuple comparison is the range check.
        Ok(data.filtered(|c| {
            let key = (c.year.clone(), c.month.clone());
            key >= start && key <= end
        }))
    }

    async fn find_with_day_type(&self, day_type: DayType) -> Result<Vec<Calendar>> {
        let data = self.data.read().await;
        Ok(data.filtered(|c| c.days.iter().any(|d| d.day_type == day_type)))
    }

    async fn find_with_attendance_value(&self, attendance: Attendance) -> Result<Vec<Calendar>> {
        let data = self.data.read().await;
        Ok(data.filtered(|c| c.days.iter().any(|d| d.attendance == Some(attendance))))
    }

    async fn find_with_any_attendance(&self) -> Result<Vec<Calendar>> {
        let data = self.data.read().await;
        Ok(data.filtered(|c| c.days.iter().any(|d| d.attendance.is_some())))
    }

    async fn find_with_mixed_attendance(&self) -> Result<Vec<Calendar>> {
        let data = self.data.read().await;
        Ok(data.filtered(|c| {
            let office = c
                .days
                .iter()
                .any(|d| d.attendance == Some(Attendance::Office));
            let remote = c
                .days
                .iter()
                .any(|d| d.attendance == Some(Attendance::Remote));
            office && remote
        }))
    }

    async fn find_with_incomplete_attendance(&self) -> Result<Vec<Calendar>> {
        let data = self.data.read().await;
        Ok(data.filtered(|c| {
            c.days
                .iter()
                .any(|d| d.day_type == DayType::Working && d.attendance.is_none())
        }))
    }

    async fn find_with_full_attendance(&self) -> Result<Vec<Calendar>> {
        let data = self.data.read().await;
        Ok(data.filtered(|c| {
            !c.days
                .iter()
                .any(|d| d.day_type == DayType::Working && d.attendance.is_none())
        }))
    }

    async fn count(&self) -> Result<u64> {
        let data = self.data.read().await;
        Ok(data.calendars.len() as u64)
    }

    async fn count_by_year(&self, year: &str) -> Result<u64> {
        let data = self.data.read().await;
        Ok(data.by_year.get(year).map_or(0, |ids| ids.len()) as u64)
    }

    async fn distinct_years(&self) -> Result<Vec<String>> {
        let data = self.data.read().await;
        let mut years: Vec<String> = data
            .by_year
            .iter()
            .filter(|(_, ids)| !ids.is_empty())
            .map(|(year, _)| year.clone())
            .collect();
        years.sort();
        Ok(years)
    }

    async fn count_containing_day_type(&self, day_type: DayType) -> Result<u64> {
        Ok(self.find_with_day_type(day_type).await?.len() as u64)
    }

    async fn count_containing_attendance(&self, attendance: Attendance) -> Result<u64> {
        Ok(self.find_with_attendance_value(attendance).await?.len() as u64)
    }
}

// ============================================================================
// Tests
// ============================================================================
