//! End-to-end service tests over the embedded store.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use rollcall::{
    Attendance, Calendar, CalendarError, CalendarService, DayEntry, DayType,
    EmbeddedCalendarStore, RollcallError,
};

fn new_service() -> CalendarService<EmbeddedCalendarStore> {
    CalendarService::new(Arc::new(RwLock::new(EmbeddedCalendarStore::new())))
}

#[tokio::test]
async fn generated_month_matches_weekday_rule() {
    let service = new_service();

    // February 2025: 28 days, Feb 1 is a Saturday.
    let calendar = service.get_or_create_calendar("2025", "02").await.unwrap();
    assert_eq!(calendar.days.len(), 28);

    let weekends: Vec<u32> = calendar
        .days
        .iter()
        .filter(|d| d.day_type == DayType::Weekend)
        .map(|d| d.day)
        .collect();
    assert_eq!(weekends, vec![1, 2, 8, 9, 15, 16, 22, 23]);

    // Every other day is working, none carry attendance.
    for entry in &calendar.days {
        if !weekends.contains(&entry.day) {
            assert_eq!(entry.day_type, DayType::Working, "day {}", entry.day);
        }
        assert_eq!(entry.attendance, None);
        assert!(!entry.is_updated);
    }
}

#[tokio::test]
async fn attendance_invariant_holds_through_service_paths() {
    let service = new_service();
    service.get_or_create_calendar("2025", "02").await.unwrap();

    service
        .update_attendance("2025", "02", 3, Some(Attendance::Office))
        .await
        .unwrap();
    service
        .update_day_type("2025", "02", 3, DayType::Holiday)
        .await
        .unwrap();

    let mut bulk: BTreeMap<u32, Option<String>> = BTreeMap::new();
    bulk.insert(4, Some("wfh".to_string()));
    bulk.insert(8, Some("wfoffice".to_string())); // Saturday: skipped by the aggregate
    service
        .bulk_update_attendance("2025", "02", &bulk)
        .await
        .unwrap();

    service
        .update_day_status(
            "2025",
            "02",
            5,
            Some(DayType::Leave),
            None,
            Some("conference"),
        )
        .await
        .unwrap();

    let stored = service.get_calendar("2025", "02").await.unwrap().unwrap();
    for entry in &stored.days {
        if entry.attendance.is_some() {
            assert_eq!(entry.day_type, DayType::Working, "day {}", entry.day);
        }
    }
    assert_eq!(stored.day_entry(3).unwrap().attendance, None);
    assert_eq!(
        stored.day_entry(4).unwrap().attendance,
        Some(Attendance::Remote)
    );
    assert_eq!(stored.day_entry(8).unwrap().attendance, None);
    assert_eq!(
        stored.day_entry(5).unwrap().description.as_deref(),
        Some("conference")
    );
}

#[tokio::test]
async fn bulk_update_is_per_item_tolerant() {
    let service = new_service();

    let mut updates: BTreeMap<u32, Option<String>> = BTreeMap::new();
    updates.insert(3, Some("wfoffice".to_string()));
    updates.insert(4, Some("wfh".to_string()));
    updates.insert(5, Some("telepathy".to_string())); // invalid value
    updates.insert(6, Some("wfh".to_string()));
    updates.insert(7, Some("wfoffice".to_string()));

    // The call as a whole succeeds.
    let calendar = service
        .bulk_update_attendance("2025", "02", &updates)
        .await
        .unwrap();

    assert_eq!(calendar.day_entry(5).unwrap().attendance, None);
    let recorded = calendar
        .days
        .iter()
        .filter(|d| d.attendance.is_some())
        .count();
    assert_eq!(recorded, 4);
}

#[tokio::test]
async fn create_conflicts_and_validation_precede_writes() {
    let service = new_service();

    service
        .create_calendar(Calendar::with_days(
            "2025",
            "06",
            vec![DayEntry::new(2, DayType::Working, Some(Attendance::Office))],
        ))
        .await
        .unwrap();

    // Conflict: same year-month again.
    let err = service
        .create_calendar(Calendar::new("2025", "06"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RollcallError::Calendar(CalendarError::Conflict { .. })
    ));

    // InvalidArgument: duplicate days never reach the store.
    let err = service
        .create_calendar(Calendar::with_days(
            "2025",
            "07",
            vec![
                DayEntry::new(1, DayType::Working, None),
                DayEntry::new(1, DayType::Working, None),
            ],
        ))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RollcallError::Calendar(CalendarError::InvalidArgument(_))
    ));
    assert!(!service.calendar_exists("2025", "07").await.unwrap());
}

#[tokio::test]
async fn statistics_roll_up_across_calendars() {
    let service = new_service();

    for month in ["01", "02"] {
        service
            .create_calendar(Calendar::with_days(
                "2025",
                month,
                vec![
                    DayEntry::new(1, DayType::Working, Some(Attendance::Office)),
                    DayEntry::new(2, DayType::Working, None),
                    DayEntry::new(3, DayType::Weekend, None),
                ],
            ))
            .await
            .unwrap();
    }
    service
        .create_calendar(Calendar::with_days(
            "2024",
            "12",
            vec![DayEntry::new(1, DayType::Holiday, None)],
        ))
        .await
        .unwrap();

    let overall = service.overall_statistics().await.unwrap();
    assert_eq!(overall.total_calendars, 3);
    assert_eq!(overall.total_working_days, 4);
    assert_eq!(overall.total_holidays, 1);
    assert_eq!(overall.total_office_attendance, 2);

    let yearly = service.yearly_statistics("2025").await.unwrap();
    assert_eq!(yearly.totals.total_calendars, 2);
    assert_eq!(yearly.totals.total_holidays, 0);

    assert_eq!(service.distinct_years().await.unwrap(), vec!["2024", "2025"]);
    assert_eq!(service.calendar_count_by_year("2025").await.unwrap(), 2);
}

#[tokio::test]
async fn query_surface_filters_by_day_predicates() {
    let service = new_service();

    service
        .create_calendar(Calendar::with_days(
            "2025",
            "01",
            vec![
                DayEntry::new(1, DayType::Working, Some(Attendance::Office)),
                DayEntry::new(2, DayType::Working, Some(Attendance::Remote)),
            ],
        ))
        .await
        .unwrap();
    service
        .create_calendar(Calendar::with_days(
            "2025",
            "02",
            vec![
                DayEntry::new(1, DayType::Holiday, None),
                DayEntry::new(2, DayType::Working, None),
            ],
        ))
        .await
        .unwrap();

    assert_eq!(service.calendars_with_holidays().await.unwrap().len(), 1);
    assert_eq!(
        service.calendars_with_mixed_attendance().await.unwrap()[0].month,
        "01"
    );
    assert_eq!(
        service
            .calendars_with_incomplete_attendance()
            .await
            .unwrap()[0]
            .month,
        "02"
    );
    assert_eq!(
        service.calendars_with_full_attendance().await.unwrap()[0].month,
        "01"
    );
    assert_eq!(
        service
            .calendars_containing_attendance(Attendance::Office)
            .await
            .unwrap(),
        1
    );

    let range = service
        .calendars_by_date_range("2025", "01", "2025", "01")
        .await
        .unwrap();
    assert_eq!(range.len(), 1);
    assert_eq!(range[0].month, "01");
}
