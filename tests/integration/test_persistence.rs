//! Persistence tests: config-driven service construction and store restarts.

use std::collections::BTreeMap;

use rollcall::{Attendance, CalendarService, Config, DayType};

fn persistent_config(dir: &std::path::Path) -> Config {
    Config::from_str(&format!(
        "[storage]\npersistent = true\ndata_dir = \"{}\"\n\n[calendar]\ndefault_region = \"emea\"\ntemplate_version = \"2.0\"\n",
        dir.display()
    ))
    .unwrap()
}

#[tokio::test]
async fn mutations_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = persistent_config(dir.path());

    {
        let service = CalendarService::from_config(&config).await.unwrap();
        let calendar = service.get_or_create_calendar("2025", "02").await.unwrap();
        assert_eq!(calendar.region, "emea");
        assert_eq!(calendar.template_version, "2.0");

        service
            .update_attendance("2025", "02", 3, Some(Attendance::Office))
            .await
            .unwrap();

        let mut bulk: BTreeMap<u32, String> = BTreeMap::new();
        bulk.insert(4, "leave".to_string());
        service
            .bulk_update_day_types("2025", "02", &bulk)
            .await
            .unwrap();
    }

    // A fresh service over the same directory sees the saved state.
    let service = CalendarService::from_config(&config).await.unwrap();
    let calendar = service.get_calendar("2025", "02").await.unwrap().unwrap();

    assert_eq!(
        calendar.day_entry(3).unwrap().attendance,
        Some(Attendance::Office)
    );
    assert_eq!(calendar.day_entry(4).unwrap().day_type, DayType::Leave);
    assert!(calendar.day_entry(4).unwrap().is_updated);
    assert_eq!(calendar.day_entry(4).unwrap().original_type, DayType::Working);
    assert_eq!(service.total_calendars_count().await.unwrap(), 1);
}

#[tokio::test]
async fn delete_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = persistent_config(dir.path());

    {
        let service = CalendarService::from_config(&config).await.unwrap();
        service.get_or_create_calendar("2025", "03").await.unwrap();
        service.delete_calendar("2025", "03").await.unwrap();
    }

    let service = CalendarService::from_config(&config).await.unwrap();
    assert!(!service.calendar_exists("2025", "03").await.unwrap());
    assert_eq!(service.total_calendars_count().await.unwrap(), 0);
}
