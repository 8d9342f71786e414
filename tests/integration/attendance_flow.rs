use std::sync::Arc;

use chrono::{Local, NaiveDate, TimeZone};
use shiftwatch::db::DbPool;
use shiftwatch::error::AppError;
use shiftwatch::models::attendance::{CheckEventInput, RecordKind, VerificationMethod};
use shiftwatch::models::settings::{GeoPoint, WorkshopConfigUpdate};
use shiftwatch::services::attendance_service::AttendanceService;
use shiftwatch::services::settings_service::SettingsService;
use tempfile::{tempdir, TempDir};

const WORKSHOP_LAT: f64 = 40.4168;
const WORKSHOP_LNG: f64 = -3.7038;

fn setup() -> (TempDir, AttendanceService, Arc<SettingsService>) {
    let dir = tempdir().expect("temp dir");
    let pool = DbPool::new(dir.path().join("attendance.sqlite")).expect("db pool");

    let settings = Arc::new(SettingsService::new(pool.clone()));
    settings
        .update_workshop_config(WorkshopConfigUpdate {
            center: Some(GeoPoint {
                latitude: WORKSHOP_LAT,
                longitude: WORKSHOP_LNG,
            }),
            radius_meters: Some(100.0),
            qr_secret: None,
        })
        .expect("configure workshop");

    let attendance = AttendanceService::new(pool, Arc::clone(&settings));
    (dir, attendance, settings)
}

fn ms(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> i64 {
    Local
        .with_ymd_and_hms(y, mo, d, h, mi, 0)
        .single()
        .expect("local time")
        .timestamp_millis()
}

fn gps_event(worker: &str, kind: RecordKind, lat: f64, lng: f64, timestamp_ms: i64) -> CheckEventInput {
    CheckEventInput {
        worker_name: worker.to_string(),
        kind,
        latitude: lat,
        longitude: lng,
        photo_url: None,
        verification_method: VerificationMethod::Gps,
        qr_token: None,
        timestamp_ms: Some(timestamp_ms),
    }
}

#[test]
fn gps_check_in_inside_geofence_is_verified() {
    let (_dir, attendance, _settings) = setup();

    let record = attendance
        .record_event(gps_event(
            "Ana",
            RecordKind::CheckIn,
            WORKSHOP_LAT,
            WORKSHOP_LNG,
            ms(2025, 3, 10, 8, 0),
        ))
        .expect("record check-in");

    assert!(record.location_verified);
    assert_eq!(record.verification_method, VerificationMethod::Gps);
}

#[test]
fn gps_check_in_outside_geofence_is_stored_unverified() {
    let (_dir, attendance, _settings) = setup();

    // Roughly one kilometre north of the workshop.
    let record = attendance
        .record_event(gps_event(
            "Ana",
            RecordKind::CheckIn,
            WORKSHOP_LAT + 0.009,
            WORKSHOP_LNG,
            ms(2025, 3, 10, 8, 0),
        ))
        .expect("record check-in");

    assert!(!record.location_verified);

    let stored = attendance
        .list_for_worker("Ana", None)
        .expect("list records");
    assert_eq!(stored.len(), 1);
    assert!(!stored[0].location_verified);
}

#[test]
fn qr_check_in_with_current_token_is_always_verified() {
    let (_dir, attendance, settings) = setup();

    let day = NaiveDate::from_ymd_opt(2025, 3, 10).expect("date");
    let token = settings.qr_token_for(day);

    // Coordinates far outside the geofence; the token alone decides.
    let record = attendance
        .record_event(CheckEventInput {
            worker_name: "Budi".to_string(),
            kind: RecordKind::CheckIn,
            latitude: 0.0,
            longitude: 0.0,
            photo_url: None,
            verification_method: VerificationMethod::Qr,
            qr_token: Some(token),
            timestamp_ms: Some(ms(2025, 3, 10, 8, 5)),
        })
        .expect("record QR check-in");

    assert!(record.location_verified);
}

#[test]
fn qr_check_in_rejects_stale_or_missing_token() {
    let (_dir, attendance, settings) = setup();

    let yesterday_token = settings.qr_token_for(NaiveDate::from_ymd_opt(2025, 3, 9).expect("date"));

    let stale = attendance.record_event(CheckEventInput {
        worker_name: "Budi".to_string(),
        kind: RecordKind::CheckIn,
        latitude: WORKSHOP_LAT,
        longitude: WORKSHOP_LNG,
        photo_url: None,
        verification_method: VerificationMethod::Qr,
        qr_token: Some(yesterday_token),
        timestamp_ms: Some(ms(2025, 3, 10, 8, 5)),
    });
    assert!(matches!(stale, Err(AppError::Validation { .. })));

    let missing = attendance.record_event(CheckEventInput {
        worker_name: "Budi".to_string(),
        kind: RecordKind::CheckIn,
        latitude: WORKSHOP_LAT,
        longitude: WORKSHOP_LNG,
        photo_url: None,
        verification_method: VerificationMethod::Qr,
        qr_token: None,
        timestamp_ms: Some(ms(2025, 3, 10, 8, 5)),
    });
    assert!(matches!(missing, Err(AppError::Validation { .. })));

    assert!(attendance
        .list_for_worker("Budi", None)
        .expect("list records")
        .is_empty());
}

#[test]
fn blank_worker_name_is_rejected() {
    let (_dir, attendance, _settings) = setup();

    let result = attendance.record_event(gps_event(
        "   ",
        RecordKind::CheckIn,
        WORKSHOP_LAT,
        WORKSHOP_LNG,
        ms(2025, 3, 10, 8, 0),
    ));

    assert!(matches!(result, Err(AppError::Validation { .. })));
}

#[test]
fn day_sessions_reconstruct_first_in_last_out_per_day() {
    let (_dir, attendance, _settings) = setup();

    for (kind, stamp) in [
        (RecordKind::CheckIn, ms(2025, 3, 10, 8, 0)),
        (RecordKind::CheckIn, ms(2025, 3, 10, 8, 30)),
        (RecordKind::CheckOut, ms(2025, 3, 10, 12, 0)),
        (RecordKind::CheckOut, ms(2025, 3, 10, 16, 0)),
        (RecordKind::CheckIn, ms(2025, 3, 11, 9, 0)),
    ] {
        attendance
            .record_event(gps_event("Ana", kind, WORKSHOP_LAT, WORKSHOP_LNG, stamp))
            .expect("record event");
    }

    let start = NaiveDate::from_ymd_opt(2025, 3, 10).expect("date");
    let end = NaiveDate::from_ymd_opt(2025, 3, 11).expect("date");
    let sessions = attendance
        .day_sessions("Ana", start, end)
        .expect("day sessions");

    assert_eq!(sessions.len(), 2);

    let monday = sessions.get(&start).expect("monday session");
    assert_eq!(
        monday.check_in.as_ref().map(|r| r.timestamp_ms),
        Some(ms(2025, 3, 10, 8, 0))
    );
    assert_eq!(
        monday.check_out.as_ref().map(|r| r.timestamp_ms),
        Some(ms(2025, 3, 10, 16, 0))
    );
    assert_eq!(monday.worked_ms, 8 * 3_600_000);

    let tuesday = sessions.get(&end).expect("tuesday session");
    assert!(tuesday.check_out.is_none());
    assert_eq!(tuesday.worked_ms, 0);
}

#[test]
fn validate_geofence_uses_configured_center_and_radius() {
    let (_dir, attendance, _settings) = setup();

    assert!(attendance.validate_geofence(GeoPoint {
        latitude: WORKSHOP_LAT,
        longitude: WORKSHOP_LNG,
    }));
    assert!(!attendance.validate_geofence(GeoPoint {
        latitude: WORKSHOP_LAT + 0.009,
        longitude: WORKSHOP_LNG,
    }));
}
