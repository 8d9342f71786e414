use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use shiftwatch::db::DbPool;
use shiftwatch::models::attendance::{CheckEventInput, RecordKind, VerificationMethod};
use shiftwatch::models::calendar::{CalendarEventInput, CalendarEventKind};
use shiftwatch::models::employee::EmployeeCreateInput;
use shiftwatch::models::leave::LeaveRequestInput;
use shiftwatch::models::notification::NotificationKind;
use shiftwatch::models::schedule::{ShiftPeriod, WorkScheduleInput};
use shiftwatch::services::alert_service::AlertService;
use shiftwatch::services::attendance_service::AttendanceService;
use shiftwatch::services::employee_service::EmployeeService;
use shiftwatch::services::leave_service::LeaveService;
use shiftwatch::services::notification_service::NotificationService;
use shiftwatch::services::schedule_service::ScheduleService;
use shiftwatch::services::settings_service::SettingsService;
use tempfile::{tempdir, TempDir};

struct Fixture {
    _dir: TempDir,
    alerts: AlertService,
    attendance: AttendanceService,
    employees: EmployeeService,
    schedules: ScheduleService,
    leaves: LeaveService,
    notifications: NotificationService,
}

fn setup() -> Fixture {
    let dir = tempdir().expect("temp dir");
    let pool = DbPool::new(dir.path().join("alerts.sqlite")).expect("db pool");

    let settings = Arc::new(SettingsService::new(pool.clone()));
    let fixture = Fixture {
        alerts: AlertService::new(pool.clone()),
        attendance: AttendanceService::new(pool.clone(), settings),
        employees: EmployeeService::new(pool.clone()),
        schedules: ScheduleService::new(pool.clone()),
        leaves: LeaveService::new(pool.clone()),
        notifications: NotificationService::new(pool),
        _dir: dir,
    };

    fixture
        .schedules
        .upsert_schedule(WorkScheduleInput {
            id: None,
            name: "Weekday shift".to_string(),
            shifts: vec![ShiftPeriod {
                start: "08:00".to_string(),
                end: "16:00".to_string(),
                label: None,
            }],
            weekdays: vec![0, 1, 2, 3, 4],
        })
        .expect("create schedule");

    fixture
}

fn add_employee(fixture: &Fixture, name: &str) {
    fixture
        .employees
        .create(EmployeeCreateInput {
            name: name.to_string(),
            role: None,
        })
        .expect("create employee");
}

fn check(fixture: &Fixture, worker: &str, kind: RecordKind, timestamp_ms: i64) {
    fixture
        .attendance
        .record_event(CheckEventInput {
            worker_name: worker.to_string(),
            kind,
            latitude: 0.0,
            longitude: 0.0,
            photo_url: None,
            verification_method: VerificationMethod::Gps,
            qr_token: None,
            timestamp_ms: Some(timestamp_ms),
        })
        .expect("record event");
}

fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Local> {
    Local
        .with_ymd_and_hms(y, mo, d, h, mi, 0)
        .single()
        .expect("local time")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("date")
}

// Monday 2025-03-10 is the reference workday throughout.

#[test]
fn absence_alerts_fire_once_per_employee_and_day() {
    let fixture = setup();
    add_employee(&fixture, "Ana");
    add_employee(&fixture, "Ben");

    check(&fixture, "Ben", RecordKind::CheckIn, local(2025, 3, 10, 8, 2).timestamp_millis());

    let first = fixture.alerts.run_checks_at(local(2025, 3, 10, 10, 0));
    assert_eq!(first.absence_alerts, 1);
    assert_eq!(first.missing_checkouts, 0);

    // Re-running the sweep must not duplicate the alert.
    let second = fixture.alerts.run_checks_at(local(2025, 3, 10, 10, 30));
    assert_eq!(second.total(), 0);

    let feed = fixture.notifications.list(None).expect("feed");
    let absence: Vec<_> = feed
        .iter()
        .filter(|n| n.kind == NotificationKind::AbsenceAlert)
        .collect();
    assert_eq!(absence.len(), 1);
    assert_eq!(absence[0].subject.as_deref(), Some("Ana"));
    assert_eq!(absence[0].event_date, Some(date(2025, 3, 10)));
}

#[test]
fn no_absence_alert_inside_the_grace_window() {
    let fixture = setup();
    add_employee(&fixture, "Ana");

    // 08:20 is within the 30-minute grace after the 08:00 shift start.
    let summary = fixture.alerts.run_checks_at(local(2025, 3, 10, 8, 20));
    assert_eq!(summary.absence_alerts, 0);

    // Past the grace window the same employee is flagged.
    let later = fixture.alerts.run_checks_at(local(2025, 3, 10, 8, 31));
    assert_eq!(later.absence_alerts, 1);
}

#[test]
fn holidays_and_non_workdays_suppress_absence_alerts() {
    let fixture = setup();
    add_employee(&fixture, "Ana");

    fixture
        .schedules
        .add_calendar_event(CalendarEventInput {
            date: date(2025, 3, 10),
            kind: CalendarEventKind::Holiday,
            label: Some("Local fiesta".to_string()),
        })
        .expect("add holiday");

    let holiday = fixture.alerts.run_checks_at(local(2025, 3, 10, 10, 0));
    assert_eq!(holiday.absence_alerts, 0);

    // Sunday 2025-03-16 does not match the weekday pattern.
    let sunday = fixture.alerts.run_checks_at(local(2025, 3, 16, 10, 0));
    assert_eq!(sunday.absence_alerts, 0);
}

#[test]
fn approved_leave_suppresses_the_absence_alert() {
    let fixture = setup();
    add_employee(&fixture, "Ana");

    let request = fixture
        .leaves
        .submit(LeaveRequestInput {
            employee_name: "Ana".to_string(),
            start_date: date(2025, 3, 10),
            end_date: date(2025, 3, 12),
            reason: None,
        })
        .expect("submit leave");
    fixture.leaves.decide(&request.id, true).expect("approve");

    let summary = fixture.alerts.run_checks_at(local(2025, 3, 10, 10, 0));
    assert_eq!(summary.absence_alerts, 0);
}

#[test]
fn pending_leave_does_not_suppress_the_absence_alert() {
    let fixture = setup();
    add_employee(&fixture, "Ana");

    fixture
        .leaves
        .submit(LeaveRequestInput {
            employee_name: "Ana".to_string(),
            start_date: date(2025, 3, 10),
            end_date: date(2025, 3, 12),
            reason: None,
        })
        .expect("submit leave");

    let summary = fixture.alerts.run_checks_at(local(2025, 3, 10, 10, 0));
    assert_eq!(summary.absence_alerts, 1);
}

#[test]
fn missing_checkout_is_flagged_the_morning_after() {
    let fixture = setup();
    add_employee(&fixture, "Ana");

    // Sunday evening check-in that was never closed.
    check(&fixture, "Ana", RecordKind::CheckIn, local(2025, 3, 9, 18, 0).timestamp_millis());

    let first = fixture.alerts.run_checks_at(local(2025, 3, 10, 10, 0));
    assert_eq!(first.missing_checkouts, 1);
    // Ana also has no check-in today, so both passes fire.
    assert_eq!(first.absence_alerts, 1);
    assert_eq!(first.total(), 2);

    let second = fixture.alerts.run_checks_at(local(2025, 3, 10, 11, 0));
    assert_eq!(second.total(), 0);

    let feed = fixture.notifications.list(None).expect("feed");
    let missing: Vec<_> = feed
        .iter()
        .filter(|n| n.kind == NotificationKind::MissingCheckout)
        .collect();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].subject.as_deref(), Some("Ana"));
    assert_eq!(missing[0].event_date, Some(date(2025, 3, 9)));
    assert_eq!(missing[0].created_on, date(2025, 3, 10));
}

#[test]
fn closed_day_produces_no_missing_checkout() {
    let fixture = setup();
    add_employee(&fixture, "Ana");

    check(&fixture, "Ana", RecordKind::CheckIn, local(2025, 3, 9, 8, 0).timestamp_millis());
    check(&fixture, "Ana", RecordKind::CheckOut, local(2025, 3, 9, 16, 0).timestamp_millis());

    let summary = fixture.alerts.run_checks_at(local(2025, 3, 10, 10, 0));
    assert_eq!(summary.missing_checkouts, 0);
}

#[test]
fn deactivated_employees_are_not_swept() {
    let fixture = setup();
    add_employee(&fixture, "Ana");

    let listed = fixture.employees.list().expect("list employees");
    fixture
        .employees
        .deactivate(&listed[0].id)
        .expect("deactivate");

    let summary = fixture.alerts.run_checks_at(local(2025, 3, 10, 10, 0));
    assert_eq!(summary.total(), 0);
}
