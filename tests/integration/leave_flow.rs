use chrono::NaiveDate;
use shiftwatch::db::DbPool;
use shiftwatch::error::AppError;
use shiftwatch::models::leave::{LeaveRequestInput, LeaveStatus};
use shiftwatch::models::notification::NotificationKind;
use shiftwatch::models::report::DayVerdict;
use shiftwatch::models::schedule::{ShiftPeriod, WorkScheduleInput};
use shiftwatch::services::leave_service::LeaveService;
use shiftwatch::services::notification_service::NotificationService;
use shiftwatch::services::report_service::ReportService;
use shiftwatch::services::schedule_service::ScheduleService;
use tempfile::{tempdir, TempDir};

struct Fixture {
    _dir: TempDir,
    leaves: LeaveService,
    notifications: NotificationService,
    schedules: ScheduleService,
    reports: ReportService,
}

fn setup() -> Fixture {
    let dir = tempdir().expect("temp dir");
    let pool = DbPool::new(dir.path().join("leaves.sqlite")).expect("db pool");

    Fixture {
        leaves: LeaveService::new(pool.clone()),
        notifications: NotificationService::new(pool.clone()),
        schedules: ScheduleService::new(pool.clone()),
        reports: ReportService::new(pool),
        _dir: dir,
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("date")
}

fn request(employee: &str, start: NaiveDate, end: NaiveDate) -> LeaveRequestInput {
    LeaveRequestInput {
        employee_name: employee.to_string(),
        start_date: start,
        end_date: end,
        reason: Some("family".to_string()),
    }
}

#[test]
fn submission_lands_pending_and_notifies_the_feed() {
    let fixture = setup();

    let submitted = fixture
        .leaves
        .submit(request("Ana", date(2025, 3, 13), date(2025, 3, 14)))
        .expect("submit leave");
    assert_eq!(submitted.status, LeaveStatus::Pending);

    let feed = fixture.notifications.list(None).expect("feed");
    let requested: Vec<_> = feed
        .iter()
        .filter(|n| n.kind == NotificationKind::LeaveRequested)
        .collect();
    assert_eq!(requested.len(), 1);
    assert_eq!(requested[0].subject.as_deref(), Some("Ana"));
    assert_eq!(requested[0].event_date, Some(date(2025, 3, 13)));

    // Pending requests never count as approved windows.
    assert!(fixture
        .leaves
        .approved_windows("Ana")
        .expect("windows")
        .is_empty());
}

#[test]
fn approval_opens_the_window_and_is_final() {
    let fixture = setup();
    let submitted = fixture
        .leaves
        .submit(request("Ana", date(2025, 3, 13), date(2025, 3, 14)))
        .expect("submit leave");

    let decided = fixture.leaves.decide(&submitted.id, true).expect("approve");
    assert_eq!(decided.status, LeaveStatus::Approved);

    let windows = fixture.leaves.approved_windows("Ana").expect("windows");
    assert_eq!(windows, vec![(date(2025, 3, 13), date(2025, 3, 14))]);

    let feed = fixture.notifications.list(None).expect("feed");
    assert!(feed
        .iter()
        .any(|n| n.kind == NotificationKind::LeaveDecided));

    // A decided request cannot be decided again.
    let again = fixture.leaves.decide(&submitted.id, false);
    assert!(matches!(again, Err(AppError::Conflict { .. })));
}

#[test]
fn rejection_keeps_the_window_closed() {
    let fixture = setup();
    let submitted = fixture
        .leaves
        .submit(request("Ana", date(2025, 3, 13), date(2025, 3, 14)))
        .expect("submit leave");

    let decided = fixture.leaves.decide(&submitted.id, false).expect("reject");
    assert_eq!(decided.status, LeaveStatus::Rejected);
    assert!(fixture
        .leaves
        .approved_windows("Ana")
        .expect("windows")
        .is_empty());
}

#[test]
fn deciding_an_unknown_request_is_not_found() {
    let fixture = setup();
    let result = fixture.leaves.decide("no-such-id", true);
    assert!(matches!(result, Err(AppError::NotFound)));
}

#[test]
fn inverted_window_is_rejected() {
    let fixture = setup();
    let result = fixture
        .leaves
        .submit(request("Ana", date(2025, 3, 14), date(2025, 3, 13)));
    assert!(matches!(result, Err(AppError::Validation { .. })));
}

#[test]
fn approved_leave_classifies_the_day_as_on_leave() {
    let fixture = setup();
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

    let submitted = fixture
        .leaves
        .submit(request("Ana", date(2025, 3, 13), date(2025, 3, 13)))
        .expect("submit leave");
    fixture.leaves.decide(&submitted.id, true).expect("approve");

    // Thursday with no records: leave beats absence.
    let daily = fixture
        .reports
        .classify_day("Ana", date(2025, 3, 13))
        .expect("classify");
    assert_eq!(daily.verdict, DayVerdict::OnLeave);

    // The day before is plain absent.
    let absent = fixture
        .reports
        .classify_day("Ana", date(2025, 3, 12))
        .expect("classify");
    assert_eq!(absent.verdict, DayVerdict::Absent);
}

#[test]
fn feed_tracks_unread_state() {
    let fixture = setup();
    let submitted = fixture
        .leaves
        .submit(request("Ana", date(2025, 3, 13), date(2025, 3, 14)))
        .expect("submit leave");
    fixture.leaves.decide(&submitted.id, true).expect("approve");

    assert_eq!(fixture.notifications.unread_count().expect("unread"), 2);

    let feed = fixture.notifications.list(None).expect("feed");
    fixture
        .notifications
        .mark_read(&feed[0].id)
        .expect("mark read");

    assert_eq!(fixture.notifications.unread_count().expect("unread"), 1);

    let listed = fixture.notifications.list(Some(1)).expect("limited feed");
    assert_eq!(listed.len(), 1);
}
