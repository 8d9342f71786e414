use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Local, NaiveDate};
use rusqlite::Connection;
use serde::Serialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::db::repositories::attendance_repository::AttendanceRepository;
use crate::db::repositories::calendar_repository::CalendarRepository;
use crate::db::repositories::employee_repository::EmployeeRepository;
use crate::db::repositories::leave_repository::LeaveRepository;
use crate::db::repositories::notification_repository::NotificationRepository;
use crate::db::repositories::schedule_repository::ScheduleRepository;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::attendance::RecordKind;
use crate::models::notification::{Notification, NotificationKind};
use crate::services::leave_service::covers_date;
use crate::services::schedule_service::resolve_day_plan;
use crate::utils::time::{local_day_bounds_ms, minutes_from_midnight};

/// Minutes after a shift start before anyone can be flagged absent.
const ABSENCE_GRACE_MINUTES: i64 = 30;
const ALERT_INTERVAL_SECS: u64 = 300;

#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRunSummary {
    pub absence_alerts: usize,
    pub missing_checkouts: usize,
}

impl AlertRunSummary {
    pub fn total(&self) -> usize {
        self.absence_alerts + self.missing_checkouts
    }
}

/// Scans today for unexcused absences and yesterday for missing checkouts,
/// emitting each notification at most once per (employee, date) per day.
/// The sweep never fails: unreadable collections degrade to empty and the
/// caller always gets counts back.
pub struct AlertService {
    db: DbPool,
    job_started: AtomicBool,
    stop_requested: Arc<AtomicBool>,
}

impl AlertService {
    pub fn new(db: DbPool) -> Self {
        Self {
            db,
            job_started: AtomicBool::new(false),
            stop_requested: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn run_checks(&self) -> AlertRunSummary {
        self.run_checks_at(Local::now())
    }

    /// Deterministic entry point: run both passes against an explicit clock.
    pub fn run_checks_at(&self, now: DateTime<Local>) -> AlertRunSummary {
        let conn = match self.db.get_connection() {
            Ok(conn) => conn,
            Err(err) => {
                error!(target: "app::alerts", error = %err, "alert sweep skipped, database unavailable");
                return AlertRunSummary::default();
            }
        };

        let absence_alerts = self.absence_pass(&conn, now).unwrap_or_else(|err| {
            warn!(target: "app::alerts", error = %err, "absence pass failed");
            0
        });
        let missing_checkouts = self.missing_checkout_pass(&conn, now).unwrap_or_else(|err| {
            warn!(target: "app::alerts", error = %err, "missing-checkout pass failed");
            0
        });

        let summary = AlertRunSummary {
            absence_alerts,
            missing_checkouts,
        };
        info!(
            target: "app::alerts",
            absence_alerts,
            missing_checkouts,
            "alert sweep finished"
        );
        summary
    }

    fn absence_pass(&self, conn: &Connection, now: DateTime<Local>) -> AppResult<usize> {
        let today = now.date_naive();
        let schedules = ScheduleRepository::list(conn)?;
        let event = CalendarRepository::find_first_for_date(conn, today)?;
        let plan = resolve_day_plan(today, &schedules, event.as_ref());

        if plan.holiday {
            debug!(target: "app::alerts", %today, "holiday, skipping absence pass");
            return Ok(0);
        }
        if !plan.workday {
            debug!(target: "app::alerts", %today, "not a workday, skipping absence pass");
            return Ok(0);
        }

        let now_minutes = minutes_from_midnight(now.time());
        let any_shift_elapsed = plan
            .shift_starts
            .iter()
            .any(|start| now_minutes > start + ABSENCE_GRACE_MINUTES);
        if !any_shift_elapsed {
            debug!(target: "app::alerts", %today, "no shift grace period elapsed yet");
            return Ok(0);
        }

        let (lower_ms, upper_ms) = local_day_bounds_ms(today, today)
            .ok_or_else(|| AppError::validation("today not representable in local time"))?;

        let mut generated = 0;
        for employee in EmployeeRepository::list_active(conn)? {
            let records = AttendanceRepository::list_for_worker_between(
                conn,
                &employee.name,
                lower_ms,
                upper_ms,
            )?;
            if records.iter().any(|r| r.kind == RecordKind::CheckIn) {
                continue;
            }

            let windows: Vec<_> = LeaveRepository::list_approved_for_employee(conn, &employee.name)?
                .into_iter()
                .map(|request| (request.start_date, request.end_date))
                .collect();
            if covers_date(&windows, today) {
                continue;
            }

            if NotificationRepository::exists_for(
                conn,
                NotificationKind::AbsenceAlert,
                &employee.name,
                today,
                today,
            )? {
                continue;
            }

            insert_alert(
                conn,
                NotificationKind::AbsenceAlert,
                "Absence alert",
                format!("{} has not checked in on {}", employee.name, today),
                &employee.name,
                today,
                today,
            )?;
            info!(target: "app::alerts", employee = %employee.name, %today, "absence alert emitted");
            generated += 1;
        }

        Ok(generated)
    }

    fn missing_checkout_pass(&self, conn: &Connection, now: DateTime<Local>) -> AppResult<usize> {
        let today = now.date_naive();
        let yesterday = today
            .pred_opt()
            .ok_or_else(|| AppError::validation("no day precedes today"))?;
        let (lower_ms, upper_ms) = local_day_bounds_ms(yesterday, yesterday)
            .ok_or_else(|| AppError::validation("yesterday not representable in local time"))?;

        let mut generated = 0;
        for employee in EmployeeRepository::list_active(conn)? {
            let records = AttendanceRepository::list_for_worker_between(
                conn,
                &employee.name,
                lower_ms,
                upper_ms,
            )?;
            let Some(last) = records.last() else {
                continue;
            };
            if last.kind != RecordKind::CheckIn {
                continue;
            }

            if NotificationRepository::exists_for(
                conn,
                NotificationKind::MissingCheckout,
                &employee.name,
                yesterday,
                today,
            )? {
                continue;
            }

            insert_alert(
                conn,
                NotificationKind::MissingCheckout,
                "Missing checkout",
                format!("{} did not check out on {}", employee.name, yesterday),
                &employee.name,
                yesterday,
                today,
            )?;
            info!(target: "app::alerts", employee = %employee.name, %yesterday, "missing-checkout alert emitted");
            generated += 1;
        }

        Ok(generated)
    }

    /// Start the periodic sweep if it is not running yet. The loop wakes
    /// every second so `shutdown` takes effect promptly; an in-flight sweep
    /// is allowed to finish and write its results.
    pub fn ensure_alert_job(self: &Arc<Self>) -> AppResult<()> {
        if self
            .job_started
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            let runner = Arc::clone(self);
            if let Err(err) = thread::Builder::new()
                .name("attendance-alert-job".to_string())
                .spawn(move || {
                    runner.run_alert_loop();
                })
            {
                self.job_started.store(false, Ordering::SeqCst);
                error!(target: "app::alerts", error = %err, "failed to start alert thread");
                return Err(AppError::other(format!("cannot start alert job: {err}")));
            }
        }

        Ok(())
    }

    pub fn shutdown(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
        info!(target: "app::alerts", "alert job shutdown requested");
    }

    fn run_alert_loop(self: Arc<Self>) {
        loop {
            if self.stop_requested.load(Ordering::SeqCst) {
                info!(target: "app::alerts", "alert job stopped");
                return;
            }

            self.run_checks();

            for _ in 0..ALERT_INTERVAL_SECS {
                if self.stop_requested.load(Ordering::SeqCst) {
                    info!(target: "app::alerts", "alert job stopped");
                    return;
                }
                thread::sleep(StdDuration::from_secs(1));
            }
        }
    }
}

fn insert_alert(
    conn: &Connection,
    kind: NotificationKind,
    title: &str,
    message: String,
    subject: &str,
    event_date: NaiveDate,
    created_on: NaiveDate,
) -> AppResult<()> {
    NotificationRepository::insert(
        conn,
        &Notification {
            id: Uuid::new_v4().to_string(),
            kind,
            title: title.to_string(),
            message,
            subject: Some(subject.to_string()),
            event_date: Some(event_date),
            created_on,
            read: false,
        },
    )
}
