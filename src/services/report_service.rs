use std::collections::HashMap;

use chrono::{Datelike, Local, NaiveDate};

use crate::db::repositories::attendance_repository::AttendanceRepository;
use crate::db::repositories::calendar_repository::CalendarRepository;
use crate::db::repositories::leave_repository::LeaveRepository;
use crate::db::repositories::schedule_repository::ScheduleRepository;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::attendance::DaySession;
use crate::models::calendar::CalendarEvent;
use crate::models::report::{AttendanceStats, DailyAttendance, DayVerdict, MonthlySummary};
use crate::models::schedule::DayPlan;
use crate::services::attendance_service::build_day_sessions;
use crate::services::leave_service::covers_date;
use crate::services::schedule_service::resolve_day_plan;
use crate::utils::time::{local_day_bounds_ms, local_minutes_of_ms};

/// Minutes after the closest shift start before a check-in counts as late.
const LATE_GRACE_MINUTES: i64 = 15;
/// Flat daily baseline for overtime; no partial-day proration.
const BASELINE_DAY_HOURS: f64 = 8.0;
const LATE_PENALTY: i64 = 5;
const ABSENT_PENALTY: i64 = 10;
const MS_PER_HOUR: f64 = 3_600_000.0;

/// Daily classification and range aggregation over reconstructed sessions,
/// resolved day plans, and approved leave windows.
pub struct ReportService {
    db: DbPool,
}

impl ReportService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub fn classify_day(&self, worker_name: &str, date: NaiveDate) -> AppResult<DailyAttendance> {
        let conn = self.db.get_connection()?;

        let (lower_ms, upper_ms) = local_day_bounds_ms(date, date)
            .ok_or_else(|| AppError::validation("date not representable in local time"))?;
        let records =
            AttendanceRepository::list_for_worker_between(&conn, worker_name, lower_ms, upper_ms)?;
        let sessions = build_day_sessions(records);

        let schedules = ScheduleRepository::list(&conn)?;
        let event = CalendarRepository::find_first_for_date(&conn, date)?;
        let plan = resolve_day_plan(date, &schedules, event.as_ref());

        let windows: Vec<_> = LeaveRepository::list_approved_for_employee(&conn, worker_name)?
            .into_iter()
            .map(|request| (request.start_date, request.end_date))
            .collect();

        Ok(daily_attendance(sessions.get(&date), &plan, &windows, date))
    }

    /// Roll daily verdicts over [start, min(end, today)] into summary
    /// statistics. Future dates are never classified or counted.
    pub fn aggregate_range(
        &self,
        worker_name: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<AttendanceStats> {
        if start > end {
            return Err(AppError::validation("range start is after range end"));
        }
        let today = Local::now().date_naive();
        let end = end.min(today);

        let mut stats = AttendanceStats {
            worker_name: worker_name.to_string(),
            start_date: start,
            end_date: end,
            days_present: 0,
            days_absent: 0,
            late_count: 0,
            total_hours: 0.0,
            overtime_hours: 0.0,
            attendance_score: 0,
            days: Vec::new(),
        };
        if start > end {
            stats.attendance_score = attendance_score(0, 0);
            return Ok(stats);
        }

        let conn = self.db.get_connection()?;

        let (lower_ms, upper_ms) = local_day_bounds_ms(start, end)
            .ok_or_else(|| AppError::validation("date range not representable in local time"))?;
        let records =
            AttendanceRepository::list_for_worker_between(&conn, worker_name, lower_ms, upper_ms)?;
        let sessions = build_day_sessions(records);

        let schedules = ScheduleRepository::list(&conn)?;
        let events = first_event_per_date(CalendarRepository::list(&conn)?);
        let windows: Vec<_> = LeaveRepository::list_approved_for_employee(&conn, worker_name)?
            .into_iter()
            .map(|request| (request.start_date, request.end_date))
            .collect();

        let mut total_ms: i64 = 0;
        let mut date = start;
        while date <= end {
            let plan = resolve_day_plan(date, &schedules, events.get(&date));
            let day = daily_attendance(sessions.get(&date), &plan, &windows, date);

            if day.verdict.counts_as_present() {
                stats.days_present += 1;
            }
            if day.verdict == DayVerdict::Late {
                stats.late_count += 1;
            }
            if day.verdict == DayVerdict::Absent {
                stats.days_absent += 1;
            }
            total_ms += day.worked_ms;
            stats.days.push(day);

            let Some(next) = date.succ_opt() else { break };
            date = next;
        }

        stats.total_hours = round_tenth(total_ms as f64 / MS_PER_HOUR);
        stats.overtime_hours =
            (stats.total_hours - stats.days_present as f64 * BASELINE_DAY_HOURS).max(0.0);
        stats.attendance_score = attendance_score(stats.late_count, stats.days_absent);

        Ok(stats)
    }

    /// Month roll-up with whole-hour totals (the display range view keeps
    /// one decimal; the two call sites round differently on purpose).
    pub fn monthly_summary(
        &self,
        worker_name: &str,
        year: i32,
        month: u32,
    ) -> AppResult<MonthlySummary> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| AppError::validation(format!("invalid month {year}-{month:02}")))?;
        let end = last_day_of_month(start);

        let stats = self.aggregate_range(worker_name, start, end)?;

        Ok(MonthlySummary {
            worker_name: stats.worker_name,
            year,
            month,
            days_present: stats.days_present,
            days_absent: stats.days_absent,
            late_count: stats.late_count,
            total_hours: stats.total_hours.round() as i64,
            overtime_hours: stats.overtime_hours.round() as i64,
            attendance_score: stats.attendance_score,
        })
    }
}

/// Classify one (worker, date). First match wins: presence beats every other
/// signal, then approved leave, then holiday, then non-workday, else absent.
pub fn classify_verdict(
    session: Option<&DaySession>,
    plan: &DayPlan,
    leave_windows: &[(NaiveDate, NaiveDate)],
    date: NaiveDate,
) -> DayVerdict {
    if let Some(session) = session {
        if !session.records.is_empty() {
            if plan.workday && !plan.holiday {
                if let Some(check_in) = &session.check_in {
                    if let Some(minutes) = local_minutes_of_ms(check_in.timestamp_ms) {
                        if let Some(start) = closest_shift_start(&plan.shift_starts, minutes) {
                            if minutes > start + LATE_GRACE_MINUTES {
                                return DayVerdict::Late;
                            }
                        }
                    }
                }
            }
            return DayVerdict::Present;
        }
    }

    if covers_date(leave_windows, date) {
        return DayVerdict::OnLeave;
    }
    if plan.holiday {
        return DayVerdict::Holiday;
    }
    if !plan.workday {
        return DayVerdict::NonWorkday;
    }
    DayVerdict::Absent
}

fn daily_attendance(
    session: Option<&DaySession>,
    plan: &DayPlan,
    leave_windows: &[(NaiveDate, NaiveDate)],
    date: NaiveDate,
) -> DailyAttendance {
    DailyAttendance {
        date,
        verdict: classify_verdict(session, plan, leave_windows, date),
        check_in_ms: session
            .and_then(|s| s.check_in.as_ref())
            .map(|r| r.timestamp_ms),
        check_out_ms: session
            .and_then(|s| s.check_out.as_ref())
            .map(|r| r.timestamp_ms),
        worked_ms: session.map(|s| s.worked_ms).unwrap_or(0),
    }
}

/// Shift start closest to the check-in by absolute distance, across every
/// shift of every schedule active that weekday. Ties keep the first
/// encountered, matching the historical behavior.
fn closest_shift_start(shift_starts: &[i64], minutes: i64) -> Option<i64> {
    let mut best: Option<i64> = None;
    for &start in shift_starts {
        match best {
            Some(current) if (start - minutes).abs() >= (current - minutes).abs() => {}
            _ => best = Some(start),
        }
    }
    best
}

fn attendance_score(late_count: u32, days_absent: u32) -> i64 {
    (100 - late_count as i64 * LATE_PENALTY - days_absent as i64 * ABSENT_PENALTY).max(0)
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn first_event_per_date(events: Vec<CalendarEvent>) -> HashMap<NaiveDate, CalendarEvent> {
    let mut map = HashMap::new();
    for event in events {
        map.entry(event.date).or_insert(event);
    }
    map
}

fn last_day_of_month(first: NaiveDate) -> NaiveDate {
    let (next_year, next_month) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .unwrap_or(first)
}
