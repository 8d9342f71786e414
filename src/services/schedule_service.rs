use chrono::{Datelike, NaiveDate};
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::repositories::calendar_repository::CalendarRepository;
use crate::db::repositories::schedule_repository::ScheduleRepository;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::calendar::{CalendarEvent, CalendarEventInput, CalendarEventKind};
use crate::models::schedule::{DayPlan, ShiftPeriod, WorkSchedule, WorkScheduleInput};
use crate::utils::time::{parse_hhmm, weekday_index};

/// Implicit shift applied when a day is a workday but no configured schedule
/// contributes a shift.
const DEFAULT_SHIFT_START: &str = "08:00";
const DEFAULT_SHIFT_END: &str = "16:00";

pub struct ScheduleService {
    db: DbPool,
}

impl ScheduleService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub fn upsert_schedule(&self, input: WorkScheduleInput) -> AppResult<WorkSchedule> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::validation("schedule name must not be empty"));
        }
        if let Some(day) = input.weekdays.iter().find(|day| **day > 6) {
            return Err(AppError::validation(format!(
                "weekday index {day} out of range (0 = Monday .. 6 = Sunday)"
            )));
        }
        for shift in &input.shifts {
            if parse_hhmm(&shift.start).is_none() || parse_hhmm(&shift.end).is_none() {
                return Err(AppError::validation(format!(
                    "shift times must be HH:MM, got {} - {}",
                    shift.start, shift.end
                )));
            }
        }

        let schedule = WorkSchedule {
            id: input.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            name,
            shifts: input.shifts,
            weekdays: input.weekdays,
        };
        self.db
            .with_connection(|conn| ScheduleRepository::upsert(conn, &schedule))?;

        info!(target: "app::schedules", name = %schedule.name, "schedule saved");
        Ok(schedule)
    }

    pub fn list_schedules(&self) -> AppResult<Vec<WorkSchedule>> {
        self.db.with_connection(ScheduleRepository::list)
    }

    pub fn delete_schedule(&self, id: &str) -> AppResult<()> {
        self.db
            .with_connection(|conn| ScheduleRepository::delete(conn, id))
    }

    pub fn add_calendar_event(&self, input: CalendarEventInput) -> AppResult<CalendarEvent> {
        let conn = self.db.get_connection()?;

        if let Some(existing) = CalendarRepository::find_first_for_date(&conn, input.date)? {
            warn!(
                target: "app::schedules",
                date = %input.date,
                existing = existing.kind.as_str(),
                "date already carries a calendar event; the first stored one wins"
            );
        }

        let event = CalendarEvent {
            id: Uuid::new_v4().to_string(),
            date: input.date,
            kind: input.kind,
            label: input.label,
        };
        CalendarRepository::insert(&conn, &event)?;

        Ok(event)
    }

    pub fn list_calendar_events(&self) -> AppResult<Vec<CalendarEvent>> {
        self.db.with_connection(CalendarRepository::list)
    }

    pub fn remove_calendar_event(&self, id: &str) -> AppResult<()> {
        self.db
            .with_connection(|conn| CalendarRepository::delete(conn, id))
    }

    /// Resolve whether `date` is a workday and which shift starts apply.
    pub fn resolve_day(&self, date: NaiveDate) -> AppResult<DayPlan> {
        let conn = self.db.get_connection()?;
        let schedules = ScheduleRepository::list(&conn)?;
        let event = CalendarRepository::find_first_for_date(&conn, date)?;
        Ok(resolve_day_plan(date, &schedules, event.as_ref()))
    }
}

/// Pure day resolution. Precedence: a Holiday event suppresses the workday
/// unconditionally; otherwise the weekday pattern applies, fail-open when no
/// schedules are configured; an ExtraWorkday event forces workday status.
pub fn resolve_day_plan(
    date: NaiveDate,
    schedules: &[WorkSchedule],
    event: Option<&CalendarEvent>,
) -> DayPlan {
    if matches!(event.map(|e| e.kind), Some(CalendarEventKind::Holiday)) {
        return DayPlan {
            date,
            workday: false,
            holiday: true,
            shift_starts: Vec::new(),
            shifts: Vec::new(),
        };
    }

    let weekday = weekday_index(date.weekday());
    let scheduled_by_pattern =
        schedules.is_empty() || schedules.iter().any(|s| s.weekdays.contains(&weekday));
    let workday =
        scheduled_by_pattern || matches!(event.map(|e| e.kind), Some(CalendarEventKind::ExtraWorkday));

    if !workday {
        return DayPlan {
            date,
            workday: false,
            holiday: false,
            shift_starts: Vec::new(),
            shifts: Vec::new(),
        };
    }

    let mut shift_starts = Vec::new();
    let mut shifts = Vec::new();
    for schedule in schedules {
        if !schedule.weekdays.contains(&weekday) {
            continue;
        }
        for shift in &schedule.shifts {
            if let Some(minutes) = parse_hhmm(&shift.start) {
                shift_starts.push(minutes);
                shifts.push(shift.clone());
            }
        }
    }

    if shift_starts.is_empty() {
        shift_starts.push(parse_hhmm(DEFAULT_SHIFT_START).unwrap_or(480));
        shifts.push(ShiftPeriod {
            start: DEFAULT_SHIFT_START.to_string(),
            end: DEFAULT_SHIFT_END.to_string(),
            label: None,
        });
    }

    DayPlan {
        date,
        workday: true,
        holiday: false,
        shift_starts,
        shifts,
    }
}
