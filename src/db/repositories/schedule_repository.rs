use std::convert::TryFrom;

use rusqlite::{named_params, Connection, Row};

use crate::error::{AppError, AppResult};
use crate::models::schedule::{ShiftPeriod, WorkSchedule};

#[derive(Debug, Clone)]
pub struct ScheduleRow {
    pub id: String,
    pub name: String,
    pub shifts: String,
    pub weekdays: String,
}

impl ScheduleRow {
    pub fn from_schedule(schedule: &WorkSchedule) -> AppResult<Self> {
        Ok(Self {
            id: schedule.id.clone(),
            name: schedule.name.clone(),
            shifts: serde_json::to_string(&schedule.shifts)?,
            weekdays: serde_json::to_string(&schedule.weekdays)?,
        })
    }

    pub fn into_schedule(self) -> AppResult<WorkSchedule> {
        let shifts: Vec<ShiftPeriod> = serde_json::from_str(&self.shifts)?;
        let weekdays: Vec<u8> = serde_json::from_str(&self.weekdays)?;

        Ok(WorkSchedule {
            id: self.id,
            name: self.name,
            shifts,
            weekdays,
        })
    }
}

impl TryFrom<&Row<'_>> for ScheduleRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            shifts: row.get("shifts")?,
            weekdays: row.get("weekdays")?,
        })
    }
}

pub struct ScheduleRepository;

impl ScheduleRepository {
    /// Whole-document overwrite keyed by id; last writer wins, no history.
    pub fn upsert(conn: &Connection, schedule: &WorkSchedule) -> AppResult<()> {
        let row = ScheduleRow::from_schedule(schedule)?;

        conn.execute(
            r#"
                INSERT INTO work_schedules (id, name, shifts, weekdays)
                VALUES (:id, :name, :shifts, :weekdays)
                ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    shifts = excluded.shifts,
                    weekdays = excluded.weekdays
            "#,
            named_params! {
                ":id": &row.id,
                ":name": &row.name,
                ":shifts": &row.shifts,
                ":weekdays": &row.weekdays,
            },
        )?;

        Ok(())
    }

    pub fn list(conn: &Connection) -> AppResult<Vec<WorkSchedule>> {
        let mut stmt =
            conn.prepare("SELECT id, name, shifts, weekdays FROM work_schedules ORDER BY name ASC")?;

        let rows = stmt
            .query_map([], |row| ScheduleRow::try_from(row))?
            .map(|row| {
                row.map_err(AppError::from)
                    .and_then(|row| row.into_schedule())
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(rows)
    }

    pub fn delete(conn: &Connection, id: &str) -> AppResult<()> {
        let deleted = conn.execute("DELETE FROM work_schedules WHERE id = ?1", [id])?;
        if deleted == 0 {
            return Err(AppError::not_found());
        }
        Ok(())
    }
}
