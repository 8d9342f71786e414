use std::convert::TryFrom;

use chrono::NaiveDate;
use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::error::{AppError, AppResult};
use crate::models::calendar::{CalendarEvent, CalendarEventKind};

#[derive(Debug, Clone)]
pub struct CalendarEventRow {
    pub id: String,
    pub event_date: String,
    pub kind: String,
    pub label: Option<String>,
}

impl CalendarEventRow {
    pub fn into_event(self) -> AppResult<CalendarEvent> {
        let date = NaiveDate::parse_from_str(&self.event_date, "%Y-%m-%d").map_err(|err| {
            AppError::validation(format!("invalid calendar event date {}: {err}", self.event_date))
        })?;
        let kind = CalendarEventKind::parse(&self.kind).ok_or_else(|| {
            AppError::validation(format!("unknown calendar event kind: {}", self.kind))
        })?;

        Ok(CalendarEvent {
            id: self.id,
            date,
            kind,
            label: self.label,
        })
    }
}

impl TryFrom<&Row<'_>> for CalendarEventRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            event_date: row.get("event_date")?,
            kind: row.get("kind")?,
            label: row.get("label")?,
        })
    }
}

pub struct CalendarRepository;

impl CalendarRepository {
    pub fn insert(conn: &Connection, event: &CalendarEvent) -> AppResult<()> {
        conn.execute(
            r#"
                INSERT INTO calendar_events (id, event_date, kind, label)
                VALUES (:id, :event_date, :kind, :label)
            "#,
            named_params! {
                ":id": &event.id,
                ":event_date": event.date.to_string(),
                ":kind": event.kind.as_str(),
                ":label": &event.label,
            },
        )?;

        Ok(())
    }

    pub fn list(conn: &Connection) -> AppResult<Vec<CalendarEvent>> {
        let mut stmt = conn.prepare(
            "SELECT id, event_date, kind, label FROM calendar_events ORDER BY event_date ASC, rowid ASC",
        )?;

        let rows = stmt
            .query_map([], |row| CalendarEventRow::try_from(row))?
            .map(|row| row.map_err(AppError::from).and_then(|row| row.into_event()))
            .collect::<AppResult<Vec<_>>>()?;

        Ok(rows)
    }

    /// First stored event for the date. Duplicates can exist; insertion order
    /// wins, matching the historical tie-break.
    pub fn find_first_for_date(
        conn: &Connection,
        date: NaiveDate,
    ) -> AppResult<Option<CalendarEvent>> {
        let mut stmt = conn.prepare(
            r#"
                SELECT id, event_date, kind, label FROM calendar_events
                WHERE event_date = :event_date
                ORDER BY rowid ASC
                LIMIT 1
            "#,
        )?;

        let row = stmt
            .query_row(named_params! {":event_date": date.to_string()}, |row| {
                CalendarEventRow::try_from(row)
            })
            .optional()?;

        row.map(|row| row.into_event()).transpose()
    }

    pub fn delete(conn: &Connection, id: &str) -> AppResult<()> {
        let deleted = conn.execute("DELETE FROM calendar_events WHERE id = ?1", [id])?;
        if deleted == 0 {
            return Err(AppError::not_found());
        }
        Ok(())
    }
}
