use std::convert::TryFrom;

use chrono::NaiveDate;
use rusqlite::{named_params, Connection, Row};

use crate::error::{AppError, AppResult};
use crate::models::notification::{Notification, NotificationKind};

#[derive(Debug, Clone)]
pub struct NotificationRow {
    pub id: String,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub subject: Option<String>,
    pub event_date: Option<String>,
    pub created_on: String,
    pub is_read: bool,
}

impl NotificationRow {
    pub fn into_notification(self) -> AppResult<Notification> {
        let kind = NotificationKind::parse(&self.kind).ok_or_else(|| {
            AppError::validation(format!("unknown notification kind: {}", self.kind))
        })?;
        let created_on = parse_date(&self.created_on)?;
        let event_date = self.event_date.as_deref().map(parse_date).transpose()?;

        Ok(Notification {
            id: self.id,
            kind,
            title: self.title,
            message: self.message,
            subject: self.subject,
            event_date,
            created_on,
            read: self.is_read,
        })
    }
}

fn parse_date(value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|err| AppError::validation(format!("invalid notification date {value}: {err}")))
}

impl TryFrom<&Row<'_>> for NotificationRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            kind: row.get("kind")?,
            title: row.get("title")?,
            message: row.get("message")?,
            subject: row.get("subject")?,
            event_date: row.get("event_date")?,
            created_on: row.get("created_on")?,
            is_read: row.get("is_read")?,
        })
    }
}

const SELECT_COLUMNS: &str =
    "id, kind, title, message, subject, event_date, created_on, is_read";

pub struct NotificationRepository;

impl NotificationRepository {
    pub fn insert(conn: &Connection, notification: &Notification) -> AppResult<()> {
        conn.execute(
            r#"
                INSERT INTO notifications (
                    id, kind, title, message, subject, event_date, created_on, is_read, created_at
                ) VALUES (
                    :id, :kind, :title, :message, :subject, :event_date, :created_on, :is_read,
                    :created_at
                )
            "#,
            named_params! {
                ":id": &notification.id,
                ":kind": notification.kind.as_str(),
                ":title": &notification.title,
                ":message": &notification.message,
                ":subject": &notification.subject,
                ":event_date": notification.event_date.map(|d| d.to_string()),
                ":created_on": notification.created_on.to_string(),
                ":is_read": notification.read,
                ":created_at": chrono::Utc::now().to_rfc3339(),
            },
        )?;

        Ok(())
    }

    /// Newest entries first.
    pub fn list_recent(conn: &Connection, limit: Option<usize>) -> AppResult<Vec<Notification>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM notifications ORDER BY created_at DESC LIMIT :limit"
        );
        let mut stmt = conn.prepare(&sql)?;

        let rows = stmt
            .query_map(
                named_params! {":limit": limit.map(|v| v as i64).unwrap_or(-1)},
                |row| NotificationRow::try_from(row),
            )?
            .map(|row| {
                row.map_err(AppError::from)
                    .and_then(|row| row.into_notification())
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(rows)
    }

    pub fn mark_read(conn: &Connection, id: &str) -> AppResult<()> {
        let updated = conn.execute("UPDATE notifications SET is_read = 1 WHERE id = ?1", [id])?;
        if updated == 0 {
            return Err(AppError::not_found());
        }
        Ok(())
    }

    pub fn unread_count(conn: &Connection) -> AppResult<usize> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM notifications WHERE is_read = 0",
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Exact match on the structured idempotency key. Read-then-write only;
    /// racing writers can still double-emit.
    pub fn exists_for(
        conn: &Connection,
        kind: NotificationKind,
        subject: &str,
        event_date: NaiveDate,
        created_on: NaiveDate,
    ) -> AppResult<bool> {
        let count: i64 = conn.query_row(
            r#"
                SELECT COUNT(*) FROM notifications
                WHERE kind = :kind
                  AND subject = :subject
                  AND event_date = :event_date
                  AND created_on = :created_on
            "#,
            named_params! {
                ":kind": kind.as_str(),
                ":subject": subject,
                ":event_date": event_date.to_string(),
                ":created_on": created_on.to_string(),
            },
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }
}
