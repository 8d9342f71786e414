use chrono::Local;
use uuid::Uuid;

use crate::db::repositories::notification_repository::NotificationRepository;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::notification::{Notification, NotificationInput};

/// Read side of the notification feed plus a generic emit for callers that
/// do not need dedup (the alerting engine inserts its own guarded entries).
pub struct NotificationService {
    db: DbPool,
}

impl NotificationService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub fn emit(&self, input: NotificationInput) -> AppResult<Notification> {
        let notification = Notification {
            id: Uuid::new_v4().to_string(),
            kind: input.kind,
            title: input.title,
            message: input.message,
            subject: input.subject,
            event_date: input.event_date,
            created_on: Local::now().date_naive(),
            read: false,
        };

        self.db
            .with_connection(|conn| NotificationRepository::insert(conn, &notification))?;
        Ok(notification)
    }

    pub fn list(&self, limit: Option<usize>) -> AppResult<Vec<Notification>> {
        self.db
            .with_connection(|conn| NotificationRepository::list_recent(conn, limit))
    }

    pub fn mark_read(&self, id: &str) -> AppResult<()> {
        self.db
            .with_connection(|conn| NotificationRepository::mark_read(conn, id))
    }

    pub fn unread_count(&self) -> AppResult<usize> {
        self.db.with_connection(NotificationRepository::unread_count)
    }
}
