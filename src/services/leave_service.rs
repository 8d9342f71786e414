use chrono::{Local, NaiveDate, Utc};
use tracing::info;
use uuid::Uuid;

use crate::db::repositories::leave_repository::LeaveRepository;
use crate::db::repositories::notification_repository::NotificationRepository;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::leave::{LeaveRequest, LeaveRequestInput, LeaveStatus};
use crate::models::notification::{Notification, NotificationKind};

pub struct LeaveService {
    db: DbPool,
}

impl LeaveService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Submit a new leave request; lands as Pending and notifies the feed.
    pub fn submit(&self, input: LeaveRequestInput) -> AppResult<LeaveRequest> {
        let employee_name = input.employee_name.trim().to_string();
        if employee_name.is_empty() {
            return Err(AppError::validation("employee name must not be empty"));
        }
        if input.end_date < input.start_date {
            return Err(AppError::validation("leave end date is before its start date"));
        }

        let request = LeaveRequest {
            id: Uuid::new_v4().to_string(),
            employee_name,
            start_date: input.start_date,
            end_date: input.end_date,
            status: LeaveStatus::Pending,
            reason: input.reason,
            created_at: Utc::now().to_rfc3339(),
        };

        let conn = self.db.get_connection()?;
        LeaveRepository::insert(&conn, &request)?;
        NotificationRepository::insert(
            &conn,
            &Notification {
                id: Uuid::new_v4().to_string(),
                kind: NotificationKind::LeaveRequested,
                title: "Leave request".to_string(),
                message: format!(
                    "{} requested leave from {} to {}",
                    request.employee_name, request.start_date, request.end_date
                ),
                subject: Some(request.employee_name.clone()),
                event_date: Some(request.start_date),
                created_on: Local::now().date_naive(),
                read: false,
            },
        )?;

        info!(
            target: "app::leaves",
            employee = %request.employee_name,
            start = %request.start_date,
            end = %request.end_date,
            "leave request submitted"
        );
        Ok(request)
    }

    /// Decide a pending request. Each request is decided at most once; a
    /// second decision is a conflict.
    pub fn decide(&self, id: &str, approve: bool) -> AppResult<LeaveRequest> {
        let conn = self.db.get_connection()?;
        let mut request = LeaveRepository::find_by_id(&conn, id)?.ok_or(AppError::NotFound)?;

        if request.status != LeaveStatus::Pending {
            return Err(AppError::conflict(format!(
                "leave request is already {}",
                request.status.as_str()
            )));
        }

        let status = if approve {
            LeaveStatus::Approved
        } else {
            LeaveStatus::Rejected
        };
        LeaveRepository::update_status(&conn, id, status)?;
        request.status = status;

        NotificationRepository::insert(
            &conn,
            &Notification {
                id: Uuid::new_v4().to_string(),
                kind: NotificationKind::LeaveDecided,
                title: "Leave request decided".to_string(),
                message: format!(
                    "Leave for {} from {} to {} was {}",
                    request.employee_name,
                    request.start_date,
                    request.end_date,
                    status.as_str()
                ),
                subject: Some(request.employee_name.clone()),
                event_date: Some(request.start_date),
                created_on: Local::now().date_naive(),
                read: false,
            },
        )?;

        info!(
            target: "app::leaves",
            employee = %request.employee_name,
            status = status.as_str(),
            "leave request decided"
        );
        Ok(request)
    }

    pub fn list(&self) -> AppResult<Vec<LeaveRequest>> {
        self.db.with_connection(LeaveRepository::list)
    }

    pub fn list_for_employee(&self, employee_name: &str) -> AppResult<Vec<LeaveRequest>> {
        self.db
            .with_connection(|conn| LeaveRepository::list_for_employee(conn, employee_name))
    }

    /// Approved leave windows for an employee, as inclusive date pairs.
    pub fn approved_windows(&self, employee_name: &str) -> AppResult<Vec<(NaiveDate, NaiveDate)>> {
        let approved = self
            .db
            .with_connection(|conn| LeaveRepository::list_approved_for_employee(conn, employee_name))?;

        Ok(approved
            .into_iter()
            .map(|request| (request.start_date, request.end_date))
            .collect())
    }
}

/// Whether any approved window covers the date (inclusive on both ends).
pub fn covers_date(windows: &[(NaiveDate, NaiveDate)], date: NaiveDate) -> bool {
    windows.iter().any(|(start, end)| *start <= date && date <= *end)
}
