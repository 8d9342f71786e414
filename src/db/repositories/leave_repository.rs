use std::convert::TryFrom;

use chrono::NaiveDate;
use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::error::{AppError, AppResult};
use crate::models::leave::{LeaveRequest, LeaveStatus};

#[derive(Debug, Clone)]
pub struct LeaveRow {
    pub id: String,
    pub employee_name: String,
    pub start_date: String,
    pub end_date: String,
    pub status: String,
    pub reason: Option<String>,
    pub created_at: String,
}

impl LeaveRow {
    pub fn into_request(self) -> AppResult<LeaveRequest> {
        let start_date = parse_date(&self.start_date)?;
        let end_date = parse_date(&self.end_date)?;
        let status = LeaveStatus::parse(&self.status).ok_or_else(|| {
            AppError::validation(format!("unknown leave status: {}", self.status))
        })?;

        Ok(LeaveRequest {
            id: self.id,
            employee_name: self.employee_name,
            start_date,
            end_date,
            status,
            reason: self.reason,
            created_at: self.created_at,
        })
    }
}

fn parse_date(value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|err| AppError::validation(format!("invalid leave date {value}: {err}")))
}

impl TryFrom<&Row<'_>> for LeaveRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            employee_name: row.get("employee_name")?,
            start_date: row.get("start_date")?,
            end_date: row.get("end_date")?,
            status: row.get("status")?,
            reason: row.get("reason")?,
            created_at: row.get("created_at")?,
        })
    }
}

const SELECT_COLUMNS: &str =
    "id, employee_name, start_date, end_date, status, reason, created_at";

pub struct LeaveRepository;

impl LeaveRepository {
    pub fn insert(conn: &Connection, request: &LeaveRequest) -> AppResult<()> {
        conn.execute(
            r#"
                INSERT INTO leave_requests (
                    id, employee_name, start_date, end_date, status, reason, created_at
                ) VALUES (
                    :id, :employee_name, :start_date, :end_date, :status, :reason, :created_at
                )
            "#,
            named_params! {
                ":id": &request.id,
                ":employee_name": &request.employee_name,
                ":start_date": request.start_date.to_string(),
                ":end_date": request.end_date.to_string(),
                ":status": request.status.as_str(),
                ":reason": &request.reason,
                ":created_at": &request.created_at,
            },
        )?;

        Ok(())
    }

    pub fn find_by_id(conn: &Connection, id: &str) -> AppResult<Option<LeaveRequest>> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM leave_requests WHERE id = ?1");
        let mut stmt = conn.prepare(&sql)?;

        let row = stmt
            .query_row([id], |row| LeaveRow::try_from(row))
            .optional()?;

        row.map(|row| row.into_request()).transpose()
    }

    pub fn list(conn: &Connection) -> AppResult<Vec<LeaveRequest>> {
        let sql =
            format!("SELECT {SELECT_COLUMNS} FROM leave_requests ORDER BY created_at DESC");
        let mut stmt = conn.prepare(&sql)?;

        let rows = stmt
            .query_map([], |row| LeaveRow::try_from(row))?
            .map(|row| {
                row.map_err(AppError::from)
                    .and_then(|row| row.into_request())
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(rows)
    }

    pub fn list_for_employee(
        conn: &Connection,
        employee_name: &str,
    ) -> AppResult<Vec<LeaveRequest>> {
        let sql = format!(
            r#"
                SELECT {SELECT_COLUMNS} FROM leave_requests
                WHERE employee_name = :employee_name
                ORDER BY created_at DESC
            "#
        );
        let mut stmt = conn.prepare(&sql)?;

        let rows = stmt
            .query_map(named_params! {":employee_name": employee_name}, |row| {
                LeaveRow::try_from(row)
            })?
            .map(|row| {
                row.map_err(AppError::from)
                    .and_then(|row| row.into_request())
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(rows)
    }

    pub fn list_approved_for_employee(
        conn: &Connection,
        employee_name: &str,
    ) -> AppResult<Vec<LeaveRequest>> {
        let sql = format!(
            r#"
                SELECT {SELECT_COLUMNS} FROM leave_requests
                WHERE employee_name = :employee_name AND status = 'approved'
                ORDER BY start_date ASC
            "#
        );
        let mut stmt = conn.prepare(&sql)?;

        let rows = stmt
            .query_map(named_params! {":employee_name": employee_name}, |row| {
                LeaveRow::try_from(row)
            })?
            .map(|row| {
                row.map_err(AppError::from)
                    .and_then(|row| row.into_request())
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(rows)
    }

    pub fn update_status(conn: &Connection, id: &str, status: LeaveStatus) -> AppResult<()> {
        let updated = conn.execute(
            "UPDATE leave_requests SET status = :status WHERE id = :id",
            named_params! {":id": id, ":status": status.as_str()},
        )?;

        if updated == 0 {
            return Err(AppError::not_found());
        }

        Ok(())
    }
}
