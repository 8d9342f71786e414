use std::convert::TryFrom;

use rusqlite::{named_params, Connection, OptionalExtension, Row};
use tracing::warn;

use crate::error::{AppError, AppResult};
use crate::models::employee::{EmployeeRecord, EmployeeStatus};

#[derive(Debug, Clone)]
pub struct EmployeeRow {
    pub id: String,
    pub name: String,
    pub role: String,
    pub status: String,
    pub created_at: String,
}

impl EmployeeRow {
    pub fn into_record(self) -> EmployeeRecord {
        let status = EmployeeStatus::parse(&self.status).unwrap_or_else(|| {
            warn!(target: "app::db", id = %self.id, status = %self.status, "unknown employee status, defaulting to active");
            EmployeeStatus::default()
        });

        EmployeeRecord {
            id: self.id,
            name: self.name,
            role: self.role,
            status,
            created_at: self.created_at,
        }
    }
}

impl TryFrom<&Row<'_>> for EmployeeRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            role: row.get("role")?,
            status: row.get("status")?,
            created_at: row.get("created_at")?,
        })
    }
}

pub struct EmployeeRepository;

impl EmployeeRepository {
    pub fn insert(conn: &Connection, record: &EmployeeRecord) -> AppResult<()> {
        conn.execute(
            r#"
                INSERT INTO employees (id, name, role, status, created_at)
                VALUES (:id, :name, :role, :status, :created_at)
            "#,
            named_params! {
                ":id": &record.id,
                ":name": &record.name,
                ":role": &record.role,
                ":status": record.status.as_str(),
                ":created_at": &record.created_at,
            },
        )?;

        Ok(())
    }

    pub fn update(conn: &Connection, record: &EmployeeRecord) -> AppResult<()> {
        let updated = conn.execute(
            r#"
                UPDATE employees
                SET name = :name, role = :role, status = :status
                WHERE id = :id
            "#,
            named_params! {
                ":id": &record.id,
                ":name": &record.name,
                ":role": &record.role,
                ":status": record.status.as_str(),
            },
        )?;

        if updated == 0 {
            return Err(AppError::not_found());
        }

        Ok(())
    }

    pub fn find_by_id(conn: &Connection, id: &str) -> AppResult<Option<EmployeeRecord>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, role, status, created_at FROM employees WHERE id = ?1",
        )?;

        let row = stmt
            .query_row([id], |row| EmployeeRow::try_from(row))
            .optional()?;

        Ok(row.map(|row| row.into_record()))
    }

    pub fn find_by_name(conn: &Connection, name: &str) -> AppResult<Option<EmployeeRecord>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, role, status, created_at FROM employees WHERE name = ?1 LIMIT 1",
        )?;

        let row = stmt
            .query_row([name], |row| EmployeeRow::try_from(row))
            .optional()?;

        Ok(row.map(|row| row.into_record()))
    }

    pub fn list(conn: &Connection) -> AppResult<Vec<EmployeeRecord>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, role, status, created_at FROM employees ORDER BY name ASC",
        )?;

        let rows = stmt
            .query_map([], |row| EmployeeRow::try_from(row))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows.into_iter().map(|row| row.into_record()).collect())
    }

    pub fn list_active(conn: &Connection) -> AppResult<Vec<EmployeeRecord>> {
        let mut stmt = conn.prepare(
            r#"
                SELECT id, name, role, status, created_at FROM employees
                WHERE status = 'active'
                ORDER BY name ASC
            "#,
        )?;

        let rows = stmt
            .query_map([], |row| EmployeeRow::try_from(row))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows.into_iter().map(|row| row.into_record()).collect())
    }
}
