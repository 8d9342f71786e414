use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::db::repositories::employee_repository::EmployeeRepository;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::employee::{
    EmployeeCreateInput, EmployeeRecord, EmployeeStatus, EmployeeUpdateInput,
};

const DEFAULT_ROLE: &str = "worker";

pub struct EmployeeService {
    db: DbPool,
}

impl EmployeeService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub fn create(&self, input: EmployeeCreateInput) -> AppResult<EmployeeRecord> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::validation("employee name must not be empty"));
        }

        let conn = self.db.get_connection()?;
        if EmployeeRepository::find_by_name(&conn, &name)?.is_some() {
            return Err(AppError::conflict(format!(
                "an employee named {name} already exists"
            )));
        }

        let record = EmployeeRecord {
            id: Uuid::new_v4().to_string(),
            name,
            role: input
                .role
                .filter(|role| !role.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_ROLE.to_string()),
            status: EmployeeStatus::Active,
            created_at: Utc::now().to_rfc3339(),
        };
        EmployeeRepository::insert(&conn, &record)?;

        info!(target: "app::employees", name = %record.name, "employee created");
        Ok(record)
    }

    /// Renaming changes the join key for *future* records only; historical
    /// attendance rows keep the old worker name.
    pub fn update(&self, id: &str, input: EmployeeUpdateInput) -> AppResult<EmployeeRecord> {
        let conn = self.db.get_connection()?;
        let mut record = EmployeeRepository::find_by_id(&conn, id)?.ok_or(AppError::NotFound)?;

        if let Some(name) = input.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(AppError::validation("employee name must not be empty"));
            }
            if name != record.name {
                info!(
                    target: "app::employees",
                    old = %record.name,
                    new = %name,
                    "employee renamed; historical records keep the old name"
                );
            }
            record.name = name;
        }
        if let Some(role) = input.role {
            record.role = role;
        }
        if let Some(status) = input.status {
            record.status = status;
        }

        EmployeeRepository::update(&conn, &record)?;
        Ok(record)
    }

    pub fn deactivate(&self, id: &str) -> AppResult<EmployeeRecord> {
        self.update(
            id,
            EmployeeUpdateInput {
                status: Some(EmployeeStatus::Inactive),
                ..EmployeeUpdateInput::default()
            },
        )
    }

    pub fn list(&self) -> AppResult<Vec<EmployeeRecord>> {
        self.db.with_connection(EmployeeRepository::list)
    }

    pub fn list_active(&self) -> AppResult<Vec<EmployeeRecord>> {
        self.db.with_connection(EmployeeRepository::list_active)
    }
}
