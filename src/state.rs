use std::sync::Arc;

use crate::db::DbPool;
use crate::error::AppResult;
use crate::services::alert_service::AlertService;
use crate::services::attendance_service::AttendanceService;
use crate::services::employee_service::EmployeeService;
use crate::services::leave_service::LeaveService;
use crate::services::notification_service::NotificationService;
use crate::services::report_service::ReportService;
use crate::services::schedule_service::ScheduleService;
use crate::services::settings_service::SettingsService;

/// Service container wired over one shared pool. Cloning is cheap; all
/// clones share the same services and the same alert job.
#[derive(Clone)]
pub struct AppState {
    db_pool: DbPool,
    attendance_service: Arc<AttendanceService>,
    employee_service: Arc<EmployeeService>,
    schedule_service: Arc<ScheduleService>,
    leave_service: Arc<LeaveService>,
    notification_service: Arc<NotificationService>,
    report_service: Arc<ReportService>,
    settings_service: Arc<SettingsService>,
    alert_service: Arc<AlertService>,
}

impl AppState {
    pub fn new(db_pool: DbPool) -> AppResult<Self> {
        // Run schema setup and migrations once up front so the first
        // caller does not pay for them.
        db_pool.get_connection()?;

        let settings_service = Arc::new(SettingsService::new(db_pool.clone()));
        let attendance_service = Arc::new(AttendanceService::new(
            db_pool.clone(),
            Arc::clone(&settings_service),
        ));
        let employee_service = Arc::new(EmployeeService::new(db_pool.clone()));
        let schedule_service = Arc::new(ScheduleService::new(db_pool.clone()));
        let leave_service = Arc::new(LeaveService::new(db_pool.clone()));
        let notification_service = Arc::new(NotificationService::new(db_pool.clone()));
        let report_service = Arc::new(ReportService::new(db_pool.clone()));
        let alert_service = Arc::new(AlertService::new(db_pool.clone()));

        Ok(Self {
            db_pool,
            attendance_service,
            employee_service,
            schedule_service,
            leave_service,
            notification_service,
            report_service,
            settings_service,
            alert_service,
        })
    }

    /// Start the periodic alert sweep. Separate from construction so
    /// embedders and tests can drive `alerts().run_checks()` themselves.
    pub fn start_alert_job(&self) -> AppResult<()> {
        self.alert_service.ensure_alert_job()
    }

    pub fn shutdown(&self) {
        self.alert_service.shutdown();
    }

    pub fn db(&self) -> &DbPool {
        &self.db_pool
    }

    pub fn attendance(&self) -> Arc<AttendanceService> {
        Arc::clone(&self.attendance_service)
    }

    pub fn employees(&self) -> Arc<EmployeeService> {
        Arc::clone(&self.employee_service)
    }

    pub fn schedules(&self) -> Arc<ScheduleService> {
        Arc::clone(&self.schedule_service)
    }

    pub fn leaves(&self) -> Arc<LeaveService> {
        Arc::clone(&self.leave_service)
    }

    pub fn notifications(&self) -> Arc<NotificationService> {
        Arc::clone(&self.notification_service)
    }

    pub fn reports(&self) -> Arc<ReportService> {
        Arc::clone(&self.report_service)
    }

    pub fn settings(&self) -> Arc<SettingsService> {
        Arc::clone(&self.settings_service)
    }

    pub fn alerts(&self) -> Arc<AlertService> {
        Arc::clone(&self.alert_service)
    }
}
