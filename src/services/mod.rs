pub mod alert_service;
pub mod attendance_service;
pub mod employee_service;
pub mod leave_service;
pub mod notification_service;
pub mod report_service;
pub mod schedule_service;
pub mod settings_service;
