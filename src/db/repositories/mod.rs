pub mod attendance_repository;
pub mod calendar_repository;
pub mod employee_repository;
pub mod leave_repository;
pub mod notification_repository;
pub mod schedule_repository;
pub mod settings_repository;
