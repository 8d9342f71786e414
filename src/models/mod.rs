pub mod attendance;
pub mod calendar;
pub mod employee;
pub mod leave;
pub mod notification;
pub mod report;
pub mod schedule;
pub mod settings;
