use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Per-day classification verdict. Presence always wins: a day with at least
/// one record is never Absent, OnLeave, Holiday, or NonWorkday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayVerdict {
    Present,
    Late,
    Absent,
    OnLeave,
    Holiday,
    NonWorkday,
}

impl DayVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            DayVerdict::Present => "present",
            DayVerdict::Late => "late",
            DayVerdict::Absent => "absent",
            DayVerdict::OnLeave => "on_leave",
            DayVerdict::Holiday => "holiday",
            DayVerdict::NonWorkday => "non_workday",
        }
    }

    pub fn counts_as_present(&self) -> bool {
        matches!(self, DayVerdict::Present | DayVerdict::Late)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyAttendance {
    pub date: NaiveDate,
    pub verdict: DayVerdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_in_ms: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_out_ms: Option<i64>,
    pub worked_ms: i64,
}

/// Range roll-up for one worker; `total_hours` carries the one-decimal
/// display rounding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceStats {
    pub worker_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days_present: u32,
    pub days_absent: u32,
    pub late_count: u32,
    pub total_hours: f64,
    pub overtime_hours: f64,
    pub attendance_score: i64,
    pub days: Vec<DailyAttendance>,
}

/// Month roll-up; hour totals are whole hours, the second rounding call site.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    pub worker_name: String,
    pub year: i32,
    pub month: u32,
    pub days_present: u32,
    pub days_absent: u32,
    pub late_count: u32,
    pub total_hours: i64,
    pub overtime_hours: i64,
    pub attendance_score: i64,
}
