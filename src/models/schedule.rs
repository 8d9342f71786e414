use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single shift window in local wall-clock time ("HH:MM").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftPeriod {
    pub start: String,
    pub end: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// A named set of shifts applied on a set of weekdays. Weekdays use an
/// integer index (0 = Monday .. 6 = Sunday); display names belong to the UI
/// boundary. Overwritten in place by id, no history kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkSchedule {
    pub id: String,
    pub name: String,
    pub shifts: Vec<ShiftPeriod>,
    pub weekdays: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkScheduleInput {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub shifts: Vec<ShiftPeriod>,
    pub weekdays: Vec<u8>,
}

/// Resolution of one calendar date against schedules and calendar events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayPlan {
    pub date: NaiveDate,
    pub workday: bool,
    pub holiday: bool,
    /// Shift start times as minutes since local midnight, in schedule order.
    pub shift_starts: Vec<i64>,
    pub shifts: Vec<ShiftPeriod>,
}
