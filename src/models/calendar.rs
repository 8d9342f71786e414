use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarEventKind {
    /// Suppresses workday status entirely; takes precedence over everything.
    Holiday,
    /// Forces workday status even when no schedule matches the weekday.
    ExtraWorkday,
}

impl CalendarEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalendarEventKind::Holiday => "holiday",
            CalendarEventKind::ExtraWorkday => "extra_workday",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "holiday" => Some(CalendarEventKind::Holiday),
            "extra_workday" => Some(CalendarEventKind::ExtraWorkday),
            _ => None,
        }
    }
}

/// Single-date override of the weekly schedule pattern. At most one event is
/// meaningful per date; on duplicates the first stored row wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub date: NaiveDate,
    pub kind: CalendarEventKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEventInput {
    pub date: NaiveDate,
    pub kind: CalendarEventKind,
    #[serde(default)]
    pub label: Option<String>,
}
