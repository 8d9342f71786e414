use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    AbsenceAlert,
    MissingCheckout,
    LeaveRequested,
    LeaveDecided,
    General,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::AbsenceAlert => "absence_alert",
            NotificationKind::MissingCheckout => "missing_checkout",
            NotificationKind::LeaveRequested => "leave_requested",
            NotificationKind::LeaveDecided => "leave_decided",
            NotificationKind::General => "general",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "absence_alert" => Some(NotificationKind::AbsenceAlert),
            "missing_checkout" => Some(NotificationKind::MissingCheckout),
            "leave_requested" => Some(NotificationKind::LeaveRequested),
            "leave_decided" => Some(NotificationKind::LeaveDecided),
            "general" => Some(NotificationKind::General),
            _ => None,
        }
    }
}

/// Append-only feed entry. Duplicate suppression matches the structured
/// (kind, subject, event_date, created_on) tuple exactly; the check is
/// read-then-write, so concurrent writers remain best-effort.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    /// Worker the notification is about, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Calendar date the condition refers to (may differ from `created_on`,
    /// e.g. a missing checkout flagged the morning after).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_date: Option<NaiveDate>,
    pub created_on: NaiveDate,
    pub read: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationInput {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub event_date: Option<NaiveDate>,
}
