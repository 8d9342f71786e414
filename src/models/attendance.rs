use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    CheckIn,
    CheckOut,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::CheckIn => "check_in",
            RecordKind::CheckOut => "check_out",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "check_in" => Some(RecordKind::CheckIn),
            "check_out" => Some(RecordKind::CheckOut),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMethod {
    Gps,
    Qr,
}

impl VerificationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationMethod::Gps => "gps",
            VerificationMethod::Qr => "qr",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "gps" => Some(VerificationMethod::Gps),
            "qr" => Some(VerificationMethod::Qr),
            _ => None,
        }
    }
}

/// One observed check event. Immutable once stored; only appended and read.
/// `location_verified` is computed at creation time and never recomputed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: String,
    pub worker_name: String,
    pub timestamp_ms: i64,
    pub kind: RecordKind,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub location_verified: bool,
    pub verification_method: VerificationMethod,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckEventInput {
    pub worker_name: String,
    pub kind: RecordKind,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub photo_url: Option<String>,
    pub verification_method: VerificationMethod,
    /// Payload scanned from the workshop QR code; required for QR check-ins.
    #[serde(default)]
    pub qr_token: Option<String>,
    /// Event time override; defaults to the current wall clock.
    #[serde(default)]
    pub timestamp_ms: Option<i64>,
}

/// Per-day reconstruction of a worker's raw events: the day's check-in is the
/// first CheckIn, the check-out the last CheckOut, and the worked duration is
/// zero unless both exist with the check-out strictly after the check-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySession {
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_in: Option<AttendanceRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_out: Option<AttendanceRecord>,
    pub worked_ms: i64,
    pub records: Vec<AttendanceRecord>,
}

pub type DaySessionMap = BTreeMap<NaiveDate, DaySession>;
