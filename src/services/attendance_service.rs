use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::repositories::attendance_repository::AttendanceRepository;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::attendance::{
    AttendanceRecord, CheckEventInput, DaySession, DaySessionMap, RecordKind, VerificationMethod,
};
use crate::models::settings::GeoPoint;
use crate::services::settings_service::SettingsService;
use crate::utils::geo::within_geofence;
use crate::utils::qr;
use crate::utils::time::{local_date_of_ms, local_day_bounds_ms};

/// Records check events with location verification and reconstructs per-day
/// sessions from the raw event stream.
pub struct AttendanceService {
    db: DbPool,
    settings: Arc<SettingsService>,
}

impl AttendanceService {
    pub fn new(db: DbPool, settings: Arc<SettingsService>) -> Self {
        Self { db, settings }
    }

    /// Append one check event. GPS events are verified against the workshop
    /// geofence; QR events require the current daily token and are then
    /// always location-verified, whatever the reported coordinates say.
    /// The verification result is stored on the record and never recomputed.
    pub fn record_event(&self, input: CheckEventInput) -> AppResult<AttendanceRecord> {
        let worker_name = input.worker_name.trim().to_string();
        if worker_name.is_empty() {
            return Err(AppError::validation("worker name must not be empty"));
        }

        let timestamp_ms = input
            .timestamp_ms
            .unwrap_or_else(|| Utc::now().timestamp_millis());
        let config = self.settings.workshop_config();

        let location_verified = match input.verification_method {
            VerificationMethod::Gps => {
                let observed = GeoPoint {
                    latitude: input.latitude,
                    longitude: input.longitude,
                };
                within_geofence(observed, config.center, config.radius_meters)
            }
            VerificationMethod::Qr => {
                let date = local_date_of_ms(timestamp_ms)
                    .ok_or_else(|| AppError::validation("event timestamp out of range"))?;
                let token = input
                    .qr_token
                    .as_deref()
                    .ok_or_else(|| AppError::validation("QR check events require the scanned token"))?;
                if !qr::verify_token(&config.qr_secret, date, token) {
                    return Err(AppError::validation("stale or unknown QR token"));
                }
                true
            }
        };

        let record = AttendanceRecord {
            id: Uuid::new_v4().to_string(),
            worker_name,
            timestamp_ms,
            kind: input.kind,
            latitude: input.latitude,
            longitude: input.longitude,
            photo_url: input.photo_url,
            location_verified,
            verification_method: input.verification_method,
        };
        self.db
            .with_connection(|conn| AttendanceRepository::insert(conn, &record))?;

        info!(
            target: "app::attendance",
            worker = %record.worker_name,
            kind = record.kind.as_str(),
            method = record.verification_method.as_str(),
            verified = record.location_verified,
            "check event recorded"
        );
        Ok(record)
    }

    /// Whether a position lies inside the configured workshop geofence.
    pub fn validate_geofence(&self, observed: GeoPoint) -> bool {
        let config = self.settings.workshop_config();
        within_geofence(observed, config.center, config.radius_meters)
    }

    pub fn list_recent(&self, limit: Option<usize>) -> AppResult<Vec<AttendanceRecord>> {
        self.db
            .with_connection(|conn| AttendanceRepository::list_recent(conn, limit))
    }

    pub fn list_for_worker(
        &self,
        worker_name: &str,
        limit: Option<usize>,
    ) -> AppResult<Vec<AttendanceRecord>> {
        self.db
            .with_connection(|conn| AttendanceRepository::list_for_worker(conn, worker_name, limit))
    }

    /// Reconstructed day sessions for one worker over an inclusive local
    /// date range.
    pub fn day_sessions(
        &self,
        worker_name: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<DaySessionMap> {
        if start > end {
            return Err(AppError::validation("range start is after range end"));
        }
        let (lower_ms, upper_ms) = local_day_bounds_ms(start, end)
            .ok_or_else(|| AppError::validation("date range not representable in local time"))?;

        let records = self.db.with_connection(|conn| {
            AttendanceRepository::list_for_worker_between(conn, worker_name, lower_ms, upper_ms)
        })?;

        Ok(build_day_sessions(records))
    }
}

/// Group raw events into per-day sessions. The day's check-in is the first
/// CheckIn, the check-out the last CheckOut. A check-out at or before the
/// check-in contributes zero worked time (operator error or clock skew is
/// silently zeroed, not reported).
pub fn build_day_sessions(records: Vec<AttendanceRecord>) -> DaySessionMap {
    let mut sessions = DaySessionMap::new();

    for record in records {
        let Some(date) = local_date_of_ms(record.timestamp_ms) else {
            warn!(
                target: "app::attendance",
                id = %record.id,
                timestamp_ms = record.timestamp_ms,
                "record timestamp not representable in local time, skipping"
            );
            continue;
        };

        sessions
            .entry(date)
            .or_insert_with(|| DaySession {
                date,
                check_in: None,
                check_out: None,
                worked_ms: 0,
                records: Vec::new(),
            })
            .records
            .push(record);
    }

    for session in sessions.values_mut() {
        session
            .records
            .sort_by_key(|record| record.timestamp_ms);

        session.check_in = session
            .records
            .iter()
            .find(|record| record.kind == RecordKind::CheckIn)
            .cloned();
        session.check_out = session
            .records
            .iter()
            .rev()
            .find(|record| record.kind == RecordKind::CheckOut)
            .cloned();

        session.worked_ms = match (&session.check_in, &session.check_out) {
            (Some(check_in), Some(check_out))
                if check_out.timestamp_ms > check_in.timestamp_ms =>
            {
                check_out.timestamp_ms - check_in.timestamp_ms
            }
            _ => 0,
        };
    }

    sessions
}
