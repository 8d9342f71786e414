use std::convert::TryFrom;

use rusqlite::{named_params, Connection, Row};

use crate::error::{AppError, AppResult};
use crate::models::attendance::{AttendanceRecord, RecordKind, VerificationMethod};

#[derive(Debug, Clone)]
pub struct AttendanceRow {
    pub id: String,
    pub worker_name: String,
    pub timestamp_ms: i64,
    pub kind: String,
    pub latitude: f64,
    pub longitude: f64,
    pub photo_url: Option<String>,
    pub location_verified: bool,
    pub verification_method: String,
}

impl AttendanceRow {
    pub fn into_record(self) -> AppResult<AttendanceRecord> {
        let kind = RecordKind::parse(&self.kind).ok_or_else(|| {
            AppError::validation(format!("unknown attendance record kind: {}", self.kind))
        })?;
        let verification_method = VerificationMethod::parse(&self.verification_method)
            .ok_or_else(|| {
                AppError::validation(format!(
                    "unknown verification method: {}",
                    self.verification_method
                ))
            })?;

        Ok(AttendanceRecord {
            id: self.id,
            worker_name: self.worker_name,
            timestamp_ms: self.timestamp_ms,
            kind,
            latitude: self.latitude,
            longitude: self.longitude,
            photo_url: self.photo_url,
            location_verified: self.location_verified,
            verification_method,
        })
    }
}

impl TryFrom<&Row<'_>> for AttendanceRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            worker_name: row.get("worker_name")?,
            timestamp_ms: row.get("timestamp_ms")?,
            kind: row.get("kind")?,
            latitude: row.get("latitude")?,
            longitude: row.get("longitude")?,
            photo_url: row.get("photo_url")?,
            location_verified: row.get("location_verified")?,
            verification_method: row.get("verification_method")?,
        })
    }
}

const SELECT_COLUMNS: &str = r#"
    id,
    worker_name,
    timestamp_ms,
    kind,
    latitude,
    longitude,
    photo_url,
    location_verified,
    verification_method
"#;

pub struct AttendanceRepository;

impl AttendanceRepository {
    pub fn insert(conn: &Connection, record: &AttendanceRecord) -> AppResult<()> {
        conn.execute(
            r#"
                INSERT INTO attendance_records (
                    id,
                    worker_name,
                    timestamp_ms,
                    kind,
                    latitude,
                    longitude,
                    photo_url,
                    location_verified,
                    verification_method
                ) VALUES (
                    :id,
                    :worker_name,
                    :timestamp_ms,
                    :kind,
                    :latitude,
                    :longitude,
                    :photo_url,
                    :location_verified,
                    :verification_method
                )
            "#,
            named_params! {
                ":id": &record.id,
                ":worker_name": &record.worker_name,
                ":timestamp_ms": record.timestamp_ms,
                ":kind": record.kind.as_str(),
                ":latitude": record.latitude,
                ":longitude": record.longitude,
                ":photo_url": &record.photo_url,
                ":location_verified": record.location_verified,
                ":verification_method": record.verification_method.as_str(),
            },
        )?;

        Ok(())
    }

    /// Most recent records first, across all workers.
    pub fn list_recent(conn: &Connection, limit: Option<usize>) -> AppResult<Vec<AttendanceRecord>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM attendance_records ORDER BY timestamp_ms DESC LIMIT :limit"
        );
        let mut stmt = conn.prepare(&sql)?;

        let rows = stmt
            .query_map(
                named_params! {":limit": limit.map(|v| v as i64).unwrap_or(-1)},
                |row| AttendanceRow::try_from(row),
            )?
            .map(|row| {
                row.map_err(AppError::from)
                    .and_then(|row| row.into_record())
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(rows)
    }

    pub fn list_for_worker(
        conn: &Connection,
        worker_name: &str,
        limit: Option<usize>,
    ) -> AppResult<Vec<AttendanceRecord>> {
        let sql = format!(
            r#"
                SELECT {SELECT_COLUMNS} FROM attendance_records
                WHERE worker_name = :worker_name
                ORDER BY timestamp_ms DESC
                LIMIT :limit
            "#
        );
        let mut stmt = conn.prepare(&sql)?;

        let rows = stmt
            .query_map(
                named_params! {
                    ":worker_name": worker_name,
                    ":limit": limit.map(|v| v as i64).unwrap_or(-1),
                },
                |row| AttendanceRow::try_from(row),
            )?
            .map(|row| {
                row.map_err(AppError::from)
                    .and_then(|row| row.into_record())
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(rows)
    }

    /// Records for one worker inside [lower_ms, upper_ms), oldest first.
    pub fn list_for_worker_between(
        conn: &Connection,
        worker_name: &str,
        lower_ms: i64,
        upper_ms: i64,
    ) -> AppResult<Vec<AttendanceRecord>> {
        let sql = format!(
            r#"
                SELECT {SELECT_COLUMNS} FROM attendance_records
                WHERE worker_name = :worker_name
                  AND timestamp_ms >= :lower_ms
                  AND timestamp_ms < :upper_ms
                ORDER BY timestamp_ms ASC
            "#
        );
        let mut stmt = conn.prepare(&sql)?;

        let rows = stmt
            .query_map(
                named_params! {
                    ":worker_name": worker_name,
                    ":lower_ms": lower_ms,
                    ":upper_ms": upper_ms,
                },
                |row| AttendanceRow::try_from(row),
            )?
            .map(|row| {
                row.map_err(AppError::from)
                    .and_then(|row| row.into_record())
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(rows)
    }
}
