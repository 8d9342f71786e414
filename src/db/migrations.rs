use chrono::Utc;
use rusqlite::Connection;
use tracing::info;

use crate::error::AppResult;
use crate::models::settings::WorkshopConfig;

const USER_VERSION: i32 = 2;
const KEY_WORKSHOP_CONFIG: &str = "workshop_config";

pub fn run(conn: &Connection) -> AppResult<()> {
    // Ensure migration history table exists
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS migration_history (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at TEXT NOT NULL,
            rollback_sql TEXT
        );
        "#,
    )?;

    let mut current_version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    if current_version < 1 {
        info!(target: "app::db", version = current_version, "running migration v1");
        migrate_to_v1(conn)?;
        current_version = 1;
        conn.execute(&format!("PRAGMA user_version = {}", current_version), [])?;
        record_migration(conn, 1, "Seed default workshop configuration", None)?;
    }

    if current_version < 2 {
        info!(target: "app::db", version = current_version, "running migration v2");
        migrate_to_v2(conn)?;
        current_version = 2;
        conn.execute(&format!("PRAGMA user_version = {}", current_version), [])?;
        record_migration(
            conn,
            2,
            "Backfill structured idempotency keys on absence notifications",
            None,
        )?;
    }

    debug_assert!(current_version == USER_VERSION);

    Ok(())
}

fn record_migration(
    conn: &Connection,
    version: i32,
    description: &str,
    rollback_sql: Option<&str>,
) -> AppResult<()> {
    conn.execute(
        r#"
        INSERT OR IGNORE INTO migration_history (version, description, applied_at, rollback_sql)
        VALUES (?1, ?2, ?3, ?4)
        "#,
        rusqlite::params![version, description, Utc::now().to_rfc3339(), rollback_sql],
    )?;
    Ok(())
}

/// Seed the workshop configuration with a fresh QR secret so QR check-ins
/// work out of the box.
fn migrate_to_v1(conn: &Connection) -> AppResult<()> {
    let existing: i64 = conn.query_row(
        "SELECT COUNT(*) FROM app_settings WHERE key = ?1",
        [KEY_WORKSHOP_CONFIG],
        |row| row.get(0),
    )?;
    if existing > 0 {
        return Ok(());
    }

    let config = WorkshopConfig {
        qr_secret: uuid::Uuid::new_v4().to_string(),
        ..WorkshopConfig::default()
    };
    let value = serde_json::to_string(&config)?;

    conn.execute(
        "INSERT INTO app_settings (key, value) VALUES (?1, ?2)",
        rusqlite::params![KEY_WORKSHOP_CONFIG, value],
    )?;

    Ok(())
}

/// Older absence alerts were matched by message substring and carried no
/// event date; give them one so the structured dedup key applies uniformly.
fn migrate_to_v2(conn: &Connection) -> AppResult<()> {
    conn.execute(
        r#"
        UPDATE notifications
        SET event_date = created_on
        WHERE kind = 'absence_alert' AND event_date IS NULL
        "#,
        [],
    )?;
    Ok(())
}
