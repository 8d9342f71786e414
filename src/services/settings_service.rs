use chrono::{Local, NaiveDate};
use serde_json::json;
use tracing::{info, warn};

use crate::db::repositories::settings_repository::SettingsRepository;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::settings::{WorkshopConfig, WorkshopConfigUpdate};
use crate::utils::qr;

const KEY_WORKSHOP_CONFIG: &str = "workshop_config";

/// Owns the workshop configuration: geofence center and radius plus the QR
/// secret the daily check-in token is derived from.
pub struct SettingsService {
    db: DbPool,
}

impl SettingsService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Current workshop configuration. A missing or unreadable stored value
    /// degrades to the built-in default instead of failing the caller.
    pub fn workshop_config(&self) -> WorkshopConfig {
        let stored = self
            .db
            .with_connection(|conn| SettingsRepository::get(conn, KEY_WORKSHOP_CONFIG));

        match stored {
            Ok(Some(row)) => serde_json::from_str(&row.value).unwrap_or_else(|err| {
                warn!(target: "app::settings", error = %err, "corrupt workshop config, using defaults");
                WorkshopConfig::default()
            }),
            Ok(None) => WorkshopConfig::default(),
            Err(err) => {
                warn!(target: "app::settings", error = %err, "failed to read workshop config, using defaults");
                WorkshopConfig::default()
            }
        }
    }

    pub fn update_workshop_config(
        &self,
        update: WorkshopConfigUpdate,
    ) -> AppResult<WorkshopConfig> {
        let mut config = self.workshop_config();

        if let Some(center) = update.center {
            if !(-90.0..=90.0).contains(&center.latitude)
                || !(-180.0..=180.0).contains(&center.longitude)
            {
                return Err(AppError::validation_with_details(
                    "geofence center out of range",
                    json!({"latitude": center.latitude, "longitude": center.longitude}),
                ));
            }
            config.center = center;
        }

        if let Some(radius) = update.radius_meters {
            if !radius.is_finite() || radius <= 0.0 {
                return Err(AppError::validation("geofence radius must be positive"));
            }
            config.radius_meters = radius;
        }

        if let Some(secret) = update.qr_secret {
            if secret.trim().is_empty() {
                return Err(AppError::validation("QR secret must not be empty"));
            }
            config.qr_secret = secret;
        }

        let value = serde_json::to_string(&config)?;
        self.db
            .with_connection(|conn| SettingsRepository::upsert(conn, KEY_WORKSHOP_CONFIG, &value))?;

        info!(target: "app::settings", radius = config.radius_meters, "workshop config updated");
        Ok(config)
    }

    /// Token to render into the workshop QR code for the given date.
    pub fn qr_token_for(&self, date: NaiveDate) -> String {
        qr::daily_token(&self.workshop_config().qr_secret, date)
    }

    pub fn current_qr_token(&self) -> String {
        self.qr_token_for(Local::now().date_naive())
    }
}
