use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Workshop configuration persisted under the `workshop_config` settings key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkshopConfig {
    pub center: GeoPoint,
    pub radius_meters: f64,
    pub qr_secret: String,
}

impl Default for WorkshopConfig {
    fn default() -> Self {
        Self {
            center: GeoPoint {
                latitude: 0.0,
                longitude: 0.0,
            },
            radius_meters: 100.0,
            qr_secret: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkshopConfigUpdate {
    #[serde(default)]
    pub center: Option<GeoPoint>,
    #[serde(default)]
    pub radius_meters: Option<f64>,
    #[serde(default)]
    pub qr_secret: Option<String>,
}
