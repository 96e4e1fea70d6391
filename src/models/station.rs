use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StationMetadata {
    #[validate(length(min = 1))]
    pub station_id: String,

    pub name: Option<String>,

    #[validate(range(exclusive_min = 0.0))]
    pub basin_area_km2: Option<f64>,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
}

impl StationMetadata {
    pub fn new(station_id: impl Into<String>, basin_area_km2: Option<f64>) -> Self {
        Self {
            station_id: station_id.into(),
            name: None,
            basin_area_km2,
            latitude: None,
            longitude: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    /// Basin area usable for yield conversion: finite and positive.
    pub fn usable_basin_area(&self) -> Option<f64> {
        self.basin_area_km2.filter(|a| a.is_finite() && *a > 0.0)
    }
}
