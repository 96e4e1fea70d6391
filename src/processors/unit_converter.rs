use crate::config::StatsConfig;
use crate::error::{ProcessingError, Result};
use crate::models::StationMetadata;
use crate::utils::constants::{MM_PER_METRE, SECONDS_PER_DAY, SQ_METRES_PER_SQ_KM};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How daily rates are expressed before accumulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FlowUnits {
    /// Plain running sum of the input values.
    Raw,
    /// Cubic metres: rate (m³/s) x seconds per day.
    Volume,
    /// Millimetres of depth over the basin.
    Yield { basin_area_km2: f64 },
}

impl FlowUnits {
    pub fn label(&self) -> &'static str {
        match self {
            FlowUnits::Raw => "Cumulative Flow",
            FlowUnits::Volume => "Cumulative Volume (m3)",
            FlowUnits::Yield { .. } => "Cumulative Yield (mm)",
        }
    }
}

/// Source of basin areas for stations without an explicit override.
pub trait BasinAreaLookup: Sync {
    fn basin_area(&self, station_id: &str) -> Option<f64>;
}

impl BasinAreaLookup for HashMap<String, StationMetadata> {
    fn basin_area(&self, station_id: &str) -> Option<f64> {
        self.get(station_id).and_then(|s| s.usable_basin_area())
    }
}

impl BasinAreaLookup for HashMap<String, f64> {
    fn basin_area(&self, station_id: &str) -> Option<f64> {
        self.get(station_id).copied()
    }
}

/// Lookup that never resolves anything.
pub struct NoMetadata;

impl BasinAreaLookup for NoMetadata {
    fn basin_area(&self, _station_id: &str) -> Option<f64> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitConverter {
    units: FlowUnits,
}

impl UnitConverter {
    pub fn new(units: FlowUnits) -> Self {
        Self { units }
    }

    pub fn volume() -> Self {
        Self::new(FlowUnits::Volume)
    }

    pub fn raw() -> Self {
        Self::new(FlowUnits::Raw)
    }

    pub fn yield_mm(basin_area_km2: f64) -> Result<Self> {
        if !basin_area_km2.is_finite() || basin_area_km2 <= 0.0 {
            return Err(ProcessingError::InvalidConfig(format!(
                "Basin area {} must be positive",
                basin_area_km2
            )));
        }
        Ok(Self::new(FlowUnits::Yield { basin_area_km2 }))
    }

    /// Pick the converter for a station, resolving its basin area in yield mode.
    ///
    /// Precedence: per-station override, global `basin_area`, station metadata.
    pub fn for_station(
        station_id: &str,
        config: &StatsConfig,
        metadata: &dyn BasinAreaLookup,
    ) -> Result<Self> {
        if !config.use_yield {
            return Ok(Self::volume());
        }

        let area = config
            .basin_areas
            .get(station_id)
            .copied()
            .or(config.basin_area)
            .or_else(|| metadata.basin_area(station_id))
            .filter(|a| a.is_finite() && *a > 0.0)
            .ok_or_else(|| ProcessingError::MissingBasinArea {
                station_id: station_id.to_string(),
            })?;

        Self::yield_mm(area)
    }

    pub fn units(&self) -> FlowUnits {
        self.units
    }

    /// Convert one day's rate into the accumulation unit.
    pub fn convert_daily(&self, rate: f64) -> f64 {
        match self.units {
            FlowUnits::Raw => rate,
            FlowUnits::Volume => rate_to_daily_volume(rate),
            FlowUnits::Yield { basin_area_km2 } => {
                volume_to_yield(rate_to_daily_volume(rate), basin_area_km2)
            }
        }
    }
}

pub fn rate_to_daily_volume(rate_m3s: f64) -> f64 {
    rate_m3s * SECONDS_PER_DAY
}

/// m³ over a basin of `basin_area_km2` expressed as depth in mm.
pub fn volume_to_yield(volume_m3: f64, basin_area_km2: f64) -> f64 {
    volume_m3 / (basin_area_km2 * SQ_METRES_PER_SQ_KM) * MM_PER_METRE
}

pub fn yield_to_volume(yield_mm: f64, basin_area_km2: f64) -> f64 {
    yield_mm / MM_PER_METRE * basin_area_km2 * SQ_METRES_PER_SQ_KM
}
