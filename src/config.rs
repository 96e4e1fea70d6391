use crate::error::{ProcessingError, Result};
use crate::readers::ColumnMapping;
use crate::utils::constants::{DEFAULT_PERCENTILES, DEFAULT_WATER_YEAR_START};
use config::{Config, File};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use validator::Validate;

/// Options controlling the cumulative statistics computation.
///
/// Every field has a documented default so an empty config file (or
/// `StatsConfig::default()`) describes the plain calendar-year, volume-mode run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct StatsConfig {
    /// First month of the water year, 1 = January.
    #[validate(range(min = 1, max = 12))]
    pub water_year_start_month: u32,

    /// First water year included in the statistics (inclusive).
    pub start_year: Option<i32>,

    /// Last water year included in the statistics (inclusive).
    pub end_year: Option<i32>,

    pub excluded_years: Vec<i32>,

    /// Calendar months whose days contribute to the statistics.
    pub months: Vec<u32>,

    /// Express cumulative flow as depth over the basin (mm) instead of volume (m³).
    pub use_yield: bool,

    /// Basin area (km²) applied to every station unless overridden per station.
    #[validate(range(exclusive_min = 0.0))]
    pub basin_area: Option<f64>,

    /// Per-station basin areas (km²).
    pub basin_areas: HashMap<String, f64>,

    pub percentiles: Vec<f64>,

    /// Water year to trace alongside the statistics.
    pub overlay_year: Option<i32>,

    /// Only include water years without any missing day.
    pub complete_years: bool,

    /// Presentation hint; no effect on the computed statistics.
    pub log_scale: bool,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            water_year_start_month: DEFAULT_WATER_YEAR_START,
            start_year: None,
            end_year: None,
            excluded_years: Vec::new(),
            months: (1..=12).collect(),
            use_yield: false,
            basin_area: None,
            basin_areas: HashMap::new(),
            percentiles: DEFAULT_PERCENTILES.to_vec(),
            overlay_year: None,
            complete_years: false,
            log_scale: false,
        }
    }
}

impl StatsConfig {
    pub fn with_water_year_start(mut self, month: u32) -> Self {
        self.water_year_start_month = month;
        self
    }

    pub fn with_year_range(mut self, start_year: Option<i32>, end_year: Option<i32>) -> Self {
        self.start_year = start_year;
        self.end_year = end_year;
        self
    }

    pub fn with_excluded_years(mut self, years: Vec<i32>) -> Self {
        self.excluded_years = years;
        self
    }

    pub fn with_months(mut self, months: Vec<u32>) -> Self {
        self.months = months;
        self
    }

    pub fn with_yield(mut self, basin_area: Option<f64>) -> Self {
        self.use_yield = true;
        self.basin_area = basin_area;
        self
    }

    pub fn with_percentiles(mut self, percentiles: Vec<f64>) -> Self {
        self.percentiles = percentiles;
        self
    }

    pub fn with_overlay_year(mut self, year: Option<i32>) -> Self {
        self.overlay_year = year;
        self
    }

    pub fn with_complete_years(mut self, complete_years: bool) -> Self {
        self.complete_years = complete_years;
        self
    }

    /// Reject invalid options before any data is touched.
    pub fn validate_config(&self) -> Result<()> {
        self.validate()
            .map_err(|e| ProcessingError::InvalidConfig(e.to_string()))?;

        if let (Some(start), Some(end)) = (self.start_year, self.end_year) {
            if start > end {
                return Err(ProcessingError::InvalidConfig(format!(
                    "start_year {} is after end_year {}",
                    start, end
                )));
            }
        }

        if self.months.is_empty() {
            return Err(ProcessingError::InvalidConfig(
                "At least one month of interest is required".to_string(),
            ));
        }

        if let Some(month) = self.months.iter().find(|m| !(1..=12).contains(*m)) {
            return Err(ProcessingError::InvalidConfig(format!(
                "Month of interest {} is outside 1-12",
                month
            )));
        }

        if let Some(p) = self
            .percentiles
            .iter()
            .find(|p| !p.is_finite() || !(0.0..=100.0).contains(*p))
        {
            return Err(ProcessingError::InvalidConfig(format!(
                "Percentile {} is outside 0-100",
                p
            )));
        }

        if let Some((station, area)) = self
            .basin_areas
            .iter()
            .find(|(_, a)| !a.is_finite() || **a <= 0.0)
        {
            return Err(ProcessingError::InvalidConfig(format!(
                "Basin area {} for station {} must be positive",
                area, station
            )));
        }

        Ok(())
    }

    pub fn excluded_year_set(&self) -> BTreeSet<i32> {
        self.excluded_years.iter().copied().collect()
    }

    pub fn month_set(&self) -> BTreeSet<u32> {
        self.months.iter().copied().collect()
    }

    /// Percentiles in ascending order without duplicates.
    pub fn sorted_percentiles(&self) -> Vec<f64> {
        let mut percentiles = self.percentiles.clone();
        percentiles.sort_by(|a, b| a.total_cmp(b));
        percentiles.dedup();
        percentiles
    }
}

/// Contents of a run configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub stats: StatsConfig,
    pub columns: ColumnMapping,
}

impl RunConfig {
    /// Load from a TOML, JSON or YAML file; the format follows the file extension.
    pub fn from_file(path: &Path) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from(path))
            .build()?;

        let run_config: RunConfig = settings.try_deserialize()?;
        run_config.stats.validate_config()?;
        Ok(run_config)
    }
}
