use crate::error::{ProcessingError, Result};
use crate::models::StationMetadata;
use crate::readers::observation_reader::parse_value;
use serde::{de, Deserialize, Deserializer};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::warn;
use validator::Validate;

/// Row layout of a station metadata file.
#[derive(Debug, Deserialize)]
struct StationRow {
    #[serde(alias = "STATION_NUMBER")]
    station_id: String,
    #[serde(default, alias = "STATION_NAME")]
    name: Option<String>,
    #[serde(default, alias = "DRAINAGE_AREA_GROSS", deserialize_with = "optional_number")]
    basin_area_km2: Option<f64>,
    #[serde(default, alias = "LATITUDE", deserialize_with = "optional_number")]
    latitude: Option<f64>,
    #[serde(default, alias = "LONGITUDE", deserialize_with = "optional_number")]
    longitude: Option<f64>,
}

/// Numeric cell where the usual missing markers (`NA`, `NaN`, ...) read as null.
fn optional_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let value = raw.trim();
    parse_value(value).ok_or_else(|| de::Error::custom(format!("invalid number {:?}", value)))
}

pub struct StationReader {
    strict: bool,
}

impl StationReader {
    pub fn new() -> Self {
        Self { strict: false }
    }

    /// In strict mode an unreadable row or invalid field fails the read instead
    /// of being skipped or cleared.
    pub fn with_strict(strict: bool) -> Self {
        Self { strict }
    }

    /// Read station metadata from a CSV file
    pub fn read_stations(&self, path: &Path) -> Result<Vec<StationMetadata>> {
        let file = File::open(path)?;
        self.read_from(BufReader::new(file))
    }

    pub fn read_from<R: Read>(&self, source: R) -> Result<Vec<StationMetadata>> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(source);

        let mut stations = Vec::new();
        for result in reader.deserialize::<StationRow>() {
            let row = match result {
                Ok(row) => row,
                Err(e) if self.strict => return Err(e.into()),
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable station metadata row");
                    continue;
                }
            };
            let mut station = StationMetadata {
                station_id: row.station_id,
                name: row.name.filter(|n| !n.is_empty()),
                basin_area_km2: row.basin_area_km2,
                latitude: row.latitude,
                longitude: row.longitude,
            };

            if let Err(e) = station.validate() {
                if self.strict {
                    return Err(ProcessingError::InvalidFormat(format!(
                        "Invalid metadata for station {}: {}",
                        station.station_id, e
                    )));
                }

                let invalid = e.field_errors();
                if invalid.contains_key("station_id") {
                    warn!(error = %e, "Skipping station metadata without a station id");
                    continue;
                }
                // clear only the offending fields
                if invalid.contains_key("basin_area_km2") {
                    station.basin_area_km2 = None;
                }
                if invalid.contains_key("latitude") {
                    station.latitude = None;
                }
                if invalid.contains_key("longitude") {
                    station.longitude = None;
                }
                warn!(station = %station.station_id, error = %e, "Cleared invalid station metadata fields");
            }

            stations.push(station);
        }

        Ok(stations)
    }

    /// Read station metadata keyed by station id
    pub fn read_stations_map(&self, path: &Path) -> Result<HashMap<String, StationMetadata>> {
        let stations = self.read_stations(path)?;
        let mut map = HashMap::with_capacity(stations.len());

        for station in stations {
            map.insert(station.station_id.clone(), station);
        }

        Ok(map)
    }
}

impl Default for StationReader {
    fn default() -> Self {
        Self::new()
    }
}
