use crate::error::Result;
use crate::models::{Observation, StationMetadata};
use crate::readers::{ColumnMapping, ObservationReader, StationReader};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::task::JoinHandle;
use tracing::debug;

pub struct ConcurrentReader {
    columns: ColumnMapping,
    use_mmap: bool,
}

impl ConcurrentReader {
    pub fn new(columns: ColumnMapping) -> Self {
        Self {
            columns,
            use_mmap: false,
        }
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    /// Read the observation table and optional station metadata concurrently
    pub async fn read_input(
        &self,
        observations_path: &Path,
        stations_path: Option<&Path>,
    ) -> Result<InputData> {
        let columns = self.columns.clone();
        let use_mmap = self.use_mmap;
        let obs_path: PathBuf = observations_path.to_path_buf();

        let observations_handle: JoinHandle<Result<Vec<Observation>>> =
            tokio::task::spawn_blocking(move || {
                ObservationReader::with_columns(columns)
                    .with_mmap(use_mmap)
                    .read_observations(&obs_path)
            });

        let station_path: Option<PathBuf> = stations_path.map(Path::to_path_buf);
        let stations_handle: JoinHandle<Result<HashMap<String, StationMetadata>>> =
            tokio::task::spawn_blocking(move || match station_path {
                Some(path) => StationReader::new().read_stations_map(&path),
                None => Ok(HashMap::new()),
            });

        let (observations, stations) = tokio::try_join!(observations_handle, stations_handle)?;
        let observations = observations?;
        let stations = stations?;

        debug!(
            observations = observations.len(),
            stations = stations.len(),
            "Input read"
        );

        Ok(InputData {
            observations,
            stations,
        })
    }
}

impl Default for ConcurrentReader {
    fn default() -> Self {
        Self::new(ColumnMapping::default())
    }
}

/// Everything the statistics pipeline needs from disk
#[derive(Debug)]
pub struct InputData {
    pub observations: Vec<Observation>,
    pub stations: HashMap<String, StationMetadata>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_read_input() -> Result<()> {
        let mut obs_file = NamedTempFile::new()?;
        writeln!(obs_file, "STATION_NUMBER,Date,Value")?;
        writeln!(obs_file, "08NM116,2000-01-01,1.5")?;

        let mut station_file = NamedTempFile::new()?;
        writeln!(station_file, "station_id,basin_area_km2")?;
        writeln!(station_file, "08NM116,795")?;

        let reader = ConcurrentReader::default();
        let input = reader
            .read_input(obs_file.path(), Some(station_file.path()))
            .await?;

        assert_eq!(input.observations.len(), 1);
        assert_eq!(input.stations["08NM116"].basin_area_km2, Some(795.0));

        let input = reader.read_input(obs_file.path(), None).await?;
        assert!(input.stations.is_empty());

        Ok(())
    }
}
