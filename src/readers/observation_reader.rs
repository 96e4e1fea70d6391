use crate::error::{ProcessingError, Result};
use crate::models::Observation;
use crate::utils::constants::{
    DEFAULT_BUFFER_SIZE, DEFAULT_DATE_COLUMN, DEFAULT_DATE_FORMAT, DEFAULT_STATION_COLUMN,
    DEFAULT_STATION_ID, DEFAULT_VALUE_COLUMN, MISSING_VALUE_MARKERS,
};
use chrono::NaiveDate;
use memmap2::Mmap;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Maps a caller's column names onto the canonical observation fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub station: String,
    pub date: String,
    pub value: String,
    /// Station id used when the file has no station column.
    pub default_station_id: String,
    pub date_format: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            station: DEFAULT_STATION_COLUMN.to_string(),
            date: DEFAULT_DATE_COLUMN.to_string(),
            value: DEFAULT_VALUE_COLUMN.to_string(),
            default_station_id: DEFAULT_STATION_ID.to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

impl ColumnMapping {
    pub fn new(
        station: impl Into<String>,
        date: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            station: station.into(),
            date: date.into(),
            value: value.into(),
            ..Self::default()
        }
    }
}

struct ColumnIndices {
    station: Option<usize>,
    date: usize,
    value: usize,
}

pub struct ObservationReader {
    columns: ColumnMapping,
    use_mmap: bool,
}

impl ObservationReader {
    pub fn new() -> Self {
        Self {
            columns: ColumnMapping::default(),
            use_mmap: false,
        }
    }

    pub fn with_columns(columns: ColumnMapping) -> Self {
        Self {
            columns,
            use_mmap: false,
        }
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    /// Read daily observations from a delimited file with a header row
    pub fn read_observations(&self, path: &Path) -> Result<Vec<Observation>> {
        let file = File::open(path)?;
        if self.use_mmap {
            let mmap = unsafe { Mmap::map(&file)? };
            self.read_from(&mmap[..])
        } else {
            self.read_from(BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file))
        }
    }

    /// Read observations from any CSV source
    pub fn read_from<R: Read>(&self, source: R) -> Result<Vec<Observation>> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);

        let indices = self.resolve_columns(reader.headers()?)?;
        let mut observations = Vec::new();

        for (row, result) in reader.records().enumerate() {
            let record = result?;
            // header is line 1
            let line = row + 2;

            if record.iter().all(|field| field.is_empty()) {
                continue;
            }

            observations.push(self.parse_record(&record, &indices, line)?);
        }

        Ok(observations)
    }

    fn resolve_columns(&self, headers: &csv::StringRecord) -> Result<ColumnIndices> {
        let find = |name: &str| headers.iter().position(|h| h == name);

        let date = find(&self.columns.date).ok_or_else(|| {
            ProcessingError::InvalidFormat(format!("Missing date column '{}'", self.columns.date))
        })?;
        let value = find(&self.columns.value).ok_or_else(|| {
            ProcessingError::InvalidFormat(format!(
                "Missing value column '{}'",
                self.columns.value
            ))
        })?;

        Ok(ColumnIndices {
            station: find(&self.columns.station),
            date,
            value,
        })
    }

    fn parse_record(
        &self,
        record: &csv::StringRecord,
        indices: &ColumnIndices,
        line: usize,
    ) -> Result<Observation> {
        let station_id = match indices.station {
            Some(i) => record.get(i).unwrap_or_default().to_string(),
            None => self.columns.default_station_id.clone(),
        };
        if station_id.is_empty() {
            return Err(ProcessingError::InvalidFormat(format!(
                "Empty station id on line {}",
                line
            )));
        }

        let date_str = record.get(indices.date).unwrap_or_default();
        let date = NaiveDate::parse_from_str(date_str, &self.columns.date_format).map_err(|_| {
            ProcessingError::InvalidFormat(format!(
                "Invalid date '{}' on line {}",
                date_str, line
            ))
        })?;

        let value_str = record.get(indices.value).unwrap_or_default();
        let value = parse_value(value_str).ok_or_else(|| {
            ProcessingError::InvalidFormat(format!(
                "Invalid value '{}' on line {}",
                value_str, line
            ))
        })?;

        Ok(Observation::new(station_id, date, value))
    }
}

impl Default for ObservationReader {
    fn default() -> Self {
        Self::new()
    }
}

/// `Some(None)` for a missing marker, `None` when the cell is not a number.
pub(crate) fn parse_value(value: &str) -> Option<Option<f64>> {
    if MISSING_VALUE_MARKERS.contains(&value) {
        return Some(None);
    }
    value
        .parse::<f64>()
        .ok()
        .map(|v| if v.is_finite() { Some(v) } else { None })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_default_columns() -> Result<()> {
        let data = "STATION_NUMBER,Date,Value\n\
                    08NM116,2000-01-01,1.5\n\
                    08NM116,2000-01-02,NA\n\
                    08NM116,2000-01-03,\n\
                    08NM242,2000-01-01,3.25\n";

        let observations = ObservationReader::new().read_from(data.as_bytes())?;

        assert_eq!(observations.len(), 4);
        assert_eq!(observations[0].station_id, "08NM116");
        assert_eq!(observations[0].value, Some(1.5));
        assert!(observations[1].is_missing());
        assert!(observations[2].is_missing());
        assert_eq!(observations[3].station_id, "08NM242");

        Ok(())
    }

    #[test]
    fn test_custom_columns_without_station() -> Result<()> {
        let data = "when,flow,symbol\n\
                    01/03/2001,10,E\n\
                    02/03/2001,11,\n";

        let mut columns = ColumnMapping::new("site", "when", "flow");
        columns.date_format = "%d/%m/%Y".to_string();
        columns.default_station_id = "MISSION".to_string();

        let observations = ObservationReader::with_columns(columns).read_from(data.as_bytes())?;

        assert_eq!(observations.len(), 2);
        assert_eq!(observations[0].station_id, "MISSION");
        assert_eq!(
            observations[1].date,
            NaiveDate::from_ymd_opt(2001, 3, 2).unwrap()
        );
        assert_eq!(observations[1].value, Some(11.0));

        Ok(())
    }

    #[test]
    fn test_missing_value_column() {
        let data = "STATION_NUMBER,Date,Flow\n08NM116,2000-01-01,1.5\n";
        let result = ObservationReader::new().read_from(data.as_bytes());
        assert!(matches!(result, Err(ProcessingError::InvalidFormat(_))));
    }

    #[test]
    fn test_invalid_cells_report_line() {
        let data = "STATION_NUMBER,Date,Value\n08NM116,2000-01-01,1.5\n08NM116,2000-13-01,1.5\n";
        let err = ObservationReader::new()
            .read_from(data.as_bytes())
            .unwrap_err();
        assert!(err.to_string().contains("line 3"));

        let data = "STATION_NUMBER,Date,Value\n08NM116,2000-01-01,abc\n";
        assert!(ObservationReader::new().read_from(data.as_bytes()).is_err());
    }

    #[test]
    fn test_read_file_with_mmap() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "STATION_NUMBER,Date,Value")?;
        writeln!(temp_file, "08NM116,2000-01-01,1.5")?;
        writeln!(temp_file, "08NM116,2000-01-02,2.5")?;

        let buffered = ObservationReader::new().read_observations(temp_file.path())?;
        let mapped = ObservationReader::new()
            .with_mmap(true)
            .read_observations(temp_file.path())?;

        assert_eq!(buffered, mapped);
        assert_eq!(mapped.len(), 2);

        Ok(())
    }
}
