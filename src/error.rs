use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Date parsing error: {0}")]
    DateParse(#[from] chrono::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet write error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Configuration file error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No basin area available for station {station_id}")]
    MissingBasinArea { station_id: String },

    #[error("No data for water year {year} at station {station_id}")]
    NoMatchingOverlayData { station_id: String, year: i32 },

    #[error("No observations remain for station {station_id}")]
    EmptyInput { station_id: String },

    #[error("Water year {water_year} at station {station_id} is outside the supported date range")]
    DateOutOfRange { station_id: String, water_year: i32 },

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Async task error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl ProcessingError {
    /// Station-scoped errors are reported as warnings and never abort a batch.
    pub fn is_station_scoped(&self) -> bool {
        matches!(
            self,
            ProcessingError::MissingBasinArea { .. }
                | ProcessingError::NoMatchingOverlayData { .. }
                | ProcessingError::EmptyInput { .. }
                | ProcessingError::DateOutOfRange { .. }
        )
    }
}
