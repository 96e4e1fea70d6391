/// Calendar anchoring: a pair of consecutive non-leap years
pub const REFERENCE_YEAR: i32 = 2001;
pub const DAYS_PER_WATER_YEAR: u32 = 365;
pub const DEFAULT_WATER_YEAR_START: u32 = 1;

/// Unit conversion factors
pub const SECONDS_PER_DAY: f64 = 86_400.0;
pub const SQ_METRES_PER_SQ_KM: f64 = 1.0e6;
pub const MM_PER_METRE: f64 = 1000.0;

/// Default percentiles reported alongside mean/median/min/max
pub const DEFAULT_PERCENTILES: [f64; 4] = [5.0, 25.0, 75.0, 95.0];

/// Input column defaults
pub const DEFAULT_STATION_COLUMN: &str = "STATION_NUMBER";
pub const DEFAULT_DATE_COLUMN: &str = "Date";
pub const DEFAULT_VALUE_COLUMN: &str = "Value";
pub const DEFAULT_STATION_ID: &str = "XXXXXXX";
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Value cells treated as missing
pub const MISSING_VALUE_MARKERS: [&str; 4] = ["", "NA", "NaN", "null"];

/// Processing defaults
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";
