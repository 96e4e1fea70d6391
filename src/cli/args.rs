use crate::config::StatsConfig;
use crate::readers::ColumnMapping;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cumflow")]
#[command(about = "Cumulative daily streamflow statistics across water years")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute cumulative statistics from a daily flow table
    Compute {
        #[arg(short, long, help = "Daily observations CSV file")]
        input: PathBuf,

        #[arg(long, help = "Station metadata CSV file (basin areas)")]
        stations: Option<PathBuf>,

        #[arg(short, long, help = "Run configuration file (TOML, JSON or YAML)")]
        config: Option<PathBuf>,

        #[arg(
            short,
            long,
            help = "Output file path [default: output/cumulative-stats-{YYMMDD}.csv]"
        )]
        output_file: Option<PathBuf>,

        #[arg(
            short,
            long,
            help = "Output format: csv, json or parquet [default: from output extension]"
        )]
        format: Option<String>,

        #[arg(long, default_value = "snappy")]
        compression: String,

        #[arg(long, help = "Also write plot-ready chart data as JSON")]
        charts: bool,

        #[arg(
            long,
            help = "Chart data file path [default: output/cumulative-chart-{YYMMDD}.json]"
        )]
        chart_file: Option<PathBuf>,

        #[arg(long, default_value_t = num_cpus::get())]
        max_workers: usize,

        #[arg(long, default_value = "false")]
        use_mmap: bool,

        #[command(flatten)]
        overrides: StatsOverrides,

        #[command(flatten)]
        columns: ColumnOverrides,
    },

    /// Read the input and run the pipeline without writing output
    Validate {
        #[arg(short, long, help = "Daily observations CSV file")]
        input: PathBuf,

        #[arg(long, help = "Station metadata CSV file (basin areas)")]
        stations: Option<PathBuf>,

        #[arg(short, long, help = "Run configuration file (TOML, JSON or YAML)")]
        config: Option<PathBuf>,

        #[arg(long, default_value_t = num_cpus::get())]
        max_workers: usize,

        #[command(flatten)]
        overrides: StatsOverrides,

        #[command(flatten)]
        columns: ColumnOverrides,
    },

    /// Display information about a statistics Parquet file
    Info {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long, default_value = "10")]
        sample: usize,
    },
}

/// Command-line overrides applied on top of the configuration file.
#[derive(Args, Debug, Clone, Default)]
pub struct StatsOverrides {
    #[arg(long, help = "First month of the water year (1-12)")]
    pub water_year_start: Option<u32>,

    #[arg(long)]
    pub start_year: Option<i32>,

    #[arg(long)]
    pub end_year: Option<i32>,

    #[arg(long, value_delimiter = ',', help = "Water years to leave out, e.g. 2003,2011")]
    pub exclude_years: Vec<i32>,

    #[arg(long, value_delimiter = ',', help = "Months of interest, e.g. 4,5,6")]
    pub months: Vec<u32>,

    #[arg(long, help = "Report cumulative yield (mm) instead of volume (m³)")]
    pub use_yield: bool,

    #[arg(long, help = "Basin area in km² for every station")]
    pub basin_area: Option<f64>,

    #[arg(long, value_delimiter = ',', help = "Percentiles, e.g. 5,25,75,95")]
    pub percentiles: Vec<f64>,

    #[arg(long)]
    pub overlay_year: Option<i32>,

    #[arg(long, help = "Only include water years without missing days")]
    pub complete_years: bool,

    #[arg(long, help = "Mark chart data for a logarithmic y axis")]
    pub log_scale: bool,
}

impl StatsOverrides {
    pub fn apply(&self, mut config: StatsConfig) -> StatsConfig {
        if let Some(month) = self.water_year_start {
            config.water_year_start_month = month;
        }
        if self.start_year.is_some() {
            config.start_year = self.start_year;
        }
        if self.end_year.is_some() {
            config.end_year = self.end_year;
        }
        if !self.exclude_years.is_empty() {
            config.excluded_years = self.exclude_years.clone();
        }
        if !self.months.is_empty() {
            config.months = self.months.clone();
        }
        if self.use_yield {
            config.use_yield = true;
        }
        if self.basin_area.is_some() {
            config.basin_area = self.basin_area;
        }
        if !self.percentiles.is_empty() {
            config.percentiles = self.percentiles.clone();
        }
        if self.overlay_year.is_some() {
            config.overlay_year = self.overlay_year;
        }
        if self.complete_years {
            config.complete_years = true;
        }
        if self.log_scale {
            config.log_scale = true;
        }
        config
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct ColumnOverrides {
    #[arg(long, help = "Station id column name")]
    pub station_column: Option<String>,

    #[arg(long, help = "Date column name")]
    pub date_column: Option<String>,

    #[arg(long, help = "Flow value column name")]
    pub value_column: Option<String>,

    #[arg(long, help = "Station id for files without a station column")]
    pub station_id: Option<String>,

    #[arg(long, help = "Date format, e.g. %Y-%m-%d")]
    pub date_format: Option<String>,
}

impl ColumnOverrides {
    pub fn apply(&self, mut columns: ColumnMapping) -> ColumnMapping {
        if let Some(ref station) = self.station_column {
            columns.station = station.clone();
        }
        if let Some(ref date) = self.date_column {
            columns.date = date.clone();
        }
        if let Some(ref value) = self.value_column {
            columns.value = value.clone();
        }
        if let Some(ref station_id) = self.station_id {
            columns.default_station_id = station_id.clone();
        }
        if let Some(ref date_format) = self.date_format {
            columns.date_format = date_format.clone();
        }
        columns
    }
}
