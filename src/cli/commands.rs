use crate::cli::args::{Cli, ColumnOverrides, Commands, StatsOverrides};
use crate::cli::logging::init_logging;
use crate::config::{RunConfig, StatsConfig};
use crate::error::{ProcessingError, Result};
use crate::presentation::build_charts;
use crate::processors::{CumulativeStatsReport, ParallelProcessor};
use crate::readers::{ColumnMapping, ConcurrentReader};
use crate::utils::filename::{generate_default_chart_filename, generate_default_output_filename};
use crate::utils::progress::ProgressReporter;
use crate::writers::{write_report, JsonWriter, OutputFormat, ParquetWriter};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    match cli.command {
        Commands::Compute {
            input,
            stations,
            config,
            output_file,
            format,
            compression,
            charts,
            chart_file,
            max_workers,
            use_mmap,
            overrides,
            columns,
        } => {
            let (stats_config, column_mapping) =
                resolve_config(config.as_deref(), &overrides, &columns)?;

            let format = match (&format, &output_file) {
                (Some(name), _) => OutputFormat::from_name(name)?,
                (None, Some(path)) => OutputFormat::from_path(path)?,
                (None, None) => OutputFormat::Csv,
            };
            let output_file =
                output_file.unwrap_or_else(|| generate_default_output_filename(format.extension()));

            println!("Computing cumulative flow statistics...");
            println!("Input file: {}", input.display());
            println!("Output file: {}", output_file.display());
            println!("Workers: {}", max_workers);

            let report = compute(
                &input,
                stations.as_deref(),
                stats_config.clone(),
                column_mapping,
                max_workers,
                use_mmap,
            )
            .await?;

            println!("\n{}", report.generate_summary());

            if report.stats.is_empty() {
                println!("No statistics to write");
                return Ok(());
            }

            write_report(&report, &output_file, format, &compression)?;
            println!("Wrote {} rows to {}", report.stats.len(), output_file.display());

            if format == OutputFormat::Parquet {
                let file_info = ParquetWriter::new().get_file_info(&output_file)?;
                println!("\n{}", file_info.summary());
            }

            if charts || chart_file.is_some() {
                let chart_path = chart_file.unwrap_or_else(generate_default_chart_filename);
                write_charts(&report, stats_config.log_scale, &chart_path)?;
                println!("Chart data written to {}", chart_path.display());
            }

            println!("Processing complete!");
        }

        Commands::Validate {
            input,
            stations,
            config,
            max_workers,
            overrides,
            columns,
        } => {
            println!("Validating input...");
            println!("Input file: {}", input.display());

            let (stats_config, column_mapping) =
                resolve_config(config.as_deref(), &overrides, &columns)?;

            let report = compute(
                &input,
                stations.as_deref(),
                stats_config,
                column_mapping,
                max_workers,
                false,
            )
            .await?;

            println!("\n{}", report.generate_summary());

            if report.warnings.is_empty() {
                println!("✅ All stations produced statistics");
            } else {
                println!("⚠️  Found {} station warnings", report.warnings.len());
            }
        }

        Commands::Info { file, sample } => {
            if OutputFormat::from_path(&file)? != OutputFormat::Parquet {
                return Err(ProcessingError::InvalidConfig(format!(
                    "Info expects a Parquet file, got {}",
                    file.display()
                )));
            }

            println!("Analyzing Parquet file: {}", file.display());

            let writer = ParquetWriter::new();
            let file_info = writer.get_file_info(&file)?;

            println!("\nFile Details:");
            println!("{}", file_info.summary());

            if sample > 0 {
                println!("\nSample Rows (showing up to {} rows):", sample);
                let rows = writer.read_stats(&file, sample)?;
                let station_count = rows
                    .iter()
                    .map(|r| r.station_id.as_str())
                    .collect::<HashSet<_>>()
                    .len();

                for (i, row) in rows.iter().enumerate() {
                    println!(
                        "{}. {} day {} ({}): mean={}, median={}, min={}, max={} from {} years",
                        i + 1,
                        row.station_id,
                        row.day_of_year,
                        row.month_day_label(),
                        format_value(row.mean),
                        format_value(row.median),
                        format_value(row.minimum),
                        format_value(row.maximum),
                        row.n_years
                    );
                }
                println!("Stations in sample: {}", station_count);
            }
        }
    }

    Ok(())
}

/// Configuration file (if any) overlaid with command-line overrides, validated.
fn resolve_config(
    config_path: Option<&Path>,
    overrides: &StatsOverrides,
    columns: &ColumnOverrides,
) -> Result<(StatsConfig, ColumnMapping)> {
    let run_config = match config_path {
        Some(path) => {
            info!(path = %path.display(), "Loading configuration");
            RunConfig::from_file(path)?
        }
        None => RunConfig::default(),
    };

    let stats_config = overrides.apply(run_config.stats);
    stats_config.validate_config()?;

    Ok((stats_config, columns.apply(run_config.columns)))
}

async fn compute(
    input: &Path,
    stations: Option<&Path>,
    stats_config: StatsConfig,
    columns: ColumnMapping,
    max_workers: usize,
    use_mmap: bool,
) -> Result<CumulativeStatsReport> {
    let spinner = ProgressReporter::new_spinner("Reading input...", false);
    let input_data = ConcurrentReader::new(columns)
        .with_mmap(use_mmap)
        .read_input(input, stations)
        .await?;
    spinner.finish_with_message(&format!(
        "Read {} observations, {} station records",
        input_data.observations.len(),
        input_data.stations.len()
    ));

    let station_count = input_data
        .observations
        .iter()
        .map(|o| o.station_id.as_str())
        .collect::<HashSet<_>>()
        .len();

    let progress = ProgressReporter::new(station_count as u64, "Computing statistics...", false);
    let processor = ParallelProcessor::new(stats_config).with_max_workers(max_workers);
    processor.process(input_data.observations, &input_data.stations, Some(&progress))
}

fn write_charts(report: &CumulativeStatsReport, log_scale: bool, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let charts = build_charts(report, log_scale);
    JsonWriter::new().write_value(&charts, path)
}

fn format_value(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| "-".to_string())
}
