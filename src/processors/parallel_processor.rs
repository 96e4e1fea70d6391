use crate::config::StatsConfig;
use crate::error::{ProcessingError, Result};
use crate::models::{DailyCumulativeStats, Observation};
use crate::processors::{
    BasinAreaLookup, CrossYearAggregator, CumulativeAccumulator, CumulativeStatsReport,
    GapFiller, OverlaySeries, StationSummary, StationWarning, UnitConverter, WaterYearCalendar,
};
use crate::utils::progress::ProgressReporter;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, warn};

/// Result of processing one station
#[derive(Debug, Default)]
struct StationOutcome {
    stats: Vec<DailyCumulativeStats>,
    summary: Option<StationSummary>,
    warnings: Vec<StationWarning>,
}

impl StationOutcome {
    fn skipped(error: ProcessingError) -> Self {
        let mut outcome = Self::default();
        outcome.warn(error);
        outcome
    }

    fn warn(&mut self, error: ProcessingError) {
        warn!("{}", error);
        if let Some(warning) = StationWarning::from_error(&error) {
            self.warnings.push(warning);
        }
    }
}

/// Runs the statistics pipeline station by station on a rayon pool.
pub struct ParallelProcessor {
    config: StatsConfig,
    max_workers: usize,
}

impl ParallelProcessor {
    pub fn new(config: StatsConfig) -> Self {
        Self {
            config,
            max_workers: num_cpus::get(),
        }
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    pub fn config(&self) -> &StatsConfig {
        &self.config
    }

    /// Compute cumulative statistics for every station in `observations`.
    ///
    /// Invalid configuration aborts before any work. Station-level problems
    /// (missing basin area, no data, no overlay data, dates past the calendar
    /// range) become warnings in the report and never affect other stations.
    pub fn process(
        &self,
        observations: Vec<Observation>,
        metadata: &dyn BasinAreaLookup,
        progress: Option<&ProgressReporter>,
    ) -> Result<CumulativeStatsReport> {
        self.config.validate_config()?;
        let calendar = WaterYearCalendar::new(self.config.water_year_start_month)?;

        let mut by_station: BTreeMap<String, Vec<Observation>> = BTreeMap::new();
        for observation in observations {
            by_station
                .entry(observation.station_id.clone())
                .or_default()
                .push(observation);
        }

        let total_stations = by_station.len();
        let processed_count = AtomicUsize::new(0);
        info!(stations = total_stations, "Computing cumulative statistics");

        if let Some(p) = progress {
            p.set_message(&format!("Processing {} stations...", total_stations));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| ProcessingError::InvalidConfig(e.to_string()))?;

        let outcomes: Vec<StationOutcome> = pool.install(|| {
            by_station
                .into_par_iter()
                .map(|(station_id, station_observations)| {
                    let outcome =
                        self.process_station(&calendar, &station_id, station_observations, metadata);

                    let count = processed_count.fetch_add(1, Ordering::Relaxed) + 1;
                    if let Some(p) = progress {
                        p.update(count as u64);
                    }

                    outcome
                })
                .collect()
        });

        let mut report = CumulativeStatsReport {
            overlay_year: self.config.overlay_year,
            ..CumulativeStatsReport::default()
        };
        for outcome in outcomes {
            report.stats.extend(outcome.stats);
            report.summaries.extend(outcome.summary);
            report.warnings.extend(outcome.warnings);
        }

        // Sort by station ID and day of year
        report.stats.sort_by(|a, b| {
            a.station_id
                .cmp(&b.station_id)
                .then_with(|| a.day_of_year.cmp(&b.day_of_year))
        });
        report.summaries.sort_by(|a, b| a.station_id.cmp(&b.station_id));

        if let Some(p) = progress {
            p.finish_with_message(&format!("Processed {} stations", total_stations));
        }
        info!(
            rows = report.stats.len(),
            warnings = report.warnings.len(),
            "Cumulative statistics complete"
        );

        Ok(report)
    }

    fn process_station(
        &self,
        calendar: &WaterYearCalendar,
        station_id: &str,
        observations: Vec<Observation>,
        metadata: &dyn BasinAreaLookup,
    ) -> StationOutcome {
        if observations.iter().all(Observation::is_missing) {
            return StationOutcome::skipped(ProcessingError::EmptyInput {
                station_id: station_id.to_string(),
            });
        }

        let converter = match UnitConverter::for_station(station_id, &self.config, metadata) {
            Ok(converter) => converter,
            Err(e) => return StationOutcome::skipped(e),
        };

        let filled = match GapFiller::new(*calendar).fill_station(station_id, observations) {
            Ok(filled) => filled,
            Err(e) => return StationOutcome::skipped(e),
        };
        let normalized = calendar.normalize_all(&filled);
        let records = CumulativeAccumulator::new(converter).accumulate(&normalized);

        let aggregator = CrossYearAggregator::from_config(*calendar, &self.config);
        let mut stats = aggregator.aggregate_station(station_id, &records);

        let mut outcome = StationOutcome::default();
        if stats.is_empty() {
            outcome.warn(ProcessingError::EmptyInput {
                station_id: station_id.to_string(),
            });
            return outcome;
        }

        if let Some(year) = self.config.overlay_year {
            match OverlaySeries::extract(station_id, year, &records) {
                Ok(overlay) => overlay.attach(&mut stats),
                Err(e) => outcome.warn(e),
            }
        }

        let missing_days = filled.iter().filter(|o| o.is_missing()).count();
        outcome.summary = Some(StationSummary {
            station_id: station_id.to_string(),
            first_date: filled.first().map(|o| o.date).unwrap_or_default(),
            last_date: filled.last().map(|o| o.date).unwrap_or_default(),
            observed_days: filled.len() - missing_days,
            missing_days,
            water_years: records.iter().map(|r| r.water_year).collect(),
            included_years: aggregator.filter().included_years(&records),
            units: converter.units(),
        });

        debug!(station = station_id, rows = stats.len(), "Station processed");
        outcome.stats = stats;
        outcome
    }
}
