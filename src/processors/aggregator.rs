use crate::config::StatsConfig;
use crate::models::{CumulativeRecord, DailyCumulativeStats, PercentileValue};
use crate::processors::WaterYearCalendar;
use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Which water years and days take part in the statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct YearFilter {
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub excluded_years: BTreeSet<i32>,
    pub months: BTreeSet<u32>,
    pub complete_years: bool,
}

impl Default for YearFilter {
    fn default() -> Self {
        Self {
            start_year: None,
            end_year: None,
            excluded_years: BTreeSet::new(),
            months: (1..=12).collect(),
            complete_years: false,
        }
    }
}

impl YearFilter {
    pub fn from_config(config: &StatsConfig) -> Self {
        Self {
            start_year: config.start_year,
            end_year: config.end_year,
            excluded_years: config.excluded_year_set(),
            months: config.month_set(),
            complete_years: config.complete_years,
        }
    }

    pub fn in_range(&self, water_year: i32) -> bool {
        self.start_year.map_or(true, |start| water_year >= start)
            && self.end_year.map_or(true, |end| water_year <= end)
            && !self.excluded_years.contains(&water_year)
    }

    pub fn month_selected(&self, month: u32) -> bool {
        self.months.contains(&month)
    }

    /// Water years that pass every year-level test.
    ///
    /// Month membership is presence based: a year needs at least one non-null
    /// daily value dated in a month of interest.
    pub fn included_years<R: Borrow<CumulativeRecord>>(&self, records: &[R]) -> BTreeSet<i32> {
        let mut with_month_data = HashSet::new();
        let mut incomplete = HashSet::new();

        for record in records.iter().map(R::borrow) {
            if record.has_daily_value() && self.month_selected(record.month()) {
                with_month_data.insert(record.water_year);
            }
            if record.day_of_year == 365 && record.cumulative_value.is_none() {
                incomplete.insert(record.water_year);
            }
        }

        records
            .iter()
            .map(|r| R::borrow(r).water_year)
            .filter(|year| self.in_range(*year))
            .filter(|year| with_month_data.contains(year))
            .filter(|year| !self.complete_years || !incomplete.contains(year))
            .collect()
    }

    /// Records that contribute to the statistics.
    pub fn apply<'a, R: Borrow<CumulativeRecord>>(
        &self,
        records: &'a [R],
    ) -> Vec<&'a CumulativeRecord> {
        let years = self.included_years(records);
        records
            .iter()
            .map(R::borrow)
            .filter(|r| years.contains(&r.water_year) && self.month_selected(r.month()))
            .collect()
    }
}

pub struct CrossYearAggregator {
    calendar: WaterYearCalendar,
    filter: YearFilter,
    percentiles: Vec<f64>,
}

impl CrossYearAggregator {
    pub fn new(calendar: WaterYearCalendar, filter: YearFilter, percentiles: Vec<f64>) -> Self {
        Self {
            calendar,
            filter,
            percentiles,
        }
    }

    pub fn from_config(calendar: WaterYearCalendar, config: &StatsConfig) -> Self {
        Self::new(
            calendar,
            YearFilter::from_config(config),
            config.sorted_percentiles(),
        )
    }

    pub fn filter(&self) -> &YearFilter {
        &self.filter
    }

    /// One row per (station, day of year) left after filtering, ordered by
    /// station then day of year.
    pub fn aggregate(&self, records: &[CumulativeRecord]) -> Vec<DailyCumulativeStats> {
        let mut by_station: BTreeMap<&str, Vec<&CumulativeRecord>> = BTreeMap::new();
        for record in records {
            by_station
                .entry(record.station_id.as_str())
                .or_default()
                .push(record);
        }

        by_station
            .into_iter()
            .flat_map(|(station_id, station_records)| {
                self.aggregate_station(station_id, &station_records)
            })
            .collect()
    }

    /// Aggregate one station's records, owned or borrowed.
    pub fn aggregate_station<R: Borrow<CumulativeRecord>>(
        &self,
        station_id: &str,
        records: &[R],
    ) -> Vec<DailyCumulativeStats> {
        let mut by_day: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
        for record in self.filter.apply(records) {
            let values = by_day.entry(record.day_of_year).or_default();
            if let Some(value) = record.cumulative_value {
                values.push(value);
            }
        }

        by_day
            .into_iter()
            .map(|(day_of_year, mut values)| {
                values.sort_by(|a, b| a.total_cmp(b));
                self.summarize(station_id, day_of_year, &values)
            })
            .collect()
    }

    fn summarize(&self, station_id: &str, day_of_year: u32, sorted: &[f64]) -> DailyCumulativeStats {
        let mean = if sorted.is_empty() {
            None
        } else {
            Some(sorted.iter().sum::<f64>() / sorted.len() as f64)
        };

        DailyCumulativeStats {
            station_id: station_id.to_string(),
            day_of_year,
            calendar_date: self.calendar.calendar_date(day_of_year),
            n_years: sorted.len(),
            mean,
            median: quantile(sorted, 0.5),
            minimum: sorted.first().copied(),
            maximum: sorted.last().copied(),
            percentiles: self
                .percentiles
                .iter()
                .map(|p| PercentileValue {
                    percentile: *p,
                    value: quantile(sorted, p / 100.0),
                })
                .collect(),
            overlay: None,
        }
    }
}

/// Type 7 quantile: linear interpolation between order statistics.
/// `sorted` must be in ascending order; `probability` in 0..=1.
pub fn quantile(sorted: &[f64], probability: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }

    let h = (sorted.len() - 1) as f64 * probability.clamp(0.0, 1.0);
    let lower = h.floor() as usize;
    let upper = h.ceil() as usize;
    let fraction = h - lower as f64;

    Some(sorted[lower] + fraction * (sorted[upper] - sorted[lower]))
}
