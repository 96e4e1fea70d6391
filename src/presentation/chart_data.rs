use crate::models::DailyCumulativeStats;
use crate::processors::{CumulativeStatsReport, FlowUnits};
use serde::Serialize;
use tracing::warn;

/// One named line or band edge, one value per day of year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub name: String,
    pub values: Vec<f64>,
}

/// The single-year trace drawn over the statistics. Gaps stay gaps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayTrace {
    pub water_year: i32,
    pub values: Vec<Option<f64>>,
}

/// Plot-ready data for one station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub station_id: String,
    pub days: Vec<u32>,
    /// Calendar labels for the x axis, e.g. `Oct-01`.
    pub x_labels: Vec<String>,
    pub y_axis_label: String,
    pub log_scale: bool,
    pub series: Vec<ChartSeries>,
    pub overlay: Option<OverlayTrace>,
}

impl ChartData {
    pub fn series(&self, name: &str) -> Option<&ChartSeries> {
        self.series.iter().find(|s| s.name == name)
    }

    fn from_rows(
        station_id: &str,
        rows: &[&DailyCumulativeStats],
        units: FlowUnits,
        overlay_year: Option<i32>,
        log_scale: bool,
    ) -> Self {
        let coerce = |value: Option<f64>| value.unwrap_or(0.0);

        let mut series = vec![
            ChartSeries {
                name: "Mean".to_string(),
                values: rows.iter().map(|r| coerce(r.mean)).collect(),
            },
            ChartSeries {
                name: "Median".to_string(),
                values: rows.iter().map(|r| coerce(r.median)).collect(),
            },
            ChartSeries {
                name: "Minimum".to_string(),
                values: rows.iter().map(|r| coerce(r.minimum)).collect(),
            },
            ChartSeries {
                name: "Maximum".to_string(),
                values: rows.iter().map(|r| coerce(r.maximum)).collect(),
            },
        ];

        if let Some(first) = rows.first() {
            for percentile in &first.percentiles {
                series.push(ChartSeries {
                    name: percentile.label(),
                    values: rows
                        .iter()
                        .map(|r| coerce(r.percentile(percentile.percentile)))
                        .collect(),
                });
            }
        }

        let overlay = overlay_year.and_then(|water_year| {
            let values: Vec<Option<f64>> = rows.iter().map(|r| r.overlay).collect();
            if values.iter().all(Option::is_none) {
                warn!(
                    station = station_id,
                    year = water_year,
                    "No overlay data to draw"
                );
                None
            } else {
                Some(OverlayTrace { water_year, values })
            }
        });

        Self {
            station_id: station_id.to_string(),
            days: rows.iter().map(|r| r.day_of_year).collect(),
            x_labels: rows.iter().map(|r| r.month_day_label()).collect(),
            y_axis_label: units.label().to_string(),
            log_scale,
            series,
            overlay,
        }
    }
}

/// Build chart data for every station in the report.
///
/// This is the only place null statistics become 0. Stations skipped by the
/// pipeline have no rows and therefore no chart.
pub fn build_charts(report: &CumulativeStatsReport, log_scale: bool) -> Vec<ChartData> {
    report
        .summaries
        .iter()
        .filter_map(|summary| {
            let rows = report.station_stats(&summary.station_id);
            if rows.is_empty() {
                return None;
            }
            Some(ChartData::from_rows(
                &summary.station_id,
                &rows,
                summary.units,
                report.overlay_year,
                log_scale,
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PercentileValue;
    use crate::processors::StationSummary;
    use chrono::NaiveDate;
    use std::collections::BTreeSet;

    fn stats_row(day_of_year: u32, value: Option<f64>, overlay: Option<f64>) -> DailyCumulativeStats {
        DailyCumulativeStats {
            station_id: "08NM116".to_string(),
            day_of_year,
            calendar_date: NaiveDate::from_ymd_opt(2000, 10, day_of_year).unwrap(),
            n_years: usize::from(value.is_some()),
            mean: value,
            median: value,
            minimum: value,
            maximum: value,
            percentiles: vec![PercentileValue {
                percentile: 25.0,
                value,
            }],
            overlay,
        }
    }

    fn report(stats: Vec<DailyCumulativeStats>, overlay_year: Option<i32>) -> CumulativeStatsReport {
        let date = NaiveDate::from_ymd_opt(2000, 10, 1).unwrap();
        CumulativeStatsReport {
            stats,
            summaries: vec![StationSummary {
                station_id: "08NM116".to_string(),
                first_date: date,
                last_date: date,
                observed_days: 1,
                missing_days: 0,
                water_years: BTreeSet::from([2001]),
                included_years: BTreeSet::from([2001]),
                units: FlowUnits::Yield {
                    basin_area_km2: 795.0,
                },
            }],
            warnings: Vec::new(),
            overlay_year,
        }
    }

    #[test]
    fn test_nulls_become_zero() {
        let report = report(
            vec![stats_row(1, Some(4.0), None), stats_row(2, None, None)],
            None,
        );

        let charts = build_charts(&report, true);
        assert_eq!(charts.len(), 1);

        let chart = &charts[0];
        assert_eq!(chart.series("Mean").unwrap().values, vec![4.0, 0.0]);
        assert_eq!(chart.series("P25").unwrap().values, vec![4.0, 0.0]);
        assert_eq!(chart.x_labels, vec!["Oct-01", "Oct-02"]);
        assert_eq!(chart.y_axis_label, "Cumulative Yield (mm)");
        assert!(chart.log_scale);
        assert!(chart.overlay.is_none());

        // the report itself keeps its nulls
        assert_eq!(report.stats[1].mean, None);
    }

    #[test]
    fn test_overlay_trace() {
        let with_overlay = report(
            vec![stats_row(1, Some(4.0), Some(3.0)), stats_row(2, Some(5.0), None)],
            Some(2001),
        );
        let chart = &build_charts(&with_overlay, false)[0];
        let overlay = chart.overlay.as_ref().unwrap();
        assert_eq!(overlay.water_year, 2001);
        assert_eq!(overlay.values, vec![Some(3.0), None]);

        let empty = report(vec![stats_row(1, Some(4.0), None)], Some(2003));
        assert!(build_charts(&empty, false)[0].overlay.is_none());
    }
}
