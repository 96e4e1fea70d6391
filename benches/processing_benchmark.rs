use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use cumflow::config::StatsConfig;
use cumflow::models::{Observation, StationMetadata};
use cumflow::processors::{
    quantile, CrossYearAggregator, CumulativeAccumulator, GapFiller, NoMetadata,
    ParallelProcessor, UnitConverter, WaterYearCalendar,
};
use std::collections::HashMap;

// Create test data for benchmarking
fn create_test_flow_data(
    station_count: usize,
    years: i32,
) -> (HashMap<String, StationMetadata>, Vec<Observation>) {
    let mut stations = HashMap::with_capacity(station_count);
    let mut observations = Vec::new();

    for station in 1..=station_count {
        let station_id = format!("ST{:05}", station);
        stations.insert(
            station_id.clone(),
            StationMetadata::new(station_id.clone(), Some(50.0 + station as f64)),
        );

        let first = NaiveDate::from_ymd_opt(2000, 10, 1).unwrap();
        let last = NaiveDate::from_ymd_opt(2000 + years, 9, 30).unwrap();
        let mut day = first;
        let mut index = 0usize;
        while day <= last {
            // every 97th day missing
            let value = if index % 97 == 96 {
                None
            } else {
                Some(5.0 + ((index * 31 + station * 7) % 50) as f64)
            };
            observations.push(Observation::new(station_id.clone(), day, value));
            day += Duration::days(1);
            index += 1;
        }
    }

    (stations, observations)
}

fn benchmark_calendar_normalization(c: &mut Criterion) {
    let (_, observations) = create_test_flow_data(1, 30);
    let calendar = WaterYearCalendar::new(10).unwrap();

    c.bench_function("calendar_normalization", |b| {
        b.iter(|| black_box(calendar.normalize_all(&observations).len()))
    });
}

fn benchmark_single_station_pipeline(c: &mut Criterion) {
    let (_, observations) = create_test_flow_data(1, 30);
    let calendar = WaterYearCalendar::new(10).unwrap();
    let config = StatsConfig::default().with_water_year_start(10);

    c.bench_function("single_station_pipeline", |b| {
        b.iter(|| {
            let filled = GapFiller::new(calendar).fill(observations.clone()).unwrap();
            let records = CumulativeAccumulator::new(UnitConverter::volume())
                .accumulate(&calendar.normalize_all(&filled));
            let stats = CrossYearAggregator::from_config(calendar, &config).aggregate(&records);
            black_box(stats.len())
        })
    });
}

fn benchmark_quantile(c: &mut Criterion) {
    let sorted: Vec<f64> = (0..100).map(|i| i as f64 * 1.5).collect();

    c.bench_function("quantile_type7", |b| {
        b.iter(|| {
            let total: f64 = [0.05, 0.25, 0.5, 0.75, 0.95]
                .iter()
                .filter_map(|p| quantile(&sorted, *p))
                .sum();
            black_box(total)
        })
    });
}

fn benchmark_varying_station_counts(c: &mut Criterion) {
    let mut group = c.benchmark_group("stations_by_count");

    for &size in &[1, 10, 50] {
        group.bench_with_input(
            BenchmarkId::new("stations", size),
            &size,
            |b, &station_count| {
                let (stations, observations) = create_test_flow_data(station_count, 20);
                let config = StatsConfig::default()
                    .with_water_year_start(10)
                    .with_yield(None);

                b.iter(|| {
                    let report = ParallelProcessor::new(config.clone())
                        .process(observations.clone(), &stations, None)
                        .map(|r| r.stats.len())
                        .unwrap_or(0);
                    black_box(report)
                })
            },
        );
    }
    group.finish();
}

fn benchmark_volume_mode(c: &mut Criterion) {
    let (_, observations) = create_test_flow_data(10, 20);

    c.bench_function("parallel_volume_mode", |b| {
        b.iter(|| {
            let rows = ParallelProcessor::new(StatsConfig::default())
                .process(observations.clone(), &NoMetadata, None)
                .map(|r| r.stats.len())
                .unwrap_or(0);
            black_box(rows)
        })
    });
}

criterion_group!(
    benches,
    benchmark_calendar_normalization,
    benchmark_single_station_pipeline,
    benchmark_quantile,
    benchmark_varying_station_counts,
    benchmark_volume_mode
);
criterion_main!(benches);
