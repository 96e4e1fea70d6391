pub mod accumulator;
pub mod aggregator;
pub mod calendar;
pub mod gap_filler;
pub mod overlay;
pub mod parallel_processor;
pub mod report;
pub mod unit_converter;

pub use accumulator::CumulativeAccumulator;
pub use aggregator::{quantile, CrossYearAggregator, YearFilter};
pub use calendar::WaterYearCalendar;
pub use gap_filler::GapFiller;
pub use overlay::OverlaySeries;
pub use parallel_processor::ParallelProcessor;
pub use report::{CumulativeStatsReport, StationSummary, StationWarning, WarningKind};
pub use unit_converter::{
    rate_to_daily_volume, volume_to_yield, yield_to_volume, BasinAreaLookup, FlowUnits,
    NoMetadata, UnitConverter,
};
