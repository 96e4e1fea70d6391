pub mod cumulative;
pub mod observation;
pub mod station;
pub mod stats;

pub use cumulative::CumulativeRecord;
pub use observation::{CalendarObservation, Observation};
pub use station::StationMetadata;
pub use stats::{percentile_label, DailyCumulativeStats, PercentileValue};
