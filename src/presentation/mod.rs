pub mod chart_data;

pub use chart_data::{build_charts, ChartData, ChartSeries, OverlayTrace};
