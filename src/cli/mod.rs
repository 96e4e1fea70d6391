pub mod args;
pub mod commands;
pub mod logging;

pub use args::{Cli, ColumnOverrides, Commands, StatsOverrides};
pub use commands::run;
