use crate::error::{ProcessingError, Result};
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Default filter directive: warnings only, or debug output for this crate when verbose.
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "warn,cumflow=debug"
    } else {
        "warn"
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let fmt_layer = match log_file {
        Some(path) => {
            let file = File::create(path)?;
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .boxed()
        }
        None => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| ProcessingError::InvalidConfig(format!("Logging setup failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter(false), "warn");
        assert!(default_filter(true).contains("cumflow=debug"));
    }
}
