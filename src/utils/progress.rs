use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Station-level progress bar. Silent reporters do nothing.
pub struct ProgressReporter {
    progress_bar: Option<ProgressBar>,
}

impl ProgressReporter {
    pub fn new(total: u64, message: &str, silent: bool) -> Self {
        if silent {
            Self { progress_bar: None }
        } else {
            let pb = ProgressBar::new(total);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} stations ({eta})")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            pb.set_message(message.to_string());
            pb.enable_steady_tick(Duration::from_millis(100));

            Self {
                progress_bar: Some(pb),
            }
        }
    }

    pub fn new_spinner(message: &str, silent: bool) -> Self {
        if silent {
            Self { progress_bar: None }
        } else {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.set_message(message.to_string());
            pb.enable_steady_tick(Duration::from_millis(100));

            Self {
                progress_bar: Some(pb),
            }
        }
    }

    pub fn update(&self, current: u64) {
        if let Some(ref pb) = self.progress_bar {
            pb.set_position(current);
        }
    }

    pub fn set_message(&self, message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.set_message(message.to_string());
        }
    }

    pub fn finish_with_message(&self, message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_with_message(message.to_string());
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish();
        }
    }
}
