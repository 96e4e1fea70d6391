use chrono::{Datelike, Local};
use std::path::PathBuf;

fn date_stamp() -> String {
    let now = Local::now();
    format!("{:02}{:02}{:02}", now.year() % 100, now.month(), now.day())
}

/// Default statistics output: output/cumulative-stats-{YYMMDD}.{extension}
pub fn generate_default_output_filename(extension: &str) -> PathBuf {
    PathBuf::from("output").join(format!("cumulative-stats-{}.{}", date_stamp(), extension))
}

/// Default chart data output: output/cumulative-chart-{YYMMDD}.json
pub fn generate_default_chart_filename() -> PathBuf {
    PathBuf::from("output").join(format!("cumulative-chart-{}.json", date_stamp()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_default_output_filename() {
        let filename = generate_default_output_filename("csv");
        let filename_str = filename.to_string_lossy();

        let parts: Vec<&str> = filename_str.split('/').collect();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], "output");

        let file_part = parts[1];
        assert!(file_part.starts_with("cumulative-stats-"));
        assert!(file_part.ends_with(".csv"));
        // cumulative-stats-YYMMDD.csv
        assert_eq!(file_part.len(), "cumulative-stats-".len() + 6 + ".csv".len());
    }

    #[test]
    fn test_generate_default_chart_filename() {
        let filename = generate_default_chart_filename();
        let filename_str = filename.to_string_lossy();

        assert!(filename_str.starts_with("output/cumulative-chart-"));
        assert!(filename_str.ends_with(".json"));
    }
}
