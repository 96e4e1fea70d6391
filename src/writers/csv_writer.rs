use crate::error::Result;
use crate::models::DailyCumulativeStats;
use crate::utils::constants::DEFAULT_DATE_FORMAT;
use crate::writers::StatsLayout;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Flat CSV output. Null statistics are written as empty cells.
pub struct CsvWriter {
    delimiter: u8,
}

impl CsvWriter {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn write_stats(
        &self,
        stats: &[DailyCumulativeStats],
        layout: &StatsLayout,
        path: &Path,
    ) -> Result<()> {
        let file = File::create(path)?;
        self.write_to(stats, layout, file)
    }

    pub fn write_to<W: Write>(
        &self,
        stats: &[DailyCumulativeStats],
        layout: &StatsLayout,
        writer: W,
    ) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(writer);

        writer.write_record(layout.headers())?;

        for row in stats {
            let mut record = vec![
                row.station_id.clone(),
                row.day_of_year.to_string(),
                row.calendar_date.format(DEFAULT_DATE_FORMAT).to_string(),
                row.n_years.to_string(),
            ];
            record.extend(
                layout
                    .values(row)
                    .into_iter()
                    .map(|v| v.map(|v| v.to_string()).unwrap_or_default()),
            );
            writer.write_record(&record)?;
        }

        writer.flush()?;
        Ok(())
    }
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self::new()
    }
}
