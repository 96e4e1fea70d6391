use crate::error::{ProcessingError, Result};
use crate::models::{DailyCumulativeStats, PercentileValue};
use crate::utils::constants::{
    COMPRESSION_GZIP, COMPRESSION_LZ4, COMPRESSION_NONE, COMPRESSION_SNAPPY, COMPRESSION_ZSTD,
    DEFAULT_ROW_GROUP_SIZE,
};
use crate::writers::StatsLayout;
use arrow::array::*;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use parquet::file::reader::{FileReader, SerializedFileReader};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

pub struct ParquetWriter {
    compression: Compression,
    row_group_size: usize,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            COMPRESSION_SNAPPY => Compression::SNAPPY,
            COMPRESSION_GZIP => Compression::GZIP(GzipLevel::default()),
            COMPRESSION_LZ4 => Compression::LZ4,
            COMPRESSION_ZSTD => Compression::ZSTD(ZstdLevel::default()),
            COMPRESSION_NONE => Compression::UNCOMPRESSED,
            _ => {
                return Err(ProcessingError::InvalidConfig(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Write the statistics table. Statistic columns are nullable Float64.
    pub fn write_stats(
        &self,
        stats: &[DailyCumulativeStats],
        layout: &StatsLayout,
        path: &Path,
    ) -> Result<()> {
        if stats.is_empty() {
            warn!(path = %path.display(), "No statistics rows, Parquet file not written");
            return Ok(());
        }

        let schema = self.create_schema(layout);
        let file = File::create(path)?;
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;
        for chunk in stats.chunks(self.row_group_size.max(1)) {
            let batch = self.stats_to_batch(chunk, layout, schema.clone())?;
            writer.write(&batch)?;
        }
        writer.close()?;

        Ok(())
    }

    fn create_schema(&self, layout: &StatsLayout) -> Arc<Schema> {
        let mut fields = vec![
            Field::new("station_id", DataType::Utf8, false),
            Field::new("day_of_year", DataType::UInt32, false),
            Field::new("date", DataType::Date32, false),
            Field::new("n_years", DataType::UInt64, false),
        ];

        let headers = layout.headers();
        fields.extend(
            headers
                .iter()
                .skip(StatsLayout::KEY_COLUMNS.len())
                .map(|name| Field::new(name.as_str(), DataType::Float64, true)),
        );

        Arc::new(Schema::new(fields))
    }

    fn stats_to_batch(
        &self,
        stats: &[DailyCumulativeStats],
        layout: &StatsLayout,
        schema: Arc<Schema>,
    ) -> Result<RecordBatch> {
        let station_ids: Vec<&str> = stats.iter().map(|r| r.station_id.as_str()).collect();
        let days: Vec<u32> = stats.iter().map(|r| r.day_of_year).collect();
        let dates: Vec<i32> = stats.iter().map(|r| date_to_days(r.calendar_date)).collect();
        let n_years: Vec<u64> = stats.iter().map(|r| r.n_years as u64).collect();

        let mut columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(station_ids)),
            Arc::new(UInt32Array::from(days)),
            Arc::new(Date32Array::from(dates)),
            Arc::new(UInt64Array::from(n_years)),
        ];

        // Row-major values transposed into one nullable column per statistic
        let rows: Vec<Vec<Option<f64>>> = stats.iter().map(|r| layout.values(r)).collect();
        let width = layout.headers().len() - StatsLayout::KEY_COLUMNS.len();
        for column in 0..width {
            let values: Vec<Option<f64>> = rows.iter().map(|r| r[column]).collect();
            columns.push(Arc::new(Float64Array::from(values)));
        }

        Ok(RecordBatch::try_new(schema, columns)?)
    }

    /// Read statistics rows back, up to `limit`.
    pub fn read_stats(&self, path: &Path, limit: usize) -> Result<Vec<DailyCumulativeStats>> {
        let file = File::open(path)?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?
            .with_batch_size(limit.clamp(1, 8192))
            .build()?;

        let mut stats = Vec::new();
        for batch_result in reader {
            let batch = batch_result?;

            let station_ids = column::<StringArray>(&batch, "station_id")?;
            let days = column::<UInt32Array>(&batch, "day_of_year")?;
            let dates = column::<Date32Array>(&batch, "date")?;
            let n_years = column::<UInt64Array>(&batch, "n_years")?;
            let mean = column::<Float64Array>(&batch, "mean")?;
            let median = column::<Float64Array>(&batch, "median")?;
            let minimum = column::<Float64Array>(&batch, "minimum")?;
            let maximum = column::<Float64Array>(&batch, "maximum")?;
            let overlay = batch
                .column_by_name(StatsLayout::OVERLAY_COLUMN)
                .and_then(|c| c.as_any().downcast_ref::<Float64Array>());

            let mut percentile_columns = Vec::new();
            for (index, field) in batch.schema().fields().iter().enumerate() {
                if let Some(p) = field
                    .name()
                    .strip_prefix('P')
                    .and_then(|p| p.parse::<f64>().ok())
                {
                    let array = batch
                        .column(index)
                        .as_any()
                        .downcast_ref::<Float64Array>()
                        .ok_or_else(|| {
                            ProcessingError::InvalidFormat(format!(
                                "Invalid {} column type",
                                field.name()
                            ))
                        })?;
                    percentile_columns.push((p, array));
                }
            }

            for i in 0..batch.num_rows() {
                if stats.len() >= limit {
                    return Ok(stats);
                }

                stats.push(DailyCumulativeStats {
                    station_id: station_ids.value(i).to_string(),
                    day_of_year: days.value(i),
                    calendar_date: days_to_date(dates.value(i))?,
                    n_years: n_years.value(i) as usize,
                    mean: nullable(mean, i),
                    median: nullable(median, i),
                    minimum: nullable(minimum, i),
                    maximum: nullable(maximum, i),
                    percentiles: percentile_columns
                        .iter()
                        .map(|(percentile, array)| PercentileValue {
                            percentile: *percentile,
                            value: nullable(array, i),
                        })
                        .collect(),
                    overlay: overlay.and_then(|array| nullable(array, i)),
                });
            }
        }

        Ok(stats)
    }

    /// Get file statistics
    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let file_metadata = metadata.file_metadata();
        let row_groups = metadata.num_row_groups();
        let total_rows = file_metadata.num_rows();
        let file_size = std::fs::metadata(path)?.len();

        let row_group_sizes = metadata
            .row_groups()
            .iter()
            .map(|rg| rg.num_rows())
            .collect();

        let columns = file_metadata
            .schema_descr()
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();

        let compression = metadata
            .row_groups()
            .first()
            .filter(|rg| rg.num_columns() > 0)
            .map(|rg| rg.column(0).compression())
            .unwrap_or(self.compression);

        Ok(ParquetFileInfo {
            total_rows,
            row_groups: row_groups as i32,
            row_group_sizes,
            file_size,
            compression,
            columns,
        })
    }
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn column<'a, T: 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<T>())
        .ok_or_else(|| ProcessingError::InvalidFormat(format!("Invalid {} column type", name)))
}

fn nullable(array: &Float64Array, index: usize) -> Option<f64> {
    if array.is_null(index) {
        None
    } else {
        Some(array.value(index))
    }
}

/// Date32 stores days since the Unix epoch.
fn date_to_days(date: NaiveDate) -> i32 {
    date.signed_duration_since(NaiveDate::default()).num_days() as i32
}

fn days_to_date(days: i32) -> Result<NaiveDate> {
    NaiveDate::default()
        .checked_add_signed(chrono::Duration::days(days as i64))
        .ok_or_else(|| ProcessingError::InvalidFormat(format!("Invalid date value {}", days)))
}

#[derive(Debug)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: i32,
    pub row_group_sizes: Vec<i64>,
    pub file_size: u64,
    pub compression: Compression,
    pub columns: Vec<String>,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        format!(
            "Parquet File Summary:\n\
            - Total rows: {}\n\
            - Row groups: {}\n\
            - File size: {:.2} MB\n\
            - Compression: {:?}\n\
            - Avg rows per group: {:.0}\n\
            - Columns: {}",
            self.total_rows,
            self.row_groups,
            self.file_size as f64 / 1_048_576.0,
            self.compression,
            self.total_rows as f64 / self.row_groups.max(1) as f64,
            self.columns.join(", ")
        )
    }
}
