//! Durable batch file writers
//!
//! Writes Arrow RecordBatches to an Arrow IPC file or a Parquet file.

use crate::config::{FileFormat, ParquetOptions};
use crate::error::{Error, Result};
use arrow::datatypes::Schema;
use arrow::ipc::writer::FileWriter;
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::{EnabledStatistics, WriterProperties};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;

/// Configuration for Parquet writer
#[derive(Debug, Clone)]
pub struct ParquetWriterConfig {
    compression: Compression,
    row_group_size: usize,
    dictionary_enabled: bool,
    statistics_enabled: bool,
}

impl Default for ParquetWriterConfig {
    fn default() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: 1024 * 1024, // 1M rows
            dictionary_enabled: true,
            statistics_enabled: true,
        }
    }
}

impl ParquetWriterConfig {
    /// Create a new config with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from serialized export options
    pub fn from_options(options: &ParquetOptions) -> Result<Self> {
        let compression = match options.compression.to_lowercase().as_str() {
            "none" | "uncompressed" => Compression::UNCOMPRESSED,
            "snappy" => Compression::SNAPPY,
            "gzip" => Compression::GZIP(GzipLevel::default()),
            "zstd" => Compression::ZSTD(ZstdLevel::default()),
            other => {
                return Err(Error::invalid_value(
                    "parquet.compression",
                    format!("unsupported codec '{other}'"),
                ))
            }
        };
        Ok(Self {
            compression,
            row_group_size: options.row_group_size,
            dictionary_enabled: options.dictionary,
            statistics_enabled: options.statistics,
        })
    }

    /// Set compression algorithm
    #[must_use]
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Set row group size
    #[must_use]
    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Enable or disable dictionary encoding
    #[must_use]
    pub fn with_dictionary(mut self, enabled: bool) -> Self {
        self.dictionary_enabled = enabled;
        self
    }

    /// Enable or disable statistics
    #[must_use]
    pub fn with_statistics(mut self, enabled: bool) -> Self {
        self.statistics_enabled = enabled;
        self
    }

    /// Get compression algorithm
    #[must_use]
    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Get row group size
    #[must_use]
    pub fn row_group_size(&self) -> usize {
        self.row_group_size
    }

    /// Build writer properties
    fn build_properties(&self) -> WriterProperties {
        let mut builder = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size);

        if !self.dictionary_enabled {
            builder = builder.set_dictionary_enabled(false);
        }

        if !self.statistics_enabled {
            builder = builder.set_statistics_enabled(EnabledStatistics::None);
        }

        builder.build()
    }
}

/// Open writer for one durable output file
pub enum BatchFileWriter {
    /// Arrow IPC file: schema header, batches, footer
    Arrow(FileWriter<BufWriter<File>>),
    /// Parquet file, one row group flushed per batch
    Parquet(ArrowWriter<File>),
}

impl BatchFileWriter {
    /// Create the file and write its header
    pub fn create(
        path: &Path,
        schema: &Schema,
        format: FileFormat,
        parquet: &ParquetWriterConfig,
    ) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path).map_err(|e| {
            Error::output(format!("Failed to create file {}: {e}", path.display()))
        })?;

        let writer = match format {
            FileFormat::Arrow => {
                BatchFileWriter::Arrow(FileWriter::try_new(BufWriter::new(file), schema)?)
            }
            FileFormat::Parquet => BatchFileWriter::Parquet(ArrowWriter::try_new(
                file,
                Arc::new(schema.clone()),
                Some(parquet.build_properties()),
            )?),
        };
        Ok(writer)
    }

    /// Write one batch and flush it to the file
    pub fn write(&mut self, batch: &RecordBatch) -> Result<()> {
        match self {
            BatchFileWriter::Arrow(writer) => {
                writer.write(batch)?;
                writer.flush()?;
            }
            BatchFileWriter::Parquet(writer) => {
                writer.write(batch)?;
                writer.flush()?;
            }
        }
        Ok(())
    }

    /// Write the footer and close the file
    pub fn close(self) -> Result<()> {
        match self {
            BatchFileWriter::Arrow(mut writer) => writer.finish()?,
            BatchFileWriter::Parquet(writer) => {
                writer.close()?;
            }
        }
        Ok(())
    }
}
