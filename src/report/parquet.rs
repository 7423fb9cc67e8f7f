//! Parquet report writer
//!
//! One file per report table, every column stored as UTF-8 so formatted
//! decimals keep their precision.

use super::ReportTable;
use ::parquet::arrow::ArrowWriter;
use ::parquet::basic::Compression;
use ::parquet::file::properties::WriterProperties;
use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Schema with one non-null UTF-8 field per column
pub fn table_schema(table: &ReportTable) -> Schema {
    Schema::new(
        table
            .columns
            .iter()
            .map(|name| Field::new(name, DataType::Utf8, false))
            .collect::<Vec<_>>(),
    )
}

/// Writes report tables into an output directory
pub struct ParquetReportWriter {
    output_dir: PathBuf,
}

impl ParquetReportWriter {
    /// Create a new writer rooted at `output_dir`
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Ensure output directory exists
    pub fn ensure_dir(&self) -> anyhow::Result<()> {
        fs::create_dir_all(&self.output_dir)?;
        Ok(())
    }

    /// Path a table is written to
    pub fn file_path(&self, table: &ReportTable) -> PathBuf {
        self.output_dir.join(format!("{}.parquet", table.slug()))
    }

    /// Write one table, returning the file path
    pub fn write_table(&self, table: &ReportTable) -> anyhow::Result<PathBuf> {
        if let Some(row) = table.rows.iter().find(|r| r.len() != table.columns.len()) {
            anyhow::bail!(
                "row {:?} in table {} has {} cells, expected {}",
                row,
                table.name,
                row.len(),
                table.columns.len()
            );
        }

        self.ensure_dir()?;

        let path = self.file_path(table);
        let schema = Arc::new(table_schema(table));
        let file = File::create(&path)?;

        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();

        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;

        let columns: Vec<ArrayRef> = (0..table.columns.len())
            .map(|i| {
                let cells: Vec<&str> = table.rows.iter().map(|row| row[i].as_str()).collect();
                Arc::new(StringArray::from(cells)) as ArrayRef
            })
            .collect();

        let batch = RecordBatch::try_new(schema, columns)?;

        writer.write(&batch)?;
        writer.close()?;

        tracing::debug!(path = ?path, rows = table.rows.len(), "Wrote report table to Parquet");

        Ok(path)
    }

    /// Write every table, returning the file paths in order
    pub fn write_all(&self, tables: &[ReportTable]) -> anyhow::Result<Vec<PathBuf>> {
        tables.iter().map(|t| self.write_table(t)).collect()
    }
}
