//! CSV log of found buckets.

use async_trait::async_trait;
use bp_error::{BpError, Result};
use bp_traits::ResultSink;
use bp_types::CheckResult;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Writes `name,region,listable,writable` records, without a header.
pub struct CsvSink<W: Write + Send> {
    writer: csv::Writer<W>,
}

impl CsvSink<std::fs::File> {
    /// Create `path`, truncating any log left by an earlier run.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path.as_ref())?;
        Ok(Self::from_writer(file))
    }
}

impl<W: Write + Send> CsvSink<W> {
    /// Write records to any writer.
    pub fn from_writer(writer: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(writer),
        }
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| BpError::Sink(format!("failed to flush CSV log: {}", e.error())))
    }
}

#[async_trait]
impl<W: Write + Send> ResultSink for CsvSink<W> {
    async fn report(&mut self, result: &CheckResult) -> Result<()> {
        self.writer
            .write_record(result.csv_record())
            .map_err(|e| BpError::Sink(format!("failed to write CSV record: {e}")))
    }

    async fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
