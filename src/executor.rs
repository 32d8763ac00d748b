//! Per-batch query execution.
//!
//! Runs the caller's Cypher once per [`Batch`], strictly in order, each in
//! its own write transaction. The first failure stops the run; batches that
//! already committed stay committed.

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use tracing::{error, info};

use crate::batch::{batch_count, partition, Batch};
use crate::config::IngestConfig;
use crate::driver::{GraphDriver, QueryCounters};
use crate::errors::{IngestError, Result};
use crate::loader::{load_records, Record};

/// Parameter name the batch rows are bound to (`$rows` in the query).
pub const ROWS_PARAM: &str = "rows";

/// Outcome of one committed batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub index: usize,
    pub start: usize,
    pub end: usize,
    pub counters: QueryCounters,
    pub elapsed: Duration,
}

impl BatchReport {
    /// Elapsed wall-clock time in milliseconds, rounded to 6 decimals.
    pub fn elapsed_ms(&self) -> f64 {
        round_ms(self.elapsed)
    }
}

/// Totals for a run in which every batch committed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestSummary {
    pub batches: usize,
    pub rows: usize,
    pub counters: QueryCounters,
    pub elapsed: Duration,
}

fn round_ms(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 1_000.0 * 1e6).round() / 1e6
}

/// Executes one Cypher template against a [`GraphDriver`], batch by batch.
pub struct BatchExecutor<'a, D> {
    driver: &'a D,
    query: &'a str,
}

impl<'a, D: GraphDriver> BatchExecutor<'a, D> {
    pub fn new(driver: &'a D, query: &'a str) -> Self {
        Self { driver, query }
    }

    /// Run every batch of `records` in order, stopping at the first failure.
    ///
    /// # Errors
    /// Returns [`IngestError::Batch`] naming the failed batch. Batches before
    /// it are committed; batches after it never run.
    pub async fn run(&self, records: &[Record], batch_size: NonZeroUsize) -> Result<IngestSummary> {
        let started = Instant::now();
        let total = batch_count(records.len(), batch_size);
        info!(
            rows = records.len(),
            batches = total,
            batch_size = batch_size.get(),
            database = self.driver.database(),
            "starting load"
        );

        let mut summary = IngestSummary::default();
        for batch in partition(records, batch_size) {
            let report = self.run_batch(batch).await?;
            summary.batches += 1;
            summary.rows += report.end - report.start;
            summary.counters += report.counters;
        }
        summary.elapsed = started.elapsed();

        info!(
            batches = summary.batches,
            rows = summary.rows,
            "Completed. Counters: {}, TimeTaken: {} ms",
            summary.counters,
            round_ms(summary.elapsed)
        );
        Ok(summary)
    }

    /// Run one batch in its own write transaction.
    pub async fn run_batch(&self, batch: Batch<'_, Record>) -> Result<BatchReport> {
        info!(batch = batch.index, "Batch - Start: '{}' End: '{}'", batch.start, batch.end);
        info!(batch = batch.index, "Executing cypher '{}'", self.query);

        let write = self
            .driver
            .run_write(self.query, ROWS_PARAM, batch.rows)
            .await
            .map_err(|source| {
                error!(
                    batch = batch.index,
                    start = batch.start,
                    end = batch.end,
                    database = self.driver.database(),
                    error = %source,
                    "Exception executing the cypher '{}'",
                    self.query
                );
                IngestError::Batch {
                    index: batch.index,
                    start: batch.start,
                    end: batch.end,
                    source,
                }
            })?;

        let report = BatchReport {
            index: batch.index,
            start: batch.start,
            end: batch.end,
            counters: write.counters,
            elapsed: write.elapsed,
        };
        info!(
            batch = report.index,
            "Counters: {}, TimeTaken: {} ms",
            report.counters,
            report.elapsed_ms()
        );
        Ok(report)
    }
}

/// Load the configured CSV file and run the configured query over it.
///
/// The file is read only after the driver exists, so a missing `--file`
/// surfaces after connecting.
pub async fn ingest<D: GraphDriver>(driver: &D, config: &IngestConfig) -> Result<IngestSummary> {
    let records = load_records(config.file.as_deref())?;
    BatchExecutor::new(driver, &config.cypher)
        .run(&records, config.batch_size)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_ms_keeps_six_decimals() {
        assert_eq!(round_ms(Duration::from_nanos(1_234_567)), 1.234567);
        assert_eq!(round_ms(Duration::from_nanos(1)), 0.000001);
        assert_eq!(round_ms(Duration::from_millis(250)), 250.0);
    }

    #[test]
    fn test_batch_report_elapsed_ms() {
        let report = BatchReport {
            index: 0,
            start: 0,
            end: 10,
            counters: QueryCounters::default(),
            elapsed: Duration::from_micros(1500),
        };
        assert_eq!(report.elapsed_ms(), 1.5);
    }
}
