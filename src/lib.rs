//! # neo4j-csv-loader
//!
//! Loads a CSV file into Neo4j by running one parameterized Cypher query per
//! fixed-size batch of rows.
//!
//! ## Architecture
//!
//! - **Loader**: CSV file → ordered [`loader::Record`]s (all values are strings)
//! - **Batcher**: records → contiguous windows of `--batch` rows
//! - **Executor**: one write transaction per window, rows bound to `$rows`
//!
//! Batches run strictly in sequence. The first failing batch stops the run;
//! earlier batches remain committed.

pub mod batch;
pub mod config;
pub mod driver;
pub mod errors;
pub mod executor;
pub mod loader;

pub use config::{Args, ConnectionConfig, IngestConfig};
pub use driver::{neo4j::Neo4jDriver, GraphDriver, QueryCounters, WriteSummary};
pub use errors::{DriverError, IngestError, LoadError, Result};
pub use executor::{ingest, BatchExecutor, IngestSummary};
