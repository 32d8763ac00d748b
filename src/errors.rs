//! Error types for neo4j-csv-loader.

use std::path::PathBuf;

/// Alias for Results returning [`IngestError`].
pub type Result<T> = std::result::Result<T, IngestError>;

/// Top-level error type for a load run.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Driver(#[from] DriverError),

    /// A batch failed inside its write transaction. Rows `[start, end)` were
    /// rolled back; earlier batches stay committed.
    #[error("Batch {index} (rows {start}..{end}) failed: {source}")]
    Batch {
        index: usize,
        start: usize,
        end: usize,
        #[source]
        source: DriverError,
    },
}

/// Errors raised while reading the CSV input.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("No input file given (use -f/--file)")]
    MissingPath,

    #[error("Cannot open '{}': {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV in '{}'{}: {message}", path.display(), line_suffix(*line))]
    Parse {
        path: PathBuf,
        line: Option<u64>,
        message: String,
    },
}

fn line_suffix(line: Option<u64>) -> String {
    line.map(|l| format!(" at line {l}")).unwrap_or_default()
}

/// Graph driver errors, split by where the failure happened.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DriverError {
    /// Could not reach the database or acquire a session/transaction.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The query or its commit failed inside an open write transaction.
    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Driver error: {0}")]
    Internal(String),
}
