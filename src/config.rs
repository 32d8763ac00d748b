//! Command-line arguments and the validated run configuration.

use std::fmt;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use validator::Validate;

use crate::batch::DEFAULT_BATCH_SIZE;
use crate::errors::{IngestError, Result};

/// Database used when `-d/--database` is not given.
pub const DEFAULT_DATABASE: &str = "neo4j";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Timestamped single-line text.
    Text,
    /// One JSON object per line.
    Json,
}

/// Arguments for loading a CSV file into a Neo4j database.
#[derive(Parser)]
#[command(
    name = "neo4j-csv-loader",
    version,
    about = "Arguments for loading csv into neo4j database"
)]
pub struct Args {
    /// Neo4j connection URI (mandatory), e.g. neo4j://localhost:7687
    #[arg(short = 'n', long = "neo4juri", env = "NEO4J_URI")]
    pub neo4juri: String,

    /// Neo4j database
    #[arg(short, long, env = "NEO4J_DATABASE", default_value = DEFAULT_DATABASE)]
    pub database: String,

    /// Neo4j username (mandatory)
    #[arg(short, long, env = "NEO4J_USERNAME")]
    pub username: String,

    /// Neo4j password (mandatory)
    #[arg(short, long, env = "NEO4J_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Input cypher query (mandatory); rows are bound to $rows
    #[arg(short, long)]
    pub cypher: String,

    /// Input CSV file path
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Batch size
    #[arg(short, long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch: NonZeroUsize,

    /// Log output format
    #[arg(long, value_enum, env = "LOG_FORMAT", default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Args")
            .field("neo4juri", &self.neo4juri)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("cypher", &self.cypher)
            .field("file", &self.file)
            .field("batch", &self.batch)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl Args {
    /// Validate the arguments and split them into an [`IngestConfig`].
    ///
    /// `file` stays optional here; a missing path is reported when loading.
    pub fn into_config(self) -> Result<IngestConfig> {
        let config = IngestConfig {
            connection: ConnectionConfig {
                uri: self.neo4juri,
                username: self.username,
                password: self.password,
                database: self.database,
            },
            cypher: self.cypher,
            file: self.file,
            batch_size: self.batch,
        };

        config
            .validate()
            .map_err(|e| IngestError::Config(e.to_string()))?;

        Ok(config)
    }
}

/// Connection settings for the graph database.
#[derive(Clone, PartialEq, Eq, Validate)]
pub struct ConnectionConfig {
    /// Bolt/neo4j URI (e.g. `neo4j://localhost:7687`).
    #[validate(length(min = 1))]
    pub uri: String,

    #[validate(length(min = 1))]
    pub username: String,

    pub password: String,

    /// Database every session is bound to.
    #[validate(length(min = 1))]
    pub database: String,
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("uri", &self.uri)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

/// Everything a load run needs, passed explicitly instead of held globally.
#[derive(Debug, Clone, Validate)]
pub struct IngestConfig {
    #[validate(nested)]
    pub connection: ConnectionConfig,

    /// Cypher template executed once per batch.
    #[validate(length(min = 1))]
    pub cypher: String,

    pub file: Option<PathBuf>,

    pub batch_size: NonZeroUsize,
}
