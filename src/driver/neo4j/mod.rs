//! Neo4j graph driver implementation.
//!
//! Uses `neo4rs` 0.9 for async, pooled Bolt connections. Every write runs in
//! an explicit transaction on the configured database; the result stream is
//! discarded and only the summary counters are kept.

use std::collections::HashMap;
use std::time::Instant;

use neo4rs::{query, ConfigBuilder, Graph, Query, Txn};
use tracing::{debug, info, warn};

use crate::config::ConnectionConfig;
use crate::driver::{DriverResult, GraphDriver, QueryCounters, WriteSummary};
use crate::errors::DriverError;
use crate::loader::Record;

/// [`GraphDriver`] backed by a `neo4rs` connection pool.
pub struct Neo4jDriver {
    graph: Graph,
    database: String,
}

impl Neo4jDriver {
    /// Build the connection pool for `config`.
    ///
    /// Bolt connections are opened lazily; call [`GraphDriver::ping`] to
    /// surface bad URIs or credentials up front.
    pub fn connect(config: &ConnectionConfig) -> DriverResult<Self> {
        info!("Connecting to Neo4j {}", config.uri);

        let neo4j_config = ConfigBuilder::default()
            .uri(config.uri.as_str())
            .user(config.username.as_str())
            .password(config.password.as_str())
            .db(config.database.as_str())
            .build()
            .map_err(connection_error)?;

        let graph = Graph::connect(neo4j_config).map_err(connection_error)?;

        Ok(Self {
            graph,
            database: config.database.clone(),
        })
    }

    /// Run `q` inside `txn` and return its summary counters.
    async fn execute_in(txn: &mut Txn, q: Query) -> DriverResult<QueryCounters> {
        let stream = txn.execute(q).await.map_err(transaction_error)?;
        let summary = stream
            .finish(txn.handle())
            .await
            .map_err(transaction_error)?;

        Ok(QueryCounters::from(summary.stats()))
    }
}

impl GraphDriver for Neo4jDriver {
    async fn ping(&self) -> DriverResult<()> {
        let mut rows = self
            .graph
            .execute(query("RETURN 1"))
            .await
            .map_err(connection_error)?;
        rows.next().await.map_err(connection_error)?;
        debug!(database = %self.database, "neo4j reachable");
        Ok(())
    }

    async fn run_write(
        &self,
        cypher: &str,
        param: &str,
        rows: &[Record],
    ) -> DriverResult<WriteSummary> {
        let mut txn = self
            .graph
            .start_txn()
            .await
            .map_err(connection_error)?;
        let started = Instant::now();

        let params: Vec<HashMap<String, String>> = rows.iter().map(Record::to_map).collect();
        let q = query(cypher).param(param, params);

        match Self::execute_in(&mut txn, q).await {
            Ok(counters) => {
                txn.commit()
                    .await
                    .map_err(|e| DriverError::Transaction(format!("commit failed: {e}")))?;
                Ok(WriteSummary {
                    counters,
                    elapsed: started.elapsed(),
                })
            }
            Err(err) => match txn.rollback().await {
                Ok(()) => Err(err),
                // The transaction outcome is unknown once rollback fails too.
                Err(rollback) => {
                    warn!(error = %rollback, "rollback after failed query did not complete");
                    Err(DriverError::Internal(format!(
                        "{err}; rollback failed: {rollback}"
                    )))
                }
            },
        }
    }

    fn database(&self) -> &str {
        &self.database
    }

    async fn close(&self) -> DriverResult<()> {
        // The pool closes its connections when the Graph is dropped.
        debug!(database = %self.database, "closing neo4j driver");
        Ok(())
    }
}

impl From<&neo4rs::summary::Counters> for QueryCounters {
    fn from(c: &neo4rs::summary::Counters) -> Self {
        Self {
            nodes_created: c.nodes_created,
            nodes_deleted: c.nodes_deleted,
            relationships_created: c.relationships_created,
            relationships_deleted: c.relationships_deleted,
            properties_set: c.properties_set,
            labels_added: c.labels_added,
            labels_removed: c.labels_removed,
            indexes_added: c.indexes_added,
            indexes_removed: c.indexes_removed,
            constraints_added: c.constraints_added,
            constraints_removed: c.constraints_removed,
            system_updates: c.system_updates,
        }
    }
}

fn connection_error(err: neo4rs::Error) -> DriverError {
    DriverError::Connection(err.to_string())
}

fn transaction_error(err: neo4rs::Error) -> DriverError {
    DriverError::Transaction(err.to_string())
}
