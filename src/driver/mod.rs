//! Graph database driver abstraction.
//!
//! Defines the [`GraphDriver`] trait the batch executor runs against, plus the
//! Neo4j implementation.

pub mod neo4j;

use std::fmt;
use std::ops::AddAssign;
use std::time::Duration;

use crate::errors::DriverError;
use crate::loader::Record;

/// Alias for Results returning [`DriverError`].
pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// Mutation counters reported by the database for one query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryCounters {
    pub nodes_created: u64,
    pub nodes_deleted: u64,
    pub relationships_created: u64,
    pub relationships_deleted: u64,
    pub properties_set: u64,
    pub labels_added: u64,
    pub labels_removed: u64,
    pub indexes_added: u64,
    pub indexes_removed: u64,
    pub constraints_added: u64,
    pub constraints_removed: u64,
    pub system_updates: u64,
}

impl QueryCounters {
    /// True when the query changed nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl AddAssign for QueryCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.nodes_created += rhs.nodes_created;
        self.nodes_deleted += rhs.nodes_deleted;
        self.relationships_created += rhs.relationships_created;
        self.relationships_deleted += rhs.relationships_deleted;
        self.properties_set += rhs.properties_set;
        self.labels_added += rhs.labels_added;
        self.labels_removed += rhs.labels_removed;
        self.indexes_added += rhs.indexes_added;
        self.indexes_removed += rhs.indexes_removed;
        self.constraints_added += rhs.constraints_added;
        self.constraints_removed += rhs.constraints_removed;
        self.system_updates += rhs.system_updates;
    }
}

/// Compact `{name: value, ...}` listing of the non-zero counters.
impl fmt::Display for QueryCounters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = [
            ("nodes_created", self.nodes_created),
            ("nodes_deleted", self.nodes_deleted),
            ("relationships_created", self.relationships_created),
            ("relationships_deleted", self.relationships_deleted),
            ("properties_set", self.properties_set),
            ("labels_added", self.labels_added),
            ("labels_removed", self.labels_removed),
            ("indexes_added", self.indexes_added),
            ("indexes_removed", self.indexes_removed),
            ("constraints_added", self.constraints_added),
            ("constraints_removed", self.constraints_removed),
            ("system_updates", self.system_updates),
        ];
        f.write_str("{")?;
        let mut first = true;
        for (name, value) in fields.iter().filter(|(_, v)| *v > 0) {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "'{name}': {value}")?;
            first = false;
        }
        f.write_str("}")
    }
}

/// Result of one committed write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub counters: QueryCounters,
    /// Time from the start of the query to commit; session acquisition is
    /// not included.
    pub elapsed: Duration,
}

/// Trait representing a graph database backend.
///
/// Each [`GraphDriver::run_write`] call is one scoped unit of work: acquire a
/// session on [`GraphDriver::database`], run inside a write transaction,
/// commit or roll back, release.
#[allow(async_fn_in_trait)]
pub trait GraphDriver: Send + Sync {
    /// Health check — verify connectivity to the database.
    async fn ping(&self) -> DriverResult<()>;

    /// Run `query` with `rows` bound as a list of maps under `$param`, inside a
    /// single write transaction. Nothing is committed unless this returns `Ok`.
    async fn run_write(&self, query: &str, param: &str, rows: &[Record])
        -> DriverResult<WriteSummary>;

    /// Name of the database sessions are bound to.
    fn database(&self) -> &str;

    /// Close the connection pool.
    async fn close(&self) -> DriverResult<()>;
}
