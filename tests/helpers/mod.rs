#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use tempfile::TempDir;

use neo4j_csv_loader::driver::DriverResult;
use neo4j_csv_loader::loader::Record;
use neo4j_csv_loader::{DriverError, GraphDriver, QueryCounters, WriteSummary};

/// Temporary directory holding CSV fixtures.
pub struct TempCsv {
    pub dir: TempDir,
}

impl TempCsv {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp csv dir");
        Self { dir }
    }

    /// Write `content` to `name` inside the temp dir and return its path.
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        let mut file = std::fs::File::create(&path).expect("create csv file");
        file.write_all(content.as_bytes()).expect("write csv file");
        path
    }

    /// Write a `id,name` CSV with `n` rows (`0,name-0`, `1,name-1`, ...).
    pub fn people(&self, n: usize) -> PathBuf {
        let mut content = String::from("id,name\n");
        for i in 0..n {
            content.push_str(&format!("{i},name-{i}\n"));
        }
        self.write("people.csv", &content)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// One `run_write` call as seen by [`RecordingDriver`].
#[derive(Debug, Clone)]
pub struct WriteCall {
    pub query: String,
    pub param: String,
    pub rows: Vec<Record>,
}

/// Query time every successful [`RecordingDriver`] write reports.
pub const WRITE_TIME: Duration = Duration::from_micros(2_500);

/// In-memory [`GraphDriver`] that records every write and can be told to fail.
///
/// A successful call counts one created node per row and reports
/// [`WRITE_TIME`]. A failing call is recorded as attempted but never committed.
pub struct RecordingDriver {
    database: String,
    fail_on_call: Option<usize>,
    attempts: Mutex<Vec<WriteCall>>,
    committed: Mutex<Vec<WriteCall>>,
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self {
            database: "neo4j".to_string(),
            fail_on_call: None,
            attempts: Mutex::new(Vec::new()),
            committed: Mutex::new(Vec::new()),
        }
    }

    /// Fail the `n`-th (zero-based) write with a transaction error.
    pub fn failing_on(n: usize) -> Self {
        Self {
            fail_on_call: Some(n),
            ..Self::new()
        }
    }

    pub fn attempts(&self) -> Vec<WriteCall> {
        self.attempts.lock().expect("attempts lock").clone()
    }

    pub fn committed(&self) -> Vec<WriteCall> {
        self.committed.lock().expect("committed lock").clone()
    }
}

impl GraphDriver for RecordingDriver {
    async fn ping(&self) -> DriverResult<()> {
        Ok(())
    }

    async fn run_write(
        &self,
        query: &str,
        param: &str,
        rows: &[Record],
    ) -> DriverResult<WriteSummary> {
        let call = WriteCall {
            query: query.to_string(),
            param: param.to_string(),
            rows: rows.to_vec(),
        };

        let attempt = {
            let mut attempts = self.attempts.lock().expect("attempts lock");
            attempts.push(call.clone());
            attempts.len() - 1
        };

        if self.fail_on_call == Some(attempt) {
            return Err(DriverError::Transaction(
                "Neo.ClientError.Schema.ConstraintValidationFailed".to_string(),
            ));
        }

        self.committed.lock().expect("committed lock").push(call);
        Ok(WriteSummary {
            counters: QueryCounters {
                nodes_created: rows.len() as u64,
                properties_set: rows.iter().map(|r| r.len() as u64).sum(),
                ..Default::default()
            },
            elapsed: WRITE_TIME,
        })
    }

    fn database(&self) -> &str {
        &self.database
    }

    async fn close(&self) -> DriverResult<()> {
        Ok(())
    }
}
