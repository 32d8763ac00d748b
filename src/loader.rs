//! CSV loading.
//!
//! Reads a header-led CSV file into an ordered list of [`Record`]s. Every
//! value stays a string. Unquoted fields lose surrounding whitespace; quoted
//! fields are kept exactly as written. Ragged rows are an error, never padded
//! or skipped.

use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info};

use crate::errors::LoadError;

/// One CSV data row: column name to value, in header order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Record(IndexMap<String, String>);

impl Record {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate `(column, value)` pairs in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Owned map form used as a Bolt parameter value.
    pub fn to_map(&self) -> HashMap<String, String> {
        self.0
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Load every record from the CSV file at `path`.
///
/// `path` is optional because `--file` is optional on the command line; a
/// missing path is reported here, at load time.
pub fn load_records(path: Option<&Path>) -> Result<Vec<Record>, LoadError> {
    let path = path.ok_or(LoadError::MissingPath)?;
    info!("Loading values from {} to params", path.display());

    let raw = std::fs::read(path).map_err(|source| LoadError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;

    let records = parse(&raw, path)?;
    debug!(file = %path.display(), count = records.len(), "records loaded");
    Ok(records)
}

/// Parse CSV from any reader. Errors are attributed to `<input>`.
pub fn read_records<R: Read>(mut reader: R) -> Result<Vec<Record>, LoadError> {
    let path = Path::new("<input>");
    let mut raw = Vec::new();
    reader
        .read_to_end(&mut raw)
        .map_err(|source| LoadError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;
    parse(&raw, path)
}

fn parse(raw: &[u8], path: &Path) -> Result<Vec<Record>, LoadError> {
    // Only headers are trimmed by the reader; data fields need to know
    // whether they were quoted, which the parsed record no longer says.
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .trim(csv::Trim::Headers)
        .from_reader(raw);

    let headers = reader
        .headers()
        .map_err(|e| parse_error(path, e))?
        .clone();

    let header_error = |message: String| LoadError::Parse {
        path: path.to_path_buf(),
        line: Some(1),
        message,
    };
    if headers.iter().any(str::is_empty) {
        return Err(header_error(
            "header contains an empty column name".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    if let Some(dup) = headers.iter().find(|name| !seen.insert(*name)) {
        return Err(header_error(format!("duplicate column name '{dup}'")));
    }

    let mut records = Vec::new();
    let mut row = csv::StringRecord::new();
    while reader.read_record(&mut row).map_err(|e| parse_error(path, e))? {
        let end = reader.position().byte() as usize;
        let quoted = row
            .position()
            .and_then(|pos| raw.get(pos.byte() as usize..end))
            .map(quoted_fields)
            .unwrap_or_default();

        records.push(
            headers
                .iter()
                .zip(row.iter())
                .enumerate()
                .map(|(i, (column, value))| {
                    if quoted.get(i).copied().unwrap_or(false) {
                        (column, value)
                    } else {
                        (column, value.trim())
                    }
                })
                .collect(),
        );
    }
    Ok(records)
}

/// For one raw CSV record, whether each field opened with a quote.
///
/// Leading line terminators (skipped blank lines) are ignored; scanning stops
/// at the first terminator outside quotes.
fn quoted_fields(raw: &[u8]) -> Vec<bool> {
    let start = raw
        .iter()
        .position(|b| *b != b'\n' && *b != b'\r')
        .unwrap_or(raw.len());

    let mut flags = Vec::new();
    let mut field_start = true;
    let mut quoted = false;
    let mut in_quotes = false;
    let mut bytes = raw[start..].iter().peekable();
    while let Some(&b) = bytes.next() {
        if field_start {
            field_start = false;
            quoted = b == b'"';
            if quoted {
                in_quotes = true;
                continue;
            }
        }
        if in_quotes {
            if b == b'"' {
                // `""` is an escaped quote inside a quoted field.
                if bytes.peek() == Some(&&b'"') {
                    bytes.next();
                } else {
                    in_quotes = false;
                }
            }
        } else if b == b',' {
            flags.push(quoted);
            field_start = true;
            quoted = false;
        } else if b == b'\n' || b == b'\r' {
            break;
        }
    }
    flags.push(quoted);
    flags
}

fn parse_error(path: &Path, err: csv::Error) -> LoadError {
    let line = err.position().map(|p| p.line());
    let path: PathBuf = path.to_path_buf();
    LoadError::Parse {
        path,
        line,
        message: err.to_string(),
    }
}
