//! Lazy-schema CSV recording.
//!
//! The recorder owns its output file exclusively. It has three states:
//! - AwaitingSchema: open, no row seen yet.
//! - Recording: header written, schema fixed for the rest of the session.
//! - Closed: handle released; further `record` calls are an error.
//!
//! The column schema is committed from the first row's own column order and
//! never changes. A later row whose columns differ is rejected with a
//! warning rather than written jagged. Every accepted row is flushed before
//! `record` returns, so a crash loses at most the in-flight row.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};

use t2c_common::{Error, Result};

use crate::flatten::FlatRow;

/// Rows between progress log lines.
const PROGRESS_INTERVAL: u64 = 1000;

/// Outcome of one `record` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Row written and flushed.
    Written,
    /// Row rejected: its columns differ from the committed schema.
    SchemaMismatch,
}

/// Stateful CSV sink with a schema committed from the first row.
pub struct CsvRecorder {
    writer: Option<BufWriter<File>>,
    path: PathBuf,
    schema: Option<Vec<String>>,
    rows_written: u64,
}

impl CsvRecorder {
    /// Create (or truncate) the destination file, creating parent
    /// directories as needed.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(&path)?;
        debug!(path = %path.display(), "recorder opened");
        Ok(Self {
            writer: Some(BufWriter::new(file)),
            path,
            schema: None,
            rows_written: 0,
        })
    }

    /// Destination path this recorder writes to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of rows accepted and written (header excluded).
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Committed column schema, if the first row has been seen.
    pub fn schema(&self) -> Option<&[String]> {
        self.schema.as_deref()
    }

    /// Write one row.
    ///
    /// The first row commits the schema and writes the header line. Later
    /// rows must match the schema exactly (names and order); mismatching
    /// rows are skipped with a warning and the session continues. Accepted
    /// rows are flushed to the OS before this returns.
    pub fn record(&mut self, row: &FlatRow) -> Result<RecordOutcome> {
        let writer = self.writer.as_mut().ok_or(Error::RecorderClosed)?;

        match &self.schema {
            None => {
                let schema: Vec<String> = row.names().map(str::to_string).collect();
                write_line(writer, schema.iter().map(|name| escape_field(name)))?;
                info!(columns = schema.len(), path = %self.path.display(), "schema committed");
                self.schema = Some(schema);
            }
            Some(schema) => {
                if !row.names().eq(schema.iter().map(String::as_str)) {
                    warn!(
                        expected = schema.len(),
                        actual = row.len(),
                        "row columns differ from committed schema, skipping row"
                    );
                    return Ok(RecordOutcome::SchemaMismatch);
                }
            }
        }

        write_line(writer, row.values().map(format_cell))?;
        writer.flush()?;
        self.rows_written += 1;
        if self.rows_written % PROGRESS_INTERVAL == 0 {
            info!(rows = self.rows_written, "saved rows");
        }
        Ok(RecordOutcome::Written)
    }

    /// Flush and release the destination. Idempotent.
    pub fn close(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
            debug!(path = %self.path.display(), rows = self.rows_written, "recorder closed");
        }
        Ok(())
    }
}

impl Drop for CsvRecorder {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.flush();
        }
    }
}

fn write_line(
    writer: &mut impl Write,
    fields: impl Iterator<Item = String>,
) -> std::io::Result<()> {
    let mut first = true;
    for field in fields {
        if !first {
            writer.write_all(b",")?;
        }
        writer.write_all(field.as_bytes())?;
        first = false;
    }
    writer.write_all(b"\n")
}

/// Render one cell as CSV field text.
///
/// Nulls become empty cells; strings are quoted only when they need to be;
/// numbers and booleans are written bare.
fn format_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => escape_field(s),
        // Arrays/objects were already turned into strings by the flattener.
        other => escape_field(&other.to_string()),
    }
}

/// Quote a field if it contains the delimiter, quotes, or line breaks.
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        let mut quoted = String::with_capacity(field.len() + 2);
        quoted.push('"');
        for ch in field.chars() {
            if ch == '"' {
                quoted.push('"');
            }
            quoted.push(ch);
        }
        quoted.push('"');
        quoted
    } else {
        field.to_string()
    }
}
