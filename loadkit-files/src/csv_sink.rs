use loadkit_common::{LoadKitError, Result};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Append-only CSV file that load-test scripts write response rows into.
///
/// Rows are buffered; call [`CsvSink::flush`] to surface write errors.
/// Anything still buffered is flushed on drop, with errors ignored.
pub struct CsvSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl CsvSink {
    /// Open `path` for appending, creating it if absent.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .map_err(|e| LoadKitError::io(path, e))?;
        debug!(path = %path.display(), "opened csv sink");
        Ok(Self { path: path.to_path_buf(), writer: BufWriter::new(file) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write a comma-delimited header row as one record.
    pub fn write_header(&mut self, row: &str) -> Result<()> {
        self.write_record(row)
    }

    /// Write a comma-delimited response row as one record.
    pub fn write_response(&mut self, row: &str) -> Result<()> {
        self.write_record(row)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(|e| LoadKitError::io(&self.path, e))
    }

    fn write_record(&mut self, row: &str) -> Result<()> {
        let mut record = format_record(row);
        record.push('\n');
        self.writer
            .write_all(record.as_bytes())
            .map_err(|e| LoadKitError::io(&self.path, e))
    }
}

/// Split `row` on commas and join it back as a CSV record (no terminator).
///
/// Fields containing `"`, `\r` or `\n` are quoted, with inner quotes doubled.
pub fn format_record(row: &str) -> String {
    row.split(',').map(quote_field).collect::<Vec<_>>().join(",")
}

fn quote_field(field: &str) -> String {
    if field.contains(['"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Split one CSV record into fields, honouring quoted fields and doubled quotes.
pub fn parse_record(record: &str) -> Vec<String> {
    scan_record(record).0
}

/// `true` if `text` ends inside a quoted field, i.e. the record continues
/// on the next physical line.
pub fn record_is_open(text: &str) -> bool {
    scan_record(text).1
}

fn scan_record(record: &str) -> (Vec<String>, bool) {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = record.chars().peekable();

    while let Some(c) = chars.next() {
        match (c, in_quotes) {
            ('"', true) if chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            ('"', true) => in_quotes = false,
            ('"', false) if field.is_empty() => in_quotes = true,
            (',', false) => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    (fields, in_quotes)
}
