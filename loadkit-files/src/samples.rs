use loadkit_common::{ColumnSelector, LoadKitError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

use crate::csv_sink::{parse_record, record_is_open};

/// One logical CSV record and the physical line it starts on (1-indexed).
struct Record {
    line: usize,
    text: String,
}

/// Read one numeric column of a CSV file into a sample set.
///
/// Quoted fields may span several lines. Blank lines are skipped.
/// Selecting a column by name requires a header row.
pub fn read_samples(
    path: impl AsRef<Path>,
    column: &ColumnSelector,
    has_header: bool,
) -> Result<Vec<f64>> {
    let path = path.as_ref();
    let mut records = read_records(path)?.into_iter();

    let column_idx = match column {
        ColumnSelector::Index(idx) => {
            if has_header {
                records.next();
            }
            *idx
        }
        ColumnSelector::Name(name) => {
            if !has_header {
                return Err(LoadKitError::ColumnNotFound(name.clone()));
            }
            let Some(header) = records.next() else {
                return Ok(Vec::new());
            };
            parse_record(&header.text)
                .iter()
                .position(|h| h.trim() == name.as_str())
                .ok_or_else(|| LoadKitError::ColumnNotFound(name.clone()))?
        }
    };

    let mut samples = Vec::new();
    for record in records {
        let fields = parse_record(&record.text);
        let raw = fields.get(column_idx).map(|f| f.trim()).unwrap_or_default();
        let value = raw.parse::<f64>().map_err(|_| LoadKitError::InvalidSample {
            line: record.line,
            value: raw.to_string(),
        })?;
        samples.push(value);
    }
    debug!(path = %path.display(), %column, samples = samples.len(), "read samples");
    Ok(samples)
}

/// Split the file into records, joining physical lines while a quoted field is open.
fn read_records(path: &Path) -> Result<Vec<Record>> {
    let file = File::open(path).map_err(|e| LoadKitError::io(path, e))?;
    let mut records = Vec::new();
    let mut pending: Option<Record> = None;

    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| LoadKitError::io(path, e))?;
        let record = match pending.take() {
            Some(mut open) => {
                open.text.push('\n');
                open.text.push_str(&line);
                open
            }
            None if line.trim().is_empty() => continue,
            None => Record { line: idx + 1, text: line },
        };
        if record_is_open(&record.text) {
            pending = Some(record);
        } else {
            records.push(record);
        }
    }
    // An unterminated quote at EOF still yields its record.
    records.extend(pending);
    Ok(records)
}
