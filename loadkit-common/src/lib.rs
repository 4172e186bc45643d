use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Header name looked up when no latency column is configured.
pub const DEFAULT_LATENCY_COLUMN: &str = "latency_ms";

/// Error types for LoadKit operations
#[derive(Debug, Error)]
pub enum LoadKitError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Percentile p{percentile} index {index} is out of range for {len} samples")]
    IndexOutOfRange { percentile: u32, index: i64, len: usize },

    #[error("Invalid sample {value:?} on line {line}")]
    InvalidSample { line: usize, value: String },

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Invalid config: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl LoadKitError {
    /// Wrap an I/O error together with the path it occurred on.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        LoadKitError::Io { path: path.as_ref().to_path_buf(), source }
    }

    /// The underlying I/O error kind, if this is an I/O failure.
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self {
            LoadKitError::Io { source, .. } => Some(source.kind()),
            _ => None,
        }
    }
}

/// Result type for LoadKit operations
pub type Result<T> = std::result::Result<T, LoadKitError>;

/// What to do when a percentile index falls outside `[0, len - 1]`.
///
/// With fewer than two samples the p90/p95/p99 formulas produce index `-1`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PercentilePolicy {
    /// Clamp every index into the valid range.
    #[default]
    Clamp,
    /// Fail with [`LoadKitError::IndexOutOfRange`].
    Strict,
}

/// How a file is written back after lines were removed from it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RewriteMode {
    /// Write a sibling temp file, then rename it over the target.
    /// A failure leaves the original content in place.
    #[default]
    Atomic,
    /// Truncate the target and write into it directly.
    /// A failure part-way through leaves the file partially written.
    InPlace,
}

/// Selects a CSV column either by header name or by zero-based position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnSelector {
    Index(usize),
    Name(String),
}

impl ColumnSelector {
    /// Numbers select by position, anything else by header name.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<usize>() {
            Ok(idx) => ColumnSelector::Index(idx),
            Err(_) => ColumnSelector::Name(raw.trim().to_string()),
        }
    }
}

impl Default for ColumnSelector {
    fn default() -> Self {
        ColumnSelector::Name(DEFAULT_LATENCY_COLUMN.to_string())
    }
}

impl std::fmt::Display for ColumnSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnSelector::Index(idx) => write!(f, "#{idx}"),
            ColumnSelector::Name(name) => f.write_str(name),
        }
    }
}

/// Settings for reporting and maintenance runs, usually loaded from a JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub latency_column: ColumnSelector,
    pub has_header: bool,
    pub percentile_policy: PercentilePolicy,
    pub rewrite_mode: RewriteMode,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            latency_column: ColumnSelector::default(),
            has_header: true,
            percentile_policy: PercentilePolicy::default(),
            rewrite_mode: RewriteMode::default(),
        }
    }
}

impl ReportSettings {
    /// Parse settings from JSON; omitted fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| LoadKitError::Config(e.to_string()))
    }

    /// Read and parse a JSON settings file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| LoadKitError::io(path, e))?;
        Self::from_json(&raw)
    }
}
