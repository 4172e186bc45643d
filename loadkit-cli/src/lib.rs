use clap::{Parser, Subcommand, ValueEnum};
use loadkit_common::{
    ColumnSelector, LoadKitError, PercentilePolicy, ReportSettings, Result, RewriteMode,
};
use loadkit_files::{is_file_empty, read_samples, remove_line_range_with, CsvSink, LineRange};
use loadkit_stats::{LatencySummary, Percentile};
use std::fmt::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Exit code for a failed operation (I/O, bad samples, strict percentile failure).
pub const EXIT_FAILURE: i32 = 1;
/// Exit code for unusable settings.
pub const EXIT_BAD_CONFIG: i32 = 3;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Policy {
    Clamp,
    Strict,
}

#[derive(Parser, Debug)]
#[command(name = "loadkit", about = "Load-test result utilities")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Summarize one latency column of a results CSV
    Stats {
        csv: PathBuf,

        /// Column header name or zero-based index
        #[arg(long)]
        column: Option<String>,

        /// The CSV has no header row
        #[arg(long)]
        no_header: bool,

        /// What to do with out-of-range percentile indices
        #[arg(long, value_enum)]
        policy: Option<Policy>,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,

        /// Path to a JSON settings file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Remove lines START..=END (1-indexed) from a file
    RemoveRows {
        path: PathBuf,
        start: usize,
        end: usize,

        /// Truncate and rewrite the file directly instead of via a temp file
        #[arg(long)]
        in_place: bool,

        /// Path to a JSON settings file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Append one comma-delimited row to a CSV file
    AppendRow {
        csv: PathBuf,
        row: String,

        /// Only write the row if the file is missing or empty
        #[arg(long)]
        header: bool,
    },

    /// Print whether a file is missing or empty
    IsEmpty { path: PathBuf },
}

/// Map an error to the process exit code the binary reports.
pub fn exit_code(err: &LoadKitError) -> i32 {
    match err {
        LoadKitError::Config(_) => EXIT_BAD_CONFIG,
        _ => EXIT_FAILURE,
    }
}

fn load_settings(config: Option<&Path>) -> Result<ReportSettings> {
    match config {
        Some(path) => ReportSettings::load(path).map_err(|e| match e {
            LoadKitError::Io { .. } => LoadKitError::Config(e.to_string()),
            other => other,
        }),
        None => Ok(ReportSettings::default()),
    }
}

/// Run one command and return what should be printed on stdout.
pub fn run(cli: Cli) -> Result<String> {
    match cli.command {
        Command::Stats { csv, column, no_header, policy, json, config } => {
            let mut settings = load_settings(config.as_deref())?;
            if let Some(raw) = column {
                settings.latency_column = ColumnSelector::parse(&raw);
            }
            if no_header {
                settings.has_header = false;
            }
            if let Some(policy) = policy {
                settings.percentile_policy = match policy {
                    Policy::Clamp => PercentilePolicy::Clamp,
                    Policy::Strict => PercentilePolicy::Strict,
                };
            }

            let samples = read_samples(&csv, &settings.latency_column, settings.has_header)?;
            let summary = LatencySummary::from_samples(&samples, settings.percentile_policy)?;
            info!(path = %csv.display(), samples = summary.count, "summarized latencies");

            if json {
                serde_json::to_string_pretty(&summary)
                    .map_err(|e| LoadKitError::Serialization(e.to_string()))
            } else {
                Ok(format_summary(&settings.latency_column, &summary))
            }
        }
        Command::RemoveRows { path, start, end, in_place, config } => {
            let mut settings = load_settings(config.as_deref())?;
            if in_place {
                settings.rewrite_mode = RewriteMode::InPlace;
            }
            let range = LineRange::new(start, end);
            if range.is_empty() {
                warn!(start, end, "start is after end; no rows will be removed");
            }
            remove_line_range_with(&path, range, settings.rewrite_mode)?;
            info!(path = %path.display(), start, end, "removed rows");
            Ok(String::new())
        }
        Command::AppendRow { csv, row, header } => {
            if header && !is_file_empty(&csv)? {
                return Ok(String::new());
            }
            let mut sink = CsvSink::open(&csv)?;
            if header {
                sink.write_header(&row)?;
            } else {
                sink.write_response(&row)?;
            }
            sink.flush()?;
            info!(path = %sink.path().display(), header, "appended row");
            Ok(String::new())
        }
        Command::IsEmpty { path } => Ok(is_file_empty(&path)?.to_string()),
    }
}

/// Render a summary as an aligned plain-text table.
pub fn format_summary(column: &ColumnSelector, summary: &LatencySummary) -> String {
    let mut out = String::new();
    let title = format!("Latency summary ({column})");
    // Writing into a String cannot fail.
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}", "=".repeat(title.chars().count()));
    let _ = writeln!(out, "Samples:   {}", summary.count);
    let _ = writeln!(out, "Min:       {:.3}", summary.min);
    let _ = writeln!(out, "Max:       {:.3}", summary.max);
    let _ = writeln!(out, "Mean:      {:.3}", summary.mean);
    let _ = writeln!(out, "Std dev:   {:.3}", summary.std_dev);
    for p in Percentile::ALL {
        let _ = writeln!(out, "P{}:       {:.3}", p.key(), summary.percentiles.get(p));
    }
    out
}
