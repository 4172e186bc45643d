use loadkit_common::Result;
use loadkit_files::CsvSink;
use std::path::Path;

pub const RESULTS_HEADER: &str = "status,method,latency_ms";

/// Write a results CSV the way a load-test run does: one header, then one
/// `200,GET,<latency>` row per sample.
pub fn write_results(path: impl AsRef<Path>, latencies: &[f64]) -> Result<()> {
    let mut sink = CsvSink::open(path)?;
    sink.write_header(RESULTS_HEADER)?;
    for latency in latencies {
        sink.write_response(&format!("200,GET,{latency}"))?;
    }
    sink.flush()
}
