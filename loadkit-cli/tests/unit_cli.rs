use clap::Parser;
use loadkit_cli::{exit_code, format_summary, run, Cli, Command, EXIT_BAD_CONFIG, EXIT_FAILURE};
use loadkit_common::{ColumnSelector, LoadKitError};
use loadkit_stats::{LatencySummary, PercentileReport};
use std::fs;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("loadkit").chain(args.iter().copied())).unwrap()
}

#[test]
fn test_parse_remove_rows() {
    let cli = parse(&["remove-rows", "out.csv", "3", "5", "--in-place"]);
    match cli.command {
        Command::RemoveRows { path, start, end, in_place, config } => {
            assert_eq!(path.to_str(), Some("out.csv"));
            assert_eq!((start, end), (3, 5));
            assert!(in_place);
            assert!(config.is_none());
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn test_parse_rejects_negative_line_numbers() {
    assert!(Cli::try_parse_from(["loadkit", "remove-rows", "f", "-1", "3"]).is_err());
}

#[test]
fn test_parse_rejects_unknown_policy() {
    assert!(Cli::try_parse_from(["loadkit", "stats", "f.csv", "--policy", "sometimes"]).is_err());
}

#[test]
fn test_stats_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("r.csv");
    fs::write(&path, "status,latency_ms\n200,1\n200,2\n200,3\n200,4\n200,5\n").unwrap();

    let out = run(parse(&["stats", path.to_str().unwrap(), "--json"])).unwrap();
    let summary: LatencySummary = serde_json::from_str(&out).unwrap();
    assert_eq!(summary.count, 5);
    assert_eq!(summary.percentiles.p50, 3.0);
    assert_eq!(summary.max, 5.0);
}

#[test]
fn test_stats_table_by_index_without_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("r.csv");
    fs::write(&path, "10\n20\n").unwrap();

    let args = ["stats", path.to_str().unwrap(), "--column", "0", "--no-header"];
    let out = run(parse(&args)).unwrap();
    assert!(out.starts_with("Latency summary (#0)\n"));
    assert!(out.contains("Samples:   2\n"));
    assert!(out.contains("P50:       20.000\n"));
}

#[test]
fn test_stats_strict_single_sample_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("r.csv");
    fs::write(&path, "latency_ms\n7\n").unwrap();

    let err = run(parse(&["stats", path.to_str().unwrap(), "--policy", "strict"])).unwrap_err();
    assert!(matches!(err, LoadKitError::IndexOutOfRange { .. }));
    assert_eq!(exit_code(&err), EXIT_FAILURE);
}

#[test]
fn test_stats_config_file_is_overridden_by_flags() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("r.csv");
    let config = dir.path().join("settings.json");
    fs::write(&csv, "a,b\n1,100\n").unwrap();
    fs::write(&config, r#"{"latency_column":"b","percentile_policy":"strict"}"#).unwrap();

    // Config alone: strict policy with one sample fails.
    let args = ["stats", csv.to_str().unwrap(), "--config", config.to_str().unwrap()];
    let err = run(parse(&args)).unwrap_err();
    assert!(matches!(err, LoadKitError::IndexOutOfRange { .. }));

    // The flag wins over the file.
    let out = run(parse(&[
        "stats",
        csv.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "--policy",
        "clamp",
        "--json",
    ]))
    .unwrap();
    let summary: LatencySummary = serde_json::from_str(&out).unwrap();
    assert_eq!(summary.percentiles.p99, 100.0);
}

#[test]
fn test_bad_config_maps_to_exit_3() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("r.csv");
    fs::write(&csv, "latency_ms\n1\n").unwrap();

    let broken = dir.path().join("broken.json");
    fs::write(&broken, "{not json").unwrap();
    let args = ["stats", csv.to_str().unwrap(), "--config", broken.to_str().unwrap()];
    let err = run(parse(&args)).unwrap_err();
    assert_eq!(exit_code(&err), EXIT_BAD_CONFIG);

    let missing = dir.path().join("missing.json");
    let args = ["stats", csv.to_str().unwrap(), "--config", missing.to_str().unwrap()];
    let err = run(parse(&args)).unwrap_err();
    assert_eq!(exit_code(&err), EXIT_BAD_CONFIG);
}

#[test]
fn test_remove_rows_command() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rows.txt");
    fs::write(&path, "a\nb\nc\nd\n").unwrap();

    let out = run(parse(&["remove-rows", path.to_str().unwrap(), "2", "3"])).unwrap();
    assert!(out.is_empty());
    assert_eq!(fs::read_to_string(&path).unwrap(), "a\nd\n");

    run(parse(&["remove-rows", path.to_str().unwrap(), "1", "1", "--in-place"])).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "d\n");
}

#[test]
fn test_remove_rows_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.txt");
    let err = run(parse(&["remove-rows", path.to_str().unwrap(), "1", "2"])).unwrap_err();
    assert_eq!(err.io_kind(), Some(std::io::ErrorKind::NotFound));
    assert_eq!(exit_code(&err), EXIT_FAILURE);
    assert!(!path.exists());
}

#[test]
fn test_append_row_and_header_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("r.csv");
    let p = path.to_str().unwrap();

    run(parse(&["append-row", p, "status,latency_ms", "--header"])).unwrap();
    run(parse(&["append-row", p, "200,12"])).unwrap();
    run(parse(&["append-row", p, "status,latency_ms", "--header"])).unwrap();
    run(parse(&["append-row", p, "500,80"])).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "status,latency_ms\n200,12\n500,80\n");
}

#[test]
fn test_is_empty_command() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("f.txt");
    assert_eq!(run(parse(&["is-empty", path.to_str().unwrap()])).unwrap(), "true");
    fs::write(&path, "x").unwrap();
    assert_eq!(run(parse(&["is-empty", path.to_str().unwrap()])).unwrap(), "false");
}

#[test]
fn test_format_summary_lists_every_percentile() {
    let summary = LatencySummary {
        count: 3,
        min: 1.0,
        max: 3.0,
        mean: 2.0,
        std_dev: 0.5,
        percentiles: PercentileReport { p50: 2.0, p90: 2.5, p95: 2.75, p99: 3.0 },
    };
    let out = format_summary(&ColumnSelector::Name("latency_ms".to_string()), &summary);
    let expected = "\
Latency summary (latency_ms)
============================
Samples:   3
Min:       1.000
Max:       3.000
Mean:      2.000
Std dev:   0.500
P50:       2.000
P90:       2.500
P95:       2.750
P99:       3.000
";
    assert_eq!(out, expected);
}
