use clap::Parser;
use sma_sweep::{AnalysisError, Cli, app};
use std::io::Write;
use tempfile::NamedTempFile;

fn price_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "Date,Close").unwrap();
    for (i, close) in [10.0, 11.0, 9.0, 12.0, 8.0, 15.0].iter().enumerate() {
        writeln!(file, "2024-03-{:02},{}", i + 1, close).unwrap();
    }
    file.flush().unwrap();
    file
}

fn cli(file: &NamedTempFile, extra: &[&str]) -> Cli {
    let path = file.path().to_str().unwrap();
    let mut args = vec![
        "sma-sweep", "TEST", "--start", "2024-03-01", "--end", "2024-03-31", "--csv", path,
    ];
    args.extend_from_slice(extra);
    Cli::parse_from(args)
}

#[tokio::test]
async fn json_report_from_csv() {
    let file = price_file();
    let out = app::run(cli(&file, &["--short", "1", "--long", "2-3", "--pair", "1-2", "--json"]))
        .await
        .unwrap();

    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["ticker"], "TEST");
    assert_eq!(json["series_len"], 6);
    assert_eq!(json["outcome"]["results"].as_array().unwrap().len(), 2);
    let records = json["drill_down"]["records"].as_array().unwrap();
    assert_eq!(records.len(), 6);
    assert_eq!(records[5]["cumulative_profit"], -6.0);
}

#[tokio::test]
async fn text_report_from_csv() {
    let file = price_file();
    let out = app::run(cli(&file, &["--short", "1-2", "--long", "2-3", "--sort", "trades"]))
        .await
        .unwrap();
    assert!(out.contains("TEST | 2024-03-01 .. 2024-03-31 | 6 prices"));
    assert!(out.contains("by trades"));
    assert!(out.contains("Best pair"));
}

#[tokio::test]
async fn invalid_requests_fail_before_reading_data() {
    let file = price_file();

    let err = app::run(cli(&file, &["--short", "5", "--long", "1-3"])).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AnalysisError>(),
        Some(AnalysisError::InputValidation(_))
    ));

    let err = app::run(cli(&file, &["--short", "1-10", "--long", "11-20", "--max-combinations", "5"]))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("limit is 5"));

    let err = app::run(cli(&file, &["--pair", "5-5"])).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AnalysisError>(),
        Some(AnalysisError::InputValidation(_))
    ));
}

#[test]
fn bad_arguments_rejected_by_parser() {
    assert!(Cli::try_parse_from(["sma-sweep", "SPY", "--start", "03/01/2024"]).is_err());
    assert!(Cli::try_parse_from(["sma-sweep", "SPY", "--start", "2024-03-01", "--short", "0-5"]).is_err());
    assert!(Cli::try_parse_from(["sma-sweep", "SPY", "--start", "2024-03-01", "--sort", "sharpe"]).is_err());

    let ok = Cli::try_parse_from(["sma-sweep", "SPY", "--start", "2024-03-01"]).unwrap();
    assert_eq!(ok.short.to_string(), "5-20");
    assert_eq!(ok.long.to_string(), "20-60");
    assert!(ok.end.is_none());
}

#[tokio::test]
async fn export_writes_best_pair_signals() {
    let file = price_file();
    let dir = tempfile::tempdir().unwrap();
    let out_path = dir.path().join("signals.csv");
    let out_str = out_path.to_str().unwrap();

    let out = app::run(cli(&file, &["--short", "1", "--long", "2-3", "--export", out_str]))
        .await
        .unwrap();
    assert!(out.contains("written to"));

    let mut reader = csv::Reader::from_path(&out_path).unwrap();
    assert_eq!(&reader.headers().unwrap()[0], "date");
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 6);
    assert_eq!(&rows[0][0], "2024-03-01");
    assert_eq!(&rows[5][0], "2024-03-06");
}

#[tokio::test]
async fn reverse_lists_results_bottom_up() {
    let file = price_file();
    let out = app::run(cli(&file, &["--short", "1-2", "--long", "2-3", "--reverse"]))
        .await
        .unwrap();
    assert!(out.contains("Bottom 3 by profit"));
}
