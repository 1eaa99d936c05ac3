use std::io::Write;

use stylized_facts::config::{EpochUnit, SourceConfig, SourceFormat};
use stylized_facts::error::FactsError;
use stylized_facts::source::{load, load_csv, load_trade_log, parse_timestamp, read_csv, read_trade_log};

fn ts(raw: &str) -> i64 {
    parse_timestamp(raw, None, None).unwrap()
}

#[test]
fn loads_named_columns_and_sorts_defensively() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ticks.csv");
    let mut f = std::fs::File::create(&path).unwrap();
    writeln!(f, "symbol,time,qty,last").unwrap();
    writeln!(f, "SBIN,2025-03-04 09:15:02.000,10,701.5").unwrap();
    writeln!(f, "SBIN,2025-03-04 09:15:00.000,5,700.0").unwrap();
    writeln!(f, "SBIN,2025-03-04 09:15:01.000,1,700.75").unwrap();
    drop(f);

    let mut cfg = SourceConfig::csv(&path);
    cfg.timestamp_column = "time".to_string();
    cfg.price_column = "last".to_string();
    let series = load_csv(&path, &cfg).unwrap();

    let prices: Vec<f64> = series.ticks().iter().map(|t| t.price).collect();
    assert_eq!(prices, vec![700.0, 700.75, 701.5]);
    assert_eq!(series.ticks()[0].timestamp_ns, ts("2025-03-04 09:15:00"));
    assert_eq!(series.span_ns(), 2_000_000_000);
}

#[test]
fn missing_column_is_invalid_time_series() {
    let csv = "timestamp,close\n2025-03-04 09:15:00,1.0\n";
    let err = read_csv(csv.as_bytes(), &SourceConfig::csv("x")).unwrap_err();
    match err {
        FactsError::InvalidTimeSeries(msg) => assert!(msg.contains("price")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn unparseable_timestamp_fails_with_line_number() {
    let csv = "timestamp,price\n2025-03-04 09:15:00,1.0\nnot-a-time,2.0\n";
    let err = read_csv(csv.as_bytes(), &SourceConfig::csv("x")).unwrap_err();
    match err {
        FactsError::InvalidTimeSeries(msg) => assert!(msg.contains("line 3"), "{}", msg),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn unparseable_or_non_positive_price_fails() {
    let csv = "timestamp,price\n2025-03-04 09:15:00,abc\n";
    assert!(matches!(
        read_csv(csv.as_bytes(), &SourceConfig::csv("x")),
        Err(FactsError::InvalidTimeSeries(_))
    ));
    let csv = "timestamp,price\n2025-03-04 09:15:00,0\n";
    assert!(matches!(
        read_csv(csv.as_bytes(), &SourceConfig::csv("x")),
        Err(FactsError::InvalidTimeSeries(_))
    ));
}

#[test]
fn epoch_timestamps_need_a_configured_unit() {
    let csv = "timestamp,price\n1000,1.0\n2500,2.0\n";
    assert!(read_csv(csv.as_bytes(), &SourceConfig::csv("x")).is_err());

    let mut cfg = SourceConfig::csv("x");
    cfg.epoch_unit = Some(EpochUnit::Ms);
    let series = read_csv(csv.as_bytes(), &cfg).unwrap();
    assert_eq!(series.ticks()[0].timestamp_ns, 1_000_000_000);
    assert_eq!(series.span_ns(), 1_500_000_000);
}

#[test]
fn header_only_csv_is_an_empty_series() {
    let series = read_csv("timestamp,price\n".as_bytes(), &SourceConfig::csv("x")).unwrap();
    assert!(series.is_empty());
}

const LOG: &str = "\
2025-03-04 09:15:00.000100 - exchange - INFO - Market open
2025-03-04 09:15:00.500000 - exchange - INFO - T: Trade executed: Buyer Order id 1 and Seller Order id 2 for 5 units at Rs 700.00. LTP=700.00
2025-03-04 09:15:01.250000 - exchange - INFO - T: Trade executed: Buyer Order id 3 and Seller Order id 4 for 2 units at Rs 700.50. LTP=700.50
2025-03-04 09:15:01.300000 - exchange - INFO - Trigger circuit: band breach.
2025-03-04 09:15:02.000000 - exchange - INFO - T: Trade executed: Seller Order id 5 and Buyer Order id 6 for 1 units at Rs 699.75. LTP=699.75
";

#[test]
fn trade_log_keeps_only_trade_lines() {
    let series = read_trade_log(LOG.as_bytes()).unwrap();
    assert_eq!(series.len(), 3);
    let prices: Vec<f64> = series.ticks().iter().map(|t| t.price).collect();
    assert_eq!(prices, vec![700.0, 700.5, 699.75]);
    assert_eq!(
        series.ticks()[1].timestamp_ns,
        ts("2025-03-04 09:15:01.25")
    );
}

#[test]
fn load_dispatches_on_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("exchange.log");
    std::fs::write(&path, LOG).unwrap();

    let mut cfg = SourceConfig::csv(&path);
    cfg.format = SourceFormat::TradeLog;
    assert_eq!(load(&cfg).unwrap().len(), 3);
    assert_eq!(load_trade_log(&path).unwrap().len(), 3);

    cfg.format = SourceFormat::Csv;
    assert!(load(&cfg).is_err());
}

#[test]
fn missing_file_is_io_error() {
    let err = load_trade_log("/nonexistent/dir/exchange.log").unwrap_err();
    assert!(matches!(err, FactsError::Io(_)));
}

#[test]
fn trade_log_matches_only_fractional_timestamps_and_decimal_ltp() {
    let log = "\
2025-03-04 09:15:01 - exchange - INFO - T: Trade executed: x LTP=700.10
2025-03-04 09:15:02.100000 - exchange - INFO - T: Trade executed: prevLTP=700 LTP=701.25
";
    let series = read_trade_log(log.as_bytes()).unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(series.ticks()[0].price, 701.25);
}
