use chrono::{DateTime, NaiveDateTime};
use csv::ReaderBuilder;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

use crate::config::{EpochUnit, SourceConfig, SourceFormat};
use crate::error::FactsError;
use crate::model::tick::{Tick, TickSeries};

const TRADE_MARKER: &str = "T: Trade executed:";
const LTP_MARKER: &str = "LTP=";
const LOG_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y%m%d %H:%M:%S%.f",
];

/// Load according to `config.format`.
pub fn load(config: &SourceConfig) -> Result<TickSeries, FactsError> {
    match config.format {
        SourceFormat::Csv => load_csv(&config.path, config),
        SourceFormat::TradeLog => load_trade_log(&config.path),
    }
}

pub fn load_csv(path: impl AsRef<Path>, config: &SourceConfig) -> Result<TickSeries, FactsError> {
    let path = path.as_ref();
    info!(path = %path.display(), "Loading tick CSV");
    let file = std::fs::File::open(path)?;
    let series = read_csv(file, config)?;
    info!(ticks = series.len(), "Loaded tick CSV");
    Ok(series)
}

/// Read `(timestamp, price)` rows from any CSV reader using the configured column names.
pub fn read_csv<R: Read>(reader: R, config: &SourceConfig) -> Result<TickSeries, FactsError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let ts_idx = column_index(&headers, &config.timestamp_column)?;
    let price_idx = column_index(&headers, &config.price_column)?;

    let mut ticks = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        // Header is line 1.
        let line = row + 2;
        let raw_ts = record.get(ts_idx).unwrap_or_default();
        let raw_price = record.get(price_idx).unwrap_or_default();
        let timestamp_ns = parse_timestamp(
            raw_ts,
            config.timestamp_format.as_deref(),
            config.epoch_unit,
        )
        .map_err(|e| FactsError::InvalidTimeSeries(format!("line {}: {}", line, e)))?;
        let price: f64 = raw_price.parse().map_err(|_| {
            FactsError::InvalidTimeSeries(format!(
                "line {}: cannot parse price '{}'",
                line, raw_price
            ))
        })?;
        ticks.push(Tick::new(timestamp_ns, price));
    }
    TickSeries::new(ticks)
}

pub fn load_trade_log(path: impl AsRef<Path>) -> Result<TickSeries, FactsError> {
    let path = path.as_ref();
    info!(path = %path.display(), "Parsing trade log");
    let file = std::fs::File::open(path)?;
    let series = read_trade_log(BufReader::new(file))?;
    info!(ticks = series.len(), "Parsed trade log");
    Ok(series)
}

/// Extract trade prints from exchange log lines of the form
/// `<%Y-%m-%d %H:%M:%S%.f> ... T: Trade executed: ... LTP=<price>`.
/// Every other line is skipped.
pub fn read_trade_log<R: BufRead>(reader: R) -> Result<TickSeries, FactsError> {
    let mut ticks = Vec::new();
    let mut skipped = 0usize;
    for line in reader.lines() {
        let line = line?;
        match parse_trade_line(&line) {
            Some(tick) => ticks.push(tick),
            None => skipped += 1,
        }
    }
    debug!(trades = ticks.len(), skipped, "Scanned trade log");
    TickSeries::new(ticks)
}

fn parse_trade_line(line: &str) -> Option<Tick> {
    let marker = line.find(TRADE_MARKER)?;
    // "2024-01-02 09:15:00" is 19 fixed chars; a fractional part is mandatory.
    let fraction = line.get(19..)?.strip_prefix('.')?;
    let fraction_len = leading_digits(fraction);
    if fraction_len == 0 {
        return None;
    }
    let ts_end = 20 + fraction_len;
    let ts = NaiveDateTime::parse_from_str(line.get(..ts_end)?, LOG_TIMESTAMP_FORMAT).ok()?;

    let rest = &line[marker + TRADE_MARKER.len()..];
    let price = rest
        .match_indices(LTP_MARKER)
        .find_map(|(at, _)| decimal_prefix(&rest[at + LTP_MARKER.len()..]))?;
    let price: f64 = price.parse().ok()?;
    let timestamp_ns = ts.and_utc().timestamp_nanos_opt()?;
    Some(Tick::new(timestamp_ns, price))
}

fn leading_digits(s: &str) -> usize {
    s.bytes().take_while(u8::is_ascii_digit).count()
}

/// `<digits>.<digits>` at the start of `s`, if present.
fn decimal_prefix(s: &str) -> Option<&str> {
    let int_len = leading_digits(s);
    if int_len == 0 {
        return None;
    }
    let frac_len = leading_digits(s[int_len..].strip_prefix('.')?);
    if frac_len == 0 {
        return None;
    }
    Some(&s[..int_len + 1 + frac_len])
}

/// Parse a timestamp into nanoseconds since the Unix epoch (UTC).
///
/// Tries an explicit `format` first, then RFC 3339, then common naive
/// formats. Bare numbers are accepted only when `epoch_unit` is given.
pub fn parse_timestamp(
    raw: &str,
    format: Option<&str>,
    epoch_unit: Option<EpochUnit>,
) -> Result<i64, FactsError> {
    let raw = raw.trim();
    let invalid = || FactsError::InvalidTimeSeries(format!("cannot parse timestamp '{}'", raw));

    if let Some(unit) = epoch_unit {
        if let Ok(n) = raw.parse::<i64>() {
            return n.checked_mul(unit.nanos_per_unit()).ok_or_else(invalid);
        }
        if let Ok(x) = raw.parse::<f64>() {
            let ns = x * unit.nanos_per_unit() as f64;
            if ns.is_finite() && ns.abs() < i64::MAX as f64 {
                return Ok(ns.round() as i64);
            }
            return Err(invalid());
        }
    }

    if let Some(fmt) = format {
        if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
            return dt.timestamp_nanos_opt().ok_or_else(invalid);
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return dt.and_utc().timestamp_nanos_opt().ok_or_else(invalid);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.timestamp_nanos_opt().ok_or_else(invalid);
    }

    for fmt in &NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return dt.and_utc().timestamp_nanos_opt().ok_or_else(invalid);
        }
    }

    Err(invalid())
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize, FactsError> {
    headers.iter().position(|h| h == name).ok_or_else(|| {
        FactsError::InvalidTimeSeries(format!(
            "column '{}' not found (have: {})",
            name,
            headers.iter().collect::<Vec<_>>().join(", ")
        ))
    })
}
