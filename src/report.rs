use anyhow::{Context, Result};
use csv::{ReaderBuilder, Writer};
use serde::Deserialize;
use std::fmt::Write as _;
use std::path::Path;

use crate::error::{FactsError, UndefinedStatistic};
use crate::model::metrics::MetricsRow;

pub const REPORT_HEADER: [&str; 5] = ["interval", "n_points", "realized_vol", "skewness", "kurtosis"];
pub const UNDEFINED_CELL: &str = "undefined";

/// Target realized volatility for one interval label.
#[derive(Debug, Clone, PartialEq)]
pub struct VolTarget {
    pub interval: String,
    pub realized_vol: f64,
}

pub fn format_stat(value: &Result<f64, UndefinedStatistic>) -> String {
    match value {
        Ok(v) => v.to_string(),
        Err(_) => UNDEFINED_CELL.to_string(),
    }
}

pub fn write_csv(path: impl AsRef<Path>, rows: &[MetricsRow]) -> Result<(), FactsError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = std::fs::File::create(path)?;
    write_rows(file, rows)?;
    tracing::info!(path = %path.display(), rows = rows.len(), "Wrote stylized facts report");
    Ok(())
}

pub fn write_rows<W: std::io::Write>(writer: W, rows: &[MetricsRow]) -> Result<(), FactsError> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(REPORT_HEADER)?;
    for row in rows {
        wtr.write_record([
            row.interval.clone(),
            row.n_points.to_string(),
            row.realized_vol.to_string(),
            format_stat(&row.skewness),
            format_stat(&row.kurtosis),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Fixed-width console table.
pub fn render_table(rows: &[MetricsRow]) -> String {
    let label_width = rows
        .iter()
        .map(|r| r.interval.len())
        .chain(std::iter::once(REPORT_HEADER[0].len()))
        .max()
        .unwrap_or(8);
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<lw$}  {:>8}  {:>14}  {:>14}  {:>14}",
        REPORT_HEADER[0],
        REPORT_HEADER[1],
        REPORT_HEADER[2],
        REPORT_HEADER[3],
        REPORT_HEADER[4],
        lw = label_width
    );
    for row in rows {
        let _ = writeln!(
            out,
            "{:<lw$}  {:>8}  {:>14.6e}  {:>14}  {:>14}",
            row.interval,
            row.n_points,
            row.realized_vol,
            table_stat(&row.skewness),
            table_stat(&row.kurtosis),
            lw = label_width
        );
    }
    out
}

fn table_stat(value: &Result<f64, UndefinedStatistic>) -> String {
    match value {
        Ok(v) => format!("{:.6}", v),
        Err(_) => UNDEFINED_CELL.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct TargetRow {
    interval: String,
    realized_vol: f64,
}

/// Read `interval` and `realized_vol` from a previously written report.
pub fn load_targets(path: impl AsRef<Path>) -> Result<Vec<VolTarget>> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("failed to open targets {}", path.display()))?;
    let mut targets = Vec::new();
    for record in reader.deserialize::<TargetRow>() {
        let row = record.with_context(|| format!("invalid target row in {}", path.display()))?;
        targets.push(VolTarget {
            interval: row.interval,
            realized_vol: row.realized_vol,
        });
    }
    Ok(targets)
}
