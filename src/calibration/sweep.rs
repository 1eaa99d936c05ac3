use anyhow::{Context, Result};
use csv::Writer;
use std::path::Path;

use crate::calibration::params::{ParamGrid, SimParams};
use crate::calibration::simulator::Simulator;
use crate::facts::StylizedFactComputer;
use crate::model::interval::IntervalSet;
use crate::model::metrics::MetricsRow;
use crate::report::format_stat;

#[derive(Debug, Clone, PartialEq)]
pub struct SweepRecord {
    pub params: SimParams,
    pub metrics: Vec<MetricsRow>,
}

/// Simulate every grid combination and compute its stylized facts.
pub fn run_sweep<S: Simulator + ?Sized>(
    simulator: &mut S,
    grid: &ParamGrid,
    computer: &StylizedFactComputer,
    intervals: &IntervalSet,
) -> Result<Vec<SweepRecord>> {
    grid.validate()?;
    let total = grid.len();
    let mut records = Vec::with_capacity(total);
    for (i, params) in grid.combinations().into_iter().enumerate() {
        tracing::info!(run = i + 1, total, ?params, "Sweep run");
        let ticks = simulator
            .simulate(&params)
            .with_context(|| format!("simulation failed for {:?}", params))?;
        let metrics = computer
            .compute(&ticks, intervals)
            .with_context(|| format!("metrics failed for {:?}", params))?;
        records.push(SweepRecord { params, metrics });
    }
    Ok(records)
}

pub fn sweep_header(intervals: &IntervalSet) -> Vec<String> {
    let mut header: Vec<String> = ["mu", "sigma", "num_bots", "vol_threshold", "aggression"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    for label in intervals.labels() {
        header.push(format!("{}_vol", label));
        header.push(format!("{}_skew", label));
        header.push(format!("{}_kurt", label));
        header.push(format!("{}_n", label));
    }
    header
}

/// One flat row per record: parameters, then vol/skew/kurt/n per interval.
pub fn write_sweep<W: std::io::Write>(
    writer: W,
    intervals: &IntervalSet,
    records: &[SweepRecord],
) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(sweep_header(intervals))?;
    for record in records {
        let p = &record.params;
        let mut row = vec![
            p.mu.to_string(),
            p.sigma.to_string(),
            p.num_bots.to_string(),
            p.vol_threshold.to_string(),
            p.aggression.to_string(),
        ];
        for label in intervals.labels() {
            let m = record
                .metrics
                .iter()
                .find(|m| m.interval == label)
                .with_context(|| format!("record is missing interval '{}'", label))?;
            row.push(m.realized_vol.to_string());
            row.push(format_stat(&m.skewness));
            row.push(format_stat(&m.kurtosis));
            row.push(m.n_points.to_string());
        }
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_sweep_csv(
    path: impl AsRef<Path>,
    intervals: &IntervalSet,
    records: &[SweepRecord],
) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_sweep(file, intervals, records)?;
    tracing::info!(path = %path.display(), rows = records.len(), "Wrote sweep results");
    Ok(())
}
