use anyhow::{bail, Context, Result};

use crate::calibration::params::SimParams;
use crate::calibration::simulator::Simulator;
use crate::facts::StylizedFactComputer;
use crate::model::interval::IntervalSet;
use crate::model::metrics::MetricsRow;
use crate::report::VolTarget;

/// Sum of squared realized-volatility errors against per-interval targets.
#[derive(Debug, Clone)]
pub struct CalibrationObjective {
    computer: StylizedFactComputer,
    intervals: IntervalSet,
    targets: Vec<VolTarget>,
}

impl CalibrationObjective {
    /// Every target must name an interval in `intervals`.
    pub fn new(
        computer: StylizedFactComputer,
        intervals: IntervalSet,
        targets: Vec<VolTarget>,
    ) -> Result<Self> {
        if targets.is_empty() {
            bail!("calibration needs at least one target");
        }
        for target in &targets {
            if intervals.get(&target.interval).is_none() {
                bail!(
                    "target interval '{}' is not configured (have: {})",
                    target.interval,
                    intervals.labels().join(", ")
                );
            }
            if !target.realized_vol.is_finite() || target.realized_vol < 0.0 {
                bail!(
                    "target realized_vol for '{}' must be finite and >= 0, got {}",
                    target.interval,
                    target.realized_vol
                );
            }
        }
        Ok(Self {
            computer,
            intervals,
            targets,
        })
    }

    pub fn targets(&self) -> &[VolTarget] {
        &self.targets
    }

    pub fn loss(&self, rows: &[MetricsRow]) -> Result<f64> {
        let mut total = 0.0;
        for target in &self.targets {
            let row = rows
                .iter()
                .find(|r| r.interval == target.interval)
                .with_context(|| format!("no metrics row for interval '{}'", target.interval))?;
            let diff = row.realized_vol - target.realized_vol;
            total += diff * diff;
        }
        Ok(total)
    }

    /// Simulate, compute and score. Any failure propagates.
    pub fn evaluate<S: Simulator + ?Sized>(
        &self,
        simulator: &mut S,
        params: &SimParams,
    ) -> Result<f64> {
        let ticks = simulator
            .simulate(params)
            .with_context(|| format!("simulation failed for {:?}", params))?;
        let rows = self
            .computer
            .compute(&ticks, &self.intervals)
            .with_context(|| format!("metrics failed for {:?}", params))?;
        self.loss(&rows)
    }
}
