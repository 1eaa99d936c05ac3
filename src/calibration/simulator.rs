use anyhow::{bail, Context, Result};
use std::process::Command;

use crate::calibration::params::SimParams;
use crate::config::{EpochUnit, SimulatorConfig, SourceConfig};
use crate::model::tick::TickSeries;
use crate::source::read_csv;

/// Produces one session of trade prints for a parameter vector.
pub trait Simulator {
    fn simulate(&mut self, params: &SimParams) -> Result<TickSeries>;
}

impl<F> Simulator for F
where
    F: FnMut(&SimParams) -> Result<TickSeries>,
{
    fn simulate(&mut self, params: &SimParams) -> Result<TickSeries> {
        self(params)
    }
}

/// Runs an external program once per parameter vector.
///
/// The program receives `--mu --sigma --num-bots --vol-threshold --aggression`
/// and must print a `timestamp,price` CSV to stdout.
#[derive(Debug, Clone)]
pub struct CommandSimulator {
    program: String,
    base_args: Vec<String>,
    source: SourceConfig,
}

impl CommandSimulator {
    pub fn new(command: &[String], epoch_unit: Option<EpochUnit>) -> Result<Self> {
        let (program, base_args) = command
            .split_first()
            .context("simulator.command must name a program")?;
        let mut source = SourceConfig::csv("<simulator stdout>");
        source.epoch_unit = epoch_unit;
        Ok(Self {
            program: program.clone(),
            base_args: base_args.to_vec(),
            source,
        })
    }

    pub fn from_config(cfg: &SimulatorConfig) -> Result<Self> {
        Self::new(&cfg.command, cfg.epoch_unit)
    }

    pub fn args_for(&self, params: &SimParams) -> Vec<String> {
        let mut args = self.base_args.clone();
        args.extend([
            "--mu".to_string(),
            params.mu.to_string(),
            "--sigma".to_string(),
            params.sigma.to_string(),
            "--num-bots".to_string(),
            params.num_bots.to_string(),
            "--vol-threshold".to_string(),
            params.vol_threshold.to_string(),
            "--aggression".to_string(),
            params.aggression.to_string(),
        ]);
        args
    }
}

impl Simulator for CommandSimulator {
    fn simulate(&mut self, params: &SimParams) -> Result<TickSeries> {
        let args = self.args_for(params);
        tracing::debug!(program = %self.program, ?args, "Running simulator");
        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .with_context(|| format!("failed to spawn simulator '{}'", self.program))?;
        if !output.status.success() {
            bail!(
                "simulator '{}' exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        let series = read_csv(output.stdout.as_slice(), &self.source)
            .context("simulator output is not a valid tick CSV")?;
        tracing::debug!(ticks = series.len(), "Simulator finished");
        Ok(series)
    }
}
