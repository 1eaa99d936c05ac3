use anyhow::{anyhow, bail, Context, Result};
use std::path::{Path, PathBuf};

use crate::calibration::{
    run_sweep, write_sweep_csv, CalibrationObjective, CalibrationOutcome, CommandSimulator,
    Optimizer, ParamGrid, RandomSearch, SearchSpace, SimParams,
};
use crate::config::Config;
use crate::facts::StylizedFactComputer;
use crate::model::metrics::MetricsRow;
use crate::report::{self, VolTarget};
use crate::source;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliCommand {
    Compute,
    Sweep,
    Calibrate,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub command: CliCommand,
    pub config_path: Option<PathBuf>,
}

/// `<compute|sweep|calibrate|help> [--config <path>]`; no subcommand means `compute`.
pub fn parse_cli_args(args: &[String]) -> Result<CliArgs> {
    let mut command = None;
    let mut config_path = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = iter
                    .next()
                    .ok_or_else(|| anyhow!("`{}` requires a path argument", arg))?;
                config_path = Some(PathBuf::from(path));
            }
            "help" | "--help" | "-h" => command = Some(CliCommand::Help),
            "compute" | "sweep" | "calibrate" if command.is_some() => {
                bail!("only one subcommand may be given, found extra `{}`", arg)
            }
            "compute" => command = Some(CliCommand::Compute),
            "sweep" => command = Some(CliCommand::Sweep),
            "calibrate" => command = Some(CliCommand::Calibrate),
            other => bail!(
                "unknown argument `{}`. expected one of: compute|sweep|calibrate|help [--config <path>]",
                other
            ),
        }
    }
    Ok(CliArgs {
        command: command.unwrap_or(CliCommand::Compute),
        config_path,
    })
}

pub fn print_usage() {
    println!("usage: stylized-facts <compute|sweep|calibrate|help> [--config <path>]");
    println!();
    println!("  compute    resample the configured tick source and write the stylized facts report");
    println!("  sweep      run the external simulator over the [sweep] grid and write one row per run");
    println!("  calibrate  random-search simulator parameters against realized volatility targets");
    println!();
    println!("config defaults to $STYLIZED_FACTS_CONFIG or config/default.toml");
}

pub fn computer_for(config: &Config) -> StylizedFactComputer {
    StylizedFactComputer::new(config.bucketing.origin)
}

pub fn run_compute(config: &Config) -> Result<Vec<MetricsRow>> {
    let intervals = config.interval_set()?;
    let ticks = source::load(&config.source)
        .with_context(|| format!("failed to load {}", config.source.path.display()))?;
    let computer = computer_for(config);
    tracing::info!(
        ticks = ticks.len(),
        intervals = intervals.len(),
        origin = computer.origin().as_str(),
        "Computing stylized facts"
    );
    let rows = computer.compute(&ticks, &intervals)?;
    for row in rows.iter().filter(|r| r.has_undefined()) {
        tracing::warn!(
            interval = %row.interval,
            n_points = row.n_points,
            skewness = ?row.skewness.err(),
            kurtosis = ?row.kurtosis.err(),
            "Undefined statistic"
        );
    }
    report::write_csv(&config.output.path, &rows)
        .with_context(|| format!("failed to write {}", config.output.path.display()))?;
    print!("{}", report::render_table(&rows));
    Ok(rows)
}

fn simulator_for(config: &Config) -> Result<CommandSimulator> {
    let sim = config
        .simulator
        .as_ref()
        .context("[simulator] section is required for sweep and calibrate")?;
    CommandSimulator::from_config(sim)
}

pub fn run_sweep_command(config: &Config) -> Result<()> {
    let sweep = config
        .sweep
        .as_ref()
        .context("[sweep] section is required for `sweep`")?;
    let grid = ParamGrid::from_config(sweep)?;
    let intervals = config.interval_set()?;
    let mut simulator = simulator_for(config)?;
    tracing::info!(runs = grid.len(), "Starting parameter sweep");
    let records = run_sweep(&mut simulator, &grid, &computer_for(config), &intervals)?;
    write_sweep_csv(&sweep.output_path, &intervals, &records)?;
    println!(
        "sweep: {} runs written to {}",
        records.len(),
        sweep.output_path.display()
    );
    Ok(())
}

/// Inline `[[calibration.targets]]` first, else the report at `targets_path`.
pub fn resolve_targets(config: &Config) -> Result<Vec<VolTarget>> {
    let cal = config
        .calibration
        .as_ref()
        .context("[calibration] section is required for `calibrate`")?;
    if !cal.targets.is_empty() {
        return Ok(cal
            .targets
            .iter()
            .map(|t| VolTarget {
                interval: t.interval.clone(),
                realized_vol: t.realized_vol,
            })
            .collect());
    }
    match &cal.targets_path {
        Some(path) => report::load_targets(path),
        None => bail!("calibration needs either [[calibration.targets]] or targets_path"),
    }
}

pub fn run_calibrate(config: &Config) -> Result<CalibrationOutcome> {
    let cal = config
        .calibration
        .as_ref()
        .context("[calibration] section is required for `calibrate`")?;
    let space = SearchSpace::from_config(&cal.bounds)?;
    let objective =
        CalibrationObjective::new(computer_for(config), config.interval_set()?, resolve_targets(config)?)?;
    let mut simulator = simulator_for(config)?;
    let mut optimizer = RandomSearch::new(cal.iterations, cal.seed);

    tracing::info!(
        iterations = cal.iterations,
        seed = cal.seed,
        targets = objective.targets().len(),
        "Starting calibration"
    );
    let outcome = optimizer.minimize(&space, &mut |params: &SimParams| {
        objective.evaluate(&mut simulator, params)
    })?;

    if let Some(path) = &cal.output_path {
        write_outcome(path, &outcome)?;
    }
    println!(
        "best loss {:.6e} at iteration {}: {:?}",
        outcome.best.loss, outcome.best.iteration, outcome.best.params
    );
    Ok(outcome)
}

pub fn write_outcome(path: &Path, outcome: &CalibrationOutcome) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(outcome)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "Wrote calibration outcome");
    Ok(())
}

pub fn run(args: &CliArgs, config: &Config) -> Result<()> {
    match args.command {
        CliCommand::Compute => run_compute(config).map(|_| ()),
        CliCommand::Sweep => run_sweep_command(config),
        CliCommand::Calibrate => run_calibrate(config).map(|_| ()),
        CliCommand::Help => {
            print_usage();
            Ok(())
        }
    }
}
