use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::model::interval::IntervalSet;
use crate::resample::BucketOrigin;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
pub const CONFIG_PATH_ENV: &str = "STYLIZED_FACTS_CONFIG";
pub const SOURCE_PATH_ENV: &str = "STYLIZED_FACTS_SOURCE";
pub const OUTPUT_PATH_ENV: &str = "STYLIZED_FACTS_OUTPUT";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub source: SourceConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub bucketing: BucketingConfig,
    pub intervals: Vec<IntervalConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub simulator: Option<SimulatorConfig>,
    #[serde(default)]
    pub calibration: Option<CalibrationConfig>,
    #[serde(default)]
    pub sweep: Option<SweepConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    #[default]
    Csv,
    TradeLog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EpochUnit {
    S,
    Ms,
    Us,
    Ns,
}

impl EpochUnit {
    pub fn nanos_per_unit(&self) -> i64 {
        match self {
            Self::S => 1_000_000_000,
            Self::Ms => 1_000_000,
            Self::Us => 1_000,
            Self::Ns => 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub format: SourceFormat,
    #[serde(default = "default_timestamp_column")]
    pub timestamp_column: String,
    #[serde(default = "default_price_column")]
    pub price_column: String,
    #[serde(default)]
    pub timestamp_format: Option<String>,
    #[serde(default)]
    pub epoch_unit: Option<EpochUnit>,
}

impl SourceConfig {
    pub fn csv(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            format: SourceFormat::Csv,
            timestamp_column: default_timestamp_column(),
            price_column: default_price_column(),
            timestamp_format: None,
            epoch_unit: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct BucketingConfig {
    #[serde(default)]
    pub origin: BucketOrigin,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IntervalConfig {
    pub label: String,
    pub width: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Text,
        }
    }
}

/// External program standing in for the market simulator.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulatorConfig {
    pub command: Vec<String>,
    #[serde(default)]
    pub epoch_unit: Option<EpochUnit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    pub interval: String,
    pub realized_vol: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BoundsConfig {
    pub mu: [f64; 2],
    pub sigma: [f64; 2],
    pub num_bots: [u64; 2],
    pub vol_threshold: [f64; 2],
    pub aggression: [f64; 2],
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalibrationConfig {
    /// Report CSV whose `realized_vol` column supplies the targets.
    #[serde(default)]
    pub targets_path: Option<PathBuf>,
    #[serde(default)]
    pub targets: Vec<TargetConfig>,
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
    pub bounds: BoundsConfig,
    #[serde(default)]
    pub output_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SweepConfig {
    pub output_path: PathBuf,
    pub mu: Vec<f64>,
    pub sigma: Vec<f64>,
    pub num_bots: Vec<u64>,
    pub vol_threshold: Vec<f64>,
    pub aggression: Vec<f64>,
}

fn default_timestamp_column() -> String {
    "timestamp".to_string()
}

fn default_price_column() -> String {
    "price".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_iterations() -> usize {
    30
}

fn default_seed() -> u64 {
    42
}

/// Parse a fixed wall-clock width (e.g. "500ms", "5s", "5S", "15min", "1h") into nanoseconds.
///
/// Calendar-relative units such as months are rejected.
pub fn parse_interval_ns(s: &str) -> Result<i64> {
    let s = s.trim();
    let split = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    let (num_str, suffix) = s.split_at(split);
    if num_str.is_empty() || suffix.is_empty() {
        bail!("invalid interval '{}': expected format like '5s' or '15min'", s);
    }
    let n: i64 = num_str.parse().with_context(|| {
        format!(
            "invalid interval '{}': quantity must be a positive integer",
            s
        )
    })?;
    if n == 0 {
        bail!("invalid interval '{}': quantity must be > 0", s);
    }

    let unit_ns: i64 = match suffix {
        "ns" => 1,
        "us" => 1_000,
        "ms" | "L" => 1_000_000,
        "s" | "S" => 1_000_000_000,
        "m" | "min" | "T" => 60_000_000_000,
        "h" | "H" => 3_600_000_000_000,
        "d" | "D" => 86_400_000_000_000,
        "w" | "W" => 7 * 86_400_000_000_000,
        "M" | "MS" | "Y" | "A" => bail!(
            "invalid interval '{}': calendar unit '{}' has no fixed width",
            s,
            suffix
        ),
        _ => bail!(
            "invalid interval '{}': unsupported suffix '{}', expected one of ns/us/ms/s/min/h/d/w",
            s,
            suffix
        ),
    };

    n.checked_mul(unit_ns)
        .with_context(|| format!("invalid interval '{}': value is too large", s))
}

impl Config {
    /// Config file path: `STYLIZED_FACTS_CONFIG` if set, else `config/default.toml`.
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(p) = explicit {
            return p.to_path_buf();
        }
        std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let config_path = Self::resolve_path(explicit);
        let config_str = std::fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;

        let mut config = Self::from_toml_str(&config_str)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;

        if let Ok(source) = std::env::var(SOURCE_PATH_ENV) {
            config.source.path = PathBuf::from(source);
        }
        if let Ok(output) = std::env::var(OUTPUT_PATH_ENV) {
            config.output.path = PathBuf::from(output);
        }

        Ok(config)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).context("invalid TOML")?;
        config
            .interval_set()
            .context("intervals are invalid")?;
        Ok(config)
    }

    /// Interval widths parsed into an ordered set, in file order.
    pub fn interval_set(&self) -> Result<IntervalSet> {
        if self.intervals.is_empty() {
            bail!("at least one [[intervals]] entry is required");
        }
        let mut set = IntervalSet::new();
        for interval in &self.intervals {
            let width_ns = parse_interval_ns(&interval.width)
                .with_context(|| format!("interval '{}'", interval.label))?;
            set.push(interval.label.clone(), width_ns)?;
        }
        Ok(set)
    }
}
