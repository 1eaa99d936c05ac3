use crate::error::UndefinedStatistic;

/// Stylized facts for one resampling interval.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsRow {
    pub interval: String,
    /// Number of log-returns the statistics were computed from.
    pub n_points: usize,
    pub realized_vol: f64,
    pub skewness: Result<f64, UndefinedStatistic>,
    /// Excess kurtosis (normal = 0).
    pub kurtosis: Result<f64, UndefinedStatistic>,
}

impl MetricsRow {
    pub fn has_undefined(&self) -> bool {
        self.skewness.is_err() || self.kurtosis.is_err()
    }
}
