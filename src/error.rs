use thiserror::Error;

#[derive(Error, Debug)]
pub enum FactsError {
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    #[error("invalid time series: {0}")]
    InvalidTimeSeries(String),

    #[error("invalid interval: {0}")]
    InvalidInterval(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a per-interval statistic could not be computed. Carried inline in the
/// metrics row; never fatal to the batch.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndefinedStatistic {
    #[error("needs at least {required} log-returns, got {available}")]
    TooFewPoints { required: usize, available: usize },

    #[error("log-returns have zero variance")]
    ZeroVariance,
}
