use crate::error::FactsError;
use crate::model::interval::{IntervalSet, IntervalSpec};
use crate::model::metrics::MetricsRow;
use crate::model::tick::TickSeries;
use crate::moments::{excess_kurtosis, realized_volatility, skewness};
use crate::resample::{log_returns, resample_last, BucketOrigin};

/// Resamples a tick series per interval and reduces each resampled series to
/// realized volatility, skewness and excess kurtosis of its log-returns.
#[derive(Debug, Clone, Copy, Default)]
pub struct StylizedFactComputer {
    origin: BucketOrigin,
}

impl StylizedFactComputer {
    pub fn new(origin: BucketOrigin) -> Self {
        Self { origin }
    }

    pub fn origin(&self) -> BucketOrigin {
        self.origin
    }

    /// One row per interval, in `intervals` order.
    pub fn compute(
        &self,
        prices: &TickSeries,
        intervals: &IntervalSet,
    ) -> Result<Vec<MetricsRow>, FactsError> {
        if prices.is_empty() {
            return Err(FactsError::InsufficientData(
                "tick series is empty".to_string(),
            ));
        }
        if intervals.is_empty() {
            return Err(FactsError::InsufficientData(
                "no intervals requested".to_string(),
            ));
        }
        intervals
            .iter()
            .map(|spec| self.compute_interval(prices, spec))
            .collect()
    }

    fn compute_interval(
        &self,
        prices: &TickSeries,
        spec: &IntervalSpec,
    ) -> Result<MetricsRow, FactsError> {
        let buckets = resample_last(prices.ticks(), spec.width_ns, self.origin)?;
        let returns = log_returns(&buckets);
        tracing::debug!(
            interval = %spec.label,
            width_ns = spec.width_ns,
            buckets = buckets.len(),
            "Resampled tick series"
        );
        Ok(MetricsRow {
            interval: spec.label.clone(),
            n_points: returns.len(),
            realized_vol: realized_volatility(&returns),
            skewness: skewness(&returns),
            kurtosis: excess_kurtosis(&returns),
        })
    }
}
