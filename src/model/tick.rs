use crate::error::FactsError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    pub timestamp_ns: i64,
    pub price: f64,
}

impl Tick {
    pub fn new(timestamp_ns: i64, price: f64) -> Self {
        Self {
            timestamp_ns,
            price,
        }
    }
}

/// Trade prints for a single instrument, sorted by timestamp.
///
/// Construction stable-sorts the input, so rows sharing a timestamp keep their
/// original relative order and the later row is the "last observed" one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickSeries {
    ticks: Vec<Tick>,
}

impl TickSeries {
    pub fn new(mut ticks: Vec<Tick>) -> Result<Self, FactsError> {
        for (row, tick) in ticks.iter().enumerate() {
            if !tick.price.is_finite() || tick.price <= 0.0 {
                return Err(FactsError::InvalidTimeSeries(format!(
                    "row {}: price must be finite and > 0, got {}",
                    row, tick.price
                )));
            }
        }
        ticks.sort_by_key(|t| t.timestamp_ns);
        Ok(Self { ticks })
    }

    /// Build from `(timestamp_ns, price)` pairs.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, FactsError>
    where
        I: IntoIterator<Item = (i64, f64)>,
    {
        Self::new(pairs.into_iter().map(|(t, p)| Tick::new(t, p)).collect())
    }

    pub fn ticks(&self) -> &[Tick] {
        &self.ticks
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    /// Last timestamp minus first timestamp, 0 for fewer than two ticks.
    pub fn span_ns(&self) -> i64 {
        match (self.ticks.first(), self.ticks.last()) {
            (Some(first), Some(last)) => last.timestamp_ns - first.timestamp_ns,
            _ => 0,
        }
    }
}
