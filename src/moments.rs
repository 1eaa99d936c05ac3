use crate::error::UndefinedStatistic;

pub const MIN_SKEW_POINTS: usize = 3;
pub const MIN_KURTOSIS_POINTS: usize = 4;

// Deviations within this many ulps of the mean are rounding noise from the
// two-pass mean, not spread.
const MEAN_ROUNDING_ULPS: f64 = 8.0;

/// Square root of the sum of squared returns (quadratic variation, not
/// divided by N).
pub fn realized_volatility(returns: &[f64]) -> f64 {
    returns.iter().map(|r| r * r).sum::<f64>().sqrt()
}

/// Sample-adjusted Fisher-Pearson skewness `G1 = g1 * sqrt(n(n-1)) / (n-2)`.
pub fn skewness(returns: &[f64]) -> Result<f64, UndefinedStatistic> {
    let n = returns.len();
    require_points(n, MIN_SKEW_POINTS)?;
    let c = CentralSums::of(returns)?;
    let nf = n as f64;
    let m2 = c.s2 / nf;
    let m3 = c.s3 / nf;
    let g1 = m3 / m2.powf(1.5);
    Ok(g1 * (nf * (nf - 1.0)).sqrt() / (nf - 2.0))
}

/// Sample-adjusted excess kurtosis `G2` (normal = 0).
pub fn excess_kurtosis(returns: &[f64]) -> Result<f64, UndefinedStatistic> {
    let n = returns.len();
    require_points(n, MIN_KURTOSIS_POINTS)?;
    let c = CentralSums::of(returns)?;
    let nf = n as f64;
    let denom = (nf - 2.0) * (nf - 3.0);
    let lead = (nf + 1.0) * nf * (nf - 1.0) / denom;
    let adj = 3.0 * (nf - 1.0) * (nf - 1.0) / denom;
    Ok(lead * c.s4 / (c.s2 * c.s2) - adj)
}

fn require_points(available: usize, required: usize) -> Result<(), UndefinedStatistic> {
    if available < required {
        return Err(UndefinedStatistic::TooFewPoints {
            required,
            available,
        });
    }
    Ok(())
}

/// Sums of powers of deviations from the mean, two-pass.
struct CentralSums {
    s2: f64,
    s3: f64,
    s4: f64,
}

impl CentralSums {
    fn of(values: &[f64]) -> Result<Self, UndefinedStatistic> {
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let mut s2 = 0.0;
        let mut s3 = 0.0;
        let mut s4 = 0.0;
        for v in values {
            let d = v - mean;
            let d2 = d * d;
            s2 += d2;
            s3 += d2 * d;
            s4 += d2 * d2;
        }
        let noise = MEAN_ROUNDING_ULPS * f64::EPSILON * mean.abs();
        if s2 / n <= noise * noise {
            return Err(UndefinedStatistic::ZeroVariance);
        }
        Ok(Self { s2, s3, s4 })
    }
}
