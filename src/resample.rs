use serde::Deserialize;

use crate::error::FactsError;
use crate::model::tick::Tick;

/// Where bucket boundaries are anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketOrigin {
    /// `floor((t - t_first) / width)`: the first tick opens bucket 0.
    #[default]
    FirstTick,
    /// `floor(t / width)`: boundaries on multiples of the width since the Unix epoch.
    Epoch,
}

impl BucketOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstTick => "first_tick",
            Self::Epoch => "epoch",
        }
    }
}

/// One non-empty bucket reduced to its last observed price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bucket {
    pub start_ns: i64,
    pub last_price: f64,
}

/// Last price per left-closed, right-open bucket of `width_ns`.
///
/// `ticks` must be sorted by timestamp (as [`crate::model::tick::TickSeries`]
/// guarantees). Empty buckets are dropped, never forward-filled.
pub fn resample_last(
    ticks: &[Tick],
    width_ns: i64,
    origin: BucketOrigin,
) -> Result<Vec<Bucket>, FactsError> {
    if width_ns <= 0 {
        return Err(FactsError::InvalidInterval(format!(
            "bucket width must be > 0 ns, got {}",
            width_ns
        )));
    }
    let Some(first) = ticks.first() else {
        return Ok(Vec::new());
    };
    let anchor = match origin {
        BucketOrigin::FirstTick => first.timestamp_ns,
        BucketOrigin::Epoch => 0,
    };

    let mut out: Vec<Bucket> = Vec::new();
    let mut current: Option<(i64, f64)> = None;
    for tick in ticks {
        let index = bucket_index(tick.timestamp_ns, anchor, width_ns);
        match current {
            Some((idx, _)) if idx == index => current = Some((idx, tick.price)),
            Some((idx, price)) => {
                out.push(finish(idx, price, anchor, width_ns));
                current = Some((index, tick.price));
            }
            None => current = Some((index, tick.price)),
        }
    }
    if let Some((idx, price)) = current {
        out.push(finish(idx, price, anchor, width_ns));
    }
    Ok(out)
}

/// First differences of natural-log prices; one shorter than the input.
pub fn log_returns(buckets: &[Bucket]) -> Vec<f64> {
    buckets
        .windows(2)
        .map(|w| w[1].last_price.ln() - w[0].last_price.ln())
        .collect()
}

fn bucket_index(timestamp_ns: i64, anchor: i64, width_ns: i64) -> i64 {
    // i128 keeps `t - anchor` exact for timestamps on either side of the epoch.
    let offset = timestamp_ns as i128 - anchor as i128;
    offset.div_euclid(width_ns as i128) as i64
}

fn finish(index: i64, last_price: f64, anchor: i64, width_ns: i64) -> Bucket {
    let start = anchor as i128 + index as i128 * width_ns as i128;
    Bucket {
        start_ns: start.clamp(i64::MIN as i128, i64::MAX as i128) as i64,
        last_price,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticks(pairs: &[(i64, f64)]) -> Vec<Tick> {
        pairs.iter().map(|&(t, p)| Tick::new(t, p)).collect()
    }

    #[test]
    fn keeps_last_price_per_bucket_and_drops_gaps() {
        let t = ticks(&[(0, 1.0), (3, 2.0), (9, 3.0), (35, 4.0), (39, 5.0)]);
        let b = resample_last(&t, 10, BucketOrigin::FirstTick).unwrap();
        assert_eq!(
            b,
            vec![
                Bucket { start_ns: 0, last_price: 3.0 },
                Bucket { start_ns: 30, last_price: 5.0 },
            ]
        );
    }

    #[test]
    fn bucket_is_left_closed_right_open() {
        let t = ticks(&[(0, 1.0), (10, 2.0)]);
        let b = resample_last(&t, 10, BucketOrigin::FirstTick).unwrap();
        assert_eq!(b.len(), 2);
        assert_eq!(b[1].start_ns, 10);
    }

    #[test]
    fn origin_changes_boundaries() {
        let t = ticks(&[(7, 1.0), (12, 2.0)]);
        assert_eq!(resample_last(&t, 10, BucketOrigin::FirstTick).unwrap().len(), 1);
        let epoch = resample_last(&t, 10, BucketOrigin::Epoch).unwrap();
        assert_eq!(epoch.len(), 2);
        assert_eq!(epoch[0].start_ns, 0);
        assert_eq!(epoch[1].start_ns, 10);
    }

    #[test]
    fn epoch_alignment_handles_pre_epoch_timestamps() {
        let t = ticks(&[(-3, 1.0), (-1, 2.0), (0, 3.0)]);
        let b = resample_last(&t, 5, BucketOrigin::Epoch).unwrap();
        assert_eq!(
            b,
            vec![
                Bucket { start_ns: -5, last_price: 2.0 },
                Bucket { start_ns: 0, last_price: 3.0 },
            ]
        );
    }

    #[test]
    fn non_positive_width_is_invalid_interval() {
        let t = ticks(&[(0, 1.0), (1, 2.0)]);
        for width in [0, -5] {
            assert!(matches!(
                resample_last(&t, width, BucketOrigin::FirstTick),
                Err(FactsError::InvalidInterval(_))
            ));
        }
        assert!(resample_last(&[], 0, BucketOrigin::Epoch).is_err());
    }

    #[test]
    fn log_returns_are_one_shorter() {
        let b = vec![
            Bucket { start_ns: 0, last_price: 100.0 },
            Bucket { start_ns: 1, last_price: 110.0 },
        ];
        let r = log_returns(&b);
        assert_eq!(r.len(), 1);
        assert!((r[0] - (1.1f64).ln()).abs() < 1e-12);
        assert!(log_returns(&b[..1]).is_empty());
        assert!(log_returns(&[]).is_empty());
    }
}
