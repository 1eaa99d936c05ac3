use stylized_facts::error::UndefinedStatistic;
use stylized_facts::moments::{excess_kurtosis, realized_volatility, skewness};

#[test]
fn realized_volatility_is_not_normalized_by_count() {
    assert_eq!(realized_volatility(&[]), 0.0);
    assert!((realized_volatility(&[3.0, 4.0]) - 5.0).abs() < 1e-12);
    // Doubling the sample with the same returns scales by sqrt(2), not 1.
    let one = realized_volatility(&[0.01, -0.02]);
    let two = realized_volatility(&[0.01, -0.02, 0.01, -0.02]);
    assert!((two / one - 2f64.sqrt()).abs() < 1e-12);
}

#[test]
/// Reference values from the sample-adjusted G1/G2 estimators.
fn sample_adjusted_moments_match_reference_values() {
    let x = [1.0, 2.0, 3.0, 4.0, 10.0];
    assert!((skewness(&x).unwrap() - 1.697_056_274_847_714).abs() < 1e-12);
    assert!((excess_kurtosis(&x).unwrap() - 3.152).abs() < 1e-12);

    let r = [0.01, -0.02, 0.005, 0.03, -0.01, 0.0];
    assert!((skewness(&r).unwrap() - 0.460_406_410_665_179_7).abs() < 1e-10);
    assert!((excess_kurtosis(&r).unwrap() - 0.519_031_141_868_512_5).abs() < 1e-10);
}

#[test]
fn symmetric_sample_has_zero_skew() {
    let r = [-0.02, -0.01, 0.0, 0.01, 0.02];
    assert!(skewness(&r).unwrap().abs() < 1e-12);
}

#[test]
fn too_few_points_are_undefined_not_zero() {
    assert_eq!(
        skewness(&[0.1, 0.2]),
        Err(UndefinedStatistic::TooFewPoints {
            required: 3,
            available: 2
        })
    );
    assert_eq!(
        excess_kurtosis(&[0.1, 0.2, 0.4]),
        Err(UndefinedStatistic::TooFewPoints {
            required: 4,
            available: 3
        })
    );
    assert!(skewness(&[]).is_err());
    assert!(excess_kurtosis(&[]).is_err());
}

#[test]
fn constant_returns_have_zero_variance() {
    let r = [0.003; 10];
    assert_eq!(skewness(&r), Err(UndefinedStatistic::ZeroVariance));
    assert_eq!(excess_kurtosis(&r), Err(UndefinedStatistic::ZeroVariance));
}

#[test]
/// A strong drift with a tiny but real spread still has defined moments.
fn small_spread_around_large_mean_is_defined() {
    let r: Vec<f64> = (0..50)
        .map(|i| 0.01 + if i % 3 == 0 { 2e-10 } else { -1e-10 })
        .collect();
    let skew = skewness(&r).unwrap();
    assert!(skew.is_finite() && skew > 0.0, "{}", skew);
    assert!(excess_kurtosis(&r).unwrap().is_finite());

    let centered: Vec<f64> = r.iter().map(|v| v - 0.01).collect();
    assert!((skew - skewness(&centered).unwrap()).abs() < 1e-4);
}

#[test]
fn moments_are_shift_invariant() {
    let r = [0.01, -0.02, 0.005, 0.03, -0.01, 0.0, 0.007];
    let shifted: Vec<f64> = r.iter().map(|v| v + 0.5).collect();
    assert!((skewness(&r).unwrap() - skewness(&shifted).unwrap()).abs() < 1e-8);
    assert!((excess_kurtosis(&r).unwrap() - excess_kurtosis(&shifted).unwrap()).abs() < 1e-8);
}
