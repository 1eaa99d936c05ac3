use anyhow::{bail, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::calibration::params::{SearchSpace, SimParams};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Trial {
    pub iteration: usize,
    pub params: SimParams,
    pub loss: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalibrationOutcome {
    pub best: Trial,
    pub trials: Vec<Trial>,
}

/// Black-box minimizer over a [`SearchSpace`].
///
/// The objective's errors abort the search; an optimizer never substitutes a
/// default loss for a failed evaluation.
pub trait Optimizer {
    fn minimize(
        &mut self,
        space: &SearchSpace,
        objective: &mut dyn FnMut(&SimParams) -> Result<f64>,
    ) -> Result<CalibrationOutcome>;
}

/// Uniform random search with a seeded ChaCha8 stream.
#[derive(Debug, Clone)]
pub struct RandomSearch {
    iterations: usize,
    seed: u64,
}

impl RandomSearch {
    pub fn new(iterations: usize, seed: u64) -> Self {
        Self { iterations, seed }
    }
}

impl Optimizer for RandomSearch {
    fn minimize(
        &mut self,
        space: &SearchSpace,
        objective: &mut dyn FnMut(&SimParams) -> Result<f64>,
    ) -> Result<CalibrationOutcome> {
        if self.iterations == 0 {
            bail!("random search needs at least one iteration");
        }
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut trials: Vec<Trial> = Vec::with_capacity(self.iterations);
        let mut best: Option<Trial> = None;

        for iteration in 0..self.iterations {
            let params = space.sample(&mut rng);
            let loss = objective(&params)?;
            if !loss.is_finite() {
                bail!("objective returned non-finite loss {} for {:?}", loss, params);
            }
            let trial = Trial {
                iteration,
                params,
                loss,
            };
            tracing::info!(iteration, loss, ?params, "Calibration trial");
            if best.map_or(true, |b| loss < b.loss) {
                best = Some(trial);
            }
            trials.push(trial);
        }

        match best {
            Some(best) => Ok(CalibrationOutcome { best, trials }),
            None => bail!("random search produced no trials"),
        }
    }
}
