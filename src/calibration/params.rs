use anyhow::{bail, Result};
use rand::Rng;
use serde::Serialize;

use crate::config::{BoundsConfig, SweepConfig};

/// Knobs of the external market simulator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimParams {
    pub mu: f64,
    pub sigma: f64,
    pub num_bots: u64,
    pub vol_threshold: f64,
    pub aggression: f64,
}

/// Inclusive bounds for one continuous parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    pub min: f64,
    pub max: f64,
}

impl Bound {
    pub fn new(name: &str, min: f64, max: f64) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() {
            bail!("{} bounds must be finite, got [{}, {}]", name, min, max);
        }
        if min > max {
            bail!("{} bounds are inverted: [{}, {}]", name, min, max);
        }
        Ok(Self { min, max })
    }

    fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        if self.min == self.max {
            self.min
        } else {
            rng.gen_range(self.min..=self.max)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchSpace {
    pub mu: Bound,
    pub sigma: Bound,
    pub num_bots: (u64, u64),
    pub vol_threshold: Bound,
    pub aggression: Bound,
}

impl SearchSpace {
    pub fn from_config(cfg: &BoundsConfig) -> Result<Self> {
        let [bots_min, bots_max] = cfg.num_bots;
        if bots_min > bots_max {
            bail!("num_bots bounds are inverted: [{}, {}]", bots_min, bots_max);
        }
        Ok(Self {
            mu: Bound::new("mu", cfg.mu[0], cfg.mu[1])?,
            sigma: Bound::new("sigma", cfg.sigma[0], cfg.sigma[1])?,
            num_bots: (bots_min, bots_max),
            vol_threshold: Bound::new("vol_threshold", cfg.vol_threshold[0], cfg.vol_threshold[1])?,
            aggression: Bound::new("aggression", cfg.aggression[0], cfg.aggression[1])?,
        })
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> SimParams {
        SimParams {
            mu: self.mu.sample(rng),
            sigma: self.sigma.sample(rng),
            num_bots: rng.gen_range(self.num_bots.0..=self.num_bots.1),
            vol_threshold: self.vol_threshold.sample(rng),
            aggression: self.aggression.sample(rng),
        }
    }

    pub fn contains(&self, p: &SimParams) -> bool {
        let within = |b: &Bound, v: f64| v >= b.min && v <= b.max;
        within(&self.mu, p.mu)
            && within(&self.sigma, p.sigma)
            && p.num_bots >= self.num_bots.0
            && p.num_bots <= self.num_bots.1
            && within(&self.vol_threshold, p.vol_threshold)
            && within(&self.aggression, p.aggression)
    }
}

/// Discrete values per parameter for an exhaustive sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamGrid {
    pub mu: Vec<f64>,
    pub sigma: Vec<f64>,
    pub num_bots: Vec<u64>,
    pub vol_threshold: Vec<f64>,
    pub aggression: Vec<f64>,
}

impl ParamGrid {
    pub fn from_config(cfg: &SweepConfig) -> Result<Self> {
        let grid = Self {
            mu: cfg.mu.clone(),
            sigma: cfg.sigma.clone(),
            num_bots: cfg.num_bots.clone(),
            vol_threshold: cfg.vol_threshold.clone(),
            aggression: cfg.aggression.clone(),
        };
        grid.validate()?;
        Ok(grid)
    }

    pub fn validate(&self) -> Result<()> {
        let lens = [
            ("mu", self.mu.len()),
            ("sigma", self.sigma.len()),
            ("num_bots", self.num_bots.len()),
            ("vol_threshold", self.vol_threshold.len()),
            ("aggression", self.aggression.len()),
        ];
        for (name, len) in lens {
            if len == 0 {
                bail!("sweep grid for {} is empty", name);
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.mu.len()
            * self.sigma.len()
            * self.num_bots.len()
            * self.vol_threshold.len()
            * self.aggression.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cartesian product in declaration order; `aggression` varies fastest.
    pub fn combinations(&self) -> Vec<SimParams> {
        let mut out = Vec::with_capacity(self.len());
        for &mu in &self.mu {
            for &sigma in &self.sigma {
                for &num_bots in &self.num_bots {
                    for &vol_threshold in &self.vol_threshold {
                        for &aggression in &self.aggression {
                            out.push(SimParams {
                                mu,
                                sigma,
                                num_bots,
                                vol_threshold,
                                aggression,
                            });
                        }
                    }
                }
            }
        }
        out
    }
}
