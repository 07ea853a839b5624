// src/io/demand.rs

use crate::simulation::config::{ChainConfig, DemandKind};
use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::StandardNormal;

/// End-customer demand, sampled fresh every tick.
#[derive(Debug, Clone)]
pub enum DemandModel {
    /// Integer drawn uniformly from `[low, high]`.
    Uniform { low: i64, high: i64 },
    /// Normal sample truncated toward zero. Negative draws are kept.
    Normal { mu: f64, sigma: f64 },
    /// `initial` before `step_time`, `stepped` from then on.
    /// The classic beer game step that triggers the bullwhip effect.
    ///
    /// Reads `demand_pattern_initial_value` and `demand_pattern_stepped_value`,
    /// not the uniform bounds. With the default config those are 4 and 8.
    Pattern {
        initial: i64,
        stepped: i64,
        step_time: u64,
    },
}

impl DemandModel {
    /// Expects a validated config.
    pub fn from_config(config: &ChainConfig) -> Self {
        match config.demand_distribution {
            DemandKind::Uniform => DemandModel::Uniform {
                low: config.demand_low,
                high: config.demand_high,
            },
            DemandKind::Normal => DemandModel::Normal {
                mu: config.demand_mu,
                sigma: config.demand_sigma,
            },
            DemandKind::Pattern => DemandModel::Pattern {
                initial: config.demand_pattern_initial_value,
                stepped: config.demand_pattern_stepped_value,
                step_time: config.demand_pattern_step_time,
            },
        }
    }

    pub fn sample(&self, time: u64, rng: &mut StdRng) -> i64 {
        match self {
            DemandModel::Uniform { low, high } => rng.gen_range(*low..=*high),
            DemandModel::Normal { mu, sigma } => {
                let z: f64 = rng.sample(StandardNormal);
                (mu + sigma * z).trunc() as i64
            }
            DemandModel::Pattern {
                initial,
                stepped,
                step_time,
            } => {
                if time < *step_time {
                    *initial
                } else {
                    *stepped
                }
            }
        }
    }
}
