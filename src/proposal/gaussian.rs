//! Default proposer: Gaussian perturbation around the search center, then
//! around members of the cost/objective Pareto front

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::TunerConfig;
use crate::error::{Result, TuneError};

use super::pareto::pareto_front_indices;
use super::traits::{CandidateProposer, ProposalContext};

/// Seeded Gaussian sampler in normalized space
///
/// The RNG is derived from `seed + row_id`, so the proposal for a given row
/// is the same whether or not the engine restarted in between.
#[derive(Debug, Clone)]
pub struct GaussianProposer {
    seed: u64,
    num_random_samples: usize,
    radius: f64,
}

impl GaussianProposer {
    pub fn new(seed: u64) -> Self {
        Self { seed, num_random_samples: 4, radius: 0.3 }
    }

    pub fn from_config(config: &TunerConfig) -> Self {
        Self {
            seed: config.seed,
            num_random_samples: config.num_random_samples,
            radius: config.initial_search_radius,
        }
    }

    /// Successes required before sampling around the Pareto front
    pub fn with_random_samples(mut self, n: usize) -> Self {
        self.num_random_samples = n;
        self
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }
}

/// Standard normal sample via Box-Muller
fn standard_normal<R: Rng>(rng: &mut R) -> f64 {
    let u1: f64 = rng.random::<f64>().max(1e-10);
    let u2: f64 = rng.random::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

impl CandidateProposer for GaussianProposer {
    fn propose(&mut self, ctx: &ProposalContext<'_>) -> Result<Vec<f64>> {
        if ctx.dimension() == 0 {
            return Err(TuneError::Proposal("empty search space".to_string()));
        }
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(ctx.row_id.get() as u64));

        let center = if ctx.successes.len() < self.num_random_samples {
            ctx.search_center
        } else {
            let pairs: Vec<(f64, f64)> = ctx.successes.iter().map(|o| (o.cost, o.output)).collect();
            let front = pareto_front_indices(&pairs, ctx.better_direction);
            if front.is_empty() {
                ctx.search_center
            } else {
                let pick = front[rng.random_range(0..front.len())];
                ctx.successes[pick].point.as_slice()
            }
        };

        Ok(center.iter().map(|c| c + standard_normal(&mut rng) * self.radius).collect())
    }
}
