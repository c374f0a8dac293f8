//! Confidence sampling.
//!
//! There is no model behind the classifier, so "confidence" is drawn from a
//! per-category range. The sampler is a trait so tests can substitute a
//! deterministic implementation and assert exact pipeline behaviour.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Samples a confidence value from `[low, high)`.
pub trait ConfidenceSampler: Send {
    fn sample(&mut self, range: (f64, f64)) -> f64;
}

/// Production sampler backed by an entropy-seeded RNG.
pub struct UniformSampler {
    rng: StdRng,
}

impl UniformSampler {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl Default for UniformSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfidenceSampler for UniformSampler {
    fn sample(&mut self, (low, high): (f64, f64)) -> f64 {
        self.rng.gen_range(low..high)
    }
}

/// Deterministic sampler for tests: always returns the range midpoint.
pub struct FixedSampler;

impl ConfidenceSampler for FixedSampler {
    fn sample(&mut self, (low, high): (f64, f64)) -> f64 {
        (low + high) / 2.0
    }
}
