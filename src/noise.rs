//! Seeded uniform random source shared by the stochastic simulators
//!
//! Every simulator draws from its own [`UniformNoise`]. Passing a seed makes a
//! run reproducible; `None` seeds from OS entropy.

use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::Uniform;

/// Uniform samples on [0, 1)
///
/// # Example
///
/// ```ignore
/// let mut noise = UniformNoise::new(Some(42));
/// let jitter = noise.centered(0.05); // uniform on [-0.025, 0.025)
/// ```
#[derive(Debug, Clone)]
pub struct UniformNoise {
    rng: StdRng,
    distribution: Uniform<f64>,
    seed: Option<u64>,
}

impl UniformNoise {
    /// Create a source with an optional seed
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };

        Self {
            rng,
            distribution: Uniform::new(0.0, 1.0),
            seed,
        }
    }

    /// Seed this source was created with, if any
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Draw U ~ [0, 1)
    #[inline]
    pub fn unit(&mut self) -> f64 {
        self.distribution.sample(&mut self.rng)
    }

    /// Draw (U - 0.5) * width, i.e. uniform on [-width/2, width/2)
    #[inline]
    pub fn centered(&mut self, width: f64) -> f64 {
        (self.unit() - 0.5) * width
    }

    /// Draw an index uniformly from 0..n as floor(U * n)
    #[inline]
    pub fn index(&mut self, n: usize) -> usize {
        ((self.unit() * n as f64) as usize).min(n.saturating_sub(1))
    }

    /// Reset with new seed
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
        self.seed = Some(seed);
    }
}
