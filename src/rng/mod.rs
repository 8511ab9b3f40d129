//! Seedable Random Source
//!
//! Every stochastic decision in the engine flows through [`MotorRng`] so
//! that two sessions with the same seed and identical call sequences
//! produce byte-identical traces. The sampler set mirrors the
//! distributions human motor data is fit with: gaussian, log-normal,
//! ex-gaussian, bivariate normal, and truncated gaussian.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Exp, LogNormal, Normal};

/// Rejection-sampling attempts before a truncated draw falls back to
/// clamping.
const TRUNCATION_ATTEMPTS: u32 = 32;

/// Seedable PRNG with the distribution samplers used across the engine.
#[derive(Debug, Clone)]
pub struct MotorRng {
    rng: ChaCha8Rng,
}

impl MotorRng {
    /// Create from an explicit seed (reproducible) or OS entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self { rng }
    }

    /// Uniform sample in `[0, 1)`.
    pub fn uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// Uniform sample in `[lo, hi)`.
    pub fn uniform_in(&mut self, lo: f64, hi: f64) -> f64 {
        if hi <= lo {
            return lo;
        }
        self.rng.gen_range(lo..hi)
    }

    /// Gaussian sample. A non-positive sigma degenerates to the mean.
    pub fn gaussian(&mut self, mu: f64, sigma: f64) -> f64 {
        match Normal::new(mu, sigma.max(0.0)) {
            Ok(dist) => dist.sample(&mut self.rng),
            Err(_) => mu,
        }
    }

    /// Log-normal sample with log-space parameters `mu`, `sigma`.
    pub fn lognormal(&mut self, mu: f64, sigma: f64) -> f64 {
        match LogNormal::new(mu, sigma.max(0.0)) {
            Ok(dist) => dist.sample(&mut self.rng),
            Err(_) => mu.exp(),
        }
    }

    /// Ex-gaussian sample: gaussian plus an independent exponential tail
    /// with mean `tau`, floored at zero. The classic reaction-time shape.
    pub fn exgaussian(&mut self, mu: f64, sigma: f64, tau: f64) -> f64 {
        let gaussian_part = self.gaussian(mu, sigma);
        let exponential_part = if tau > 0.0 {
            match Exp::new(1.0 / tau) {
                Ok(dist) => dist.sample(&mut self.rng),
                Err(_) => 0.0,
            }
        } else {
            0.0
        };
        (gaussian_part + exponential_part).max(0.0)
    }

    /// Truncated gaussian via rejection sampling, clamping after
    /// [`TRUNCATION_ATTEMPTS`] misses.
    pub fn truncated_gaussian(&mut self, mu: f64, sigma: f64, lo: f64, hi: f64) -> f64 {
        debug_assert!(lo <= hi, "truncation bounds inverted");
        for _ in 0..TRUNCATION_ATTEMPTS {
            let value = self.gaussian(mu, sigma);
            if (lo..=hi).contains(&value) {
                return value;
            }
        }
        self.gaussian(mu, sigma).clamp(lo, hi)
    }

    /// Isotropic bivariate normal around `(cx, cy)`.
    ///
    /// Submovement error covariances are isotropic, so two independent
    /// axis draws suffice; no Cholesky factor is needed.
    pub fn bivariate_normal(&mut self, cx: f64, cy: f64, sigma_x: f64, sigma_y: f64) -> (f64, f64) {
        let x = self.gaussian(cx, sigma_x);
        let y = self.gaussian(cy, sigma_y);
        (x, y)
    }

    /// Random sign, `+1.0` or `-1.0` with equal probability.
    pub fn coin_sign(&mut self) -> f64 {
        if self.rng.gen::<bool>() {
            1.0
        } else {
            -1.0
        }
    }
}
