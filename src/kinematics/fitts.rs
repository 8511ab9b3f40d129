//! Fitts' Law Movement Timing
//!
//! Samples movement durations from distance and target size using the
//! Shannon formulation of the index of difficulty, with per-invocation
//! coefficient draws and a hard human throughput ceiling.

use crate::config::FittsParams;
use crate::rng::MotorRng;
use crate::{Error, Result};

/// Durations are clamped to this range after all other bounds.
const MIN_DURATION_S: f64 = 0.05;
const MAX_DURATION_S: f64 = 4.0;

/// Coefficient draws are clamped to at least this fraction of their mean.
const COEFFICIENT_FLOOR: f64 = 0.10;

/// Shannon index of difficulty in bits: `log2(2D/W + 1)`.
///
/// The `+ 1` keeps the index non-negative when the distance is shorter
/// than half the target width.
pub fn index_of_difficulty(distance: f64, width: f64) -> f64 {
    (2.0 * distance / width + 1.0).log2()
}

/// Stochastic Fitts' Law duration sampler.
#[derive(Debug, Clone)]
pub struct FittsSampler {
    params: FittsParams,
}

impl FittsSampler {
    pub fn new(params: FittsParams) -> Self {
        Self { params }
    }

    /// Sample a movement time in seconds for the given distance and
    /// effective target width.
    ///
    /// The instantaneous throughput `ID / T` never exceeds
    /// `max_throughput`: when the sampled coefficients would beat the
    /// ceiling, the duration is raised to `ID / max_throughput`.
    pub fn duration(&self, rng: &mut MotorRng, distance: f64, width: f64) -> Result<f64> {
        if !distance.is_finite() || distance < 0.0 {
            return Err(Error::InvalidGeometry(format!(
                "movement distance must be finite and non-negative, got {distance}"
            )));
        }
        if !width.is_finite() || width <= 0.0 {
            return Err(Error::InvalidGeometry(format!(
                "effective target width must be positive, got {width}"
            )));
        }

        let id = index_of_difficulty(distance, width);

        let a = rng
            .gaussian(self.params.a_mean, self.params.a_std)
            .max(COEFFICIENT_FLOOR * self.params.a_mean);
        let b = rng
            .gaussian(self.params.b_mean, self.params.b_std)
            .max(COEFFICIENT_FLOOR * self.params.b_mean);

        let mut duration = a + b * id;

        // Hard human ceiling: never faster than max_throughput allows.
        let floor = id / self.params.max_throughput;
        if duration < floor {
            duration = floor;
        }

        Ok(duration.clamp(MIN_DURATION_S, MAX_DURATION_S))
    }

    /// Throughput in bits per second for an observed movement.
    pub fn throughput(&self, distance: f64, width: f64, duration: f64) -> f64 {
        if duration <= 0.0 {
            return f64::INFINITY;
        }
        index_of_difficulty(distance, width) / duration
    }
}
