//! Configuration Management
//!
//! A single validated value object covering every tunable of the synthesis
//! pipeline. All ranges are enforced at session construction; violations
//! surface as [`Error::InvalidConfig`](crate::Error::InvalidConfig).

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Main configuration for a motion session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Fitts' Law movement-time parameters
    pub fitts: FittsParams,
    /// Peak-velocity fraction alpha of the minimum-jerk profile
    pub velocity_asymmetry: f64,
    /// Signal-dependent noise and tremor parameters
    pub noise: NoiseParams,
    /// Path curvature parameters
    pub path: PathParams,
    /// Submovement decomposition parameters
    pub submovement: SubmovementParams,
    /// Click and dwell timing parameters
    pub click: ClickTiming,
    /// Sample dispatch cadence in Hz
    pub sample_rate_hz: f64,
    /// Optional PRNG seed; identical seeds and call sequences reproduce
    /// identical traces
    pub seed: Option<u64>,
}

/// Fitts' Law coefficients and bounds.
///
/// Movement time is `T = a + b * ID` with `a ~ N(a_mean, a_std)` and
/// `b ~ N(b_mean, b_std)`, lower-bounded so instantaneous throughput never
/// exceeds `max_throughput`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittsParams {
    /// Intercept mean (seconds)
    pub a_mean: f64,
    /// Intercept standard deviation (seconds)
    pub a_std: f64,
    /// Slope mean (seconds per bit)
    pub b_mean: f64,
    /// Slope standard deviation (seconds per bit)
    pub b_std: f64,
    /// Hard human throughput ceiling (bits per second)
    pub max_throughput: f64,
    /// Probability that a movement misses the target before re-approach
    pub nominal_error_rate: f64,
}

/// Signal-dependent noise and physiological tremor parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoiseParams {
    /// Fraction of the commanded inter-sample displacement lost to motor
    /// noise (unitless)
    pub k_signal: f64,
    /// Tremor center frequency (Hz)
    pub tremor_freq_hz: f64,
    /// Tremor amplitude, RMS pixels per axis after band-pass filtering
    pub tremor_amp_px: f64,
    /// Slow perpendicular drift along a leg, as a fraction of leg length
    pub wander: f64,
}

/// Path curvature parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathParams {
    /// Hard cap on the perpendicular deviation, as a fraction of leg length
    pub curvature: f64,
    /// Center of the per-leg deviation draw, as a fraction of leg length
    pub deviation: f64,
}

/// Submovement decomposition parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmovementParams {
    /// Fraction of the remaining distance covered by the primary ballistic leg
    pub primary_coverage: f64,
    /// Primary endpoint error, as a fraction of the remaining distance
    pub primary_error_std: f64,
    /// Maximum number of visually-guided correction legs
    pub max_corrections: u32,
}

/// Click and verification-dwell timing, log-normal in log-millisecond space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickTiming {
    /// Button hold duration, log-space mean
    pub duration_mu: f64,
    /// Button hold duration, log-space sigma
    pub duration_sigma: f64,
    /// Pre-click verification dwell, log-space mean
    pub dwell_mu: f64,
    /// Pre-click verification dwell, log-space sigma
    pub dwell_sigma: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            fitts: FittsParams::default(),
            velocity_asymmetry: 0.42,
            noise: NoiseParams::default(),
            path: PathParams::default(),
            submovement: SubmovementParams::default(),
            click: ClickTiming::default(),
            sample_rate_hz: 100.0,
            seed: None,
        }
    }
}

impl Default for FittsParams {
    fn default() -> Self {
        Self {
            a_mean: 0.300,
            a_std: 0.050,
            b_mean: 0.100,
            b_std: 0.010,
            max_throughput: 12.0,
            nominal_error_rate: 0.04,
        }
    }
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            k_signal: 0.03,
            tremor_freq_hz: 10.0,
            tremor_amp_px: 1.2,
            wander: 0.005,
        }
    }
}

impl Default for PathParams {
    fn default() -> Self {
        Self {
            curvature: 0.15,
            deviation: 0.06,
        }
    }
}

impl Default for SubmovementParams {
    fn default() -> Self {
        Self {
            primary_coverage: 0.95,
            primary_error_std: 0.08,
            max_corrections: 3,
        }
    }
}

impl Default for ClickTiming {
    fn default() -> Self {
        Self {
            duration_mu: 4.6,
            duration_sigma: 0.25,
            dwell_mu: 5.5,
            dwell_sigma: 0.3,
        }
    }
}

impl MotionConfig {
    /// Validate all fields against their admissible ranges.
    /// Returns Ok(()) if valid, or Err describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        self.fitts.validate()?;
        if !(0.30..=0.50).contains(&self.velocity_asymmetry) {
            return Err(Error::InvalidConfig(format!(
                "velocity_asymmetry must be in [0.30, 0.50], got {}",
                self.velocity_asymmetry
            )));
        }
        self.noise.validate()?;
        self.path.validate()?;
        self.submovement.validate()?;
        self.click.validate()?;
        if !(30.0..=1000.0).contains(&self.sample_rate_hz) {
            return Err(Error::InvalidConfig(format!(
                "sample_rate_hz must be in [30, 1000], got {}",
                self.sample_rate_hz
            )));
        }
        // Nyquist margin for the tremor band-pass
        if self.sample_rate_hz < 4.0 * self.noise.tremor_freq_hz {
            return Err(Error::InvalidConfig(format!(
                "sample_rate_hz must be at least 4x tremor_freq_hz ({} < 4 * {})",
                self.sample_rate_hz, self.noise.tremor_freq_hz
            )));
        }
        Ok(())
    }

    /// Nominal sample period in seconds.
    pub fn sample_period(&self) -> f64 {
        1.0 / self.sample_rate_hz
    }
}

impl FittsParams {
    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("fitts.a_mean", self.a_mean),
            ("fitts.a_std", self.a_std),
            ("fitts.b_mean", self.b_mean),
            ("fitts.b_std", self.b_std),
            ("fitts.max_throughput", self.max_throughput),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }
        if self.a_std >= self.a_mean {
            return Err(Error::InvalidConfig(format!(
                "fitts.a_std must be below fitts.a_mean ({} >= {})",
                self.a_std, self.a_mean
            )));
        }
        if self.b_std >= self.b_mean {
            return Err(Error::InvalidConfig(format!(
                "fitts.b_std must be below fitts.b_mean ({} >= {})",
                self.b_std, self.b_mean
            )));
        }
        if self.max_throughput > 20.0 {
            return Err(Error::InvalidConfig(format!(
                "fitts.max_throughput must not exceed 20 bits/s, got {}",
                self.max_throughput
            )));
        }
        if !(0.0..=1.0).contains(&self.nominal_error_rate) {
            return Err(Error::InvalidConfig(format!(
                "fitts.nominal_error_rate must be in [0, 1], got {}",
                self.nominal_error_rate
            )));
        }
        Ok(())
    }
}

impl NoiseParams {
    fn validate(&self) -> Result<()> {
        if !(0.0..=0.2).contains(&self.k_signal) {
            return Err(Error::InvalidConfig(format!(
                "noise.k_signal must be in [0, 0.2], got {}",
                self.k_signal
            )));
        }
        if !(8.0..=12.0).contains(&self.tremor_freq_hz) {
            return Err(Error::InvalidConfig(format!(
                "noise.tremor_freq_hz must be in [8, 12], got {}",
                self.tremor_freq_hz
            )));
        }
        if !(0.0..=5.0).contains(&self.tremor_amp_px) {
            return Err(Error::InvalidConfig(format!(
                "noise.tremor_amp_px must be in [0, 5], got {}",
                self.tremor_amp_px
            )));
        }
        if !(0.0..=0.02).contains(&self.wander) {
            return Err(Error::InvalidConfig(format!(
                "noise.wander must be in [0, 0.02], got {}",
                self.wander
            )));
        }
        Ok(())
    }
}

impl PathParams {
    fn validate(&self) -> Result<()> {
        if !(0.0..=0.3).contains(&self.curvature) {
            return Err(Error::InvalidConfig(format!(
                "path.curvature must be in [0, 0.3], got {}",
                self.curvature
            )));
        }
        if !self.deviation.is_finite() || self.deviation < 0.0 || self.deviation > self.curvature {
            return Err(Error::InvalidConfig(format!(
                "path.deviation must be in [0, curvature={}], got {}",
                self.curvature, self.deviation
            )));
        }
        Ok(())
    }
}

impl SubmovementParams {
    fn validate(&self) -> Result<()> {
        if !(0.5..=1.1).contains(&self.primary_coverage) {
            return Err(Error::InvalidConfig(format!(
                "submovement.primary_coverage must be in [0.5, 1.1], got {}",
                self.primary_coverage
            )));
        }
        if !self.primary_error_std.is_finite()
            || self.primary_error_std <= 0.0
            || self.primary_error_std > 0.3
        {
            return Err(Error::InvalidConfig(format!(
                "submovement.primary_error_std must be in (0, 0.3], got {}",
                self.primary_error_std
            )));
        }
        if self.max_corrections > 8 {
            return Err(Error::InvalidConfig(format!(
                "submovement.max_corrections must not exceed 8, got {}",
                self.max_corrections
            )));
        }
        Ok(())
    }
}

impl ClickTiming {
    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("click.duration_mu", self.duration_mu),
            ("click.dwell_mu", self.dwell_mu),
        ] {
            if !value.is_finite() || !(1.0..=8.0).contains(&value) {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be in [1, 8] (log-milliseconds), got {value}"
                )));
            }
        }
        for (name, value) in [
            ("click.duration_sigma", self.duration_sigma),
            ("click.dwell_sigma", self.dwell_sigma),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be in [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}
