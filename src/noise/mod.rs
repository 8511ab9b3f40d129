//! Neuromotor Noise Injection
//!
//! Three noise sources are layered onto a sampled leg:
//!
//! - **Signal-dependent noise**: gaussian position noise whose standard
//!   deviation is `k_signal` times the commanded inter-sample
//!   displacement, so fast motion jitters more than slow motion and rest
//!   samples carry none.
//! - **Micro-wander**: a slow perpendicular drift along the leg, white
//!   noise smoothed with a short box filter and scaled to a fraction of
//!   the leg length. This is the low-frequency texture that keeps real
//!   paths from being geometrically perfect.
//! - **Physiological tremor**: band-limited gaussian noise in the 8-12 Hz
//!   band, scaled to a target RMS amplitude after filtering, independent
//!   per axis. Tremor amplitude scales with the movement amplitude up to
//!   [`TREMOR_FULL_SCALE_PX`]; small precise movements carry
//!   proportionally less. Unlike the motion-coupled sources, tremor is
//!   applied once across the stitched trace so the oscillation keeps
//!   phase across submovement boundaries.
//!
//! Endpoints are snapped back to their nominal positions after injection
//! so submovement endpoint contracts survive.

pub mod bandpass;

pub use bandpass::{band_limited_noise, Biquad};

use crate::config::NoiseParams;
use crate::rng::MotorRng;
use crate::trace::{Point, Sample};

/// Tremor band half-width around the center frequency.
const TREMOR_HALF_BAND_HZ: f64 = 1.0;

/// Movement amplitude at which tremor reaches its configured RMS.
pub const TREMOR_FULL_SCALE_PX: f64 = 300.0;

/// Box-filter width for the micro-wander sequence.
const WANDER_SMOOTHING: usize = 5;

/// Legs shorter than this get no wander (no meaningful chord normal).
const MIN_WANDER_DISTANCE_PX: f64 = 1.0;

/// Adds signal-dependent noise, micro-wander, and tremor to sampled legs.
#[derive(Debug, Clone)]
pub struct NoiseInjector {
    params: NoiseParams,
    sample_rate: f64,
}

impl NoiseInjector {
    pub fn new(params: NoiseParams, sample_rate: f64) -> Self {
        Self {
            params,
            sample_rate,
        }
    }

    /// Perturb one leg in place with the motion-coupled noise sources
    /// (signal-dependent noise and micro-wander), preserving length and
    /// timestamps.
    ///
    /// `nominal_start` and `nominal_end` are the leg's contracted
    /// endpoints; the first and last samples are snapped onto them after
    /// noise is added. Tremor is not applied here: it runs once over the
    /// stitched trace (see [`inject_tremor`](Self::inject_tremor)) so the
    /// oscillation keeps phase across leg boundaries.
    pub fn inject_leg(
        &self,
        rng: &mut MotorRng,
        samples: &mut [Sample],
        nominal_start: Point,
        nominal_end: Point,
    ) {
        let n = samples.len();
        if n == 0 {
            return;
        }

        // Commanded inter-sample displacements, before any noise.
        let steps: Vec<f64> = (0..n)
            .map(|i| {
                if i == 0 {
                    if n > 1 {
                        samples[0].point().distance_to(samples[1].point())
                    } else {
                        0.0
                    }
                } else {
                    samples[i - 1].point().distance_to(samples[i].point())
                }
            })
            .collect();

        if self.params.k_signal > 0.0 {
            for (sample, step) in samples.iter_mut().zip(&steps) {
                let sigma = self.params.k_signal * step;
                sample.x += rng.gaussian(0.0, sigma);
                sample.y += rng.gaussian(0.0, sigma);
            }
        }

        self.apply_wander(rng, samples, nominal_start, nominal_end);

        samples[0].x = nominal_start.x;
        samples[0].y = nominal_start.y;
        samples[n - 1].x = nominal_end.x;
        samples[n - 1].y = nominal_end.y;
    }

    /// Add band-passed tremor across a whole stitched trace, then snap
    /// the trace endpoints back onto their anchors.
    ///
    /// `tremor_scale` in `[0, 1]` attenuates the amplitude for small
    /// movements (the composer derives it from the macro-movement
    /// amplitude).
    pub fn inject_tremor(
        &self,
        rng: &mut MotorRng,
        samples: &mut [Sample],
        anchor_start: Point,
        anchor_end: Point,
        tremor_scale: f64,
    ) {
        let n = samples.len();
        if n == 0 {
            return;
        }

        let tremor_rms = self.params.tremor_amp_px * tremor_scale.clamp(0.0, 1.0);
        if tremor_rms > 0.0 {
            let tremor_x = band_limited_noise(
                rng,
                n,
                self.sample_rate,
                self.params.tremor_freq_hz,
                TREMOR_HALF_BAND_HZ,
                tremor_rms,
            );
            let tremor_y = band_limited_noise(
                rng,
                n,
                self.sample_rate,
                self.params.tremor_freq_hz,
                TREMOR_HALF_BAND_HZ,
                tremor_rms,
            );
            for ((sample, tx), ty) in samples.iter_mut().zip(&tremor_x).zip(&tremor_y) {
                sample.x += tx;
                sample.y += ty;
            }
        }

        samples[0].x = anchor_start.x;
        samples[0].y = anchor_start.y;
        samples[n - 1].x = anchor_end.x;
        samples[n - 1].y = anchor_end.y;
    }

    /// Slow drift perpendicular to the leg chord: smoothed white noise
    /// with sigma proportional to the leg length.
    fn apply_wander(
        &self,
        rng: &mut MotorRng,
        samples: &mut [Sample],
        nominal_start: Point,
        nominal_end: Point,
    ) {
        let distance = nominal_start.distance_to(nominal_end);
        if self.params.wander <= 0.0 || distance < MIN_WANDER_DISTANCE_PX || samples.len() < 4 {
            return;
        }
        let (nx, ny) = (
            -(nominal_end.y - nominal_start.y) / distance,
            (nominal_end.x - nominal_start.x) / distance,
        );

        let sigma = self.params.wander * distance;
        let raw: Vec<f64> = (0..samples.len()).map(|_| rng.gaussian(0.0, sigma)).collect();

        let half = WANDER_SMOOTHING / 2;
        for (i, sample) in samples.iter_mut().enumerate() {
            let lo = i.saturating_sub(half);
            let hi = (i + half + 1).min(raw.len());
            let drift = raw[lo..hi].iter().sum::<f64>() / (hi - lo) as f64;
            sample.x += drift * nx;
            sample.y += drift * ny;
        }
    }
}
