//! Asymmetric Minimum-Jerk Profile
//!
//! The base curve is the 5th-order minimum-jerk polynomial
//! `s0(tau) = 10 tau^3 - 15 tau^4 + 6 tau^5`, whose velocity peaks at the
//! midpoint. Human point-to-point movements peak earlier (38-45% of the
//! movement), so the profile is built from two time-scaled halves of the
//! base velocity lobe: the rising half compressed into `[0, alpha]`, the
//! falling half stretched over `[alpha, 1]`. Both halves meet at the full
//! lobe peak with zero slope, so the velocity is C1 at the knot and its
//! global maximum sits exactly on `alpha` for any `alpha` in
//! `[0.30, 0.50]`. Equivalently this is a monotone time warp
//! `tau = warp(u, alpha)` applied to the base curve, expressed through
//! the velocity domain where the peak-placement guarantee is direct.

/// A sampled normalized profile over one movement leg.
#[derive(Debug, Clone)]
pub struct JerkProfile {
    /// Sample times in seconds, `[0, duration]` inclusive
    pub times: Vec<f64>,
    /// Normalized progress in `[0, 1]`
    pub progress: Vec<f64>,
    /// Progress per second, non-negative
    pub velocity: Vec<f64>,
}

impl JerkProfile {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

/// Base minimum-jerk position polynomial.
fn jerk_position(tau: f64) -> f64 {
    let t3 = tau * tau * tau;
    10.0 * t3 - 15.0 * t3 * tau + 6.0 * t3 * tau * tau
}

/// Base minimum-jerk velocity polynomial, `d s0 / d tau`.
fn jerk_velocity(tau: f64) -> f64 {
    let t2 = tau * tau;
    30.0 * t2 - 60.0 * t2 * tau + 30.0 * t2 * t2
}

/// Normalized progress and velocity at normalized time `u`, with the
/// velocity peak at `alpha`.
///
/// Rising half: `tau = u / (2 alpha)`, `s = 2 alpha * s0(tau)`.
/// Falling half: `tau = 0.5 + (u - alpha) / (2 (1 - alpha))`,
/// `s = alpha + 2 (1 - alpha) (s0(tau) - 0.5)`.
/// In both, `ds/du = s0'(tau)`, so the velocity curve is the base lobe
/// traversed at two rates that agree at the peak.
fn eval(u: f64, alpha: f64) -> (f64, f64) {
    let u = u.clamp(0.0, 1.0);
    if u <= alpha {
        let tau = 0.5 * u / alpha;
        (2.0 * alpha * jerk_position(tau), jerk_velocity(tau))
    } else {
        let tau = 0.5 + 0.5 * (u - alpha) / (1.0 - alpha);
        (
            alpha + 2.0 * (1.0 - alpha) * (jerk_position(tau) - 0.5),
            jerk_velocity(tau),
        )
    }
}

/// Generate an asymmetric normalized profile over `[0, duration]`.
///
/// Samples are uniform at `sample_rate` Hz with inclusive endpoints;
/// `progress` starts at exactly 0 and ends at exactly 1, and the velocity
/// argmax lies within one sample of `asymmetry * duration`.
pub fn profile(duration: f64, sample_rate: f64, asymmetry: f64) -> JerkProfile {
    debug_assert!((0.30..=0.50).contains(&asymmetry), "asymmetry out of range");
    let duration = duration.max(1e-3);

    let n = ((duration * sample_rate).round() as usize).max(2);
    let mut times = Vec::with_capacity(n);
    let mut progress = Vec::with_capacity(n);
    let mut velocity = Vec::with_capacity(n);

    for i in 0..n {
        let u = i as f64 / (n - 1) as f64;
        let (s, ds_du) = eval(u, asymmetry);
        times.push(duration * u);
        progress.push(s.clamp(0.0, 1.0));
        velocity.push((ds_du / duration).max(0.0));
    }

    // Remove floating drift at the endpoints.
    progress[0] = 0.0;
    *progress.last_mut().expect("n >= 2") = 1.0;
    times[0] = 0.0;
    *times.last_mut().expect("n >= 2") = duration;

    JerkProfile {
        times,
        progress,
        velocity,
    }
}
