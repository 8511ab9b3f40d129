//! Band-Pass Filtering
//!
//! A 2nd-order Butterworth-style biquad band-pass run forward and
//! backward (zero phase), used to shape white noise into the 8-12 Hz
//! physiological tremor band. Implemented directly rather than through a
//! DSP dependency; the tremor peak only needs +/-0.5 Hz accuracy.

use crate::rng::MotorRng;

/// Sequences shorter than this return silence; the filter transient
/// would dominate them.
const MIN_FILTER_LEN: usize = 8;

/// Normalized biquad coefficients (`a0` divided out).
#[derive(Debug, Clone, Copy)]
pub struct Biquad {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

impl Biquad {
    /// Design a band-pass centered on `f0` with bandwidth `f_hi - f_lo`
    /// (audio-cookbook bilinear design, constant 0 dB peak gain).
    pub fn bandpass(sample_rate: f64, f_lo: f64, f_hi: f64) -> Self {
        let f0 = (f_lo * f_hi).sqrt();
        let bandwidth = (f_hi - f_lo).max(1e-3);
        let q = f0 / bandwidth;

        let w0 = std::f64::consts::TAU * f0 / sample_rate;
        let alpha = w0.sin() / (2.0 * q);
        let a0 = 1.0 + alpha;

        Self {
            b0: alpha / a0,
            b1: 0.0,
            b2: -alpha / a0,
            a1: -2.0 * w0.cos() / a0,
            a2: (1.0 - alpha) / a0,
        }
    }

    /// Run the filter over `input` in one direction (direct form I).
    fn run(&self, input: &[f64]) -> Vec<f64> {
        let mut output = Vec::with_capacity(input.len());
        let (mut x1, mut x2, mut y1, mut y2) = (0.0, 0.0, 0.0, 0.0);
        for &x in input {
            let y = self.b0 * x + self.b1 * x1 + self.b2 * x2 - self.a1 * y1 - self.a2 * y2;
            x2 = x1;
            x1 = x;
            y2 = y1;
            y1 = y;
            output.push(y);
        }
        output
    }

    /// Zero-phase filtering: forward pass, then a reversed pass.
    pub fn filtfilt(&self, input: &[f64]) -> Vec<f64> {
        let forward = self.run(input);
        let mut reversed: Vec<f64> = forward.into_iter().rev().collect();
        reversed = self.run(&reversed);
        reversed.reverse();
        reversed
    }
}

/// Root-mean-square of a sequence.
pub fn rms(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    (data.iter().map(|x| x * x).sum::<f64>() / data.len() as f64).sqrt()
}

/// Generate `n` samples of band-limited gaussian noise with the given RMS
/// amplitude, centered on `center_hz` with `+/- half_band_hz` width.
///
/// Sequences too short to filter meaningfully come back as zeros.
pub fn band_limited_noise(
    rng: &mut MotorRng,
    n: usize,
    sample_rate: f64,
    center_hz: f64,
    half_band_hz: f64,
    amplitude_rms: f64,
) -> Vec<f64> {
    if n < MIN_FILTER_LEN || amplitude_rms <= 0.0 {
        return vec![0.0; n];
    }

    let white: Vec<f64> = (0..n).map(|_| rng.gaussian(0.0, 1.0)).collect();

    let nyquist = sample_rate / 2.0;
    let f_lo = (center_hz - half_band_hz).max(0.5);
    let f_hi = (center_hz + half_band_hz).min(0.95 * nyquist);
    let filter = Biquad::bandpass(sample_rate, f_lo, f_hi);
    let mut shaped = filter.filtfilt(&white);

    let measured = rms(&shaped);
    if measured > 1e-12 {
        let gain = amplitude_rms / measured;
        for v in &mut shaped {
            *v *= gain;
        }
    }
    shaped
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Dominant frequency via zero-crossing rate, adequate for a
    /// narrow-band signal.
    fn dominant_freq_hz(data: &[f64], sample_rate: f64) -> f64 {
        let crossings = data
            .windows(2)
            .filter(|w| (w[0] >= 0.0) != (w[1] >= 0.0))
            .count();
        crossings as f64 * sample_rate / (2.0 * data.len() as f64)
    }

    #[test]
    fn test_rms_of_constant() {
        assert!((rms(&[2.0; 100]) - 2.0).abs() < 1e-12);
        assert_eq!(rms(&[]), 0.0);
    }

    #[test]
    fn test_band_noise_hits_target_rms() {
        let mut rng = MotorRng::new(Some(42));
        let noise = band_limited_noise(&mut rng, 1000, 100.0, 10.0, 1.0, 0.8);
        assert!((rms(&noise) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_band_noise_centered_on_tremor_band() {
        let mut rng = MotorRng::new(Some(7));
        let noise = band_limited_noise(&mut rng, 4000, 100.0, 10.0, 1.0, 1.0);
        let freq = dominant_freq_hz(&noise, 100.0);
        assert!(
            (8.0..=12.0).contains(&freq),
            "dominant frequency {freq} Hz outside tremor band"
        );
    }

    #[test]
    fn test_short_sequences_are_silent() {
        let mut rng = MotorRng::new(Some(3));
        let noise = band_limited_noise(&mut rng, 5, 100.0, 10.0, 1.0, 1.0);
        assert_eq!(noise, vec![0.0; 5]);
    }

    #[test]
    fn test_zero_amplitude_is_silent() {
        let mut rng = MotorRng::new(Some(3));
        let noise = band_limited_noise(&mut rng, 100, 100.0, 10.0, 1.0, 0.0);
        assert!(noise.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_filtfilt_attenuates_dc() {
        let filter = Biquad::bandpass(100.0, 9.0, 11.0);
        let dc = vec![1.0; 500];
        let out = filter.filtfilt(&dc);
        // steady-state tail should be strongly suppressed
        let tail_rms = rms(&out[300..]);
        assert!(tail_rms < 0.05, "DC leaked through: {tail_rms}");
    }

    #[test]
    fn test_filtfilt_passes_band_center() {
        let filter = Biquad::bandpass(100.0, 9.0, 11.0);
        let n = 1000;
        let tone: Vec<f64> = (0..n)
            .map(|i| (std::f64::consts::TAU * 10.0 * i as f64 / 100.0).sin())
            .collect();
        let out = filter.filtfilt(&tone);
        // interior of the output keeps most of the in-band energy
        let kept = rms(&out[200..800]) / rms(&tone[200..800]);
        assert!(kept > 0.7, "band center attenuated to {kept}");
    }

    #[test]
    fn test_filtfilt_rejects_out_of_band_tone() {
        let filter = Biquad::bandpass(100.0, 9.0, 11.0);
        let n = 1000;
        let tone: Vec<f64> = (0..n)
            .map(|i| (std::f64::consts::TAU * 2.0 * i as f64 / 100.0).sin())
            .collect();
        let out = filter.filtfilt(&tone);
        let kept = rms(&out[200..800]) / rms(&tone[200..800]);
        assert!(kept < 0.2, "2 Hz tone kept {kept} of its energy");
    }

    #[test]
    fn test_seeded_noise_reproducible() {
        let mut a = MotorRng::new(Some(1337));
        let mut b = MotorRng::new(Some(1337));
        let na = band_limited_noise(&mut a, 256, 100.0, 10.0, 1.0, 0.5);
        let nb = band_limited_noise(&mut b, 256, 100.0, 10.0, 1.0, 0.5);
        assert_eq!(na, nb);
    }
}
