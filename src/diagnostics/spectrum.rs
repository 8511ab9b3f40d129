//! Power-Spectrum Helpers
//!
//! Thin wrappers over `rustfft` for the diagnostics tremor check: a
//! one-sided power spectrum and mean band power.

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// One-sided power spectrum of a real sequence.
///
/// Returns `(frequency_hz, power)` pairs for bins from DC up to the
/// Nyquist frequency.
pub fn power_spectrum(data: &[f64], sample_rate: f64) -> Vec<(f64, f64)> {
    let n = data.len();
    if n < 2 {
        return Vec::new();
    }

    let mut buffer: Vec<Complex<f64>> = data.iter().map(|&x| Complex::new(x, 0.0)).collect();
    let mut planner = FftPlanner::new();
    planner.plan_fft_forward(n).process(&mut buffer);

    let scale = 1.0 / (n as f64 * n as f64);
    let bin_hz = sample_rate / n as f64;
    buffer
        .iter()
        .take(n / 2 + 1)
        .enumerate()
        .map(|(i, c)| (i as f64 * bin_hz, c.norm_sqr() * scale))
        .collect()
}

/// Mean power over bins with frequency in `[lo_hz, hi_hz)`.
///
/// Returns 0 when no bin falls in the band.
pub fn band_power(spectrum: &[(f64, f64)], lo_hz: f64, hi_hz: f64) -> f64 {
    let mut total = 0.0;
    let mut count = 0usize;
    for &(freq, power) in spectrum {
        if freq >= lo_hz && freq < hi_hz {
            total += power;
            count += 1;
        }
    }
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

/// Frequency of the strongest bin in `[lo_hz, hi_hz)`, if any.
pub fn peak_frequency(spectrum: &[(f64, f64)], lo_hz: f64, hi_hz: f64) -> Option<f64> {
    spectrum
        .iter()
        .filter(|(freq, _)| *freq >= lo_hz && *freq < hi_hz)
        .max_by(|a, b| a.1.partial_cmp(&b.1).expect("finite powers"))
        .map(|&(freq, _)| freq)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(freq: f64, sample_rate: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| (std::f64::consts::TAU * freq * i as f64 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn test_tone_peak_located() {
        let data = tone(10.0, 100.0, 400);
        let spectrum = power_spectrum(&data, 100.0);
        let peak = peak_frequency(&spectrum, 1.0, 50.0).unwrap();
        assert!((peak - 10.0).abs() < 0.5, "peak at {peak} Hz");
    }

    #[test]
    fn test_band_power_separates_tones() {
        let data: Vec<f64> = tone(10.0, 100.0, 800)
            .iter()
            .zip(tone(3.0, 100.0, 800))
            .map(|(a, b)| a + 0.2 * b)
            .collect();
        let spectrum = power_spectrum(&data, 100.0);
        let tremor_band = band_power(&spectrum, 8.0, 12.0);
        let low_band = band_power(&spectrum, 4.0, 8.0);
        assert!(tremor_band > low_band * 5.0);
    }

    #[test]
    fn test_empty_band_is_zero() {
        let spectrum = power_spectrum(&tone(10.0, 100.0, 128), 100.0);
        assert_eq!(band_power(&spectrum, 60.0, 70.0), 0.0);
        assert!(peak_frequency(&spectrum, 60.0, 70.0).is_none());
    }

    #[test]
    fn test_short_sequences() {
        assert!(power_spectrum(&[], 100.0).is_empty());
        assert!(power_spectrum(&[1.0], 100.0).is_empty());
    }

    #[test]
    fn test_dc_lands_in_zero_bin() {
        let spectrum = power_spectrum(&[5.0; 256], 100.0);
        assert!(spectrum[0].1 > 1.0);
        let rest: f64 = spectrum[1..].iter().map(|&(_, p)| p).sum();
        assert!(rest < 1e-9);
    }
}
