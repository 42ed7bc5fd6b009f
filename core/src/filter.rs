//! Signal conditioning applied to a received stream before framing
//!
//! The chain is: peak normalization, a zero-phase Butterworth band-pass
//! (cascaded biquads run forward then backward), and a centred moving average.
//! None of the stages shifts samples in time, so frame boundaries computed on
//! the raw stream stay valid on the conditioned one.

use std::f64::consts::PI;

use crate::config::CodecConfig;

/// Biquad filter coefficients, a0 normalized to 1
///
/// H(z) = (b0 + b1*z^-1 + b2*z^-2) / (1 + a1*z^-1 + a2*z^-2)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BiquadCoeffs {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl BiquadCoeffs {
    /// Second-order low-pass section with cutoff `fc` and quality factor `q`
    pub fn lowpass(fc: f64, fs: f64, q: f64) -> Self {
        let omega = 2.0 * PI * fc / fs;
        let sin_omega = omega.sin();
        let cos_omega = omega.cos();
        let alpha = sin_omega / (2.0 * q);

        let b0 = (1.0 - cos_omega) / 2.0;
        let b1 = 1.0 - cos_omega;
        let b2 = (1.0 - cos_omega) / 2.0;
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_omega;
        let a2 = 1.0 - alpha;

        Self::normalize(b0, b1, b2, a0, a1, a2)
    }

    /// Second-order high-pass section with cutoff `fc` and quality factor `q`
    pub fn highpass(fc: f64, fs: f64, q: f64) -> Self {
        let omega = 2.0 * PI * fc / fs;
        let sin_omega = omega.sin();
        let cos_omega = omega.cos();
        let alpha = sin_omega / (2.0 * q);

        let b0 = (1.0 + cos_omega) / 2.0;
        let b1 = -(1.0 + cos_omega);
        let b2 = (1.0 + cos_omega) / 2.0;
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_omega;
        let a2 = 1.0 - alpha;

        Self::normalize(b0, b1, b2, a0, a1, a2)
    }

    fn normalize(b0: f64, b1: f64, b2: f64, a0: f64, a1: f64, a2: f64) -> Self {
        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        }
    }

    /// Magnitude response at `freq`
    pub fn magnitude_at(&self, freq: f64, fs: f64) -> f64 {
        let omega = 2.0 * PI * freq / fs;
        let (s1, c1) = omega.sin_cos();
        let (s2, c2) = (2.0 * omega).sin_cos();

        let num_re = self.b0 + self.b1 * c1 + self.b2 * c2;
        let num_im = -(self.b1 * s1 + self.b2 * s2);
        let den_re = 1.0 + self.a1 * c1 + self.a2 * c2;
        let den_im = -(self.a1 * s1 + self.a2 * s2);

        ((num_re * num_re + num_im * num_im) / (den_re * den_re + den_im * den_im)).sqrt()
    }
}

/// Quality factors of the second-order sections of an even-order Butterworth filter
pub fn butterworth_q(order: usize) -> Vec<f64> {
    (0..order / 2)
        .map(|k| {
            let theta = (2 * k + 1) as f64 * PI / (2 * order) as f64;
            1.0 / (2.0 * theta.cos())
        })
        .collect()
}

/// Direct Form II Transposed biquad state
#[derive(Clone, Copy, Debug)]
struct Biquad {
    coeffs: BiquadCoeffs,
    z1: f64,
    z2: f64,
}

impl Biquad {
    fn new(coeffs: BiquadCoeffs) -> Self {
        Self {
            coeffs,
            z1: 0.0,
            z2: 0.0,
        }
    }

    fn process(&mut self, input: f64) -> f64 {
        let output = self.coeffs.b0 * input + self.z1;
        self.z1 = self.coeffs.b1 * input - self.coeffs.a1 * output + self.z2;
        self.z2 = self.coeffs.b2 * input - self.coeffs.a2 * output;
        output
    }
}

/// Butterworth band-pass built from high-pass and low-pass sections
#[derive(Debug, Clone)]
pub struct BandPass {
    sections: Vec<BiquadCoeffs>,
    sample_rate: f64,
    edge_padding: usize,
}

impl BandPass {
    pub fn new(low: f64, high: f64, order: usize, sample_rate: f64) -> Self {
        let qs = butterworth_q(order);
        let mut sections = Vec::with_capacity(qs.len() * 2);
        for &q in &qs {
            sections.push(BiquadCoeffs::highpass(low, sample_rate, q));
        }
        for &q in &qs {
            sections.push(BiquadCoeffs::lowpass(high, sample_rate, q));
        }

        // A few periods of the lowest passband frequency lets the start-up
        // transient die out inside the padding.
        let edge_padding = (3.0 * sample_rate / low).ceil() as usize;

        Self {
            sections,
            sample_rate,
            edge_padding,
        }
    }

    pub fn from_config(config: &CodecConfig) -> Self {
        Self::new(
            config.band_low as f64,
            config.band_high as f64,
            config.filter_order,
            config.sample_rate as f64,
        )
    }

    /// Single-pass magnitude response of the cascade at `freq`
    pub fn magnitude_at(&self, freq: f64) -> f64 {
        self.sections
            .iter()
            .map(|s| s.magnitude_at(freq, self.sample_rate))
            .product()
    }

    fn run_cascade(&self, samples: &mut [f64]) {
        for &coeffs in &self.sections {
            let mut biquad = Biquad::new(coeffs);
            for sample in samples.iter_mut() {
                *sample = biquad.process(*sample);
            }
        }
    }

    /// Filter forward then backward so the overall phase response is zero
    ///
    /// The input is extended at both ends by odd reflection before filtering
    /// and the extension is cut away afterwards. The output has the same length
    /// as the input and the squared magnitude response of the cascade.
    pub fn filtfilt(&self, samples: &[f64]) -> Vec<f64> {
        let n = samples.len();
        if n == 0 {
            return Vec::new();
        }

        let pad = self.edge_padding.min(n - 1);
        let mut extended = Vec::with_capacity(n + 2 * pad);
        let first = samples[0];
        let last = samples[n - 1];
        for i in (1..=pad).rev() {
            extended.push(2.0 * first - samples[i]);
        }
        extended.extend_from_slice(samples);
        for i in 1..=pad {
            extended.push(2.0 * last - samples[n - 1 - i]);
        }

        self.run_cascade(&mut extended);
        extended.reverse();
        self.run_cascade(&mut extended);
        extended.reverse();

        extended[pad..pad + n].to_vec()
    }
}

/// Rescale so the largest magnitude maps to full 16-bit scale
///
/// Values are truncated to integers as they would be when stored as 16-bit
/// samples. A silent stream passes through unchanged.
pub fn normalize(samples: &[i16]) -> Vec<f64> {
    let max_abs = samples
        .iter()
        .map(|&s| (s as i32).abs())
        .max()
        .unwrap_or(0);

    if max_abs == 0 {
        return samples.iter().map(|&s| s as f64).collect();
    }

    let full_scale = i16::MAX as f64;
    let max_abs = max_abs as f64;
    samples
        .iter()
        .map(|&s| (s as f64 * full_scale / max_abs).trunc())
        .collect()
}

/// Centred moving average with zero padding at both ends
///
/// Output sample `i` averages the window whose centre is `i`; for even
/// windows the extra sample is taken from before `i`.
pub fn moving_average(samples: &[f64], window: usize) -> Vec<f64> {
    let n = samples.len();
    if window <= 1 || n == 0 {
        return samples.to_vec();
    }

    let mut prefix = Vec::with_capacity(n + 1);
    prefix.push(0.0);
    let mut acc = 0.0;
    for &s in samples {
        acc += s;
        prefix.push(acc);
    }

    let ahead = (window - 1) / 2;
    let behind = window - 1 - ahead;
    let scale = 1.0 / window as f64;

    (0..n)
        .map(|i| {
            let start = i.saturating_sub(behind);
            let end = (i + ahead + 1).min(n);
            (prefix[end] - prefix[start]) * scale
        })
        .collect()
}

/// Normalize, band-pass and smooth a received stream
#[derive(Debug, Clone)]
pub struct SignalConditioner {
    band_pass: BandPass,
    smoothing_window: usize,
}

impl SignalConditioner {
    pub fn new(config: &CodecConfig) -> Self {
        Self {
            band_pass: BandPass::from_config(config),
            smoothing_window: config.smoothing_window,
        }
    }

    pub fn band_pass(&self) -> &BandPass {
        &self.band_pass
    }

    pub fn condition(&self, samples: &[i16]) -> Vec<f64> {
        let normalized = normalize(samples);
        let filtered = self.band_pass.filtfilt(&normalized);
        moving_average(&filtered, self.smoothing_window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FS: f64 = 44100.0;

    fn tone(freq: f64, len: usize, amplitude: f64) -> Vec<f64> {
        (0..len)
            .map(|i| amplitude * (2.0 * PI * freq * i as f64 / FS).sin())
            .collect()
    }

    fn rms(samples: &[f64]) -> f64 {
        (samples.iter().map(|s| s * s).sum::<f64>() / samples.len() as f64).sqrt()
    }

    #[test]
    fn test_butterworth_q_values() {
        let q2 = butterworth_q(2);
        assert_eq!(q2.len(), 1);
        assert!((q2[0] - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-9);

        let q4 = butterworth_q(4);
        assert!((q4[0] - 0.5412).abs() < 1e-3);
        assert!((q4[1] - 1.3066).abs() < 1e-3);
    }

    #[test]
    fn test_biquad_cutoff_is_minus_3db() {
        let lp = BiquadCoeffs::lowpass(1000.0, FS, std::f64::consts::FRAC_1_SQRT_2);
        let hp = BiquadCoeffs::highpass(1000.0, FS, std::f64::consts::FRAC_1_SQRT_2);
        assert!((lp.magnitude_at(1000.0, FS) - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-3);
        assert!((hp.magnitude_at(1000.0, FS) - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-3);
        assert!((lp.magnitude_at(10.0, FS) - 1.0).abs() < 1e-3);
        assert!(hp.magnitude_at(10.0, FS) < 1e-3);
    }

    #[test]
    fn test_band_pass_response() {
        let bp = BandPass::new(400.0, 1100.0, 4, FS);
        assert!(bp.magnitude_at(700.0) > 0.95);
        assert!(bp.magnitude_at(100.0) < 0.01);
        assert!(bp.magnitude_at(5000.0) < 0.01);
    }

    #[test]
    fn test_filtfilt_preserves_length_and_phase() {
        let bp = BandPass::new(400.0, 1100.0, 4, FS);
        let input = tone(700.0, 8820, 1000.0);
        let output = bp.filtfilt(&input);
        assert_eq!(output.len(), input.len());

        // In the interior the output must be an in-phase scaled copy
        let mid = &input[2000..6000];
        let out = &output[2000..6000];
        let dot: f64 = mid.iter().zip(out).map(|(a, b)| a * b).sum();
        let norm = (mid.iter().map(|a| a * a).sum::<f64>() * out.iter().map(|b| b * b).sum::<f64>()).sqrt();
        assert!(dot / norm > 0.99, "correlation {}", dot / norm);
    }

    #[test]
    fn test_filtfilt_rejects_out_of_band() {
        let bp = BandPass::new(400.0, 1100.0, 4, FS);
        let input = tone(5000.0, 8820, 1000.0);
        let output = bp.filtfilt(&input);
        let ratio = rms(&output[2000..6000]) / rms(&input[2000..6000]);
        assert!(ratio < 0.01, "ratio {}", ratio);
    }

    #[test]
    fn test_filtfilt_short_inputs() {
        let bp = BandPass::new(400.0, 1100.0, 4, FS);
        assert!(bp.filtfilt(&[]).is_empty());
        assert_eq!(bp.filtfilt(&[3.0]).len(), 1);
        assert_eq!(bp.filtfilt(&[1.0, -1.0, 0.5]).len(), 3);
    }

    #[test]
    fn test_normalize_scales_to_full_range() {
        let out = normalize(&[100, -200, 50]);
        assert_eq!(out, vec![16383.0, -32767.0, 8191.0]);
    }

    #[test]
    fn test_normalize_silence_passes_through() {
        assert_eq!(normalize(&[0, 0, 0]), vec![0.0, 0.0, 0.0]);
        assert!(normalize(&[]).is_empty());
    }

    #[test]
    fn test_normalize_handles_min_value() {
        let out = normalize(&[i16::MIN, 0]);
        assert_eq!(out[0], -32767.0);
    }

    #[test]
    fn test_moving_average_centred() {
        let input = [0.0, 0.0, 5.0, 0.0, 0.0, 0.0, 0.0];
        let out = moving_average(&input, 5);
        assert_eq!(out.len(), input.len());
        // The impulse spreads symmetrically over indices 0..=4
        for (i, &v) in out.iter().enumerate() {
            let expected = if i <= 4 { 1.0 } else { 0.0 };
            assert!((v - expected).abs() < 1e-12, "index {} = {}", i, v);
        }
    }

    #[test]
    fn test_moving_average_edges_zero_padded() {
        let out = moving_average(&[5.0; 6], 5);
        assert!((out[0] - 3.0).abs() < 1e-12);
        assert!((out[2] - 5.0).abs() < 1e-12);
        assert!((out[5] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_moving_average_window_one_is_identity() {
        let input = [1.0, 2.0, 3.0];
        assert_eq!(moving_average(&input, 1), input.to_vec());
    }
}
