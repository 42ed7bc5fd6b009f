use crate::error::{AudioModemError, Result};
use crate::{
    AMPLITUDE, BAND_HIGH, BAND_LOW, FILTER_ORDER, FREQ_HIGH, FREQ_LOW, SAMPLE_RATE,
    SMOOTHING_WINDOW, SYMBOL_DURATION_MS, TOLERANCE,
};

/// CRC-16-CCITT, used to fingerprint a parameter set
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc: u32 = 0xFFFF;
    for &byte in data {
        crc ^= (byte as u32) << 8;
        for _ in 0..8 {
            crc <<= 1;
            if crc & 0x10000 != 0 {
                crc ^= 0x1021;
            }
        }
    }
    (crc & 0xFFFF) as u16
}

/// Carrier, timing and conditioning parameters shared by both ends of the link.
///
/// The modulator and demodulator must be built from identical values, otherwise
/// frame alignment and classification are undefined. Compare [`fingerprint`]
/// values to detect a mismatch instead of relying on shared defaults.
///
/// [`fingerprint`]: CodecConfig::fingerprint
#[derive(Debug, Clone, PartialEq)]
pub struct CodecConfig {
    /// Samples per second of the channel
    pub sample_rate: u32,
    /// Duration of one bit (one frame) in milliseconds
    pub symbol_duration_ms: u32,
    /// Carrier for bit 0 (Hz)
    pub freq_low: f32,
    /// Carrier for bit 1 (Hz)
    pub freq_high: f32,
    /// Half-width of each classification window (Hz)
    pub tolerance: f32,
    /// Lower band-pass cutoff (Hz)
    pub band_low: f32,
    /// Upper band-pass cutoff (Hz)
    pub band_high: f32,
    /// Butterworth order applied at each band edge (must be even)
    pub filter_order: usize,
    /// Moving-average length in samples
    pub smoothing_window: usize,
    /// Peak sample value written by the modulator
    pub amplitude: f32,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            sample_rate: SAMPLE_RATE,
            symbol_duration_ms: SYMBOL_DURATION_MS,
            freq_low: FREQ_LOW,
            freq_high: FREQ_HIGH,
            tolerance: TOLERANCE,
            band_low: BAND_LOW,
            band_high: BAND_HIGH,
            filter_order: FILTER_ORDER,
            smoothing_window: SMOOTHING_WINDOW,
            amplitude: AMPLITUDE,
        }
    }
}

impl CodecConfig {
    /// Number of samples making up one frame (one bit)
    pub fn samples_per_frame(&self) -> usize {
        (self.sample_rate as u64 * self.symbol_duration_ms as u64 / 1000) as usize
    }

    pub fn nyquist(&self) -> f32 {
        self.sample_rate as f32 / 2.0
    }

    /// Check that the parameter set describes a decodable link
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(invalid("sample_rate must be positive"));
        }
        if self.samples_per_frame() == 0 {
            return Err(invalid(format!(
                "symbol duration of {} ms yields no samples at {} Hz",
                self.symbol_duration_ms, self.sample_rate
            )));
        }
        if !(self.freq_low > 0.0 && self.freq_high > self.freq_low) {
            return Err(invalid(format!(
                "carriers must satisfy 0 < freq_low < freq_high (got {} / {})",
                self.freq_low, self.freq_high
            )));
        }
        if !(self.tolerance >= 0.0) {
            return Err(invalid("tolerance must not be negative"));
        }
        if self.freq_high - self.freq_low <= 2.0 * self.tolerance {
            return Err(invalid(format!(
                "carrier separation {} Hz must exceed twice the tolerance ({} Hz)",
                self.freq_high - self.freq_low,
                self.tolerance
            )));
        }
        if !(self.band_low > 0.0 && self.band_low < self.freq_low) {
            return Err(invalid(format!(
                "band_low {} Hz must lie between 0 and freq_low {} Hz",
                self.band_low, self.freq_low
            )));
        }
        if self.band_high <= self.freq_high || self.band_high >= self.nyquist() {
            return Err(invalid(format!(
                "band_high {} Hz must lie between freq_high {} Hz and Nyquist {} Hz",
                self.band_high,
                self.freq_high,
                self.nyquist()
            )));
        }
        if self.filter_order == 0 || self.filter_order % 2 != 0 {
            return Err(invalid(format!(
                "filter_order must be a positive even number (got {})",
                self.filter_order
            )));
        }
        if self.smoothing_window == 0 {
            return Err(invalid("smoothing_window must be at least 1"));
        }
        if !(self.amplitude > 0.0 && self.amplitude <= i16::MAX as f32) {
            return Err(invalid(format!(
                "amplitude must be in (0, {}] (got {})",
                i16::MAX,
                self.amplitude
            )));
        }
        Ok(())
    }

    /// Canonical big-endian serialization of every parameter
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(48);
        out.extend_from_slice(&self.sample_rate.to_be_bytes());
        out.extend_from_slice(&self.symbol_duration_ms.to_be_bytes());
        out.extend_from_slice(&self.freq_low.to_bits().to_be_bytes());
        out.extend_from_slice(&self.freq_high.to_bits().to_be_bytes());
        out.extend_from_slice(&self.tolerance.to_bits().to_be_bytes());
        out.extend_from_slice(&self.band_low.to_bits().to_be_bytes());
        out.extend_from_slice(&self.band_high.to_bits().to_be_bytes());
        out.extend_from_slice(&(self.filter_order as u32).to_be_bytes());
        out.extend_from_slice(&(self.smoothing_window as u32).to_be_bytes());
        out.extend_from_slice(&self.amplitude.to_bits().to_be_bytes());
        out
    }

    /// 16-bit checksum over all parameters, for explicit exchange between ends
    pub fn fingerprint(&self) -> u16 {
        crc16(&self.to_bytes())
    }

    /// Fail with `ConfigMismatch` unless `other` carries the same fingerprint
    pub fn ensure_fingerprint(&self, other: u16) -> Result<()> {
        let ours = self.fingerprint();
        if ours != other {
            return Err(AudioModemError::ConfigMismatch {
                expected: format!("fingerprint {:04x}", other),
                found: format!("fingerprint {:04x}", ours),
            });
        }
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> AudioModemError {
    AudioModemError::InvalidConfig(msg.into())
}
