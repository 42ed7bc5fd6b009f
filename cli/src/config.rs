use std::path::{Path, PathBuf};

use clap::Args;
use serde::{Deserialize, Serialize};
use tonecast_core::{AudioModemError, CodecConfig};

/// Codec parameters as stored in a JSON config file
///
/// Missing fields take the built-in defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub sample_rate: u32,
    pub symbol_duration_ms: u32,
    pub freq_low: f32,
    pub freq_high: f32,
    pub tolerance: f32,
    pub band_low: f32,
    pub band_high: f32,
    pub filter_order: usize,
    pub smoothing_window: usize,
    pub amplitude: f32,
}

impl Default for ConfigFile {
    fn default() -> Self {
        (&CodecConfig::default()).into()
    }
}

impl From<&CodecConfig> for ConfigFile {
    fn from(c: &CodecConfig) -> Self {
        Self {
            sample_rate: c.sample_rate,
            symbol_duration_ms: c.symbol_duration_ms,
            freq_low: c.freq_low,
            freq_high: c.freq_high,
            tolerance: c.tolerance,
            band_low: c.band_low,
            band_high: c.band_high,
            filter_order: c.filter_order,
            smoothing_window: c.smoothing_window,
            amplitude: c.amplitude,
        }
    }
}

impl From<ConfigFile> for CodecConfig {
    fn from(f: ConfigFile) -> Self {
        Self {
            sample_rate: f.sample_rate,
            symbol_duration_ms: f.symbol_duration_ms,
            freq_low: f.freq_low,
            freq_high: f.freq_high,
            tolerance: f.tolerance,
            band_low: f.band_low,
            band_high: f.band_high,
            filter_order: f.filter_order,
            smoothing_window: f.smoothing_window,
            amplitude: f.amplitude,
        }
    }
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let text = std::fs::read_to_string(path).map_err(|source| {
            AudioModemError::SourceUnavailable {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let file = serde_json::from_str(&text)
            .map_err(|e| format!("Invalid config file {}: {}", path.display(), e))?;
        Ok(file)
    }
}

/// Link parameters; both ends must use the same values
#[derive(Debug, Clone, Default, Args)]
pub struct CodecArgs {
    /// JSON file with codec parameters (flags below override it)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Sample rate in Hz
    #[arg(long, global = true)]
    pub sample_rate: Option<u32>,

    /// Duration of one bit in milliseconds
    #[arg(long, global = true, value_name = "MS")]
    pub symbol_ms: Option<u32>,

    /// Carrier frequency for bit 0 (Hz)
    #[arg(long, global = true, value_name = "HZ")]
    pub freq_low: Option<f32>,

    /// Carrier frequency for bit 1 (Hz)
    #[arg(long, global = true, value_name = "HZ")]
    pub freq_high: Option<f32>,

    /// Classification tolerance around each carrier (Hz)
    #[arg(long, global = true, value_name = "HZ")]
    pub tolerance: Option<f32>,

    /// Lower band-pass cutoff (Hz)
    #[arg(long, global = true, value_name = "HZ")]
    pub band_low: Option<f32>,

    /// Upper band-pass cutoff (Hz)
    #[arg(long, global = true, value_name = "HZ")]
    pub band_high: Option<f32>,

    /// Butterworth order at each band edge (even)
    #[arg(long, global = true)]
    pub filter_order: Option<usize>,

    /// Moving-average window in samples
    #[arg(long, global = true, value_name = "SAMPLES")]
    pub smoothing_window: Option<usize>,

    /// Peak sample value written by the encoder (up to 32767)
    #[arg(long, global = true)]
    pub amplitude: Option<f32>,
}

impl CodecArgs {
    /// Defaults, then the config file, then individual flags
    pub fn resolve(&self) -> Result<CodecConfig, Box<dyn std::error::Error>> {
        let mut config: CodecConfig = match &self.config {
            Some(path) => ConfigFile::load(path)?.into(),
            None => CodecConfig::default(),
        };

        if let Some(v) = self.sample_rate {
            config.sample_rate = v;
        }
        if let Some(v) = self.symbol_ms {
            config.symbol_duration_ms = v;
        }
        if let Some(v) = self.freq_low {
            config.freq_low = v;
        }
        if let Some(v) = self.freq_high {
            config.freq_high = v;
        }
        if let Some(v) = self.tolerance {
            config.tolerance = v;
        }
        if let Some(v) = self.band_low {
            config.band_low = v;
        }
        if let Some(v) = self.band_high {
            config.band_high = v;
        }
        if let Some(v) = self.filter_order {
            config.filter_order = v;
        }
        if let Some(v) = self.smoothing_window {
            config.smoothing_window = v;
        }
        if let Some(v) = self.amplitude {
            config.amplitude = v;
        }

        config.validate()?;
        Ok(config)
    }
}

pub fn parse_fingerprint(s: &str) -> Result<u16, String> {
    let digits = s.trim_start_matches("0x");
    u16::from_str_radix(digits, 16).map_err(|e| format!("invalid fingerprint {:?}: {}", s, e))
}
