use std::path::Path;

use log::debug;

use crate::bits::{bytes_to_bits, text_to_bits};
use crate::config::CodecConfig;
use crate::error::Result;
use crate::fsk::{FskModulator, SampleSink};
use crate::wav::WavSink;

/// Encoder turning a payload into one FSK tone per bit
///
/// Output is a mono stream of 16-bit samples at `config.sample_rate`, exactly
/// `8 * payload.len()` frames long with no preamble or guard interval.
pub struct Encoder {
    config: CodecConfig,
    modulator: FskModulator,
}

impl Encoder {
    pub fn new(config: CodecConfig) -> Result<Self> {
        config.validate()?;
        debug!(
            "encoder: {} Hz / {} Hz carriers, {} samples per bit, fingerprint {:04x}",
            config.freq_low,
            config.freq_high,
            config.samples_per_frame(),
            config.fingerprint()
        );
        Ok(Self {
            modulator: FskModulator::new(&config),
            config,
        })
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Encode bytes into audio samples
    pub fn encode(&self, data: &[u8]) -> Vec<i16> {
        self.encode_bits(&bytes_to_bits(data))
    }

    pub fn encode_bits(&self, bits: &[bool]) -> Vec<i16> {
        self.modulator.modulate(bits)
    }

    /// Encode single-byte text; fails on characters above U+00FF
    pub fn encode_text(&self, text: &str) -> Result<Vec<i16>> {
        Ok(self.encode_bits(&text_to_bits(text)?))
    }

    /// Stream the encoded bits into `sink` frame by frame, returning the frame count
    pub fn encode_bits_to<S: SampleSink + ?Sized>(&self, bits: &[bool], sink: &mut S) -> Result<usize> {
        self.modulator.modulate_into(bits, sink)
    }

    pub fn encode_to<S: SampleSink + ?Sized>(&self, data: &[u8], sink: &mut S) -> Result<usize> {
        self.encode_bits_to(&bytes_to_bits(data), sink)
    }

    /// Write the encoded bits to a WAV file without buffering the whole signal
    ///
    /// On failure the partially written file is left in place.
    pub fn write_wav<P: AsRef<Path>>(&self, path: P, bits: &[bool]) -> Result<usize> {
        let mut sink = WavSink::create(path.as_ref(), &self.config)?;
        let frames = self.encode_bits_to(bits, &mut sink)?;
        debug!(
            "wrote {} frames ({} samples) to {}",
            frames,
            sink.samples_written(),
            path.as_ref().display()
        );
        sink.finalize()?;
        Ok(frames)
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self {
            modulator: FskModulator::new(&CodecConfig::default()),
            config: CodecConfig::default(),
        }
    }
}
