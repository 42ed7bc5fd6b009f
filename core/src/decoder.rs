use std::borrow::Cow;
use std::path::Path;

use crate::bits::{bits_to_bytes, bits_to_string, bits_to_text};
use crate::config::CodecConfig;
use crate::error::Result;
use crate::fsk::{FrameReport, FskDemodulator};
use crate::sniff::{guess_type_bytes, TypeLabel};
use crate::wav::read_wav;

/// Bits recovered from a stream, with byte and text views
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPayload {
    pub bits: Vec<bool>,
    pub bytes: Vec<u8>,
}

impl DecodedPayload {
    pub fn from_bits(bits: Vec<bool>) -> Self {
        let bytes = bits_to_bytes(&bits);
        Self { bits, bytes }
    }

    /// The payload as UTF-8 text, or `None` when the bytes are not valid text
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }

    /// One character per byte, the inverse of `text_to_bits`
    pub fn single_byte_text(&self) -> String {
        bits_to_text(&self.bits)
    }

    /// Text for display: UTF-8 when the bytes are valid UTF-8, otherwise one
    /// character per byte, matching what `text_to_bits` accepts
    pub fn display_text(&self) -> Cow<'_, str> {
        match self.text() {
            Some(text) => Cow::Borrowed(text),
            None => Cow::Owned(self.single_byte_text()),
        }
    }

    pub fn bit_string(&self) -> String {
        bits_to_string(&self.bits)
    }

    pub fn guess_type(&self) -> TypeLabel {
        guess_type_bytes(&self.bytes)
    }
}

/// Decoder recovering one bit per fixed-length frame
pub struct Decoder {
    config: CodecConfig,
    demodulator: FskDemodulator,
}

impl Decoder {
    pub fn new(config: CodecConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            demodulator: FskDemodulator::new(&config),
            config,
        })
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Decode audio samples back to bits, one per full frame
    pub fn decode(&self, samples: &[i16]) -> Vec<bool> {
        self.demodulator.demodulate(samples)
    }

    /// Per-frame peak frequencies and decisions
    pub fn analyze(&self, samples: &[i16]) -> Vec<FrameReport> {
        self.demodulator.analyze(samples)
    }

    pub fn decode_payload(&self, samples: &[i16]) -> DecodedPayload {
        DecodedPayload::from_bits(self.decode(samples))
    }

    /// Read a WAV file written with the same configuration and decode it
    pub fn decode_wav<P: AsRef<Path>>(&self, path: P) -> Result<DecodedPayload> {
        let samples = read_wav(path, &self.config)?;
        Ok(self.decode_payload(&samples))
    }
}

impl Default for Decoder {
    fn default() -> Self {
        let config = CodecConfig::default();
        Self {
            demodulator: FskDemodulator::new(&config),
            config,
        }
    }
}
