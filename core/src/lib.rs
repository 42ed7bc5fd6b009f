//! Binary FSK audio codec
//!
//! Encodes a byte payload as one fixed-duration tone per bit (one carrier for
//! 0, another for 1) and recovers it from a recorded mono 16-bit stream by
//! picking the dominant frequency of each frame.

pub mod error;
pub mod config;
pub mod bits;
pub mod filter;
pub mod fsk;
pub mod sniff;
pub mod wav;
pub mod encoder;
pub mod decoder;

pub use bits::{bits_to_bytes, bits_to_string, bits_to_text, bytes_to_bits, parse_bits, text_to_bits};
pub use config::CodecConfig;
pub use decoder::{DecodedPayload, Decoder};
pub use encoder::Encoder;
pub use error::{AudioModemError, Result};
pub use fsk::{ClassificationState, Decision, FrameClassifier, FrameReport, SampleSink};
pub use sniff::{guess_type, guess_type_bytes, TypeLabel};

// Default link parameters
pub const SAMPLE_RATE: u32 = 44100;
pub const SYMBOL_DURATION_MS: u32 = 100;
pub const SAMPLES_PER_SYMBOL: usize = (SAMPLE_RATE as usize * SYMBOL_DURATION_MS as usize) / 1000; // 4410

// Carriers
pub const FREQ_LOW: f32 = 432.0; // Hz, bit 0
pub const FREQ_HIGH: f32 = 528.0; // Hz, bit 1
pub const TOLERANCE: f32 = 45.0; // Hz, must stay below half the carrier separation

// Receiver conditioning
pub const BAND_LOW: f32 = 400.0; // Hz
pub const BAND_HIGH: f32 = 1100.0; // Hz
pub const FILTER_ORDER: usize = 4;
pub const SMOOTHING_WINDOW: usize = 5;

pub const AMPLITUDE: f32 = 32767.0;
