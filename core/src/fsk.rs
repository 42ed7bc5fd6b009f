use std::f64::consts::PI;
use std::sync::Arc;

use log::{debug, trace};
use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::config::CodecConfig;
use crate::error::Result;
use crate::filter::SignalConditioner;

// Binary FSK layout
//
// - One frame per bit, `samples_per_frame` samples long
// - Bit 1: sine at freq_high, bit 0: sine at freq_low
// - Phase restarts at zero on every frame, no guard interval between frames
// - Receiver frames the stream from sample 0 and assumes no clock drift

/// Destination for modulated samples, written one at a time in stream order
pub trait SampleSink {
    fn write_sample(&mut self, sample: i16) -> Result<()>;
}

impl SampleSink for Vec<i16> {
    fn write_sample(&mut self, sample: i16) -> Result<()> {
        self.push(sample);
        Ok(())
    }
}

/// Generate one frame of a pure tone, phase starting at zero
pub fn tone_frame(freq: f32, num_samples: usize, sample_rate: u32, amplitude: f32) -> Vec<i16> {
    let angular_freq = 2.0 * PI * freq as f64 / sample_rate as f64;
    (0..num_samples)
        .map(|i| ((angular_freq * i as f64).sin() * amplitude as f64) as i16)
        .collect()
}

/// FSK modulator - one fixed-duration tone per bit
pub struct FskModulator {
    low_frame: Vec<i16>,
    high_frame: Vec<i16>,
}

impl FskModulator {
    pub fn new(config: &CodecConfig) -> Self {
        let n = config.samples_per_frame();
        Self {
            low_frame: tone_frame(config.freq_low, n, config.sample_rate, config.amplitude),
            high_frame: tone_frame(config.freq_high, n, config.sample_rate, config.amplitude),
        }
    }

    pub fn samples_per_frame(&self) -> usize {
        self.low_frame.len()
    }

    /// Samples making up the frame for `bit`
    pub fn frame(&self, bit: bool) -> &[i16] {
        if bit {
            &self.high_frame
        } else {
            &self.low_frame
        }
    }

    /// Stream the frames for `bits` into `sink`, returning the number of frames written
    pub fn modulate_into<S: SampleSink + ?Sized>(&self, bits: &[bool], sink: &mut S) -> Result<usize> {
        for &bit in bits {
            for &sample in self.frame(bit) {
                sink.write_sample(sample)?;
            }
        }
        Ok(bits.len())
    }

    pub fn modulate(&self, bits: &[bool]) -> Vec<i16> {
        let mut samples = Vec::with_capacity(bits.len() * self.samples_per_frame());
        for &bit in bits {
            samples.extend_from_slice(self.frame(bit));
        }
        samples
    }
}

/// Most recently committed bit of a decode, used to resolve ambiguous frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassificationState {
    /// Nothing committed yet; an ambiguous frame resolves to 0
    #[default]
    Undetermined,
    Zero,
    One,
}

impl ClassificationState {
    pub fn fallback_bit(self) -> bool {
        matches!(self, ClassificationState::One)
    }
}

/// Outcome of classifying one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Peak fell inside a carrier's tolerance window
    Carrier(bool),
    /// No carrier matched; the previous bit was carried over
    CarryOver(bool),
}

impl Decision {
    pub fn bit(self) -> bool {
        match self {
            Decision::Carrier(bit) | Decision::CarryOver(bit) => bit,
        }
    }

    pub fn is_ambiguous(self) -> bool {
        matches!(self, Decision::CarryOver(_))
    }
}

/// Tolerance-window classifier with carry-over for ambiguous frames
#[derive(Debug, Clone)]
pub struct FrameClassifier {
    freq_low: f64,
    freq_high: f64,
    tolerance: f64,
    state: ClassificationState,
}

impl FrameClassifier {
    pub fn new(config: &CodecConfig) -> Self {
        Self {
            freq_low: config.freq_low as f64,
            freq_high: config.freq_high as f64,
            tolerance: config.tolerance as f64,
            state: ClassificationState::Undetermined,
        }
    }

    pub fn state(&self) -> ClassificationState {
        self.state
    }

    fn within(&self, freq: f64, carrier: f64) -> bool {
        carrier - self.tolerance <= freq && freq <= carrier + self.tolerance
    }

    /// Map a frame's dominant frequency to a bit, updating the state on a match
    pub fn classify(&mut self, peak_freq: f64) -> Decision {
        if self.within(peak_freq, self.freq_high) {
            self.state = ClassificationState::One;
            Decision::Carrier(true)
        } else if self.within(peak_freq, self.freq_low) {
            self.state = ClassificationState::Zero;
            Decision::Carrier(false)
        } else {
            Decision::CarryOver(self.state.fallback_bit())
        }
    }
}

/// Per-frame result of a demodulation pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub index: usize,
    pub peak_freq: f64,
    pub decision: Decision,
}

/// FSK demodulator - conditions the whole stream, then classifies each frame
/// by the dominant frequency of its magnitude spectrum
pub struct FskDemodulator {
    config: CodecConfig,
    conditioner: SignalConditioner,
    fft: Arc<dyn Fft<f64>>,
}

impl FskDemodulator {
    pub fn new(config: &CodecConfig) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            config: config.clone(),
            conditioner: SignalConditioner::new(config),
            fft: planner.plan_fft_forward(config.samples_per_frame()),
        }
    }

    pub fn samples_per_frame(&self) -> usize {
        self.config.samples_per_frame()
    }

    /// Frequency (Hz) of the largest-magnitude DFT bin of one full frame
    ///
    /// Only bins up to Nyquist are searched; for real input the negative
    /// frequencies mirror them. Ties resolve to the lowest bin.
    pub fn dominant_frequency(&self, frame: &[f64]) -> f64 {
        let n = self.samples_per_frame();
        debug_assert_eq!(frame.len(), n);

        let mut buffer: Vec<Complex<f64>> = frame.iter().map(|&s| Complex::new(s, 0.0)).collect();
        self.fft.process(&mut buffer);

        let mut peak_bin = 0;
        let mut peak_magnitude = f64::NEG_INFINITY;
        for (bin, value) in buffer.iter().take(n / 2 + 1).enumerate() {
            let magnitude = value.norm();
            if magnitude > peak_magnitude {
                peak_magnitude = magnitude;
                peak_bin = bin;
            }
        }

        peak_bin as f64 * self.config.sample_rate as f64 / n as f64
    }

    /// Classify every full frame of `samples`
    ///
    /// A trailing partial frame is discarded.
    pub fn analyze(&self, samples: &[i16]) -> Vec<FrameReport> {
        let n = self.samples_per_frame();
        let conditioned = self.conditioner.condition(samples);
        let mut classifier = FrameClassifier::new(&self.config);

        let frames = conditioned.chunks_exact(n);
        let leftover = frames.remainder().len();

        let reports: Vec<FrameReport> = frames
            .enumerate()
            .map(|(index, frame)| {
                let peak_freq = self.dominant_frequency(frame);
                let decision = classifier.classify(peak_freq);
                trace!("frame {}: peak {:.1} Hz -> {:?}", index, peak_freq, decision);
                if decision.is_ambiguous() {
                    debug!(
                        "frame {}: peak {:.1} Hz outside both carrier windows, carrying over {}",
                        index,
                        peak_freq,
                        decision.bit() as u8
                    );
                }
                FrameReport {
                    index,
                    peak_freq,
                    decision,
                }
            })
            .collect();

        if leftover > 0 {
            debug!("discarding {} trailing samples (partial frame)", leftover);
        }
        let ambiguous = reports.iter().filter(|r| r.decision.is_ambiguous()).count();
        debug!(
            "demodulated {} frames ({} resolved by carry-over)",
            reports.len(),
            ambiguous
        );

        reports
    }

    /// Demodulate `samples` into one bit per full frame
    pub fn demodulate(&self, samples: &[i16]) -> Vec<bool> {
        self.analyze(samples)
            .into_iter()
            .map(|report| report.decision.bit())
            .collect()
    }
}
