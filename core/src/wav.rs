//! WAV container adapter for the sample channel (mono, 16-bit PCM)

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use log::debug;

use crate::config::CodecConfig;
use crate::error::{AudioModemError, Result};
use crate::fsk::SampleSink;

pub fn wav_spec(config: &CodecConfig) -> hound::WavSpec {
    hound::WavSpec {
        channels: 1,
        sample_rate: config.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}

/// Sample sink that streams straight into a WAV file
pub struct WavSink {
    writer: hound::WavWriter<BufWriter<File>>,
    written: usize,
}

impl WavSink {
    pub fn create<P: AsRef<Path>>(path: P, config: &CodecConfig) -> Result<Self> {
        let writer = hound::WavWriter::create(path, wav_spec(config))?;
        Ok(Self { writer, written: 0 })
    }

    pub fn samples_written(&self) -> usize {
        self.written
    }

    /// Flush buffered samples and patch the header lengths
    pub fn finalize(self) -> Result<()> {
        self.writer.finalize()?;
        Ok(())
    }
}

impl SampleSink for WavSink {
    fn write_sample(&mut self, sample: i16) -> Result<()> {
        self.writer.write_sample(sample)?;
        self.written += 1;
        Ok(())
    }
}

/// Read a mono 16-bit stream, checking the header against `config`
pub fn read_wav<P: AsRef<Path>>(path: P, config: &CodecConfig) -> Result<Vec<i16>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| AudioModemError::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    })?;

    let reader = hound::WavReader::new(BufReader::new(file))
        .map_err(|e| AudioModemError::ContainerCorrupt(e.to_string()))?;

    let spec = reader.spec();
    debug!(
        "{}: {} Hz, {} channel(s), {} bits, {:?}, {} samples",
        path.display(),
        spec.sample_rate,
        spec.channels,
        spec.bits_per_sample,
        spec.sample_format,
        reader.len()
    );

    if spec.channels != 1 {
        return Err(AudioModemError::ContainerCorrupt(format!(
            "expected 1 channel, found {}",
            spec.channels
        )));
    }
    if spec.bits_per_sample != 16 || spec.sample_format != hound::SampleFormat::Int {
        return Err(AudioModemError::ContainerCorrupt(format!(
            "expected 16-bit integer samples, found {}-bit {:?}",
            spec.bits_per_sample, spec.sample_format
        )));
    }
    if spec.sample_rate != config.sample_rate {
        return Err(AudioModemError::ConfigMismatch {
            expected: format!("{} Hz", config.sample_rate),
            found: format!("{} Hz", spec.sample_rate),
        });
    }

    reader
        .into_samples::<i16>()
        .collect::<std::result::Result<Vec<i16>, _>>()
        .map_err(|e| AudioModemError::ContainerCorrupt(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("tonecast-wav-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_sink_then_read() {
        let config = CodecConfig::default();
        let path = temp_path("roundtrip.wav");

        let mut sink = WavSink::create(&path, &config).unwrap();
        for s in [0i16, 100, -100, i16::MAX, i16::MIN] {
            sink.write_sample(s).unwrap();
        }
        assert_eq!(sink.samples_written(), 5);
        sink.finalize().unwrap();

        let samples = read_wav(&path, &config).unwrap();
        assert_eq!(samples, vec![0, 100, -100, i16::MAX, i16::MIN]);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_file() {
        let err = read_wav(temp_path("does-not-exist.wav"), &CodecConfig::default()).unwrap_err();
        assert!(matches!(err, AudioModemError::SourceUnavailable { .. }));
    }

    #[test]
    fn test_garbage_is_corrupt() {
        let path = temp_path("garbage.wav");
        std::fs::write(&path, b"definitely not a riff file").unwrap();
        let err = read_wav(&path, &CodecConfig::default()).unwrap_err();
        assert!(matches!(err, AudioModemError::ContainerCorrupt(_)));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_stereo_rejected() {
        let path = temp_path("stereo.wav");
        let spec = hound::WavSpec {
            channels: 2,
            ..wav_spec(&CodecConfig::default())
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        writer.write_sample(0i16).unwrap();
        writer.write_sample(0i16).unwrap();
        writer.finalize().unwrap();

        let err = read_wav(&path, &CodecConfig::default()).unwrap_err();
        assert!(matches!(err, AudioModemError::ContainerCorrupt(_)));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_sample_rate_mismatch() {
        let path = temp_path("rate.wav");
        let written = CodecConfig {
            sample_rate: 48000,
            ..CodecConfig::default()
        };
        let mut sink = WavSink::create(&path, &written).unwrap();
        sink.write_sample(1).unwrap();
        sink.finalize().unwrap();

        let err = read_wav(&path, &CodecConfig::default()).unwrap_err();
        assert!(matches!(err, AudioModemError::ConfigMismatch { .. }));
        std::fs::remove_file(&path).ok();
    }
}
