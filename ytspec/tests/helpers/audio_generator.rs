//! Audio Test Fixture Generator
//!
//! Writes 16-bit WAV files made of half-scale square-wave segments and
//! silence, so slice RMS values are known exactly.

use std::path::Path;

/// Configuration for generated audio
#[derive(Debug, Clone)]
pub struct AudioConfig {
    pub sample_rate: u32,
    pub channels: u16,
    /// (seconds, amplitude as a fraction of full scale) segments, in order
    pub segments: Vec<(f64, f64)>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 8_000,
            channels: 1,
            segments: vec![(1.0, 0.5)],
        }
    }
}

/// Generate a WAV file at `path`
pub fn generate_test_wav(path: &Path, config: &AudioConfig) -> anyhow::Result<()> {
    let spec = hound::WavSpec {
        channels: config.channels,
        sample_rate: config.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;

    for &(seconds, amplitude) in &config.segments {
        let frames = (seconds * config.sample_rate as f64) as usize;
        let level = (amplitude * 32768.0).round().min(i16::MAX as f64) as i16;
        for i in 0..frames {
            let sample = if i % 2 == 0 { level } else { -level };
            for _ in 0..config.channels {
                writer.write_sample(sample)?;
            }
        }
    }

    writer.finalize()?;
    Ok(())
}
