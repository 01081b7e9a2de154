//! Amplitude envelope extraction
//!
//! **Purpose:** Turn an encoded audio stream into one amplitude value per
//! `1 / resolution` seconds.
//!
//! Uses symphonia for format-agnostic decoding (FLAC, MP3, WAV, OGG, etc.)

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use ytspec_common::config::{ExtractorConfig, SampleFunction};
use ytspec_common::{Error, Resolution, Result};

/// Extraction parameters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractorOptions {
    /// Slices per second
    pub resolution: Resolution,
    /// Reduction applied to each slice
    pub sample_function: SampleFunction,
}

impl ExtractorOptions {
    pub fn new(resolution: Resolution, config: &ExtractorConfig) -> Self {
        Self {
            resolution,
            sample_function: config.sample_function,
        }
    }
}

/// Produces the raw amplitude sequence for a clip
///
/// Index `i` of the returned vector is slice `i`. The stream is consumed and
/// dropped before returning, on success and on error.
pub trait AmplitudeExtractor: Send + Sync {
    /// Extractor identifier for logs
    fn name(&self) -> &'static str;

    /// Decode `source` and reduce it to one value per slice
    ///
    /// # Arguments
    /// * `source` - Encoded audio byte stream
    /// * `extension` - Container hint (e.g. "flac"), may be `None`
    /// * `options` - Resolution and slice reduction
    ///
    /// # Errors
    /// * `Error::Decode` - Unrecognized container, missing track, corrupt packet
    fn extract(
        &self,
        source: Box<dyn MediaSource>,
        extension: Option<&str>,
        options: &ExtractorOptions,
    ) -> Result<Vec<f64>>;
}

/// Symphonia-backed extractor
///
/// **Algorithm:**
/// 1. Probe the container and pick the first decodable track
/// 2. Decode packets to interleaved f64 samples in [-1.0, 1.0]
/// 3. Group `sample_rate * channels / resolution` interleaved samples per slice
/// 4. Reduce each slice with the sample function (RMS by default)
/// 5. Emit a final value for a trailing partial slice
#[derive(Debug, Default, Clone, Copy)]
pub struct SymphoniaExtractor;

impl AmplitudeExtractor for SymphoniaExtractor {
    fn name(&self) -> &'static str {
        "symphonia"
    }

    fn extract(
        &self,
        source: Box<dyn MediaSource>,
        extension: Option<&str>,
        options: &ExtractorOptions,
    ) -> Result<Vec<f64>> {
        let mss = MediaSourceStream::new(source, Default::default());

        let mut hint = Hint::new();
        if let Some(extension) = extension {
            hint.with_extension(extension);
        }

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|e| Error::Decode(format!("Failed to probe audio stream: {}", e)))?;

        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| Error::Decode("No audio track found in stream".to_string()))?;
        let track_id = track.id;

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| Error::Decode(format!("Failed to create decoder: {}", e)))?;

        let mut reducer: Option<SliceReducer> = None;
        let mut buffer: Option<SampleBuffer<f64>> = None;

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(e) => {
                    return Err(Error::Decode(format!("Error reading packet: {}", e)));
                }
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = decoder
                .decode(&packet)
                .map_err(|e| Error::Decode(format!("Failed to decode packet: {}", e)))?;

            let spec = *decoded.spec();
            let capacity = decoded.capacity();
            let channels = spec.channels.count();

            let reducer = reducer.get_or_insert_with(|| {
                let window = slice_window(spec.rate, channels, options.resolution);
                tracing::debug!(
                    sample_rate = spec.rate,
                    channels,
                    window,
                    resolution = options.resolution.get(),
                    "Audio stream info"
                );
                SliceReducer::new(options.sample_function, window)
            });

            if buffer.as_ref().map_or(true, |b| b.capacity() < capacity * channels) {
                buffer = Some(SampleBuffer::new(capacity as u64, spec));
            }
            if let Some(buf) = buffer.as_mut() {
                buf.copy_interleaved_ref(decoded);
                for &sample in buf.samples() {
                    reducer.push(sample);
                }
            }
        }

        let values = reducer.map(SliceReducer::finish).unwrap_or_default();

        tracing::debug!(
            slices = values.len(),
            function = ?options.sample_function,
            "Amplitude extraction complete"
        );

        Ok(values)
    }
}

/// Interleaved samples per slice, never less than one
pub fn slice_window(sample_rate: u32, channels: usize, resolution: Resolution) -> usize {
    let per_second = sample_rate as usize * channels.max(1);
    (per_second / resolution.get() as usize).max(1)
}

/// Running reduction over fixed-size slices
struct SliceReducer {
    function: SampleFunction,
    window: usize,
    count: usize,
    sum_squares: f64,
    peak: f64,
    values: Vec<f64>,
}

impl SliceReducer {
    fn new(function: SampleFunction, window: usize) -> Self {
        Self {
            function,
            window,
            count: 0,
            sum_squares: 0.0,
            peak: 0.0,
            values: Vec::new(),
        }
    }

    fn push(&mut self, sample: f64) {
        match self.function {
            SampleFunction::Rms => self.sum_squares += sample * sample,
            SampleFunction::Peak => self.peak = self.peak.max(sample.abs()),
        }
        self.count += 1;
        if self.count == self.window {
            self.flush();
        }
    }

    fn flush(&mut self) {
        if self.count == 0 {
            return;
        }
        let value = match self.function {
            SampleFunction::Rms => (self.sum_squares / self.count as f64).sqrt(),
            SampleFunction::Peak => self.peak,
        };
        self.values.push(value);
        self.count = 0;
        self.sum_squares = 0.0;
        self.peak = 0.0;
    }

    fn finish(mut self) -> Vec<f64> {
        self.flush();
        self.values
    }
}
