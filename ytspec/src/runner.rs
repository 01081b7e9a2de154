//! Single-shot pipeline runner
//!
//! open file → extract → normalize → emit, in order, on the calling task.
//! Nothing is retried. The input file is dropped as soon as extraction
//! returns, whichever way it returns.

use tracing::{info, warn};
use ytspec_common::config::{DecodeErrorPolicy, PipelineConfig};
use ytspec_common::{ClipResult, Error, Result};

use crate::extractor::{AmplitudeExtractor, ExtractorOptions, SymphoniaExtractor};
use crate::input::ClipInput;
use crate::normalizer::NormalizationPipeline;
use crate::sinks::{build_sink, FailurePolicy, ResultSink};

/// What happened to a clip
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub id: String,
    pub samples: usize,
    pub peak: i64,
    /// Decoding failed and an empty result was emitted instead
    pub decode_failed: bool,
    /// False only when a best-effort sink failed
    pub emitted: bool,
}

/// Wires one extractor, the normalizer and one sink
pub struct Runner {
    config: PipelineConfig,
    extractor: Box<dyn AmplitudeExtractor>,
    normalizer: NormalizationPipeline,
    sink: Box<dyn ResultSink>,
}

impl Runner {
    pub fn new(
        config: PipelineConfig,
        extractor: Box<dyn AmplitudeExtractor>,
        sink: Box<dyn ResultSink>,
    ) -> Self {
        let normalizer = NormalizationPipeline::new().with_value_places(config.output.value_places);
        Self {
            config,
            extractor,
            normalizer,
            sink,
        }
    }

    /// Production wiring: symphonia extractor plus the configured sink
    pub async fn from_config(config: PipelineConfig) -> Result<Self> {
        let sink = build_sink(&config.output).await?;
        Ok(Self::new(config, Box::new(SymphoniaExtractor), sink))
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Process one clip end to end
    ///
    /// # Arguments
    /// * `target` - Clip file name or hash, unsanitized
    ///
    /// # Errors
    /// Every failure is returned except a best-effort sink failure, which is
    /// logged and reported through `RunSummary::emitted`.
    pub async fn run(&self, target: Option<&str>) -> Result<RunSummary> {
        let input = ClipInput::resolve(target, &self.config)?;
        info!(id = %input.id, path = %input.path.display(), "Processing clip");

        let (result, decode_failed) = match self.extract(&input)? {
            Some(raw) => {
                let result = self
                    .normalizer
                    .run(input.id.clone(), &raw, self.config.resolution)?;
                (result, false)
            }
            None => (ClipResult::empty(input.id.clone(), self.config.resolution), true),
        };

        info!(
            id = %result.id,
            samples = result.len(),
            peak = result.peak.get(),
            duration_seconds = result.duration_seconds(),
            "Clip normalized"
        );

        let emitted = self.emit(&result).await?;

        Ok(RunSummary {
            id: result.id.clone(),
            samples: result.len(),
            peak: result.peak.get(),
            decode_failed,
            emitted,
        })
    }

    /// Raw samples, or `None` when decoding failed and the policy tolerates it
    fn extract(&self, input: &ClipInput) -> Result<Option<Vec<f64>>> {
        let file = input.open()?;
        let options = ExtractorOptions::new(self.config.resolution, &self.config.extractor);

        match self
            .extractor
            .extract(Box::new(file), input.extension(), &options)
        {
            Ok(raw) => {
                tracing::debug!(
                    extractor = self.extractor.name(),
                    slices = raw.len(),
                    "Extracted amplitudes"
                );
                Ok(Some(raw))
            }
            Err(Error::Decode(msg))
                if self.config.on_decode_error == DecodeErrorPolicy::ContinueWithEmpty =>
            {
                warn!(
                    id = %input.id,
                    error = %msg,
                    "Decode failed, continuing with empty result"
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn emit(&self, result: &ClipResult) -> Result<bool> {
        match self.sink.emit(result).await {
            Ok(()) => {
                info!(id = %result.id, sink = self.sink.name(), "Result emitted");
                Ok(true)
            }
            Err(e) => match self.sink.failure_policy() {
                FailurePolicy::Fatal => Err(e),
                FailurePolicy::BestEffort => {
                    warn!(
                        id = %result.id,
                        sink = self.sink.name(),
                        error = %e,
                        "Sink failed (best effort, continuing)"
                    );
                    Ok(false)
                }
            },
        }
    }
}
