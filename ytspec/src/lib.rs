//! ytspec library - amplitude envelope extraction and publishing
//!
//! Decodes one audio clip into a per-slice loudness envelope, normalizes it
//! against the clip peak, and hands the result to a configured sink.
//! Exposes public APIs for integration testing.

pub mod extractor;
pub mod input;
pub mod normalizer;
pub mod runner;
pub mod sinks;

pub use extractor::{AmplitudeExtractor, ExtractorOptions, SymphoniaExtractor};
pub use input::ClipInput;
pub use normalizer::NormalizationPipeline;
pub use runner::{RunSummary, Runner};
pub use sinks::{FailurePolicy, ResultSink};
