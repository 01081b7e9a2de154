//! Result sinks
//!
//! A sink receives the finished `ClipResult` exactly once. One sink is chosen
//! at startup from `OutputConfig`; the runner never knows which.
//!
//! | Sink        | Failure policy |
//! |-------------|----------------|
//! | stdout      | fatal          |
//! | json_file   | fatal          |
//! | http_post   | best effort    |
//! | database    | fatal          |

use async_trait::async_trait;
use ytspec_common::config::{OutputConfig, SinkKind};
use ytspec_common::{ClipResult, Error, Result};

pub mod database;
pub mod http;
pub mod json_file;
pub mod stdout;

pub use database::DatabaseSink;
pub use http::HttpPostSink;
pub use json_file::JsonFileSink;
pub use stdout::StdoutSink;

/// How the runner treats an `emit` error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Abort the run
    Fatal,
    /// Log and finish normally
    BestEffort,
}

/// Destination for a finished clip
///
/// Sinks only read the result. Implementations must not retry.
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Sink identifier for logs
    fn name(&self) -> &'static str;

    /// Policy applied by the runner when `emit` fails
    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::Fatal
    }

    /// Persist or publish the result
    async fn emit(&self, result: &ClipResult) -> Result<()>;
}

/// Construct the configured sink
///
/// The database sink connects here, so a bad URL fails before any decoding.
pub async fn build_sink(config: &OutputConfig) -> Result<Box<dyn ResultSink>> {
    let sink: Box<dyn ResultSink> = match config.sink {
        SinkKind::Stdout => Box::new(StdoutSink::new(config.shape)),
        SinkKind::JsonFile => Box::new(JsonFileSink::new(
            config.json_file.path.clone(),
            config.shape,
        )),
        SinkKind::HttpPost => {
            let url = config
                .http
                .url
                .clone()
                .ok_or_else(|| Error::Config("http_post sink requires output.http.url".to_string()))?;
            Box::new(HttpPostSink::new(url, config.shape)?)
        }
        SinkKind::Database => {
            let url = config.database.url.as_deref().ok_or_else(|| {
                Error::Config("database sink requires output.database.url".to_string())
            })?;
            Box::new(DatabaseSink::connect(url, &config.database.table).await?)
        }
    };

    tracing::debug!(sink = sink.name(), shape = ?config.shape, "Result sink ready");
    Ok(sink)
}
