//! JSON file sink

use std::path::PathBuf;

use async_trait::async_trait;
use ytspec_common::output::OutputShape;
use ytspec_common::{ClipResult, Error, Result};

use super::ResultSink;

/// Writes the JSON document to a fixed path, replacing any previous content
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
    shape: OutputShape,
}

impl JsonFileSink {
    pub fn new(path: PathBuf, shape: OutputShape) -> Self {
        Self { path, shape }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl ResultSink for JsonFileSink {
    fn name(&self) -> &'static str {
        "json_file"
    }

    async fn emit(&self, result: &ClipResult) -> Result<()> {
        let json = self.shape.document(result)?;

        tokio::fs::write(&self.path, json.as_bytes())
            .await
            .map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to write {}: {}", self.path.display(), e),
                ))
            })?;

        tracing::info!(
            path = %self.path.display(),
            bytes = json.len(),
            "Wrote result file"
        );
        Ok(())
    }
}
