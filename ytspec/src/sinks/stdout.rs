//! Standard output sink

use std::io::Write;

use async_trait::async_trait;
use ytspec_common::output::OutputShape;
use ytspec_common::{ClipResult, Result};

use super::ResultSink;

/// Prints the JSON document as one line on stdout
#[derive(Debug, Clone, Copy)]
pub struct StdoutSink {
    shape: OutputShape,
}

impl StdoutSink {
    pub fn new(shape: OutputShape) -> Self {
        Self { shape }
    }

    /// The exact line written (without the trailing newline)
    pub fn render(&self, result: &ClipResult) -> Result<String> {
        self.shape.document(result)
    }
}

#[async_trait]
impl ResultSink for StdoutSink {
    fn name(&self) -> &'static str {
        "stdout"
    }

    async fn emit(&self, result: &ClipResult) -> Result<()> {
        let line = self.render(result)?;
        let mut out = std::io::stdout().lock();
        writeln!(out, "{}", line)?;
        out.flush()?;
        Ok(())
    }
}
