//! Stand-in extractor and sink for runner tests

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use symphonia::core::io::MediaSource;
use ytspec::extractor::{AmplitudeExtractor, ExtractorOptions};
use ytspec::sinks::{FailurePolicy, ResultSink};
use ytspec_common::{ClipResult, Error, Result};

/// Ignores the stream and returns preset amplitudes (or a decode error)
pub struct FixedExtractor {
    values: Option<Vec<f64>>,
}

impl FixedExtractor {
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values: Some(values),
        }
    }

    pub fn failing() -> Self {
        Self { values: None }
    }
}

impl AmplitudeExtractor for FixedExtractor {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn extract(
        &self,
        _source: Box<dyn MediaSource>,
        _extension: Option<&str>,
        _options: &ExtractorOptions,
    ) -> Result<Vec<f64>> {
        self.values
            .clone()
            .ok_or_else(|| Error::Decode("fixture decode failure".to_string()))
    }
}

/// Records every emitted result; optionally fails each emit
#[derive(Clone)]
pub struct RecordingSink {
    pub received: Arc<Mutex<Vec<ClipResult>>>,
    fail: bool,
    policy: FailurePolicy,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            received: Arc::new(Mutex::new(Vec::new())),
            fail: false,
            policy: FailurePolicy::Fatal,
        }
    }

    pub fn failing(policy: FailurePolicy) -> Self {
        Self {
            fail: true,
            policy,
            ..Self::new()
        }
    }

    pub fn results(&self) -> Vec<ClipResult> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResultSink for RecordingSink {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn failure_policy(&self) -> FailurePolicy {
        self.policy
    }

    async fn emit(&self, result: &ClipResult) -> Result<()> {
        self.received.lock().unwrap().push(result.clone());
        if self.fail {
            return Err(Error::Http("recording sink told to fail".to_string()));
        }
        Ok(())
    }
}
