//! HTTP POST sink
//!
//! Best effort: network errors and non-2xx responses come back as
//! `Error::Http`, and the runner logs them without failing the run.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use ytspec_common::output::OutputShape;
use ytspec_common::{ClipResult, Error, Result};

use super::{FailurePolicy, ResultSink};

const USER_AGENT: &str = concat!("ytspec/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// POSTs the JSON document to a fixed endpoint
pub struct HttpPostSink {
    http_client: reqwest::Client,
    url: String,
    shape: OutputShape,
}

impl HttpPostSink {
    pub fn new(url: String, shape: OutputShape) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            http_client,
            url,
            shape,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ResultSink for HttpPostSink {
    fn name(&self) -> &'static str {
        "http_post"
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::BestEffort
    }

    async fn emit(&self, result: &ClipResult) -> Result<()> {
        let body = self.shape.document(result)?;

        tracing::debug!(url = %self.url, bytes = body.len(), "Posting result");

        let response = self
            .http_client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| Error::Http(format!("POST {} failed: {}", self.url, e)))?;

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(
                    url = %self.url,
                    status = status.as_u16(),
                    error = %e,
                    "Failed to read response body"
                );
                String::new()
            }
        };

        if !status.is_success() {
            return Err(Error::Http(format!(
                "POST {} returned {}: {}",
                self.url,
                status.as_u16(),
                text
            )));
        }

        tracing::info!(
            url = %self.url,
            status = status.as_u16(),
            response = %text,
            "Result posted"
        );
        Ok(())
    }
}
