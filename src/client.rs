use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{LeaseLensError, Result};
use crate::upload::ValidatedUpload;

/// Remote service that turns a lease PDF into an analysis report.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    async fn analyze(&self, upload: &ValidatedUpload) -> Result<String>;
}

#[derive(Deserialize)]
struct AnalysisResponse {
    analysis: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    detail: Option<serde_json::Value>,
}

/// Multipart HTTP client for the analysis endpoint.
pub struct HttpAnalysisClient {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpAnalysisClient {
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| unavailable(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn unavailable(reason: String) -> LeaseLensError {
    tracing::warn!("analysis service unavailable: {reason}");
    LeaseLensError::RemoteUnavailable { reason }
}

/// Pull a displayable message out of an error body. FastAPI validation
/// errors carry a list under `detail`; plain errors carry a string.
fn error_detail(body: &str) -> Option<String> {
    let parsed: ErrorResponse = serde_json::from_str(body).ok()?;
    match parsed.detail? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[async_trait]
impl AnalysisService for HttpAnalysisClient {
    async fn analyze(&self, upload: &ValidatedUpload) -> Result<String> {
        let part = reqwest::multipart::Part::bytes(upload.bytes().to_vec())
            .file_name(upload.file_name().to_string())
            .mime_str("application/pdf")
            .map_err(|e| LeaseLensError::InvalidUpload {
                reason: format!("failed to encode upload: {e}"),
            })?;
        let form = reqwest::multipart::Form::new().part("file", part);

        tracing::info!(
            "uploading {} ({} bytes) to {}",
            upload.file_name(),
            upload.size(),
            self.endpoint
        );

        let response = self
            .http
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| unavailable(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            tracing::warn!("analysis service returned {}", status);
            return Err(LeaseLensError::RemoteRejected {
                status: status.as_u16(),
                detail: error_detail(&body),
            });
        }

        let parsed: AnalysisResponse =
            serde_json::from_str(&body).map_err(|_| LeaseLensError::RemoteRejected {
                status: status.as_u16(),
                detail: None,
            })?;
        parsed.analysis.ok_or(LeaseLensError::RemoteRejected {
            status: status.as_u16(),
            detail: error_detail(&body),
        })
    }
}
