//! HTTP client for a model worker process.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

use super::types::{EngineError, EngineHealth, InferenceParameters};
use super::{SynthesisEngine, ensure_output};

/// Talks to a long-running worker that hosts the model.
///
/// The worker receives the inference keywords as JSON on `POST /infer`.
/// It may either stream the generated WAV back (any `audio/*` response),
/// which is then written to `output_path`, or write `output_path` itself
/// on a shared filesystem and answer with an empty or JSON body.
pub struct HttpEngine {
    base_url: String,
    client: reqwest::Client,
}

impl HttpEngine {
    /// Create a new HTTP engine client.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl SynthesisEngine for HttpEngine {
    fn describe(&self) -> String {
        format!("http worker at {}", self.base_url)
    }

    async fn health(&self) -> Result<EngineHealth, EngineError> {
        let url = format!("{}/health", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| EngineError::ConnectionFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(EngineError::RequestFailed(format!(
                "Status: {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| EngineError::InvalidResponse(e.to_string()))
    }

    async fn infer(&self, params: &InferenceParameters) -> Result<(), EngineError> {
        let url = format!("{}/infer", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(params)
            .send()
            .await
            .map_err(|e| EngineError::ConnectionFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body = body.trim();
            return Err(if body.is_empty() {
                EngineError::EngineFailed(format!("Status: {status}"))
            } else {
                EngineError::EngineFailed(format!("Status: {status}: {body}"))
            });
        }

        let streams_audio = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("audio/"));

        if streams_audio {
            let audio = response
                .bytes()
                .await
                .map_err(|e| EngineError::InvalidResponse(e.to_string()))?;
            tokio::fs::write(&params.output_path, &audio).await?;
        }

        ensure_output(&params.output_path).await
    }
}
