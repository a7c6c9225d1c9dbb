//! The external synthesis engine.
//!
//! The model itself lives outside this crate. [`SynthesisEngine`] is the
//! seam: it takes one fully-resolved [`InferenceParameters`] and must leave
//! a waveform at `output_path`. Two adapters are provided, a worker reached
//! over HTTP and a program spawned per call.

mod client;
mod command;
mod types;

use std::path::Path;

use async_trait::async_trait;

pub use client::HttpEngine;
pub use command::CommandEngine;
pub use types::{EngineError, EngineHealth, InferenceParameters};

/// Trait for the model's single inference entry point.
///
/// Implementations are not expected to be reentrant; callers go through
/// [`crate::pipeline::EngineGate`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SynthesisEngine: Send + Sync {
    /// Short human-readable description for logs.
    fn describe(&self) -> String;

    /// Check engine health status.
    async fn health(&self) -> Result<EngineHealth, EngineError>;

    /// Run one inference, writing the waveform to `params.output_path`.
    async fn infer(&self, params: &InferenceParameters) -> Result<(), EngineError>;
}

/// Fail unless a non-empty file exists at `path`.
pub(crate) async fn ensure_output(path: &Path) -> Result<(), EngineError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() && meta.len() > 0 => Ok(()),
        _ => Err(EngineError::MissingOutput(path.to_path_buf())),
    }
}
