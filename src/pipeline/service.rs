//! The request-to-inference pipeline shared by both front ends.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{info, warn};

use crate::audio::{TranscodeError, Transcoder, wav_duration};
use crate::emotion::EmotionVector;
use crate::engine::EngineError;
use crate::request::{RawSubmission, UploadedFile, ValidationError, validate};
use crate::workspace::{RequestArena, WorkDirs};

use super::builder::build_parameters;
use super::gate::{EngineGate, GateError};

/// Failure class of a synthesis attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Transcoding,
    Inference,
    Storage,
}

/// Errors that can occur while handling a synthesis request.
#[derive(Error, Debug)]
pub enum SynthesisError {
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("Audio conversion failed: {0}")]
    Transcoding(#[from] TranscodeError),

    #[error("Synthesis failed: {0}")]
    Inference(#[from] EngineError),

    #[error("Synthesis engine is busy (waited {0:?}), please retry later")]
    Busy(Duration),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl From<GateError> for SynthesisError {
    fn from(e: GateError) -> Self {
        match e {
            GateError::Busy(waited) => SynthesisError::Busy(waited),
            GateError::Engine(e) => SynthesisError::Inference(e),
        }
    }
}

impl SynthesisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SynthesisError::Validation(_) => ErrorKind::Validation,
            SynthesisError::Transcoding(_) => ErrorKind::Transcoding,
            SynthesisError::Inference(_) | SynthesisError::Busy(_) => ErrorKind::Inference,
            SynthesisError::Storage(_) => ErrorKind::Storage,
        }
    }

    /// Message shown to the client.
    ///
    /// Validation faults are reported as-is; the other classes carry the
    /// collaborator's diagnostic under a fixed prefix.
    pub fn user_message(&self) -> String {
        match self {
            SynthesisError::Validation(e) => e.to_string(),
            other => other.to_string(),
        }
    }
}

/// A finished synthesis.
#[derive(Debug, Clone)]
pub struct SynthesisOutput {
    pub token: String,
    pub output_path: PathBuf,
    pub emo_alpha: f32,
    pub emo_vector: Option<EmotionVector>,
    pub use_random: bool,
    pub use_emo_text: bool,
    /// Descriptor actually forwarded to the engine.
    pub emo_text: Option<String>,
    /// Length of the generated audio, when its header is readable.
    pub duration: Option<f32>,
}

impl SynthesisOutput {
    /// File name under the output directory.
    pub fn file_name(&self) -> String {
        self.output_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// One-line description of what was generated.
    pub fn summary(&self) -> String {
        let mut msg = format!("Synthesis complete! emo_alpha={:.2}", self.emo_alpha);
        if let Some(vector) = &self.emo_vector {
            let _ = write!(msg, ", emo_vector={vector}");
        }
        if self.use_random {
            msg.push_str(" (use_random=true)");
        }
        if self.use_emo_text {
            match &self.emo_text {
                Some(text) => {
                    let _ = write!(msg, " (use_emo_text=true, emo_text='{text}')");
                }
                None => msg.push_str(" (use_emo_text=true)"),
            }
        }
        if let Some(duration) = self.duration {
            let _ = write!(msg, ", duration={duration:.2}s");
        }
        msg
    }

    /// Read the generated audio and delete it from disk.
    pub async fn into_bytes(self) -> Result<Vec<u8>, SynthesisError> {
        let audio = tokio::fs::read(&self.output_path).await?;
        if let Err(e) = tokio::fs::remove_file(&self.output_path).await {
            warn!(token = %self.token, error = %e, "failed to remove streamed output");
        }
        Ok(audio)
    }
}

/// Validates, normalizes and dispatches synthesis requests.
pub struct SynthesisService {
    gate: EngineGate,
    transcoder: Box<dyn Transcoder>,
    dirs: WorkDirs,
    keep_uploads: bool,
}

impl SynthesisService {
    pub fn new(gate: EngineGate, transcoder: Box<dyn Transcoder>, dirs: WorkDirs) -> Self {
        Self {
            gate,
            transcoder,
            dirs,
            keep_uploads: false,
        }
    }

    /// Leave raw and normalized uploads on disk after each request.
    pub fn keep_uploads(mut self, keep: bool) -> Self {
        self.keep_uploads = keep;
        self
    }

    pub fn gate(&self) -> &EngineGate {
        &self.gate
    }

    pub fn dirs(&self) -> &WorkDirs {
        &self.dirs
    }

    /// Run a submission through the whole pipeline.
    pub async fn synthesize(&self, raw: RawSubmission) -> Result<SynthesisOutput, SynthesisError> {
        let result = self.run(raw).await;
        if let Err(e) = &result {
            warn!(kind = ?e.kind(), error = %e, "synthesis request failed");
        }
        result
    }

    async fn run(&self, raw: RawSubmission) -> Result<SynthesisOutput, SynthesisError> {
        let request = validate(raw)?;

        let mut arena = RequestArena::open(&self.dirs, self.keep_uploads);
        let token = arena.token().to_string();

        let reference = self.normalize_upload(&mut arena, "ref", &request.ref_audio).await?;
        let emotion = match &request.emo_audio {
            Some(file) => Some(self.normalize_upload(&mut arena, "emo", file).await?),
            None => None,
        };

        let params = build_parameters(
            &request,
            &reference,
            emotion.as_deref(),
            arena.output_path(),
        );

        info!(
            token = %token,
            ref_audio = %request.ref_audio.file_name,
            emo_audio = ?request.emo_audio.as_ref().map(|f| f.file_name.as_str()),
            params = %serde_json::to_string(&params).unwrap_or_default(),
            "dispatching inference"
        );

        let started = Instant::now();
        let lease = self.gate.acquire().await?;

        // Detached so the lease and the request files outlive a dropped
        // client until the engine has returned.
        let job = tokio::spawn(async move {
            let result = lease.infer(&params).await;
            (arena, params, result)
        });
        let (mut arena, params, result) = job.await.map_err(|e| {
            SynthesisError::Inference(EngineError::EngineFailed(format!(
                "inference task aborted: {e}"
            )))
        })?;
        result?;

        let output_path = arena.persist_output();
        let duration = wav_duration(&output_path);
        info!(
            token = %token,
            elapsed_ms = started.elapsed().as_millis() as u64,
            audio_secs = ?duration,
            "inference finished"
        );

        Ok(SynthesisOutput {
            token,
            output_path,
            emo_alpha: params.emo_alpha,
            emo_vector: params.emo_vector,
            use_random: params.use_random,
            use_emo_text: params.use_emo_text.unwrap_or(false),
            emo_text: params.emo_text,
            duration,
        })
    }

    /// Save an upload and convert it to the engine's input format.
    async fn normalize_upload(
        &self,
        arena: &mut RequestArena,
        role: &str,
        file: &UploadedFile,
    ) -> Result<PathBuf, SynthesisError> {
        let raw_path = arena.upload_path(role, &file.file_name);
        tokio::fs::write(&raw_path, &file.data).await?;

        let normalized = arena.normalized_path(role);
        self.transcoder.normalize(&raw_path, &normalized).await?;

        Ok(normalized)
    }
}

