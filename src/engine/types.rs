//! Engine request/response types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::emotion::EmotionVector;

/// Errors that can occur when calling the synthesis engine.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Failed to start engine: {0}")]
    Spawn(String),

    #[error("Engine error: {0}")]
    EngineFailed(String),

    #[error("Engine produced no output at {0}")]
    MissingOutput(PathBuf),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Health report from an engine worker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineHealth {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
}

/// Keyword arguments of a single inference call.
///
/// The engine branches on which optional keys are present, so inactive
/// options are left out of the serialized form instead of being sent as
/// defaults. `emo_audio_prompt` is the exception: it is always sent and
/// is `null` when no emotion clip was given.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InferenceParameters {
    pub spk_audio_prompt: PathBuf,
    pub text: String,
    pub output_path: PathBuf,
    pub verbose: bool,
    pub emo_audio_prompt: Option<PathBuf>,
    pub emo_alpha: f32,
    pub use_random: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emo_vector: Option<EmotionVector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_emo_text: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emo_text: Option<String>,
}

impl InferenceParameters {
    /// Create parameters with only the always-present fields.
    pub fn new(
        spk_audio_prompt: impl Into<PathBuf>,
        text: impl Into<String>,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            spk_audio_prompt: spk_audio_prompt.into(),
            text: text.into(),
            output_path: output_path.into(),
            verbose: false,
            emo_audio_prompt: None,
            emo_alpha: 1.0,
            use_random: false,
            emo_vector: None,
            use_emo_text: None,
            emo_text: None,
        }
    }

    /// Set the emotion reference clip.
    pub fn with_emo_audio(mut self, path: impl Into<PathBuf>) -> Self {
        self.emo_audio_prompt = Some(path.into());
        self
    }

    pub fn with_emo_alpha(mut self, alpha: f32) -> Self {
        self.emo_alpha = alpha;
        self
    }

    pub fn with_use_random(mut self, use_random: bool) -> Self {
        self.use_random = use_random;
        self
    }

    pub fn with_emo_vector(mut self, vector: EmotionVector) -> Self {
        self.emo_vector = Some(vector);
        self
    }

    /// Enable text-derived emotion, optionally with a separate descriptor.
    pub fn with_emo_text(mut self, descriptor: Option<String>) -> Self {
        self.use_emo_text = Some(true);
        self.emo_text = descriptor;
        self
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameters_defaults() {
        let params = InferenceParameters::new("/u/ref.wav", "Hello", "/o/gen.wav");

        assert_eq!(params.emo_alpha, 1.0);
        assert!(!params.use_random);
        assert!(!params.verbose);
        assert!(params.emo_audio_prompt.is_none());
    }

    #[test]
    fn test_parameters_serialize_null_emotion_audio() {
        let params = InferenceParameters::new("/u/ref.wav", "Hello", "/o/gen.wav");
        let json = serde_json::to_value(&params).unwrap();

        assert!(json["emo_audio_prompt"].is_null());
        assert!(json.as_object().unwrap().contains_key("emo_audio_prompt"));
        assert!(!json.as_object().unwrap().contains_key("emo_vector"));
        assert!(!json.as_object().unwrap().contains_key("use_emo_text"));
        assert!(!json.as_object().unwrap().contains_key("emo_text"));
    }

    #[test]
    fn test_parameters_serialize_optional_fields() {
        let params = InferenceParameters::new("/u/ref.wav", "Hello", "/o/gen.wav")
            .with_emo_audio("/u/emo.wav")
            .with_emo_vector(EmotionVector::from([0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.5, 0.0]))
            .with_emo_text(Some("so scared".to_string()));
        let json = serde_json::to_value(&params).unwrap();

        assert_eq!(json["emo_audio_prompt"], "/u/emo.wav");
        assert_eq!(json["emo_vector"][6], 0.5);
        assert_eq!(json["use_emo_text"], true);
        assert_eq!(json["emo_text"], "so scared");
    }

    #[test]
    fn test_parameters_keys_reflect_presence() {
        let params = InferenceParameters::new("/u/ref.wav", "Hello", "/o/gen.wav")
            .with_emo_text(None);

        let json = serde_json::to_value(&params).unwrap();
        let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort();

        assert_eq!(
            keys,
            [
                "emo_alpha",
                "emo_audio_prompt",
                "output_path",
                "spk_audio_prompt",
                "text",
                "use_emo_text",
                "use_random",
                "verbose"
            ]
        );
    }

    #[test]
    fn test_engine_health_deserialize() {
        let json = r#"{"status": "ok", "model": "IndexTTS2"}"#;
        let health: EngineHealth = serde_json::from_str(json).unwrap();

        assert_eq!(health.status, "ok");
        assert_eq!(health.model.as_deref(), Some("IndexTTS2"));
        assert!(health.device.is_none());
    }
}
