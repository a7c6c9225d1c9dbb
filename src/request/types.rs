//! Raw and validated synthesis submissions.

use bytes::Bytes;

use crate::emotion::EmotionVector;

/// An uploaded file part, exactly as received.
#[derive(Debug, Clone, Default)]
pub struct UploadedFile {
    /// Client-supplied file name (untrusted).
    pub file_name: String,
    pub data: Bytes,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            data: data.into(),
        }
    }
}

/// Untyped form fields collected from either front end.
///
/// Every field is optional here; the validator decides what is required.
#[derive(Debug, Clone, Default)]
pub struct RawSubmission {
    pub text: Option<String>,
    pub ref_audio: Option<UploadedFile>,
    pub emo_audio: Option<UploadedFile>,
    /// Weight controls in priority order (`emo_alpha`, `emo_alpha_number`,
    /// `emo_alpha_range`).
    pub emo_alpha: Option<String>,
    pub emo_alpha_number: Option<String>,
    pub emo_alpha_range: Option<String>,
    pub use_random: Option<String>,
    pub use_emo_text: Option<String>,
    pub emo_text: Option<String>,
    pub emo_vector: Option<String>,
}

impl RawSubmission {
    /// Start a submission with the two required fields.
    pub fn new(text: impl Into<String>, ref_audio: UploadedFile) -> Self {
        Self {
            text: Some(text.into()),
            ref_audio: Some(ref_audio),
            ..Default::default()
        }
    }

    pub fn with_emo_audio(mut self, file: UploadedFile) -> Self {
        self.emo_audio = Some(file);
        self
    }

    pub fn with_emo_alpha(mut self, value: impl Into<String>) -> Self {
        self.emo_alpha = Some(value.into());
        self
    }

    pub fn with_use_random(mut self, value: impl Into<String>) -> Self {
        self.use_random = Some(value.into());
        self
    }

    pub fn with_use_emo_text(mut self, value: impl Into<String>) -> Self {
        self.use_emo_text = Some(value.into());
        self
    }

    pub fn with_emo_text(mut self, value: impl Into<String>) -> Self {
        self.emo_text = Some(value.into());
        self
    }

    pub fn with_emo_vector(mut self, value: impl Into<String>) -> Self {
        self.emo_vector = Some(value.into());
        self
    }
}

/// A submission that passed validation, with every emotion control
/// normalized.
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    /// Trimmed, never empty.
    pub text: String,
    pub ref_audio: UploadedFile,
    pub emo_audio: Option<UploadedFile>,
    /// Always within `[0.0, 1.0]`.
    pub emo_alpha: f32,
    pub use_random: bool,
    pub use_emo_text: bool,
    /// Trimmed; may be empty.
    pub emo_text: String,
    pub emo_vector: Option<EmotionVector>,
}
