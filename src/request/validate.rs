//! Input validation for synthesis submissions.

use thiserror::Error;

use crate::emotion::{EmotionVector, parse_flag, parse_weight};

use super::types::{RawSubmission, SynthesisRequest, UploadedFile};

/// Container formats accepted for reference and emotion audio.
pub const ALLOWED_EXTENSIONS: [&str; 6] = ["wav", "mp3", "aac", "m4a", "ogg", "flac"];

/// Input faults detected before any audio is processed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Synthesis text is required")]
    EmptyText,

    #[error("Reference audio is required")]
    MissingReference,

    #[error("Unsupported reference audio format: {0} (expected WAV/MP3/FLAC/AAC/M4A/OGG)")]
    UnsupportedReference(String),

    #[error("Reference audio is empty, please upload a valid audio file")]
    EmptyReference,

    #[error("Unsupported emotion audio format: {0}")]
    UnsupportedEmotion(String),

    #[error("Emotion audio is empty")]
    EmptyEmotion,

    #[error("Malformed form data: {0}")]
    MalformedForm(String),

    #[error("Upload too large: {0}")]
    UploadTooLarge(String),
}

/// Check whether a file name carries an allow-listed extension.
pub fn allowed_file(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .is_some_and(|(_, ext)| {
            ALLOWED_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
}

/// Validate a raw submission and normalize its emotion controls.
pub fn validate(raw: RawSubmission) -> Result<SynthesisRequest, ValidationError> {
    let text = raw.text.as_deref().map(str::trim).unwrap_or_default();
    if text.is_empty() {
        return Err(ValidationError::EmptyText);
    }

    let ref_audio = match raw.ref_audio {
        Some(file) if !file.file_name.is_empty() => file,
        _ => return Err(ValidationError::MissingReference),
    };
    if !allowed_file(&ref_audio.file_name) {
        return Err(ValidationError::UnsupportedReference(ref_audio.file_name));
    }
    if ref_audio.data.is_empty() {
        return Err(ValidationError::EmptyReference);
    }

    let emo_audio = validate_emotion_audio(raw.emo_audio)?;

    let emo_alpha = parse_weight([
        raw.emo_alpha.as_deref(),
        raw.emo_alpha_number.as_deref(),
        raw.emo_alpha_range.as_deref(),
    ]);

    Ok(SynthesisRequest {
        text: text.to_string(),
        ref_audio,
        emo_audio,
        emo_alpha,
        use_random: parse_flag(raw.use_random.as_deref()),
        use_emo_text: parse_flag(raw.use_emo_text.as_deref()),
        emo_text: raw.emo_text.as_deref().map(str::trim).unwrap_or_default().to_string(),
        emo_vector: raw.emo_vector.as_deref().and_then(EmotionVector::parse),
    })
}

/// A part without a file name means "no emotion audio".
fn validate_emotion_audio(
    file: Option<UploadedFile>,
) -> Result<Option<UploadedFile>, ValidationError> {
    let Some(file) = file.filter(|f| !f.file_name.is_empty()) else {
        return Ok(None);
    };

    if !allowed_file(&file.file_name) {
        return Err(ValidationError::UnsupportedEmotion(file.file_name));
    }
    if file.data.is_empty() {
        return Err(ValidationError::EmptyEmotion);
    }

    Ok(Some(file))
}
