//! Collects multipart form data into a [`RawSubmission`].

use axum::extract::Multipart;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::http::StatusCode;
use tracing::debug;

use crate::request::{RawSubmission, UploadedFile, ValidationError};

/// Read every field of a synthesis form.
///
/// Unknown fields are skipped. A repeated field keeps its last value.
pub async fn collect_submission(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<RawSubmission, ValidationError> {
    let mut multipart =
        multipart.map_err(|e| ValidationError::MalformedForm(e.body_text()))?;
    let mut raw = RawSubmission::default();

    while let Some(field) = multipart.next_field().await.map_err(read_error)? {
        let name = field.name().unwrap_or_default().to_string();

        if name == "ref_audio" || name == "emo_audio" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let data = field.bytes().await.map_err(read_error)?;
            let file = UploadedFile::new(file_name, data);
            if name == "ref_audio" {
                raw.ref_audio = Some(file);
            } else {
                raw.emo_audio = Some(file);
            }
            continue;
        }

        let value = field.text().await.map_err(read_error)?;
        match name.as_str() {
            "text" => raw.text = Some(value),
            "emo_alpha" => raw.emo_alpha = Some(value),
            "emo_alpha_number" => raw.emo_alpha_number = Some(value),
            "emo_alpha_range" => raw.emo_alpha_range = Some(value),
            "use_random" => raw.use_random = Some(value),
            "use_emo_text" => raw.use_emo_text = Some(value),
            "emo_text" => raw.emo_text = Some(value),
            "emo_vector" => raw.emo_vector = Some(value),
            other => debug!(field = other, "ignoring unknown form field"),
        }
    }

    Ok(raw)
}

/// A body cut off by the upload limit is reported apart from bad framing.
fn read_error(e: MultipartError) -> ValidationError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ValidationError::UploadTooLarge(e.body_text())
    } else {
        ValidationError::MalformedForm(e.body_text())
    }
}
