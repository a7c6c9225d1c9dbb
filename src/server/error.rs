//! JSON error responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::pipeline::{ErrorKind, SynthesisError};
use crate::request::ValidationError;

/// Body of every non-2xx API response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<SynthesisError> for ApiError {
    fn from(e: SynthesisError) -> Self {
        let status = match (&e, e.kind()) {
            (SynthesisError::Busy(_), _) => StatusCode::SERVICE_UNAVAILABLE,
            (SynthesisError::Validation(ValidationError::UploadTooLarge(_)), _) => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            (_, ErrorKind::Validation) => StatusCode::BAD_REQUEST,
            (_, ErrorKind::Transcoding | ErrorKind::Inference | ErrorKind::Storage) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, e.user_message())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}
