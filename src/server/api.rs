//! Programmatic front end: multipart in, WAV bytes out.

use axum::Router;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use tracing::warn;

use crate::pipeline::SynthesisError;

use super::AppState;
use super::error::ApiError;
use super::multipart::collect_submission;

pub fn routes() -> Router<AppState> {
    Router::new().route("/synthesize", post(synthesize))
}

async fn synthesize(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let raw = collect_submission(multipart).await.map_err(|e| {
        warn!(error = %e, "rejecting malformed form");
        SynthesisError::from(e)
    })?;

    let output = state.service.synthesize(raw).await?;
    let audio = output.into_bytes().await?;

    Ok((
        [
            (CONTENT_TYPE, "audio/wav"),
            (CONTENT_DISPOSITION, "attachment; filename=\"gen.wav\""),
        ],
        audio,
    )
        .into_response())
}
