//! Browser front end: HTML form, flash messages and an output directory.

use axum::Router;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::pipeline::SynthesisError;

use super::AppState;
use super::multipart::collect_submission;
use super::page;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/synthesize", post(synthesize))
        .route("/outputs/{filename}", get(output_file))
}

#[derive(Debug, Deserialize)]
struct IndexQuery {
    flash: Option<String>,
}

async fn index(Query(query): Query<IndexQuery>) -> Html<String> {
    Html(page::render(query.flash.as_deref(), None))
}

async fn synthesize(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let raw = match collect_submission(multipart).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "rejecting malformed form");
            return flash_redirect(&SynthesisError::from(e).user_message());
        }
    };

    match state.service.synthesize(raw).await {
        Ok(output) => {
            let audio_url = format!("/outputs/{}", output.file_name());
            Html(page::render(Some(&output.summary()), Some(&audio_url))).into_response()
        }
        Err(e) => flash_redirect(&e.user_message()),
    }
}

/// 303 back to the form with a one-shot message.
fn flash_redirect(message: &str) -> Response {
    Redirect::to(&format!("/?flash={}", urlencoding::encode(message))).into_response()
}

async fn output_file(State(state): State<AppState>, Path(filename): Path<String>) -> Response {
    let path = match state.service.dirs().output_file(&filename) {
        Ok(path) => path,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    match tokio::fs::read(&path).await {
        Ok(audio) => ([(CONTENT_TYPE, "audio/wav")], audio).into_response(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(file = %filename, "output not found");
            (StatusCode::NOT_FOUND, "Not found").into_response()
        }
        Err(e) => {
            warn!(file = %filename, error = %e, "failed to read output");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to read output").into_response()
        }
    }
}
