//! HTTP front ends over the synthesis pipeline.

mod api;
mod error;
mod form;
mod multipart;
mod page;

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::info;

use crate::cli::Frontend;
use crate::pipeline::SynthesisService;

pub use error::{ApiError, ErrorBody};
pub use multipart::collect_submission;
pub use page::{escape_html, render as render_page};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SynthesisService>,
    pub frontend: Frontend,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(service: SynthesisService, frontend: Frontend) -> Self {
        Self {
            service: Arc::new(service),
            frontend,
            started_at: Utc::now(),
        }
    }
}

/// Liveness report returned by `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub frontend: String,
    pub started_at: DateTime<Utc>,
    pub engine: String,
    pub engine_busy: bool,
}

/// Build the router for the configured front end.
pub fn router(state: AppState, body_limit: usize) -> Router {
    let routes = match state.frontend {
        Frontend::Api => api::routes(),
        Frontend::Form => form::routes(),
    };

    routes
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let gate = state.service.gate();
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "voice cloning service is running".to_string(),
        frontend: state.frontend.as_str().to_string(),
        started_at: state.started_at,
        engine: gate.description().to_string(),
        engine_busy: gate.is_busy(),
    })
}

/// Serve until Ctrl-C.
pub async fn serve(listener: TcpListener, app: Router) -> std::io::Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{ErrorKind, SynthesisError};
    use crate::request::ValidationError;
    use axum::http::StatusCode;
    use std::time::Duration;

    // ===========================================
    // ApiError status mapping
    // ===========================================

    #[test]
    fn test_validation_maps_to_bad_request() {
        let err = ApiError::from(SynthesisError::from(ValidationError::EmptyText));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), ValidationError::EmptyText.to_string());
    }

    #[test]
    fn test_oversized_upload_maps_to_payload_too_large() {
        let source = SynthesisError::from(ValidationError::UploadTooLarge(
            "length limit exceeded".to_string(),
        ));
        assert_eq!(source.kind(), ErrorKind::Validation);
        let err = ApiError::from(source);
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(err.message().starts_with("Upload too large"));
    }

    #[test]
    fn test_busy_maps_to_service_unavailable() {
        let source = SynthesisError::Busy(Duration::from_secs(5));
        assert_eq!(source.kind(), ErrorKind::Inference);
        let err = ApiError::from(source);
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_engine_failure_maps_to_internal_error() {
        let source = SynthesisError::from(crate::engine::EngineError::EngineFailed(
            "CUDA out of memory".to_string(),
        ));
        let err = ApiError::from(source);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.message().starts_with("Synthesis failed: "));
        assert!(err.message().contains("CUDA out of memory"));
    }

    #[test]
    fn test_storage_failure_maps_to_internal_error() {
        let source = SynthesisError::from(std::io::Error::other("disk full"));
        assert_eq!(
            ApiError::from(source).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    // ===========================================
    // Page rendering
    // ===========================================

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"a" & 'b'</b>"#),
            "&lt;b&gt;&quot;a&quot; &amp; &#39;b&#39;&lt;/b&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_render_empty_page() {
        let html = render_page(None, None);
        assert!(html.contains(r#"name="ref_audio""#));
        assert!(html.contains(r#"name="emo_vector""#));
        assert!(html.contains(".wav,.mp3,.aac,.m4a,.ogg,.flac"));
        assert!(html.contains("happy, angry, sad, afraid, disgusted, melancholic, surprised, calm"));
        assert!(!html.contains("<audio"));
        assert!(!html.contains("{{"));
        assert!(!html.contains("card flash"));
    }

    #[test]
    fn test_render_flash_is_escaped() {
        let html = render_page(Some("<script>alert(1)</script>"), None);
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>alert(1)"));
    }

    #[test]
    fn test_render_does_not_expand_placeholders_in_messages() {
        let html = render_page(
            Some("emo_text='{{result}} {{flash}}'"),
            Some("/outputs/abc_gen.wav"),
        );
        assert_eq!(html.matches("<audio").count(), 1);
        assert!(html.contains("{{result}} {{flash}}"));
        assert_eq!(html.matches("class=\"card flash\"").count(), 1);
    }

    #[test]
    fn test_render_result_player() {
        let html = render_page(Some("Synthesis complete!"), Some("/outputs/abc_gen.wav"));
        assert!(html.contains(r#"<audio controls src="/outputs/abc_gen.wav"></audio>"#));
        assert!(html.contains(r#"href="/outputs/abc_gen.wav" download"#));
        assert!(html.contains("Synthesis complete!"));
    }
}
