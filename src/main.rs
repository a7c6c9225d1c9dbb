//! clone-tts-server entry point.

use anyhow::{Context, Result};
use clap::Parser;
use clone_tts_server::audio::FfmpegTranscoder;
use clone_tts_server::cli::{Args, EngineSource, init_tracing};
use clone_tts_server::engine::{CommandEngine, HttpEngine, SynthesisEngine};
use clone_tts_server::pipeline::{EngineGate, SynthesisService};
use clone_tts_server::server::{AppState, router, serve};
use clone_tts_server::workspace::WorkDirs;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let engine = create_engine(args.engine()?);
    match engine.health().await {
        Ok(health) => info!(
            engine = %engine.describe(),
            status = %health.status,
            model = ?health.model,
            device = ?health.device,
            "engine ready"
        ),
        Err(e) => warn!(
            engine = %engine.describe(),
            error = %e,
            "engine health check failed, requests will fail until it is reachable"
        ),
    }

    let dirs = WorkDirs::new(&args.work_dir);
    dirs.ensure().with_context(|| {
        format!(
            "Failed to create working directories under {}",
            args.work_dir.display()
        )
    })?;

    let gate = EngineGate::new(engine).with_wait_limit(args.gate_timeout()?);
    let transcoder = FfmpegTranscoder::new(&args.ffmpeg);
    let service = SynthesisService::new(gate, Box::new(transcoder), dirs)
        .keep_uploads(args.keep_uploads);

    let app = router(AppState::new(service, args.frontend), args.body_limit()?);

    let addr = format!("{}:{}", args.host, args.port());
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(
        addr = %addr,
        frontend = args.frontend.as_str(),
        work_dir = %args.work_dir.display(),
        "listening"
    );

    serve(listener, app).await.context("Server error")?;
    Ok(())
}

fn create_engine(source: EngineSource) -> Box<dyn SynthesisEngine> {
    match source {
        EngineSource::Http(url) => Box::new(HttpEngine::new(&url)),
        EngineSource::Command { program, args } => Box::new(CommandEngine::new(program, args)),
    }
}
