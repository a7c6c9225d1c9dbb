//! Shared helpers for the HTTP integration tests.
//!
//! The engine and transcoder doubles stand in for the model worker and
//! ffmpeg; everything between the socket and those seams is real.

#![allow(dead_code)]

use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use clone_tts_server::audio::{TranscodeError, Transcoder};
use clone_tts_server::cli::Frontend;
use clone_tts_server::engine::{EngineError, EngineHealth, InferenceParameters, SynthesisEngine};
use clone_tts_server::pipeline::{EngineGate, SynthesisService};
use clone_tts_server::server::{AppState, router};
use clone_tts_server::workspace::WorkDirs;
use tokio::net::TcpListener;

pub const SAMPLE_RATE: u32 = 22050;

/// Encode `samples` of silence as a mono 16-bit WAV.
pub fn wav_bytes(samples: u32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for _ in 0..samples {
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

/// What the fake engine saw.
#[derive(Default)]
pub struct EngineLog {
    active: AtomicUsize,
    max_active: AtomicUsize,
    calls: Mutex<Vec<InferenceParameters>>,
}

impl EngineLog {
    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<InferenceParameters> {
        self.calls.lock().unwrap().clone()
    }
}

/// Engine double that records overlap and writes one second of audio.
pub struct RecordingEngine {
    log: Arc<EngineLog>,
    delay: Duration,
    failure: Option<String>,
}

impl RecordingEngine {
    pub fn new() -> (Self, Arc<EngineLog>) {
        let log = Arc::new(EngineLog::default());
        let engine = Self {
            log: Arc::clone(&log),
            delay: Duration::ZERO,
            failure: None,
        };
        (engine, log)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }
}

#[async_trait]
impl SynthesisEngine for RecordingEngine {
    fn describe(&self) -> String {
        "recording engine".to_string()
    }

    async fn health(&self) -> Result<EngineHealth, EngineError> {
        Ok(EngineHealth {
            status: "ok".to_string(),
            model: None,
            device: None,
        })
    }

    async fn infer(&self, params: &InferenceParameters) -> Result<(), EngineError> {
        let now = self.log.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.log.max_active.fetch_max(now, Ordering::SeqCst);
        self.log.calls.lock().unwrap().push(params.clone());

        tokio::time::sleep(self.delay).await;

        let result = match &self.failure {
            Some(message) => {
                // Partial output must not survive a failed request.
                std::fs::write(&params.output_path, b"partial").unwrap();
                Err(EngineError::EngineFailed(message.clone()))
            }
            None => {
                std::fs::write(&params.output_path, wav_bytes(SAMPLE_RATE)).unwrap();
                Ok(())
            }
        };

        self.log.active.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Transcoder double: the uploads are already WAV, so copy them through.
pub struct CopyTranscoder;

#[async_trait]
impl Transcoder for CopyTranscoder {
    async fn normalize(&self, input: &Path, output: &Path) -> Result<(), TranscodeError> {
        tokio::fs::copy(input, output)
            .await
            .map(|_| ())
            .map_err(|e| TranscodeError::Failed(e.to_string()))
    }
}

/// Bind the router on an ephemeral port and return its base URL.
pub async fn spawn_server(frontend: Frontend, engine: RecordingEngine, work_dir: &Path) -> String {
    spawn_server_with_limit(frontend, engine, work_dir, 8 * 1024 * 1024).await
}

pub async fn spawn_server_with_limit(
    frontend: Frontend,
    engine: RecordingEngine,
    work_dir: &Path,
    body_limit: usize,
) -> String {
    let dirs = WorkDirs::new(work_dir);
    dirs.ensure().unwrap();

    let service = SynthesisService::new(
        EngineGate::new(Box::new(engine)),
        Box::new(CopyTranscoder),
        dirs,
    );
    let app = router(AppState::new(service, frontend), body_limit);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

/// Client that leaves redirects for the test to inspect.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

/// A form carrying the two required fields.
pub fn base_form(text: &str) -> reqwest::multipart::Form {
    reqwest::multipart::Form::new()
        .text("text", text.to_string())
        .part("ref_audio", wav_part("speaker.wav"))
}

pub fn wav_part(file_name: &str) -> reqwest::multipart::Part {
    sized_wav_part(file_name, 2205)
}

pub fn sized_wav_part(file_name: &str, samples: u32) -> reqwest::multipart::Part {
    reqwest::multipart::Part::bytes(wav_bytes(samples))
        .file_name(file_name.to_string())
        .mime_str("audio/wav")
        .unwrap()
}

pub fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
