//! CLI argument definitions and parsing.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use thiserror::Error;

/// HTTP front ends for a voice-cloning text-to-speech engine.
#[derive(Parser, Debug)]
#[command(name = "clone-tts-server")]
#[command(about = "Voice cloning with emotion control over HTTP")]
#[command(version)]
pub struct Args {
    /// Front end to serve: "form" (HTML page) or "api" (multipart in, WAV out)
    #[arg(short, long, value_enum, default_value = "api")]
    pub frontend: Frontend,

    /// Address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on [default: 7860 for form, 8000 for api]
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Directory holding uploads/ and outputs/
    #[arg(short, long, default_value = ".")]
    pub work_dir: PathBuf,

    /// ffmpeg executable used to normalize uploads
    #[arg(long, default_value = "ffmpeg")]
    pub ffmpeg: PathBuf,

    /// Base URL of a model worker (POST /infer)
    #[arg(long, conflicts_with = "engine_command")]
    pub engine_url: Option<String>,

    /// Program run once per inference, fed JSON keywords on stdin
    #[arg(long)]
    pub engine_command: Option<PathBuf>,

    /// Extra argument for --engine-command (repeatable)
    #[arg(long = "engine-arg", allow_hyphen_values = true)]
    pub engine_args: Vec<String>,

    /// Give up waiting for the engine after this many seconds (default: wait forever)
    #[arg(long)]
    pub gate_timeout_secs: Option<u64>,

    /// Maximum request body size in MiB
    #[arg(long, default_value = "64")]
    pub max_upload_mb: usize,

    /// Keep raw and normalized uploads after each request
    #[arg(long)]
    pub keep_uploads: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Front end selection.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Frontend {
    /// Multipart request, WAV or JSON error response
    #[default]
    #[value(name = "api")]
    Api,

    /// HTML form with flash messages and an audio player
    #[value(name = "form")]
    Form,
}

impl Frontend {
    /// Returns the CLI argument string for this front end.
    pub fn as_str(&self) -> &'static str {
        match self {
            Frontend::Api => "api",
            Frontend::Form => "form",
        }
    }

    /// Returns the default listening port for this front end.
    pub fn port(&self) -> u16 {
        match self {
            Frontend::Api => 8000,
            Frontend::Form => 7860,
        }
    }
}

/// Where inference requests go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineSource {
    Http(String),
    Command { program: PathBuf, args: Vec<String> },
}

/// Errors in the argument combination.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("No engine configured: pass --engine-url or --engine-command")]
    MissingEngine,

    #[error("Invalid engine URL: {0}. Expected http://host:port")]
    InvalidEngineUrl(String),

    #[error("--engine-arg requires --engine-command")]
    DanglingEngineArgs,

    #[error("--gate-timeout-secs must be greater than zero")]
    ZeroGateTimeout,

    #[error("--max-upload-mb must be greater than zero")]
    ZeroUploadLimit,
}

impl Args {
    /// Resolved listening port.
    pub fn port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.frontend.port())
    }

    /// Resolve the engine adapter from the arguments.
    pub fn engine(&self) -> Result<EngineSource, ConfigError> {
        if let Some(url) = &self.engine_url {
            if !self.engine_args.is_empty() {
                return Err(ConfigError::DanglingEngineArgs);
            }
            let url = url.trim();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidEngineUrl(url.to_string()));
            }
            return Ok(EngineSource::Http(url.to_string()));
        }

        match &self.engine_command {
            Some(program) => Ok(EngineSource::Command {
                program: program.clone(),
                args: self.engine_args.clone(),
            }),
            None if !self.engine_args.is_empty() => Err(ConfigError::DanglingEngineArgs),
            None => Err(ConfigError::MissingEngine),
        }
    }

    /// Bounded wait on the engine gate, if configured.
    pub fn gate_timeout(&self) -> Result<Option<Duration>, ConfigError> {
        match self.gate_timeout_secs {
            Some(0) => Err(ConfigError::ZeroGateTimeout),
            Some(secs) => Ok(Some(Duration::from_secs(secs))),
            None => Ok(None),
        }
    }

    /// Request body limit in bytes.
    pub fn body_limit(&self) -> Result<usize, ConfigError> {
        match self.max_upload_mb {
            0 => Err(ConfigError::ZeroUploadLimit),
            mb => Ok(mb.saturating_mul(1024 * 1024)),
        }
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `default_filter`.
pub fn init_tracing(default_filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
