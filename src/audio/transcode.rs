//! ffmpeg-backed transcoding to the engine's canonical input format.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Sample rate of every normalized asset.
pub const TARGET_SAMPLE_RATE: u32 = 22_050;

/// Channel count of every normalized asset.
pub const TARGET_CHANNELS: u16 = 1;

/// Errors that can occur while normalizing uploaded audio.
#[derive(Error, Debug)]
pub enum TranscodeError {
    #[error("Failed to start transcoder {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Transcoder failed: {0}")]
    Failed(String),
}

/// Converts arbitrary uploaded audio into PCM mono 22.05 kHz WAV.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Write a normalized copy of `input` to `output`.
    async fn normalize(&self, input: &Path, output: &Path) -> Result<(), TranscodeError>;
}

/// Runs an external ffmpeg binary.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    program: PathBuf,
}

impl FfmpegTranscoder {
    /// Create a transcoder using the given ffmpeg executable.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Arguments for a single conversion.
    pub fn args(input: &Path, output: &Path) -> Vec<OsString> {
        let sample_rate = TARGET_SAMPLE_RATE.to_string();
        let channels = TARGET_CHANNELS.to_string();
        vec![
            "-y".into(),
            "-i".into(),
            input.as_os_str().to_owned(),
            "-acodec".into(),
            "pcm_s16le".into(),
            "-ac".into(),
            channels.into(),
            "-ar".into(),
            sample_rate.into(),
            output.as_os_str().to_owned(),
        ]
    }
}


#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn normalize(&self, input: &Path, output: &Path) -> Result<(), TranscodeError> {
        debug!(
            program = %self.program.display(),
            input = %input.display(),
            output = %output.display(),
            "normalizing audio"
        );

        let result = Command::new(&self.program)
            .args(Self::args(input, output))
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| TranscodeError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        if !result.status.success() {
            return Err(TranscodeError::Failed(diagnostic(
                &result.stderr,
                &result.stdout,
                result.status,
            )));
        }

        Ok(())
    }
}

/// Pick the most useful description of a failed run.
fn diagnostic(stderr: &[u8], stdout: &[u8], status: std::process::ExitStatus) -> String {
    [stderr, stdout]
        .into_iter()
        .map(|bytes| String::from_utf8_lossy(bytes).trim().to_string())
        .find(|text| !text.is_empty())
        .unwrap_or_else(|| format!("exited with {status}"))
}
