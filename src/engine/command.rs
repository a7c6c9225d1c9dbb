//! Subprocess adapter: one engine process per inference call.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::types::{EngineError, EngineHealth, InferenceParameters};
use super::{SynthesisEngine, ensure_output};

/// Runs a program that reads the inference keywords as JSON on stdin and
/// writes the waveform to `output_path`.
pub struct CommandEngine {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandEngine {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

#[async_trait]
impl SynthesisEngine for CommandEngine {
    fn describe(&self) -> String {
        format!("command {}", self.program.display())
    }

    async fn health(&self) -> Result<EngineHealth, EngineError> {
        // The process only exists for the duration of a call.
        Ok(EngineHealth {
            status: "on-demand".to_string(),
            model: None,
            device: None,
        })
    }

    async fn infer(&self, params: &InferenceParameters) -> Result<(), EngineError> {
        let input = serde_json::to_vec(params)
            .map_err(|e| EngineError::InvalidResponse(e.to_string()))?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| EngineError::Spawn(format!("{}: {e}", self.program.display())))?;

        if let Some(mut stdin) = child.stdin.take() {
            // A program that exits without reading stdin is judged by its exit status.
            if let Err(e) = stdin.write_all(&input).await
                && e.kind() != std::io::ErrorKind::BrokenPipe
            {
                return Err(e.into());
            }
            drop(stdin);
        }

        let output = child.wait_with_output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            return Err(EngineError::EngineFailed(if stderr.is_empty() {
                format!("exited with {}", output.status)
            } else {
                stderr.to_string()
            }));
        }

        ensure_output(&params.output_path).await
    }
}
