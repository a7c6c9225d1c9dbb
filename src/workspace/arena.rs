//! Request-scoped file arena.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

/// Errors that can occur while managing request files.
#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("Invalid file name: {0}")]
    InvalidName(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Directories shared by all requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkDirs {
    upload_dir: PathBuf,
    output_dir: PathBuf,
}

impl WorkDirs {
    /// Use `<root>/uploads` and `<root>/outputs`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            upload_dir: root.join("uploads"),
            output_dir: root.join("outputs"),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Create both directories if they do not exist.
    pub fn ensure(&self) -> Result<(), WorkspaceError> {
        std::fs::create_dir_all(&self.upload_dir)?;
        std::fs::create_dir_all(&self.output_dir)?;
        Ok(())
    }

    /// Resolve a generated file name inside the output directory.
    pub fn output_file(&self, name: &str) -> Result<PathBuf, WorkspaceError> {
        validate_name(name)?;
        Ok(self.output_dir.join(name))
    }
}

/// Reject names that could escape their directory.
pub fn validate_name(name: &str) -> Result<(), WorkspaceError> {
    if name.is_empty() {
        return Err(WorkspaceError::InvalidName(
            "Name cannot be empty".to_string(),
        ));
    }

    // Prevent path traversal
    if name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(WorkspaceError::InvalidName(
            "Name cannot contain path separators".to_string(),
        ));
    }

    Ok(())
}

/// Reduce an untrusted upload name to `[A-Za-z0-9._-]`.
///
/// Whitespace and path separators become underscores and leading dots
/// are stripped, so the result can never name a parent or hidden file.
pub fn sanitize_file_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
            out.push(c);
        } else if c.is_whitespace() || c == '/' || c == '\\' {
            out.push('_');
        }
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Owns every file created on behalf of a single request.
///
/// Files are deleted when the arena is dropped, on success and failure
/// alike. The generated output survives only if [`persist_output`] was
/// called.
///
/// [`persist_output`]: RequestArena::persist_output
#[derive(Debug)]
pub struct RequestArena {
    token: String,
    upload_dir: PathBuf,
    output_path: PathBuf,
    uploads: Vec<PathBuf>,
    keep_uploads: bool,
    keep_output: bool,
}

impl RequestArena {
    /// Open an arena under a fresh unique token.
    pub fn open(dirs: &WorkDirs, keep_uploads: bool) -> Self {
        let token = Uuid::new_v4().simple().to_string();
        let output_path = dirs.output_dir.join(format!("{token}_gen.wav"));

        Self {
            token,
            upload_dir: dirs.upload_dir.clone(),
            output_path,
            uploads: Vec::new(),
            keep_uploads,
            keep_output: false,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Path for a raw upload, e.g. `<token>_ref_voice.mp3`.
    pub fn upload_path(&mut self, role: &str, file_name: &str) -> PathBuf {
        let name = format!("{}_{role}_{}", self.token, sanitize_file_name(file_name));
        self.track(name)
    }

    /// Path for a normalized asset, e.g. `<token>_ref.wav`.
    pub fn normalized_path(&mut self, role: &str) -> PathBuf {
        let name = format!("{}_{role}.wav", self.token);
        self.track(name)
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Keep the generated output after the arena is dropped.
    pub fn persist_output(&mut self) -> PathBuf {
        self.keep_output = true;
        self.output_path.clone()
    }

    fn track(&mut self, name: String) -> PathBuf {
        let path = self.upload_dir.join(name);
        self.uploads.push(path.clone());
        path
    }
}

impl Drop for RequestArena {
    fn drop(&mut self) {
        let mut doomed: Vec<&Path> = Vec::new();
        if !self.keep_uploads {
            doomed.extend(self.uploads.iter().map(PathBuf::as_path));
        }
        if !self.keep_output {
            doomed.push(&self.output_path);
        }

        for path in doomed {
            match std::fs::remove_file(path) {
                Ok(()) => debug!(token = %self.token, path = %path.display(), "removed request file"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(token = %self.token, path = %path.display(), error = %e, "failed to remove request file")
                }
            }
        }
    }
}
