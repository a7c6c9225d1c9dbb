//! Filesystem layout for uploads and generated audio.
//!
//! Every request works inside a [`RequestArena`] keyed by a unique token,
//! which keeps concurrent requests from colliding and removes their
//! intermediate files once the request is finished.

mod arena;

pub use arena::{RequestArena, WorkDirs, WorkspaceError, sanitize_file_name, validate_name};

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn dirs_in(temp_dir: &TempDir) -> WorkDirs {
        let dirs = WorkDirs::new(temp_dir.path());
        dirs.ensure().unwrap();
        dirs
    }

    // ===========================================
    // WorkDirs tests
    // ===========================================

    #[test]
    fn test_work_dirs_layout() {
        let dirs = WorkDirs::new("/srv/tts");
        assert_eq!(dirs.upload_dir(), PathBuf::from("/srv/tts/uploads"));
        assert_eq!(dirs.output_dir(), PathBuf::from("/srv/tts/outputs"));
    }

    #[test]
    fn test_work_dirs_ensure_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let dirs = dirs_in(&temp_dir);
        assert!(dirs.upload_dir().is_dir());
        assert!(dirs.output_dir().is_dir());
    }

    #[test]
    fn test_output_file_rejects_traversal() {
        let dirs = WorkDirs::new("/srv/tts");
        assert!(dirs.output_file("../secrets").is_err());
        assert!(dirs.output_file("a/b.wav").is_err());
        assert!(dirs.output_file("").is_err());
        assert_eq!(
            dirs.output_file("abc_gen.wav").unwrap(),
            PathBuf::from("/srv/tts/outputs/abc_gen.wav")
        );
    }

    // ===========================================
    // sanitize_file_name tests
    // ===========================================

    #[test]
    fn test_sanitize_keeps_safe_names() {
        assert_eq!(sanitize_file_name("voice-01_a.wav"), "voice-01_a.wav");
    }

    #[test]
    fn test_sanitize_strips_paths_and_spaces() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "etc_passwd");
        assert_eq!(sanitize_file_name("my voice.mp3"), "my_voice.mp3");
    }

    #[test]
    fn test_sanitize_drops_non_ascii() {
        assert_eq!(sanitize_file_name("声音.wav"), "wav");
        assert_eq!(sanitize_file_name("???"), "upload");
    }

    // ===========================================
    // RequestArena tests
    // ===========================================

    #[test]
    fn test_arena_paths_are_token_namespaced() {
        let temp_dir = TempDir::new().unwrap();
        let dirs = dirs_in(&temp_dir);
        let mut arena = RequestArena::open(&dirs, false);
        let token = arena.token().to_string();

        assert_eq!(token.len(), 32);
        assert_eq!(
            arena.upload_path("ref", "my voice.mp3"),
            dirs.upload_dir().join(format!("{token}_ref_my_voice.mp3"))
        );
        assert_eq!(
            arena.normalized_path("emo"),
            dirs.upload_dir().join(format!("{token}_emo.wav"))
        );
        assert_eq!(
            arena.output_path(),
            dirs.output_dir().join(format!("{token}_gen.wav"))
        );
    }

    #[test]
    fn test_arena_tokens_are_unique() {
        let dirs = WorkDirs::new("/srv/tts");
        let a = RequestArena::open(&dirs, false);
        let b = RequestArena::open(&dirs, false);
        assert_ne!(a.token(), b.token());
    }

    #[test]
    fn test_arena_drop_removes_everything_by_default() {
        let temp_dir = TempDir::new().unwrap();
        let dirs = dirs_in(&temp_dir);
        let mut arena = RequestArena::open(&dirs, false);

        let upload = arena.upload_path("ref", "a.wav");
        let normalized = arena.normalized_path("ref");
        let output = arena.output_path().to_path_buf();
        for path in [&upload, &normalized, &output] {
            std::fs::write(path, b"data").unwrap();
        }

        drop(arena);

        assert!(!upload.exists());
        assert!(!normalized.exists());
        assert!(!output.exists());
    }

    #[test]
    fn test_arena_persisted_output_survives() {
        let temp_dir = TempDir::new().unwrap();
        let dirs = dirs_in(&temp_dir);
        let mut arena = RequestArena::open(&dirs, false);

        let upload = arena.upload_path("ref", "a.wav");
        std::fs::write(&upload, b"data").unwrap();
        std::fs::write(arena.output_path(), b"RIFF").unwrap();
        let output = arena.persist_output();

        drop(arena);

        assert!(!upload.exists());
        assert!(output.exists());
    }

    #[test]
    fn test_arena_keep_uploads() {
        let temp_dir = TempDir::new().unwrap();
        let dirs = dirs_in(&temp_dir);
        let mut arena = RequestArena::open(&dirs, true);

        let upload = arena.upload_path("ref", "a.wav");
        std::fs::write(&upload, b"data").unwrap();

        drop(arena);

        assert!(upload.exists());
    }

    #[test]
    fn test_arena_drop_tolerates_missing_files() {
        let temp_dir = TempDir::new().unwrap();
        let dirs = dirs_in(&temp_dir);
        let mut arena = RequestArena::open(&dirs, false);
        let _ = arena.upload_path("ref", "never-written.wav");
        drop(arena);
    }
}
