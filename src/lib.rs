//! clone-tts-server: HTTP front ends for a voice-cloning TTS engine.
//!
//! Uploaded reference clips are normalized with ffmpeg, combined with
//! emotion controls into a keyword set, and handed to a single shared
//! engine one request at a time.

pub mod audio;
pub mod cli;
pub mod emotion;
pub mod engine;
pub mod pipeline;
pub mod request;
pub mod server;
pub mod workspace;
