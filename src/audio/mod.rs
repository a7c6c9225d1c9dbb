//! Audio normalization for uploaded reference clips.
//!
//! The engine only accepts PCM mono 22.05 kHz WAV, so every upload goes
//! through a [`Transcoder`] first.

mod transcode;

pub use transcode::{
    FfmpegTranscoder, TARGET_CHANNELS, TARGET_SAMPLE_RATE, TranscodeError, Transcoder,
};

#[cfg(test)]
pub use transcode::MockTranscoder;

/// Read the duration of a WAV file in seconds.
pub fn wav_duration(path: &std::path::Path) -> Option<f32> {
    let reader = hound::WavReader::open(path).ok()?;
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return None;
    }
    Some(reader.duration() as f32 / spec.sample_rate as f32)
}
