//! Emotion control normalization.
//!
//! Clients send the emotion weight, the boolean switches and the emotion
//! vector as free-form strings. This module turns them into well-typed
//! values with the ranges and lengths the engine expects.

mod normalize;

pub use normalize::{
    DEFAULT_EMOTION_WEIGHT, EMOTION_DIMENSIONS, EMOTION_LABELS, EmotionVector, parse_flag,
    parse_weight,
};
