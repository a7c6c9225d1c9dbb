//! Parsing of the loosely-typed emotion controls submitted by clients.

use serde::{Serialize, Serializer};

/// Number of components in an emotion vector.
pub const EMOTION_DIMENSIONS: usize = 8;

/// Component labels, in the order the engine expects them.
pub const EMOTION_LABELS: [&str; EMOTION_DIMENSIONS] = [
    "happy",
    "angry",
    "sad",
    "afraid",
    "disgusted",
    "melancholic",
    "surprised",
    "calm",
];

/// Weight used when the client sends nothing usable.
pub const DEFAULT_EMOTION_WEIGHT: f32 = 1.0;

const TRUTHY: [&str; 5] = ["1", "true", "yes", "y", "on"];

/// A fixed-length emotion intensity vector.
///
/// Only constructed from at least one valid component, so an all-zero
/// vector is still an explicit request and is forwarded as such.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmotionVector([f64; EMOTION_DIMENSIONS]);

impl EmotionVector {
    /// Parse a comma-separated list such as `"0,0,0,0,0,0,0.45,0"`.
    ///
    /// Any token that is not a number makes the whole vector absent, so a
    /// value can never shift into a neighbouring slot. `NaN` components are
    /// dropped. Short inputs are zero-padded on the right and long inputs
    /// are truncated.
    pub fn parse(input: &str) -> Option<Self> {
        let mut values = Vec::with_capacity(EMOTION_DIMENSIONS);
        for token in input.split(',') {
            let value = token.trim().parse::<f64>().ok()?;
            if !value.is_nan() {
                values.push(value);
            }
        }

        if values.is_empty() {
            return None;
        }

        let mut components = [0.0; EMOTION_DIMENSIONS];
        for (slot, value) in components.iter_mut().zip(values) {
            *slot = value;
        }

        Some(Self(components))
    }

    pub fn components(&self) -> &[f64; EMOTION_DIMENSIONS] {
        &self.0
    }
}

impl From<[f64; EMOTION_DIMENSIONS]> for EmotionVector {
    fn from(components: [f64; EMOTION_DIMENSIONS]) -> Self {
        Self(components)
    }
}

impl Serialize for EmotionVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl std::fmt::Display for EmotionVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, "]")
    }
}

/// Interpret a form value as a boolean flag.
///
/// The value is matched as sent, so surrounding whitespace makes it false.
pub fn parse_flag(input: Option<&str>) -> bool {
    input.is_some_and(|value| TRUTHY.iter().any(|token| value.eq_ignore_ascii_case(token)))
}

/// Resolve the emotion weight from one or more redundant controls.
///
/// The first non-empty candidate wins, even if it does not parse. The
/// result is always within `[0.0, 1.0]`.
pub fn parse_weight<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> f32 {
    let raw = candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty());

    let weight = raw
        .and_then(|value| value.parse::<f32>().ok())
        .filter(|value| !value.is_nan())
        .unwrap_or(DEFAULT_EMOTION_WEIGHT);

    weight.clamp(0.0, 1.0)
}
