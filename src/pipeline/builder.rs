//! Composition of engine keywords from a validated request.

use std::path::Path;

use crate::engine::InferenceParameters;
use crate::request::SynthesisRequest;

/// Build the inference keywords for one request.
///
/// Always sets the speaker prompt, text, output path, emotion prompt
/// (possibly `None`), weight and random flag. The emotion vector is added
/// only when present. Text-derived emotion is added only when enabled,
/// and its descriptor only when non-empty.
pub fn build_parameters(
    request: &SynthesisRequest,
    reference: &Path,
    emotion: Option<&Path>,
    output: &Path,
) -> InferenceParameters {
    let mut params = InferenceParameters::new(reference, request.text.clone(), output)
        .with_emo_alpha(request.emo_alpha)
        .with_use_random(request.use_random);

    if let Some(path) = emotion {
        params = params.with_emo_audio(path);
    }

    if let Some(vector) = request.emo_vector {
        params = params.with_emo_vector(vector);
    }

    if request.use_emo_text {
        let descriptor = request.emo_text.trim();
        let descriptor = (!descriptor.is_empty()).then(|| descriptor.to_string());
        params = params.with_emo_text(descriptor);
    }

    params
}
