//! Submission intake: raw form fields in, validated requests out.

mod types;
mod validate;

pub use types::{RawSubmission, SynthesisRequest, UploadedFile};
pub use validate::{ALLOWED_EXTENSIONS, ValidationError, allowed_file, validate};
