//! Synthesis pipeline orchestrator.
//!
//! This module provides the service that both HTTP front ends call:
//! validation, audio normalization, keyword composition and the single
//! serialized engine call.

mod builder;
mod gate;
mod service;

pub use builder::build_parameters;
pub use gate::{EngineGate, EngineLease, GateError};
pub use service::{ErrorKind, SynthesisError, SynthesisOutput, SynthesisService};
