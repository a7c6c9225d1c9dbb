//! CLI argument parsing and server configuration.

mod args;

pub use args::{Args, ConfigError, EngineSource, Frontend, init_tracing};
