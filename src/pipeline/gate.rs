//! Exclusive access to the engine.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use crate::engine::{EngineError, InferenceParameters, SynthesisEngine};

/// Errors raised while passing through the gate.
#[derive(Error, Debug)]
pub enum GateError {
    #[error("Engine busy: no slot within {0:?}")]
    Busy(Duration),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Owns the engine handle and serializes every call into it.
///
/// Waiters are served in the order they started waiting. Without a wait
/// limit a caller blocks until the engine is free, however long that is.
pub struct EngineGate {
    engine: Arc<Mutex<Box<dyn SynthesisEngine>>>,
    description: String,
    wait_limit: Option<Duration>,
}

impl EngineGate {
    pub fn new(engine: Box<dyn SynthesisEngine>) -> Self {
        let description = engine.describe();
        Self {
            engine: Arc::new(Mutex::new(engine)),
            description,
            wait_limit: None,
        }
    }

    /// Give up with [`GateError::Busy`] after waiting this long.
    pub fn with_wait_limit(mut self, limit: Option<Duration>) -> Self {
        self.wait_limit = limit;
        self
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// True while an inference is running.
    pub fn is_busy(&self) -> bool {
        self.engine.try_lock().is_err()
    }

    /// Wait for exclusive use of the engine.
    ///
    /// The returned lease does not borrow the gate, so it can be moved into
    /// a spawned task and keep the engine locked after the caller is gone.
    pub async fn acquire(&self) -> Result<EngineLease, GateError> {
        let lock = Arc::clone(&self.engine).lock_owned();
        let guard = match self.wait_limit {
            Some(limit) => tokio::time::timeout(limit, lock)
                .await
                .map_err(|_| GateError::Busy(limit))?,
            None => lock.await,
        };
        debug!("engine acquired");
        Ok(EngineLease { engine: guard })
    }
}

/// Exclusive use of the engine; released on drop.
pub struct EngineLease {
    engine: OwnedMutexGuard<Box<dyn SynthesisEngine>>,
}

impl EngineLease {
    pub async fn infer(&self, params: &InferenceParameters) -> Result<(), GateError> {
        Ok(self.engine.infer(params).await?)
    }
}
