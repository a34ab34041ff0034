use hourglass_core::{HourglassConfig, SchedulerError, Timer};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Holds all shared state for the CLI application.
/// This is a lightweight container - timer logic lives in hourglass-core.
#[derive(Clone)]
pub struct CliContext {
    pub config: Arc<RwLock<HourglassConfig>>,
    pub timer: Arc<Mutex<Timer>>,
}

impl CliContext {
    /// Must be called from within a tokio runtime.
    pub fn new(config: HourglassConfig) -> Result<Self, SchedulerError> {
        let timer = Timer::tokio(config.clock)?;
        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            timer: Arc::new(Mutex::new(timer)),
        })
    }
}
