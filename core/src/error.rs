//! Error types for hourglass hosts
//!
//! Timer operations themselves never fail; these cover the host surfaces around them.

use thiserror::Error;

/// Errors while creating a scheduler
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("no tokio runtime is running on this thread")]
    NoRuntime(#[source] tokio::runtime::TryCurrentError),
}

/// Errors during configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration")]
    Load(#[from] confy::ConfyError),

    #[error("failed to save configuration")]
    Save(#[source] confy::ConfyError),

    #[error("invalid configuration: {reason}")]
    Invalid { reason: &'static str },
}
