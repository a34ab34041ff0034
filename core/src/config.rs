//! Application configuration
//!
//! This module re-exports shared types from hourglass-types and provides
//! persistence for `HourglassConfig`.

pub use hourglass_types::{ClockSource, HourglassConfig};

use crate::error::ConfigError;

const APP_NAME: &str = "hourglass";
const CONFIG_NAME: &str = "config";

/// Extension trait for HourglassConfig persistence
pub trait HourglassConfigExt: Sized {
    fn try_load() -> Result<Self, ConfigError>;
    fn save(&self) -> Result<(), ConfigError>;
}

impl HourglassConfigExt for HourglassConfig {
    fn try_load() -> Result<Self, ConfigError> {
        let config: HourglassConfig = confy::load(APP_NAME, CONFIG_NAME)?;
        config
            .validate()
            .map_err(|reason| ConfigError::Invalid { reason })?;
        Ok(config)
    }

    fn save(&self) -> Result<(), ConfigError> {
        self.validate()
            .map_err(|reason| ConfigError::Invalid { reason })?;
        confy::store(APP_NAME, CONFIG_NAME, self).map_err(ConfigError::Save)
    }
}
