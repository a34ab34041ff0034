//! Shared configuration types for hourglass
//!
//! This crate contains serializable configuration types that are shared between
//! the timer core (hourglass-core) and its hosts (hourglass-cli).

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Clock Selection
// ─────────────────────────────────────────────────────────────────────────────

/// Which time source a timer measures elapsed seconds against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockSource {
    /// System wall clock. Adjustments to system time during a run are not compensated.
    #[default]
    Wall,
    /// Monotonic clock, immune to system time changes
    Monotonic,
}

impl ClockSource {
    /// Display label used by hosts
    pub fn label(&self) -> &'static str {
        match self {
            ClockSource::Wall => "wall",
            ClockSource::Monotonic => "monotonic",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Application Config
// ─────────────────────────────────────────────────────────────────────────────

/// Persisted host configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HourglassConfig {
    /// Time source for new timers
    pub clock: ClockSource,

    /// Target used when a timer is started without an explicit deadline.
    /// `None` starts the timer counting with no destination.
    pub default_target_secs: Option<i64>,

    /// Enable debug-level output for hourglass crates
    pub debug_logging: bool,
}

impl HourglassConfig {
    /// Check settings that serde alone cannot express.
    pub fn validate(&self) -> Result<(), &'static str> {
        if matches!(self.default_target_secs, Some(secs) if secs < 0) {
            return Err("default_target_secs must not be negative");
        }
        Ok(())
    }
}
