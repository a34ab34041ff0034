//! Observable timer state

use std::fmt;

/// Lifecycle phase of a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerState {
    /// Not started, or reset
    #[default]
    Idle,
    Running,
    /// Elapsed-time accounting is frozen
    Paused,
}

impl TimerState {
    pub fn label(&self) -> &'static str {
        match self {
            TimerState::Idle => "idle",
            TimerState::Running => "running",
            TimerState::Paused => "paused",
        }
    }
}

/// Point-in-time view of a timer, for display and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSnapshot {
    pub state: TimerState,
    pub elapsed_secs: i64,
    /// `None` when no deadline is configured
    pub remaining_secs: Option<i64>,
    pub triggered: bool,
    /// Whether a trigger is currently scheduled
    pub armed: bool,
}

impl fmt::Display for TimerSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | elapsed {}s", self.state.label(), self.elapsed_secs)?;
        match self.remaining_secs {
            Some(remaining) => write!(f, " | remaining {}s", remaining)?,
            None => write!(f, " | no deadline")?,
        }
        if self.armed {
            write!(f, " | armed")?;
        }
        if self.triggered {
            write!(f, " | triggered")?;
        }
        Ok(())
    }
}
