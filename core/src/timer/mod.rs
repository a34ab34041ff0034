//! Pause-aware countdown timer
//!
//! This module provides:
//! - **Timer**: measures elapsed time from `start`, excluding time spent paused,
//!   and fires a callback once the configured target is reached
//! - **State**: lifecycle phase and snapshots for display
//!
//! # Lifecycle
//!
//! ```text
//!   idle ──start──▶ running ◀──resume── paused
//!    ▲                 │ └─────pause─────▶ │
//!    └──────reset──────┴───────────────────┘
//! ```
//!
//! `update` arms, re-arms or disarms the trigger in either running or paused
//! state. Firing marks the timer triggered but it keeps counting, and a later
//! `update` can arm it again.

mod countdown;
mod state;


pub use countdown::{Callback, Timer};
pub use state::{TimerSnapshot, TimerState};
