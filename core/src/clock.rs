//! Time sources for timers
//!
//! All clocks report whole seconds. Elapsed-time math only ever subtracts two
//! readings from the same clock, so the epoch is arbitrary.
//!
//! - `SystemClock`: wall clock (default). System time changes during a run are not compensated.
//! - `MonotonicClock`: seconds since construction, driven by tokio's clock
//! - `ManualClock`: advanced explicitly by the host (or a test)

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use hourglass_types::ClockSource;
use tokio::time::Instant;

/// Reads the current time with one-second resolution
pub trait Clock {
    fn now_secs(&self) -> i64;
}

/// Round milliseconds to the nearest whole second
fn round_millis(millis: i64) -> i64 {
    (millis + 500).div_euclid(1000)
}

/// Wall clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_secs(&self) -> i64 {
        round_millis(Utc::now().timestamp_millis())
    }
}

/// Monotonic clock counting seconds since it was created
///
/// Uses `tokio::time::Instant`, so paused test time (`start_paused`) drives it.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_secs(&self) -> i64 {
        let millis = self.origin.elapsed().as_millis();
        round_millis(i64::try_from(millis).unwrap_or(i64::MAX - 500))
    }
}

/// Host-driven clock; clones share the same reading
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(start_secs: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(start_secs)),
        }
    }

    pub fn set(&self, secs: i64) {
        self.now.store(secs, Ordering::SeqCst);
    }

    /// Move the clock forward (or backward, for negative values)
    pub fn advance(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_secs(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Clock chosen at runtime from configuration
#[derive(Debug, Clone, Copy)]
pub enum AnyClock {
    System(SystemClock),
    Monotonic(MonotonicClock),
}

impl AnyClock {
    pub fn from_source(source: ClockSource) -> Self {
        match source {
            ClockSource::Wall => AnyClock::System(SystemClock),
            ClockSource::Monotonic => AnyClock::Monotonic(MonotonicClock::new()),
        }
    }
}

impl Clock for AnyClock {
    fn now_secs(&self) -> i64 {
        match self {
            AnyClock::System(clock) => clock.now_secs(),
            AnyClock::Monotonic(clock) => clock.now_secs(),
        }
    }
}
