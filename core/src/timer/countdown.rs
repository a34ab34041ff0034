//! Timer state machine
//!
//! Elapsed time is `now - started_at - accumulated_paused`, minus the length of
//! the current pause when paused. At most one trigger is scheduled at a time;
//! every arming path cancels the previous trigger first.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hourglass_types::ClockSource;
use tracing::{debug, trace};

use super::state::{TimerSnapshot, TimerState};
use crate::clock::{AnyClock, Clock};
use crate::error::SchedulerError;
use crate::scheduler::{Scheduler, TokioScheduler, TriggerHandle};

/// Action invoked when a timer reaches its target
pub type Callback = Arc<dyn Fn() + Send + Sync + 'static>;

/// State shared with scheduled triggers
#[derive(Default)]
struct FireState {
    callback: Option<Callback>,
    triggered: bool,
    /// Bumped on every arm and disarm. A trigger carrying an older value is stale.
    generation: u64,
    armed: bool,
}

fn lock(shared: &Mutex<FireState>) -> MutexGuard<'_, FireState> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Body of every scheduled trigger
fn fire(shared: &Mutex<FireState>, generation: u64) {
    let callback = {
        let mut state = lock(shared);
        if state.generation != generation {
            trace!(generation, current = state.generation, "Ignoring superseded trigger");
            return;
        }
        state.armed = false;
        state.triggered = true;
        state.callback.clone()
    };

    debug!(generation, "Timer triggered");

    // Invoked unlocked so the callback may query the timer.
    if let Some(callback) = callback {
        callback();
    }
}

/// Countdown that can be paused, resumed and re-targeted
///
/// Every operation is safe to call in any state: calls that make no sense
/// (pausing an idle timer, resuming a running one) are ignored.
pub struct Timer<C = AnyClock, S = TokioScheduler> {
    clock: C,
    scheduler: S,
    shared: Arc<Mutex<FireState>>,
    pending: Option<TriggerHandle>,

    /// Desired elapsed seconds before firing. `None` = never fire.
    target: Option<i64>,
    started_at: Option<i64>,
    paused_at: Option<i64>,
    accumulated_paused: i64,
}

impl Timer<AnyClock, TokioScheduler> {
    /// Timer on the current tokio runtime, reading the configured clock
    pub fn tokio(source: ClockSource) -> Result<Self, SchedulerError> {
        Ok(Self::new(
            AnyClock::from_source(source),
            TokioScheduler::current()?,
        ))
    }
}

impl<C, S> Timer<C, S> {
    /// Whether the callback has fired since the last start
    pub fn has_triggered(&self) -> bool {
        lock(&self.shared).triggered
    }

    /// Whether a trigger is scheduled and has not fired yet
    pub fn is_armed(&self) -> bool {
        lock(&self.shared).armed
    }

    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    pub fn target_secs(&self) -> Option<i64> {
        self.target
    }

    pub fn state(&self) -> TimerState {
        match (self.started_at, self.paused_at) {
            (None, _) => TimerState::Idle,
            (Some(_), None) => TimerState::Running,
            (Some(_), Some(_)) => TimerState::Paused,
        }
    }

    fn disarm(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.cancel();
        }
        let mut state = lock(&self.shared);
        state.generation += 1;
        state.armed = false;
    }
}

impl<C: Clock, S: Scheduler> Timer<C, S> {
    pub fn new(clock: C, scheduler: S) -> Self {
        Self {
            clock,
            scheduler,
            shared: Arc::new(Mutex::new(FireState::default())),
            pending: None,
            target: None,
            started_at: None,
            paused_at: None,
            accumulated_paused: 0,
        }
    }

    /// Reset, then begin counting from now.
    ///
    /// No trigger is armed until `update` sets a target.
    pub fn start<F>(&mut self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.reset();

        let now = self.clock.now_secs();
        self.started_at = Some(now);
        lock(&self.shared).callback = Some(Arc::new(callback));

        debug!(started_at = now, "Timer started");
    }

    /// Freeze elapsed-time accounting and cancel any pending trigger
    pub fn pause(&mut self) {
        if self.started_at.is_none() || self.paused_at.is_some() {
            trace!(state = self.state().label(), "Ignoring pause");
            return;
        }

        let now = self.clock.now_secs();
        self.paused_at = Some(now);
        self.disarm();

        debug!(paused_at = now, elapsed_secs = self.elapsed(), "Timer paused");
    }

    /// Continue counting; re-arms the trigger if it has not fired yet
    pub fn resume(&mut self) {
        let Some(paused_at) = self.paused_at.filter(|_| self.started_at.is_some()) else {
            trace!(state = self.state().label(), "Ignoring resume");
            return;
        };

        let now = self.clock.now_secs();
        self.accumulated_paused += now - paused_at;
        self.paused_at = None;

        debug!(
            paused_secs = now - paused_at,
            total_paused_secs = self.accumulated_paused,
            "Timer resumed"
        );

        if let Some(target) = self.target {
            if !self.has_triggered() {
                self.arm(target);
            }
        }
    }

    /// Set the target elapsed time, or `None` to never fire.
    ///
    /// While running the trigger is (re-)armed immediately; while paused arming
    /// waits for `resume`. This does not look at whether the callback already
    /// fired, so a triggered timer can be extended and fire again.
    pub fn update(&mut self, seconds: Option<i64>) {
        if self.started_at.is_none() {
            trace!(target_secs = ?seconds, "Ignoring update on idle timer");
            return;
        }

        self.target = seconds;

        match seconds {
            Some(target) if self.paused_at.is_none() => self.arm(target),
            Some(target) => {
                debug!(target_secs = target, "Target updated while paused; arming deferred")
            }
            None => {
                self.disarm();
                debug!("Target cleared; timer counting without deadline");
            }
        }
    }

    /// Seconds counted since start, excluding time spent paused. 0 when idle.
    pub fn elapsed(&self) -> i64 {
        let Some(started_at) = self.started_at else {
            return 0;
        };

        let now = self.clock.now_secs();
        let mut elapsed = now - started_at - self.accumulated_paused;
        if let Some(paused_at) = self.paused_at {
            elapsed -= now - paused_at;
        }
        elapsed
    }

    /// Seconds until the target, negative when overdue. `None` without a target.
    pub fn remaining_secs(&self) -> Option<i64> {
        self.target.map(|target| target.saturating_sub(self.elapsed()))
    }

    /// Cancel any pending trigger and return to idle
    pub fn reset(&mut self) {
        self.disarm();

        {
            let mut state = lock(&self.shared);
            state.callback = None;
            state.triggered = false;
        }

        self.target = None;
        self.started_at = None;
        self.paused_at = None;
        self.accumulated_paused = 0;

        trace!("Timer reset");
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            state: self.state(),
            elapsed_secs: self.elapsed(),
            remaining_secs: self.remaining_secs(),
            triggered: self.has_triggered(),
            armed: self.is_armed(),
        }
    }

    fn arm(&mut self, target: i64) {
        self.disarm();

        let delay_secs = target.saturating_sub(self.elapsed());
        let generation = {
            let mut state = lock(&self.shared);
            state.armed = true;
            state.generation
        };

        let shared = Arc::clone(&self.shared);
        let handle = self
            .scheduler
            .schedule(delay_secs, Box::new(move || fire(&shared, generation)));
        self.pending = Some(handle);

        debug!(target_secs = target, delay_secs, generation, "Trigger armed");
    }
}

impl<C, S> Drop for Timer<C, S> {
    fn drop(&mut self) {
        self.disarm();
    }
}

impl<C, S> fmt::Debug for Timer<C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer")
            .field("state", &self.state())
            .field("target", &self.target)
            .field("started_at", &self.started_at)
            .field("paused_at", &self.paused_at)
            .field("accumulated_paused", &self.accumulated_paused)
            .field("triggered", &self.has_triggered())
            .field("armed", &self.is_armed())
            .finish()
    }
}
