//! One-shot delayed task scheduling
//!
//! A `Scheduler` runs a task once after a delay given in whole seconds.
//! Delays of zero or less run on the next turn of the event loop instead of being rejected.
//! Every scheduled task comes back as a `TriggerHandle` that can cancel it.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::AbortHandle;

use crate::clock::{Clock, ManualClock};
use crate::error::SchedulerError;

/// Work handed to a scheduler
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Schedules one-shot tasks
pub trait Scheduler {
    fn schedule(&self, delay_secs: i64, task: Task) -> TriggerHandle;
}

/// Handle to a scheduled task that can be cancelled
/// When dropped without calling cancel(), the task still runs
#[derive(Debug, Clone)]
pub struct TriggerHandle {
    cancelled: Arc<AtomicBool>,
    task: Option<AbortHandle>,
}

impl TriggerHandle {
    pub(crate) fn new(cancelled: Arc<AtomicBool>) -> Self {
        Self {
            cancelled,
            task: None,
        }
    }

    pub(crate) fn with_task(cancelled: Arc<AtomicBool>, task: AbortHandle) -> Self {
        Self {
            cancelled,
            task: Some(task),
        }
    }

    /// Cancel the task - it will not run
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Some(task) = &self.task {
            task.abort();
        }
    }

    /// Check if the task has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

fn delay_duration(delay_secs: i64) -> Duration {
    Duration::from_secs(u64::try_from(delay_secs).unwrap_or(0))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tokio
// ─────────────────────────────────────────────────────────────────────────────

/// Runs each task on its own tokio task after sleeping for the delay
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    /// Bind to the runtime driving the current thread
    pub fn current() -> Result<Self, SchedulerError> {
        Handle::try_current()
            .map(Self::with_handle)
            .map_err(SchedulerError::NoRuntime)
    }

    pub fn with_handle(handle: Handle) -> Self {
        Self { handle }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay_secs: i64, task: Task) -> TriggerHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let delay = delay_duration(delay_secs);

        let join = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            if !flag.load(Ordering::SeqCst) {
                task();
            }
        });

        TriggerHandle::with_task(cancelled, join.abort_handle())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Manual (host-driven)
// ─────────────────────────────────────────────────────────────────────────────

struct Scheduled {
    due: i64,
    seq: u64,
    cancelled: Arc<AtomicBool>,
    task: Task,
}

#[derive(Default)]
struct Queue {
    entries: Vec<Scheduled>,
    next_seq: u64,
}

impl Queue {
    /// Cancelled entries would otherwise linger until their due time
    fn prune_cancelled(&mut self) {
        self.entries.retain(|e| !e.cancelled.load(Ordering::SeqCst));
    }
}

/// Scheduler for hosts that drive their own loop
///
/// Tasks become due against a shared `ManualClock`; nothing runs until the
/// host calls `run_due`.
#[derive(Clone)]
pub struct ManualScheduler {
    clock: ManualClock,
    queue: Arc<Mutex<Queue>>,
}

impl ManualScheduler {
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            queue: Arc::new(Mutex::new(Queue::default())),
        }
    }

    /// Run every due, non-cancelled task in due order. Returns how many ran.
    pub fn run_due(&self) -> usize {
        let mut ran = 0;
        while let Some(entry) = self.pop_due() {
            if !entry.cancelled.load(Ordering::SeqCst) {
                (entry.task)();
                ran += 1;
            }
        }
        ran
    }

    /// Number of scheduled tasks that have not run or been cancelled
    pub fn pending(&self) -> usize {
        let queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        queue
            .entries
            .iter()
            .filter(|e| !e.cancelled.load(Ordering::SeqCst))
            .count()
    }

    /// Entries held in the queue, cancelled ones included
    #[cfg(test)]
    pub(crate) fn stored(&self) -> usize {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    // Tasks run with the lock released so they may schedule more work.
    fn pop_due(&self) -> Option<Scheduled> {
        let now = self.clock.now_secs();
        let mut queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        queue.prune_cancelled();
        let index = queue
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due <= now)
            .min_by_key(|(_, e)| (e.due, e.seq))
            .map(|(i, _)| i)?;
        Some(queue.entries.swap_remove(index))
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay_secs: i64, task: Task) -> TriggerHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        // Overdue work is due now, not in the past, so it keeps insertion order.
        let due = self.clock.now_secs().saturating_add(delay_secs.max(0));

        let mut queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        queue.prune_cancelled();
        let seq = queue.next_seq;
        queue.next_seq += 1;
        queue.entries.push(Scheduled {
            due,
            seq,
            cancelled: Arc::clone(&cancelled),
            task,
        });

        TriggerHandle::new(cancelled)
    }
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("now", &self.clock.now_secs())
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counting_task(counter: &Arc<AtomicUsize>) -> Task {
        let counter = Arc::clone(counter);
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn manual_runs_only_due_tasks() {
        let clock = ManualClock::new(0);
        let scheduler = ManualScheduler::new(clock.clone());
        let count = Arc::new(AtomicUsize::new(0));

        scheduler.schedule(3, counting_task(&count));
        assert_eq!(scheduler.run_due(), 0);

        clock.advance(2);
        assert_eq!(scheduler.run_due(), 0);

        clock.advance(1);
        assert_eq!(scheduler.run_due(), 1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn manual_negative_delay_is_due_immediately() {
        let clock = ManualClock::new(10);
        let scheduler = ManualScheduler::new(clock);
        let count = Arc::new(AtomicUsize::new(0));

        scheduler.schedule(-4, counting_task(&count));
        assert_eq!(scheduler.run_due(), 1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn manual_cancelled_task_never_runs() {
        let clock = ManualClock::new(0);
        let scheduler = ManualScheduler::new(clock.clone());
        let count = Arc::new(AtomicUsize::new(0));

        let handle = scheduler.schedule(1, counting_task(&count));
        assert_eq!(scheduler.pending(), 1);

        handle.cancel();
        assert!(handle.is_cancelled());
        assert_eq!(scheduler.pending(), 0);

        clock.advance(5);
        assert_eq!(scheduler.run_due(), 0);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn manual_runs_in_due_order() {
        let clock = ManualClock::new(0);
        let scheduler = ManualScheduler::new(clock.clone());
        let order = Arc::new(Mutex::new(Vec::new()));

        for (delay, label) in [(5, "late"), (1, "early"), (1, "early-second")] {
            let order = Arc::clone(&order);
            scheduler.schedule(delay, Box::new(move || order.lock().unwrap().push(label)));
        }

        clock.advance(10);
        assert_eq!(scheduler.run_due(), 3);
        assert_eq!(*order.lock().unwrap(), vec!["early", "early-second", "late"]);
    }

    #[test]
    fn manual_drops_cancelled_entries() {
        let clock = ManualClock::new(0);
        let scheduler = ManualScheduler::new(clock.clone());
        let count = Arc::new(AtomicUsize::new(0));

        for _ in 0..1_000 {
            scheduler.schedule(1_000_000, counting_task(&count)).cancel();
        }
        assert!(scheduler.stored() <= 1);

        clock.advance(1);
        assert_eq!(scheduler.run_due(), 0);
        assert_eq!(scheduler.stored(), 0);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn manual_far_future_delay_saturates() {
        let clock = ManualClock::new(100);
        let scheduler = ManualScheduler::new(clock.clone());
        let count = Arc::new(AtomicUsize::new(0));

        scheduler.schedule(i64::MAX, counting_task(&count));
        clock.advance(1_000);
        assert_eq!(scheduler.run_due(), 0);
        assert_eq!(scheduler.pending(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_fires_after_delay() {
        let scheduler = TokioScheduler::current().unwrap();
        let count = Arc::new(AtomicUsize::new(0));

        scheduler.schedule(2, counting_task(&count));

        tokio::time::sleep(Duration::from_millis(1_900)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_zero_delay_fires_next_turn() {
        let scheduler = TokioScheduler::current().unwrap();
        let count = Arc::new(AtomicUsize::new(0));

        scheduler.schedule(-3, counting_task(&count));
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_cancelled_task_never_runs() {
        let scheduler = TokioScheduler::current().unwrap();
        let count = Arc::new(AtomicUsize::new(0));

        let handle = scheduler.schedule(1, counting_task(&count));
        handle.cancel();

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn tokio_requires_runtime() {
        assert!(matches!(
            TokioScheduler::current(),
            Err(SchedulerError::NoRuntime(_))
        ));
    }
}
