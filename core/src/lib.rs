pub mod clock;
pub mod config;
pub mod error;
pub mod scheduler;
pub mod timer;

// Re-exports for convenience
pub use clock::{AnyClock, Clock, ManualClock, MonotonicClock, SystemClock};
pub use config::{ClockSource, HourglassConfig, HourglassConfigExt};
pub use error::{ConfigError, SchedulerError};
pub use scheduler::{ManualScheduler, Scheduler, Task, TokioScheduler, TriggerHandle};
pub use timer::{Callback, Timer, TimerSnapshot, TimerState};
