//! Timed callback delivery.
//!
//! The counter never sleeps or polls. Whenever it needs to look at the world again later, it asks
//! a [`Scheduler`] to call it back at an absolute point in time. Times are [`Duration`]s since
//! the scheduler's origin, and sample timestamps passed to the counter are expected to use the
//! same timeline.
//!
//! There are two schedulers:
//!
//! - [`ManualScheduler`] keeps a virtual clock that only moves when told to. Tests and trace
//!   replays use it to get bit-for-bit reproducible output without sleeping.
//! - [`LoopScheduler`] turns callbacks into calloop timers, so they fire on the wall clock while
//!   the event loop is dispatching.

use std::time::Duration;

mod event_loop;
mod manual;

pub use event_loop::LoopScheduler;
pub use manual::ManualScheduler;

/// Callback scheduled to run once, receiving the time it was scheduled for.
pub type Callback = Box<dyn FnOnce(Duration)>;

pub trait Scheduler {
    /// Returns the current time.
    fn now(&self) -> Duration;

    /// Schedules `callback` to run once `deadline` is reached.
    ///
    /// Callbacks run exactly once, in deadline order; callbacks with the same deadline run in the
    /// order they were scheduled. A deadline in the past fires on the next dispatch.
    fn schedule_at(&self, deadline: Duration, callback: Callback);
}
