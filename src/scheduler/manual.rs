use std::cell::RefCell;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};
use std::rc::Rc;
use std::time::Duration;

use super::{Callback, Scheduler};

/// Scheduler running on a virtual clock.
///
/// The clock stands still until [`ManualScheduler::advance_to`] moves it, firing every callback
/// that became due on the way. Cloning gives another handle to the same clock and queue.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    inner: Rc<RefCell<Inner>>,
}

#[derive(Default)]
struct Inner {
    now: Duration,
    next_seq: u64,
    // Ordered by deadline, then by insertion, so equal deadlines fire first-in first-out.
    queue: BinaryHeap<Reverse<(Duration, u64)>>,
    callbacks: BTreeMap<u64, Callback>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scheduler whose clock starts at `time`.
    pub fn with_time(time: Duration) -> Self {
        let scheduler = Self::new();
        scheduler.inner.borrow_mut().now = time;
        scheduler
    }

    /// Moves the clock forward to `time`, running due callbacks in order.
    ///
    /// While a callback runs, [`now`](Scheduler::now) reports that callback's deadline.
    /// Callbacks scheduled from inside a callback also fire if they become due before `time`.
    ///
    /// Moving the clock backwards is ignored.
    pub fn advance_to(&self, time: Duration) {
        if time < self.now() {
            trace!(
                "ignoring request to move the clock back from {:?} to {time:?}",
                self.now()
            );
            return;
        }

        while let Some((deadline, callback)) = self.pop_due(time) {
            callback(deadline);
        }

        self.inner.borrow_mut().now = time;
    }

    /// Moves the clock forward by `delta`.
    pub fn advance_by(&self, delta: Duration) {
        let target = self.now().saturating_add(delta);
        self.advance_to(target);
    }

    /// Moves the clock forward to `time` in steps of `step`, like a dispatcher woken up at a
    /// fixed granularity.
    pub fn advance_in_steps(&self, time: Duration, step: Duration) {
        if step.is_zero() {
            self.advance_to(time);
            return;
        }

        while self.now() < time {
            let next = self.now().saturating_add(step).min(time);
            self.advance_to(next);
        }
    }

    /// Returns the number of callbacks that haven't fired yet.
    pub fn pending(&self) -> usize {
        self.inner.borrow().callbacks.len()
    }

    /// Returns the deadline of the next callback to fire, if any.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.inner
            .borrow()
            .queue
            .peek()
            .map(|Reverse((deadline, _))| *deadline)
    }

    fn pop_due(&self, time: Duration) -> Option<(Duration, Callback)> {
        // Release the borrow before the callback runs: it will likely schedule again.
        let mut inner = self.inner.borrow_mut();

        let Reverse((deadline, seq)) = *inner.queue.peek()?;
        if deadline > time {
            return None;
        }
        let _ = inner.queue.pop();

        let callback = inner.callbacks.remove(&seq)?;
        // Never let the clock go backwards for callbacks scheduled in the past.
        inner.now = inner.now.max(deadline);
        Some((deadline, callback))
    }
}

impl Scheduler for ManualScheduler {
    fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    fn schedule_at(&self, deadline: Duration, callback: Callback) {
        let mut inner = self.inner.borrow_mut();
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.queue.push(Reverse((deadline, seq)));
        inner.callbacks.insert(seq, callback);
    }
}
