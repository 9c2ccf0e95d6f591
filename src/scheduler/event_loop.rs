use std::time::{Duration, Instant};

use calloop::timer::{TimeoutAction, Timer};
use calloop::LoopHandle;

use super::{Callback, Scheduler};

/// Scheduler backed by calloop timers on the wall clock.
///
/// Time is measured from the moment the scheduler was created. Callbacks run while the event
/// loop is dispatching, one at a time, so they are serialized with any other event source of the
/// same loop.
pub struct LoopScheduler<D: 'static> {
    event_loop: LoopHandle<'static, D>,
    origin: Instant,
}

impl<D: 'static> LoopScheduler<D> {
    pub fn new(event_loop: LoopHandle<'static, D>) -> Self {
        Self {
            event_loop,
            origin: Instant::now(),
        }
    }

    /// Converts a scheduler time into a wall-clock instant.
    pub fn instant_at(&self, time: Duration) -> Instant {
        self.origin + time
    }
}

impl<D: 'static> Scheduler for LoopScheduler<D> {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn schedule_at(&self, deadline: Duration, callback: Callback) {
        let timer = Timer::from_deadline(self.instant_at(deadline));

        // Timer callbacks are FnMut, but a dropped timer never fires again.
        let mut callback = Some(callback);
        let res = self.event_loop.insert_source(timer, move |_, _, _| {
            if let Some(callback) = callback.take() {
                callback(deadline);
            }
            TimeoutAction::Drop
        });

        if let Err(err) = res {
            warn!("error scheduling callback at {deadline:?}: {}", err.error);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use calloop::EventLoop;

    use super::*;

    #[test]
    fn fires_in_order_on_the_event_loop() {
        let mut event_loop = EventLoop::<()>::try_new().unwrap();
        let scheduler = LoopScheduler::new(event_loop.handle());
        let fired = Rc::new(RefCell::new(Vec::new()));

        let now = scheduler.now();
        for (name, delay) in [("b", 10), ("a", 5), ("c", 15)] {
            let fired = fired.clone();
            scheduler.schedule_at(
                now + Duration::from_millis(delay),
                Box::new(move |_| fired.borrow_mut().push(name)),
            );
        }

        let give_up = Instant::now() + Duration::from_secs(5);
        while fired.borrow().len() < 3 && Instant::now() < give_up {
            event_loop
                .dispatch(Some(Duration::from_millis(5)), &mut ())
                .unwrap();
        }

        assert_eq!(*fired.borrow(), ["a", "b", "c"]);
        assert!(scheduler.now() >= now + Duration::from_millis(15));
    }

    #[test]
    fn callback_receives_its_deadline() {
        let mut event_loop = EventLoop::<()>::try_new().unwrap();
        let scheduler = LoopScheduler::new(event_loop.handle());
        let seen = Rc::new(RefCell::new(None));

        let deadline = scheduler.now() + Duration::from_millis(2);
        let seen_ = seen.clone();
        scheduler.schedule_at(deadline, Box::new(move |time| *seen_.borrow_mut() = Some(time)));

        let give_up = Instant::now() + Duration::from_secs(5);
        while seen.borrow().is_none() && Instant::now() < give_up {
            event_loop
                .dispatch(Some(Duration::from_millis(5)), &mut ())
                .unwrap();
        }

        assert_eq!(*seen.borrow(), Some(deadline));
    }
}
