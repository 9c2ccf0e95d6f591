//! Conversion of relative pointer motion into scroll wheel notches.
//!
//! The [`Counter`] adds up incoming motion per axis and emits a scroll event whenever an axis
//! crosses a notch boundary. Once the pointer stops, the counter keeps scrolling for a while on
//! its own: it estimates the velocity the pointer had right before stopping and lets it decay on
//! a fixed tick, feeding the decayed velocity through the same notch logic.
//!
//! All timing goes through a [`Scheduler`]. The counter never blocks; it asks to be called back
//! later instead. Every scheduled tick carries a token, and only the tick matching the current
//! token is acted upon, so ticks made obsolete by new input or by teardown fire as no-ops.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::mem;
use std::rc::{Rc, Weak};
use std::time::Duration;

use async_channel::TrySendError;

use crate::error::Error;
use crate::parameters::Parameters;
use crate::pointing_motion::PointingMotion;
use crate::scheduler::Scheduler;

mod history;
mod notch;


pub use history::MotionHistory;
pub use notch::{NotchAccumulator, Notches};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing accumulated, no momentum.
    Idle,
    /// Receiving real pointer motion.
    Accumulating,
    /// Pointer stopped; emitting decaying synthetic motion on a timer.
    Momentum,
    /// The counter was torn down and rejects further input.
    TornDown,
}

pub type Observer = Box<dyn FnMut(PointingMotion)>;

/// How long after the idle gap the idle check runs.
///
/// A sample arriving exactly one idle gap after the previous one is still continuous input.
const IDLE_CHECK_DELAY: Duration = Duration::from_nanos(1);

/// Turns pointer motion into scroll events, with momentum after the pointer stops.
///
/// `update()` and tick callbacks must come from the same thread, one at a time, which is what
/// both provided schedulers do.
pub struct Counter {
    shared: Rc<Shared>,
}

struct Shared {
    state: RefCell<State>,
    observers: RefCell<Vec<Observer>>,
    queued_events: RefCell<VecDeque<PointingMotion>>,
    notifying: Cell<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TickToken(u64);

struct State {
    this: Weak<Shared>,
    scheduler: Rc<dyn Scheduler>,
    parameters: Parameters,
    phase: Phase,
    notches: Notches,
    history: MotionHistory,
    /// Timestamp of the last real sample.
    last_time_stamp: Option<Duration>,
    /// Scheduler time when the last real sample arrived.
    last_input_at: Duration,
    /// Momentum velocity per tick.
    velocity: (f64, f64),
    pending_tick: Option<TickToken>,
    next_token: u64,
}

impl Counter {
    pub fn new(scheduler: Rc<dyn Scheduler>, parameters: Parameters) -> Self {
        let shared = Rc::new_cyclic(|this| Shared {
            state: RefCell::new(State::new(this.clone(), scheduler, parameters)),
            observers: RefCell::new(Vec::new()),
            queued_events: RefCell::new(VecDeque::new()),
            notifying: Cell::new(false),
        });
        Self { shared }
    }

    /// Feeds a pointer motion sample taken at `time_stamp`.
    ///
    /// Scroll events produced by this sample reach the observers before this returns.
    pub fn update(&self, motion: PointingMotion, time_stamp: Duration) -> Result<(), Error> {
        let event = self.shared.state.borrow_mut().update(motion, time_stamp)?;
        if let Some(event) = event {
            self.shared.notify(event);
        }
        Ok(())
    }

    /// Registers an observer called synchronously for every scroll event.
    pub fn connect(&self, observer: impl FnMut(PointingMotion) + 'static) {
        self.shared.observers.borrow_mut().push(Box::new(observer));
    }

    /// Returns a channel receiving every scroll event.
    ///
    /// When the channel holds `capacity` undelivered events, new events are dropped.
    pub fn subscribe(&self, capacity: usize) -> async_channel::Receiver<PointingMotion> {
        let (tx, rx) = async_channel::bounded(capacity.max(1));
        self.connect(move |event| match tx.try_send(event) {
            Ok(()) => (),
            Err(TrySendError::Full(event)) => {
                warn!("scroll event channel is full, dropping {event:?}");
            }
            Err(TrySendError::Closed(_)) => {
                trace!("scroll event receiver is gone");
            }
        });
        rx
    }

    /// Ends the session.
    ///
    /// Accumulated motion and momentum are discarded, pending ticks become no-ops, and further
    /// calls to [`update`](Self::update) fail with [`Error::UseAfterTeardown`].
    pub fn teardown(&self) {
        let mut state = self.shared.state.borrow_mut();
        if state.phase != Phase::TornDown {
            debug!("tearing down counter in {:?}", state.phase);
            state.reset();
            state.phase = Phase::TornDown;
        }
    }

    pub fn phase(&self) -> Phase {
        self.shared.state.borrow().phase
    }

    pub fn parameters(&self) -> Parameters {
        self.shared.state.borrow().parameters
    }

    /// Returns the `(x, y)` motion accumulated towards the next notch.
    pub fn remainder(&self) -> (f64, f64) {
        self.shared.state.borrow().notches.remainder()
    }

    /// Returns the current `(x, y)` momentum velocity per tick.
    pub fn momentum_velocity(&self) -> (f64, f64) {
        self.shared.state.borrow().velocity
    }
}

impl Shared {
    fn on_tick(this: &Weak<Shared>, token: TickToken, time: Duration) {
        let Some(shared) = this.upgrade() else {
            trace!("counter is gone, ignoring tick {token:?}");
            return;
        };

        let event = shared.state.borrow_mut().tick(token, time);
        if let Some(event) = event {
            shared.notify(event);
        }
    }

    fn notify(&self, event: PointingMotion) {
        self.queued_events.borrow_mut().push_back(event);

        // An observer fed us more input; the outer loop delivers it in order.
        if self.notifying.replace(true) {
            return;
        }

        loop {
            let Some(event) = self.queued_events.borrow_mut().pop_front() else {
                break;
            };

            // Observers may connect more observers while we are calling them.
            let mut observers = mem::take(&mut *self.observers.borrow_mut());
            for observer in &mut observers {
                observer(event);
            }

            let mut slot = self.observers.borrow_mut();
            observers.append(&mut slot);
            *slot = observers;
        }

        self.notifying.set(false);
    }
}

impl State {
    fn new(this: Weak<Shared>, scheduler: Rc<dyn Scheduler>, parameters: Parameters) -> Self {
        Self {
            this,
            scheduler,
            parameters,
            phase: Phase::Idle,
            notches: Notches::new(parameters.notch_size()),
            history: MotionHistory::new(parameters.recent_window()),
            last_time_stamp: None,
            last_input_at: Duration::ZERO,
            velocity: (0., 0.),
            pending_tick: None,
            next_token: 0,
        }
    }

    fn update(
        &mut self,
        motion: PointingMotion,
        time_stamp: Duration,
    ) -> Result<Option<PointingMotion>, Error> {
        match self.phase {
            Phase::TornDown => return Err(Error::UseAfterTeardown),
            Phase::Momentum => {
                debug!("pointer moved during momentum, dropping momentum");
                self.reset();
            }
            Phase::Idle | Phase::Accumulating => (),
        }

        let motion = motion.clamped();

        let time_stamp = match self.last_time_stamp {
            Some(last) if time_stamp <= last => {
                trace!("sample at {time_stamp:?} is not later than {last:?}");
                last
            }
            Some(last) if time_stamp - last > self.parameters.idle_gap() => {
                trace!(
                    "{:?} since the last sample, restarting motion history",
                    time_stamp - last
                );
                self.history.clear();
                time_stamp
            }
            _ => time_stamp,
        };

        if self.phase == Phase::Idle {
            trace!("starting to accumulate at {time_stamp:?}");
        }

        self.phase = Phase::Accumulating;
        self.last_time_stamp = Some(time_stamp);
        self.last_input_at = self.scheduler.now();

        let speed = self.parameters.speed_multiplier();
        let dx = f64::from(motion.x) * speed;
        let dy = f64::from(motion.y) * speed;
        self.history.push(dx, dy, time_stamp);
        let (x, y) = self.notches.accumulate(dx, dy);

        // An idle check is already pending otherwise; it will look at the new input time.
        if self.pending_tick.is_none() {
            self.schedule_tick(self.idle_check_deadline());
        }

        Ok(wheel_event(x, y))
    }

    fn tick(&mut self, token: TickToken, now: Duration) -> Option<PointingMotion> {
        let _span = tracy_client::span!("Counter::tick");

        if self.pending_tick != Some(token) {
            trace!("ignoring stale tick {token:?}");
            return None;
        }
        self.pending_tick = None;

        match self.phase {
            Phase::Accumulating => {
                self.check_idle(now);
                None
            }
            Phase::Momentum => self.momentum_step(now),
            Phase::Idle | Phase::TornDown => None,
        }
    }

    fn check_idle(&mut self, now: Duration) {
        let idle_gap = self.parameters.idle_gap();
        let idle_for = now.saturating_sub(self.last_input_at);
        if idle_for <= idle_gap {
            self.schedule_tick(self.idle_check_deadline());
            return;
        }

        let interval = self.parameters.momentum_interval();
        self.velocity = self.history.velocity_per(interval);
        self.history.clear();
        self.phase = Phase::Momentum;
        debug!(
            "no input for {idle_for:?}, starting momentum at {:?} per tick",
            self.velocity
        );

        // Momentum ticks count from the end of the idle gap.
        self.schedule_tick(self.last_input_at + idle_gap + interval);
    }

    fn idle_check_deadline(&self) -> Duration {
        self.last_input_at + self.parameters.idle_gap() + IDLE_CHECK_DELAY
    }

    fn momentum_step(&mut self, now: Duration) -> Option<PointingMotion> {
        let decay = self.parameters.momentum_decay();
        let (vx, vy) = (self.velocity.0 * decay, self.velocity.1 * decay);
        self.velocity = (vx, vy);

        let cutoff = self.parameters.momentum_cutoff();
        if vx.abs() < cutoff && vy.abs() < cutoff {
            debug!("momentum ended");
            self.reset();
            return None;
        }

        let (x, y) = self.notches.accumulate(vx, vy);
        self.schedule_tick(now + self.parameters.momentum_interval());
        wheel_event(x, y)
    }

    fn schedule_tick(&mut self, deadline: Duration) {
        let token = TickToken(self.next_token);
        self.next_token += 1;
        self.pending_tick = Some(token);

        let this = self.this.clone();
        self.scheduler.schedule_at(
            deadline,
            Box::new(move |time| Shared::on_tick(&this, token, time)),
        );
    }

    /// Returns to `Idle`, forgetting accumulated motion and momentum.
    fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.notches.reset();
        self.history.clear();
        self.velocity = (0., 0.);
        self.last_time_stamp = None;
        // Whatever tick is still scheduled is now stale.
        self.pending_tick = None;
    }
}

fn wheel_event(x: i32, y: i32) -> Option<PointingMotion> {
    if x == 0 && y == 0 {
        None
    } else {
        Some(PointingMotion::wheel(y, x))
    }
}
