use std::collections::VecDeque;
use std::time::Duration;

/// Recent pointer motion, used to estimate how fast the pointer was moving when it stopped.
#[derive(Debug)]
pub struct MotionHistory {
    history: VecDeque<Event>,
    window: Duration,
}

#[derive(Debug, Clone, Copy)]
struct Event {
    dx: f64,
    dy: f64,
    timestamp: Duration,
}

impl MotionHistory {
    pub fn new(window: Duration) -> Self {
        Self {
            history: VecDeque::new(),
            window,
        }
    }

    /// Pushes a new reading into the history.
    ///
    /// A reading older than the latest one is recorded at the latest timestamp, so time never
    /// runs backwards inside the history.
    pub fn push(&mut self, dx: f64, dy: f64, timestamp: Duration) {
        let timestamp = match self.history.back() {
            Some(last) if timestamp < last.timestamp => {
                trace!(
                    "recording event with timestamp {timestamp:?} at the later {:?}",
                    last.timestamp
                );
                last.timestamp
            }
            _ => timestamp,
        };

        self.history.push_back(Event { dx, dy, timestamp });
        self.trim_history();
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Returns the motion inside the window, spread evenly over the window and scaled to
    /// `interval`.
    ///
    /// This is the per-tick velocity the pointer had right before the newest reading.
    pub fn velocity_per(&self, interval: Duration) -> (f64, f64) {
        if self.history.is_empty() {
            return (0., 0.);
        }

        let (dx, dy) = self
            .history
            .iter()
            .fold((0., 0.), |(x, y), event| (x + event.dx, y + event.dy));

        let scale = interval.as_secs_f64() / self.window.as_secs_f64();
        (dx * scale, dy * scale)
    }

    fn trim_history(&mut self) {
        let Some(&Event { timestamp, .. }) = self.history.back() else {
            return;
        };

        while let Some(first) = self.history.front() {
            if timestamp <= first.timestamp + self.window {
                break;
            }

            let _ = self.history.pop_front();
        }
    }
}
