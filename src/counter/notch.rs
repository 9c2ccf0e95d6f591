/// Single-axis accumulator that turns continuous motion into whole notches.
///
/// Unlike a plain wheel tracker, a change of direction does not throw the remainder away: the
/// remainder is always exactly what is left of the summed input after taking out the emitted
/// notches.
#[derive(Debug, Clone, Copy)]
pub struct NotchAccumulator {
    notch: f64,
    acc: f64,
}

impl NotchAccumulator {
    pub fn new(notch: f64) -> Self {
        Self { notch, acc: 0. }
    }

    /// Adds `amount` and returns the whole notches crossed, keeping the sign of the motion.
    ///
    /// Afterwards the remainder is strictly smaller than one notch in magnitude.
    pub fn accumulate(&mut self, amount: f64) -> i32 {
        self.acc += amount;

        if self.acc.abs() < self.notch {
            return 0;
        }

        let rem = self.acc % self.notch;
        let notches = ((self.acc - rem) / self.notch).round();
        self.acc = rem;

        // Saturates for absurdly large accumulations.
        notches as i32
    }

    /// Returns the motion accumulated towards the next notch.
    pub fn remainder(&self) -> f64 {
        self.acc
    }

    pub fn reset(&mut self) {
        self.acc = 0.;
    }
}

/// Pair of notch accumulators for both pointer axes.
#[derive(Debug, Clone, Copy)]
pub struct Notches {
    pub x: NotchAccumulator,
    pub y: NotchAccumulator,
}

impl Notches {
    pub fn new(notch: f64) -> Self {
        Self {
            x: NotchAccumulator::new(notch),
            y: NotchAccumulator::new(notch),
        }
    }

    /// Accumulates motion on both axes and returns the `(x, y)` notches crossed.
    pub fn accumulate(&mut self, x: f64, y: f64) -> (i32, i32) {
        (self.x.accumulate(x), self.y.accumulate(y))
    }

    pub fn remainder(&self) -> (f64, f64) {
        (self.x.remainder(), self.y.remainder())
    }

    pub fn reset(&mut self) {
        self.x.reset();
        self.y.reset();
    }
}
