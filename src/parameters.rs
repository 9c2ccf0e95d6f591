use std::time::Duration;

use motoscroll_config::MotionToScroll;

use crate::error::Error;

/// Validated description of how pointer motion turns into scroll notches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parameters {
    speed_multiplier: f64,
    notch_size: f64,
    recent_window: Duration,
    idle_gap: Duration,
    momentum_interval: Duration,
    momentum_decay: f64,
    momentum_cutoff: f64,
}

impl Parameters {
    pub fn from_config(config: &MotionToScroll) -> Result<Self, Error> {
        let params = Self::from_config_unchecked(config);
        params.validate()?;
        Ok(params)
    }

    fn from_config_unchecked(config: &MotionToScroll) -> Self {
        let millis = |ms: u32| Duration::from_millis(u64::from(ms));
        Self {
            speed_multiplier: config.speed_multiplier.0,
            notch_size: config.notch_size.0,
            recent_window: millis(config.recent_window_ms),
            idle_gap: millis(config.idle_gap_ms),
            momentum_interval: millis(config.momentum.interval_ms),
            momentum_decay: config.momentum.decay.0,
            momentum_cutoff: config.momentum.cutoff.0,
        }
    }

    fn validate(&self) -> Result<(), Error> {
        positive("speed-multiplier", self.speed_multiplier)?;
        positive("notch-size", self.notch_size)?;
        positive("momentum cutoff", self.momentum_cutoff)?;
        nonzero("recent-window-ms", self.recent_window)?;
        nonzero("idle-gap-ms", self.idle_gap)?;
        nonzero("momentum interval-ms", self.momentum_interval)?;

        let decay = self.momentum_decay;
        if !(decay > 0. && decay < 1.) {
            return Err(Error::invalid(
                "momentum decay",
                format!("must be strictly between 0 and 1, got {decay}"),
            ));
        }

        if self.momentum_cutoff >= self.notch_size {
            return Err(Error::invalid(
                "momentum cutoff",
                format!(
                    "must be smaller than notch-size ({}), got {}",
                    self.notch_size, self.momentum_cutoff
                ),
            ));
        }

        Ok(())
    }

    /// Factor applied to every incoming delta before accumulation.
    pub fn speed_multiplier(&self) -> f64 {
        self.speed_multiplier
    }

    /// Accumulated motion that makes up one wheel notch.
    pub fn notch_size(&self) -> f64 {
        self.notch_size
    }

    /// Span of pre-idle history used to seed momentum.
    pub fn recent_window(&self) -> Duration {
        self.recent_window
    }

    /// Input pause after which momentum takes over.
    pub fn idle_gap(&self) -> Duration {
        self.idle_gap
    }

    pub fn momentum_interval(&self) -> Duration {
        self.momentum_interval
    }

    pub fn momentum_decay(&self) -> f64 {
        self.momentum_decay
    }

    pub fn momentum_cutoff(&self) -> f64 {
        self.momentum_cutoff
    }

    /// Upper bound on the number of momentum ticks for a given initial speed.
    ///
    /// Speed is measured per tick, on the fastest axis.
    pub fn max_momentum_ticks(&self, initial_speed: f64) -> u32 {
        let initial_speed = initial_speed.abs();
        if initial_speed < self.momentum_cutoff {
            return 1;
        }

        let ticks = (self.momentum_cutoff / initial_speed).ln() / self.momentum_decay.ln();
        // One extra tick for the step that notices the cutoff.
        ticks.ceil() as u32 + 1
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Self::from_config_unchecked(&MotionToScroll::default())
    }
}

impl TryFrom<&MotionToScroll> for Parameters {
    type Error = Error;

    fn try_from(config: &MotionToScroll) -> Result<Self, Self::Error> {
        Self::from_config(config)
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), Error> {
    if value.is_finite() && value > 0. {
        Ok(())
    } else {
        Err(Error::invalid(
            name,
            format!("must be a positive number, got {value}"),
        ))
    }
}

fn nonzero(name: &'static str, value: Duration) -> Result<(), Error> {
    if value.is_zero() {
        Err(Error::invalid(name, "must not be zero"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use motoscroll_config::{FloatOrInt, Momentum};

    use super::*;

    fn with_momentum(momentum: Momentum) -> MotionToScroll {
        MotionToScroll {
            momentum,
            ..Default::default()
        }
    }

    #[track_caller]
    fn invalid_name(config: MotionToScroll) -> &'static str {
        match Parameters::from_config(&config) {
            Err(Error::InvalidParameter { name, .. }) => name,
            other => panic!("expected InvalidParameter, got {other:?}"),
        }
    }

    #[test]
    fn default_is_valid() {
        let params = Parameters::from_config(&MotionToScroll::default()).unwrap();
        assert_eq!(params, Parameters::default());
        assert_eq!(params.notch_size(), 10.);
        assert_eq!(params.idle_gap(), Duration::from_millis(100));
        assert_eq!(params.momentum_interval(), Duration::from_millis(20));
    }

    #[test]
    fn zero_notch_size_is_rejected() {
        let config = MotionToScroll {
            notch_size: FloatOrInt(0.),
            ..Default::default()
        };
        assert_eq!(invalid_name(config), "notch-size");
    }

    #[test]
    fn negative_speed_is_rejected() {
        let config = MotionToScroll {
            speed_multiplier: FloatOrInt(-1.),
            ..Default::default()
        };
        assert_eq!(invalid_name(config), "speed-multiplier");
    }

    #[test]
    fn nan_is_rejected() {
        let config = MotionToScroll {
            speed_multiplier: FloatOrInt(f64::NAN),
            ..Default::default()
        };
        assert_eq!(invalid_name(config), "speed-multiplier");
    }

    #[test]
    fn zero_durations_are_rejected() {
        let config = MotionToScroll {
            idle_gap_ms: 0,
            ..Default::default()
        };
        assert_eq!(invalid_name(config), "idle-gap-ms");

        let config = MotionToScroll {
            recent_window_ms: 0,
            ..Default::default()
        };
        assert_eq!(invalid_name(config), "recent-window-ms");

        let config = with_momentum(Momentum {
            interval_ms: 0,
            ..Default::default()
        });
        assert_eq!(invalid_name(config), "momentum interval-ms");
    }

    #[test]
    fn decay_must_be_a_fraction() {
        for decay in [0., 1., 1.5, -0.2] {
            let config = with_momentum(Momentum {
                decay: FloatOrInt(decay),
                ..Default::default()
            });
            assert_eq!(invalid_name(config), "momentum decay");
        }
    }

    #[test]
    fn cutoff_must_be_below_notch_size() {
        let config = with_momentum(Momentum {
            cutoff: FloatOrInt(10.),
            ..Default::default()
        });
        assert_eq!(invalid_name(config), "momentum cutoff");

        let config = with_momentum(Momentum {
            cutoff: FloatOrInt(9.5),
            ..Default::default()
        });
        assert!(Parameters::from_config(&config).is_ok());
    }

    #[test]
    fn error_message_names_the_parameter() {
        let config = with_momentum(Momentum {
            decay: FloatOrInt(2.),
            ..Default::default()
        });
        let err = Parameters::try_from(&config).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid parameter `momentum decay`: must be strictly between 0 and 1, got 2"
        );
    }

    #[test]
    fn momentum_tick_bound() {
        let params = Parameters::default();
        assert_eq!(params.max_momentum_ticks(0.5), 1);
        // 3 * 0.9^11 < 1 <= 3 * 0.9^10
        assert_eq!(params.max_momentum_ticks(3.), 12);
    }
}
