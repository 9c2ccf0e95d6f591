use crate::FloatOrInt;

pub const DEFAULT_SPEED_MULTIPLIER: f64 = 1.;
pub const DEFAULT_NOTCH_SIZE: f64 = 10.;
pub const DEFAULT_RECENT_WINDOW_MS: u32 = 100;
pub const DEFAULT_IDLE_GAP_MS: u32 = 100;
pub const DEFAULT_MOMENTUM_INTERVAL_MS: u32 = 20;
pub const DEFAULT_MOMENTUM_DECAY: f64 = 0.9;
pub const DEFAULT_MOMENTUM_CUTOFF: f64 = 1.;

#[derive(knuffel::Decode, Debug, Clone, Copy, PartialEq)]
pub struct MotionToScroll {
    #[knuffel(child, unwrap(argument), default = FloatOrInt(DEFAULT_SPEED_MULTIPLIER))]
    pub speed_multiplier: FloatOrInt<0, 1000>,
    #[knuffel(child, unwrap(argument), default = FloatOrInt(DEFAULT_NOTCH_SIZE))]
    pub notch_size: FloatOrInt<0, 65535>,
    #[knuffel(child, unwrap(argument), default = DEFAULT_RECENT_WINDOW_MS)]
    pub recent_window_ms: u32,
    #[knuffel(child, unwrap(argument), default = DEFAULT_IDLE_GAP_MS)]
    pub idle_gap_ms: u32,
    #[knuffel(child, default)]
    pub momentum: Momentum,
}

impl Default for MotionToScroll {
    fn default() -> Self {
        Self {
            speed_multiplier: FloatOrInt(DEFAULT_SPEED_MULTIPLIER),
            notch_size: FloatOrInt(DEFAULT_NOTCH_SIZE),
            recent_window_ms: DEFAULT_RECENT_WINDOW_MS,
            idle_gap_ms: DEFAULT_IDLE_GAP_MS,
            momentum: Momentum::default(),
        }
    }
}

#[derive(knuffel::Decode, Debug, Clone, Copy, PartialEq)]
pub struct Momentum {
    #[knuffel(child, unwrap(argument), default = DEFAULT_MOMENTUM_INTERVAL_MS)]
    pub interval_ms: u32,
    #[knuffel(child, unwrap(argument), default = FloatOrInt(DEFAULT_MOMENTUM_DECAY))]
    pub decay: FloatOrInt<0, 1>,
    #[knuffel(child, unwrap(argument), default = FloatOrInt(DEFAULT_MOMENTUM_CUTOFF))]
    pub cutoff: FloatOrInt<0, 65535>,
}

impl Default for Momentum {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_MOMENTUM_INTERVAL_MS,
            decay: FloatOrInt(DEFAULT_MOMENTUM_DECAY),
            cutoff: FloatOrInt(DEFAULT_MOMENTUM_CUTOFF),
        }
    }
}
