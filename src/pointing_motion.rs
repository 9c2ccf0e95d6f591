use std::iter::Sum;
use std::ops::Add;

use serde::{Deserialize, Serialize};

/// Largest pointer delta accepted on a single axis.
///
/// Larger values are clamped when a sample enters the counter.
pub const MAX_DELTA: i32 = i16::MAX as i32;

/// Relative pointer motion, or a scroll event produced from it.
///
/// Raw samples carry `x` and `y`. Emitted scroll events carry wheel notches in `vertical_wheel`
/// and `horizontal_wheel`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct PointingMotion {
    pub x: i32,
    pub y: i32,
    pub vertical_wheel: i32,
    pub horizontal_wheel: i32,
}

impl PointingMotion {
    pub const fn new(x: i32, y: i32, vertical_wheel: i32, horizontal_wheel: i32) -> Self {
        Self {
            x,
            y,
            vertical_wheel,
            horizontal_wheel,
        }
    }

    /// Creates a pointer motion with no wheel component.
    pub const fn motion(x: i32, y: i32) -> Self {
        Self::new(x, y, 0, 0)
    }

    /// Creates a scroll event with the given notch counts.
    pub const fn wheel(vertical_wheel: i32, horizontal_wheel: i32) -> Self {
        Self::new(0, 0, vertical_wheel, horizontal_wheel)
    }

    /// Returns the motion with `x` and `y` limited to [`MAX_DELTA`].
    pub fn clamped(self) -> Self {
        Self {
            x: self.x.clamp(-MAX_DELTA, MAX_DELTA),
            y: self.y.clamp(-MAX_DELTA, MAX_DELTA),
            ..self
        }
    }
}

impl Add for PointingMotion {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x.saturating_add(rhs.x),
            y: self.y.saturating_add(rhs.y),
            vertical_wheel: self.vertical_wheel.saturating_add(rhs.vertical_wheel),
            horizontal_wheel: self.horizontal_wheel.saturating_add(rhs.horizontal_wheel),
        }
    }
}

impl Sum for PointingMotion {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl<'a> Sum<&'a PointingMotion> for PointingMotion {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sum_adds_every_axis() {
        let motions = [
            PointingMotion::new(1, 2, 3, 4),
            PointingMotion::new(-5, 6, 0, -1),
            PointingMotion::wheel(2, 0),
        ];
        assert_eq!(
            motions.iter().sum::<PointingMotion>(),
            PointingMotion::new(-4, 8, 5, 3)
        );
    }

    #[test]
    fn add_saturates() {
        let sum = PointingMotion::motion(i32::MAX, i32::MIN) + PointingMotion::motion(1, -1);
        assert_eq!(sum, PointingMotion::motion(i32::MAX, i32::MIN));
    }

    #[test]
    fn clamp_only_touches_pointer_axes() {
        let motion = PointingMotion::new(100_000, -100_000, 100_000, 7).clamped();
        assert_eq!(motion, PointingMotion::new(MAX_DELTA, -MAX_DELTA, 100_000, 7));
    }

    #[test]
    fn deserialize_fills_missing_fields() {
        let motion: PointingMotion = serde_json::from_str(r#"{"x": 3, "y": -2}"#).unwrap();
        assert_eq!(motion, PointingMotion::motion(3, -2));

        let motion: PointingMotion = serde_json::from_str(r#"{"vertical_wheel": 1}"#).unwrap();
        assert_eq!(motion, PointingMotion::wheel(1, 0));
    }

    #[test]
    fn serialize_uses_field_names() {
        let json = serde_json::to_string(&PointingMotion::wheel(-1, 2)).unwrap();
        assert_eq!(
            json,
            r#"{"x":0,"y":0,"vertical_wheel":-1,"horizontal_wheel":2}"#
        );
    }
}
