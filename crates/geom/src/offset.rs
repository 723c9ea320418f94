use std::ops::{Add, AddAssign, Neg, Sub};

use serde::{Deserialize, Serialize};

use super::Axis;

/// A position relative to some origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Offset {
    /// Horizontal position.
    pub x: f32,
    /// Vertical position.
    pub y: f32,
}

impl Offset {
    /// The origin.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Construct an offset.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Build an offset from main and cross positions along `axis`.
    pub fn from_main_cross(axis: Axis, main: f32, cross: f32) -> Self {
        match axis {
            Axis::Horizontal => Self::new(main, cross),
            Axis::Vertical => Self::new(cross, main),
        }
    }

    /// Position along `axis`.
    pub fn main(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.x,
            Axis::Vertical => self.y,
        }
    }

    /// Position perpendicular to `axis`.
    pub fn cross(&self, axis: Axis) -> f32 {
        self.main(axis.flip())
    }

    /// Shift along `axis`.
    pub fn add_main(&mut self, axis: Axis, delta: f32) {
        match axis {
            Axis::Horizontal => self.x += delta,
            Axis::Vertical => self.y += delta,
        }
    }

    /// Shift perpendicular to `axis`.
    pub fn add_cross(&mut self, axis: Axis, delta: f32) {
        self.add_main(axis.flip(), delta);
    }
}

impl Add for Offset {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl AddAssign for Offset {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl Sub for Offset {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl Neg for Offset {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl From<(f32, f32)> for Offset {
    #[inline]
    fn from(v: (f32, f32)) -> Self {
        Self::new(v.0, v.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add() {
        assert_eq!(Offset::ZERO + (1.0, 1.0).into(), Offset::new(1.0, 1.0));
        let mut o = Offset::new(2.0, 3.0);
        o.add_cross(Axis::Horizontal, 5.0);
        assert_eq!(o, Offset::new(2.0, 8.0));
    }
}
