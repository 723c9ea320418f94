use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

use super::{Axis, Edges, is_infinite};

/// A width and height with no location.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    /// Horizontal extent.
    pub width: f32,
    /// Vertical extent.
    pub height: f32,
}

impl Size {
    /// A zero-valued size.
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    /// An unbounded size on both axes.
    pub const INFINITE: Self = Self {
        width: f32::INFINITY,
        height: f32::INFINITY,
    };

    /// Construct a size.
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Build a size from main and cross extents along `axis`.
    pub fn from_main_cross(axis: Axis, main: f32, cross: f32) -> Self {
        match axis {
            Axis::Horizontal => Self::new(main, cross),
            Axis::Vertical => Self::new(cross, main),
        }
    }

    /// Extent along `axis`.
    pub fn main(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    /// Extent perpendicular to `axis`.
    pub fn cross(&self, axis: Axis) -> f32 {
        self.main(axis.flip())
    }

    /// Set the extent along `axis`.
    pub fn set_main(&mut self, axis: Axis, value: f32) {
        match axis {
            Axis::Horizontal => self.width = value,
            Axis::Vertical => self.height = value,
        }
    }

    /// Set the extent perpendicular to `axis`.
    pub fn set_cross(&mut self, axis: Axis, value: f32) {
        self.set_main(axis.flip(), value);
    }

    /// True if either axis is unbounded.
    pub fn is_infinite(&self) -> bool {
        is_infinite(self.width) || is_infinite(self.height)
    }

    /// True if both axes are non-negative and finite.
    pub fn is_valid(&self) -> bool {
        self.width >= 0.0 && self.height >= 0.0 && !self.is_infinite()
    }

    /// Component-wise minimum.
    pub fn min(self, other: Self) -> Self {
        Self::new(self.width.min(other.width), self.height.min(other.height))
    }

    /// Component-wise maximum.
    pub fn max(self, other: Self) -> Self {
        Self::new(self.width.max(other.width), self.height.max(other.height))
    }

    /// Clamp each axis into `[min, max]`. When `min > max` on an axis, max wins.
    pub fn clamp(self, min: Self, max: Self) -> Self {
        Self::new(
            clamp_axis(self.width, min.width, max.width),
            clamp_axis(self.height, min.height, max.height),
        )
    }

    /// Remove insets from both axes, never going below zero.
    pub fn deflate(self, edges: Edges) -> Self {
        Self::new(
            (self.width - edges.horizontal()).max(0.0),
            (self.height - edges.vertical()).max(0.0),
        )
    }

    /// Add insets to both axes.
    pub fn inflate(self, edges: Edges) -> Self {
        Self::new(
            self.width + edges.horizontal(),
            self.height + edges.vertical(),
        )
    }
}

/// Clamp a single axis. An inverted range collapses onto `max`.
fn clamp_axis(value: f32, min: f32, max: f32) -> f32 {
    let min = min.min(max);
    value.min(max).max(min)
}

impl Add for Size {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.width + other.width, self.height + other.height)
    }
}

impl Sub for Size {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.width - other.width, self.height - other.height)
    }
}

impl From<(f32, f32)> for Size {
    fn from(v: (f32, f32)) -> Self {
        Self::new(v.0, v.1)
    }
}

/// A size where each axis may be left unset.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OptionalSize {
    /// Horizontal extent, if known.
    pub width: Option<f32>,
    /// Vertical extent, if known.
    pub height: Option<f32>,
}

impl OptionalSize {
    /// Construct with both axes set.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
        }
    }

    /// Extent along `axis`.
    pub fn main(&self, axis: Axis) -> Option<f32> {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    /// Extent perpendicular to `axis`.
    pub fn cross(&self, axis: Axis) -> Option<f32> {
        self.main(axis.flip())
    }

    /// Set the extent along `axis`.
    pub fn set_main(&mut self, axis: Axis, value: f32) {
        match axis {
            Axis::Horizontal => self.width = Some(value),
            Axis::Vertical => self.height = Some(value),
        }
    }

    /// Set the extent perpendicular to `axis`.
    pub fn set_cross(&mut self, axis: Axis, value: f32) {
        self.set_main(axis.flip(), value);
    }

    /// True if neither axis is set.
    pub fn is_empty(&self) -> bool {
        self.width.is_none() && self.height.is_none()
    }

    /// True if both axes are set.
    pub fn is_full(&self) -> bool {
        self.width.is_some() && self.height.is_some()
    }

    /// Fill axes that are unset here from `other`.
    pub fn fill_unset(&mut self, other: Self) {
        if self.width.is_none() {
            self.width = other.width;
        }
        if self.height.is_none() {
            self.height = other.height;
        }
    }

    /// Resolve to a concrete size, using `fallback` for unset axes.
    pub fn unwrap_or(&self, fallback: Size) -> Size {
        Size::new(
            self.width.unwrap_or(fallback.width),
            self.height.unwrap_or(fallback.height),
        )
    }
}

impl From<Size> for OptionalSize {
    fn from(s: Size) -> Self {
        Self::new(s.width, s.height)
    }
}
