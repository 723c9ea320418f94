use std::ops::Add;

use serde::{Deserialize, Serialize};

use super::{Axis, Offset};

/// Insets on the four sides of a box. Used for margin, padding and border.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Edges {
    /// Left inset.
    pub left: f32,
    /// Top inset.
    pub top: f32,
    /// Right inset.
    pub right: f32,
    /// Bottom inset.
    pub bottom: f32,
}

impl Edges {
    /// Zero insets.
    pub const ZERO: Self = Self {
        left: 0.0,
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
    };

    /// Construct insets in left, top, right, bottom order.
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// The same inset on every side.
    pub fn all(v: f32) -> Self {
        Self::new(v, v, v, v)
    }

    /// Horizontal and vertical insets.
    pub fn symmetric(horizontal: f32, vertical: f32) -> Self {
        Self::new(horizontal, vertical, horizontal, vertical)
    }

    /// Sum of left and right.
    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    /// Sum of top and bottom.
    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }

    /// Total inset along `axis`.
    pub fn along(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.horizontal(),
            Axis::Vertical => self.vertical(),
        }
    }

    /// Offset of the content origin inside the box.
    pub fn top_left(&self) -> Offset {
        Offset::new(self.left, self.top)
    }
}

impl Add for Edges {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(
            self.left + other.left,
            self.top + other.top,
            self.right + other.right,
            self.bottom + other.bottom,
        )
    }
}
