use serde::{Deserialize, Serialize};

use super::{Offset, Size};

/// A rectangle with an offset and a size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner.
    pub offset: Offset,
    /// Extent.
    pub size: Size,
}

impl Rect {
    /// Construct a rectangle from position and extent.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            offset: Offset::new(x, y),
            size: Size::new(width, height),
        }
    }

    /// Construct a rectangle from an offset and a size.
    pub fn from_parts(offset: Offset, size: Size) -> Self {
        Self { offset, size }
    }

    /// Right edge.
    pub fn right(&self) -> f32 {
        self.offset.x + self.size.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f32 {
        self.offset.y + self.size.height
    }

    /// True if the two rectangles share any area.
    pub fn intersects(&self, other: &Self) -> bool {
        self.offset.x < other.right()
            && other.offset.x < self.right()
            && self.offset.y < other.bottom()
            && other.offset.y < self.bottom()
    }
}
