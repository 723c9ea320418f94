//! Geometry and constraint primitives used by the box layout engine.
//!
//! Everything here is plain data: sizes, offsets, insets, and the layout
//! constraint record passed from parent to child during measurement.

/// Layout constraint record.
mod constraint;
/// Length units resolved against a reference size.
mod dimension;
/// Edge insets.
mod edges;
/// Float comparison helpers.
mod float;
/// Position offsets.
mod offset;
/// Positioned rectangles.
mod rect;
/// Width/height size types.
mod size;

use serde::{Deserialize, Serialize};

pub use constraint::LayoutConstraint;
pub use dimension::Dimension;
pub use edges::Edges;
pub use float::{INFINITE, is_infinite, near_equal, near_zero};
pub use offset::Offset;
pub use rect::Rect;
pub use size::{OptionalSize, Size};

/// A layout axis.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// Left to right.
    #[default]
    Horizontal,
    /// Top to bottom.
    Vertical,
}

impl Axis {
    /// The perpendicular axis.
    pub fn flip(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }
}
