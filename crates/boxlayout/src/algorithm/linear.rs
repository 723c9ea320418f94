use geom::Axis;
use serde::{Deserialize, Serialize};

use super::flex::{FlexDirection, FlexParams, MainAlign};
use crate::props::CrossAlign;

/// A single row or column.
///
/// Measured as a flex container with linear defaults: items are centered
/// across the axis, never shrink, and an unset main extent wraps the
/// content.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinearParams {
    /// Stacking axis.
    pub axis: Axis,
    /// Gap between items.
    pub space: f32,
    /// Distribution of free space along the axis.
    pub main_align: MainAlign,
    /// Default cross alignment for items.
    pub cross_align: CrossAlign,
}

impl Default for LinearParams {
    fn default() -> Self {
        Self {
            axis: Axis::Horizontal,
            space: 0.0,
            main_align: MainAlign::Start,
            cross_align: CrossAlign::Center,
        }
    }
}

impl LinearParams {
    /// The equivalent flex parameters.
    pub fn to_flex(&self) -> FlexParams {
        FlexParams {
            direction: match self.axis {
                Axis::Horizontal => FlexDirection::Row,
                Axis::Vertical => FlexDirection::Column,
            },
            main_align: self.main_align,
            cross_align: self.cross_align,
            space: self.space,
            ..FlexParams::default()
        }
    }
}
