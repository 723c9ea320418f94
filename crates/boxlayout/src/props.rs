//! Per-node layout properties read by the algorithms.

use std::collections::BTreeMap;

use geom::{Dimension, Edges, Offset};
use serde::{Deserialize, Serialize};

/// How a node sizes itself when no ideal size is forced.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasureType {
    /// Size to content.
    #[default]
    Content,
    /// Take the parent's ideal content size, else its max size.
    MatchParent,
}

/// Position along one axis of an anchor or box.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    /// Leading edge.
    #[default]
    Start,
    /// Midpoint.
    Center,
    /// Trailing edge.
    End,
}

/// Cross-axis alignment of an item inside a flex line.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossAlign {
    /// Leading cross edge.
    #[default]
    Start,
    /// Centered.
    Center,
    /// Trailing cross edge.
    End,
    /// Fill the cross extent.
    Stretch,
    /// Align text baselines. Only meaningful for horizontal lines.
    Baseline,
}

/// Which edge or midpoint of a node an anchor rule binds.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignDirection {
    /// Left edge.
    Left,
    /// Horizontal midpoint.
    Middle,
    /// Right edge.
    Right,
    /// Top edge.
    Top,
    /// Vertical midpoint.
    Center,
    /// Bottom edge.
    Bottom,
}

impl AlignDirection {
    /// True for the left/middle/right family.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Middle | Self::Right)
    }
}

/// Binds one edge of a node to an edge or midpoint of an anchor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignRule {
    /// Id of a sibling, or [`crate::CONTAINER_ID`] for the container.
    pub anchor: String,
    /// Which part of the anchor along the rule's axis.
    pub align: Align,
}

impl AlignRule {
    /// Construct a rule.
    pub fn new(anchor: impl Into<String>, align: Align) -> Self {
        Self {
            anchor: anchor.into(),
            align,
        }
    }
}

/// Anchor rules keyed by the bound edge.
pub type AlignRules = BTreeMap<AlignDirection, AlignRule>;

/// Execution context an algorithm needs.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadClass {
    /// Safe to lay out on any thread.
    #[default]
    Any,
    /// Must run on the UI thread.
    Main,
}

/// Flex item metadata.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlexItem {
    /// Share of surplus space.
    pub grow: f32,
    /// Share of deficit. `None` uses the container's default.
    pub shrink: Option<f32>,
    /// Main-axis size before distribution.
    pub basis: Option<Dimension>,
    /// Proportional share of the remaining main-axis space.
    pub weight: f32,
    /// Groups with lower values are dropped first on overflow.
    pub display_priority: i32,
    /// Overrides the container's cross alignment.
    pub align_self: Option<CrossAlign>,
}

impl Default for FlexItem {
    fn default() -> Self {
        Self {
            grow: 0.0,
            shrink: None,
            basis: None,
            weight: 0.0,
            display_priority: 1,
            align_self: None,
        }
    }
}

/// The property bag attached to each layout node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutProps {
    /// Declared width.
    pub width: Option<Dimension>,
    /// Declared height.
    pub height: Option<Dimension>,
    /// Lower width bound.
    pub min_width: Option<Dimension>,
    /// Lower height bound.
    pub min_height: Option<Dimension>,
    /// Upper width bound.
    pub max_width: Option<Dimension>,
    /// Upper height bound.
    pub max_height: Option<Dimension>,
    /// Outer spacing, outside the frame.
    pub margin: Edges,
    /// Inner spacing between border and content.
    pub padding: Edges,
    /// Border widths.
    pub border: Edges,
    /// Width divided by height. Height is derived from width when set.
    pub aspect_ratio: Option<f32>,
    /// Sizing mode on axes without an ideal size.
    pub measure_type: MeasureType,
    /// Flex item metadata.
    pub flex: FlexItem,
    /// Explicit position; removes the node from flex flow.
    pub position: Option<Offset>,
    /// Id used by relative anchor rules.
    pub id: Option<String>,
    /// Anchor rules for relative containers.
    pub align_rules: AlignRules,
    /// Thread requirement of this node's algorithm.
    pub thread: ThreadClass,
}

impl LayoutProps {
    /// Props with a fixed pixel size.
    pub fn fixed(width: f32, height: f32) -> Self {
        Self {
            width: Some(Dimension::Px(width)),
            height: Some(Dimension::Px(height)),
            ..Self::default()
        }
    }

    /// Padding plus border.
    pub fn padding_border(&self) -> Edges {
        self.padding + self.border
    }

    /// Add an anchor rule.
    pub fn align(mut self, direction: AlignDirection, anchor: &str, align: Align) -> Self {
        self.align_rules
            .insert(direction, AlignRule::new(anchor, align));
        self
    }

    /// Set the anchor id.
    pub fn id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }
}
