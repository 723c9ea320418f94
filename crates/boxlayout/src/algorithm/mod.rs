//! Layout strategies bound per node.
//!
//! Each strategy measures a node's children and resolves the node's frame
//! size, then positions the children during layout. Strategies share no
//! state beyond the per-node scratch in [`AlgorithmState`].

/// Flex line distribution.
mod flex;
/// Linear layout defaults over flex.
mod linear;
/// Anchor rule resolution.
mod relative;
/// Overlaid children.
mod stack;
/// Multi-line wrapping.
mod wrap;

use serde::{Deserialize, Serialize};

pub use flex::{FlexDirection, FlexParams, FlexState, MainAlign};
pub use linear::LinearParams;
pub use relative::{CONTAINER_ID, RelativeState};
pub use stack::StackParams;
pub use wrap::{WrapAlignment, WrapDirection, WrapLine, WrapParams, WrapState};

use crate::{NodeId, pass::LayoutPass, props::Align};

/// Strategy bound to a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Algorithm {
    /// Children overlaid and aligned in the content box.
    Stack(StackParams),
    /// A single row or column with linear defaults.
    Linear(LinearParams),
    /// Flexible box distribution.
    Flex(FlexParams),
    /// Items broken into lines.
    Wrap(WrapParams),
    /// Children positioned by anchor rules.
    Relative,
}

impl Algorithm {
    /// Measure `id`'s children and resolve its frame size.
    pub(crate) fn measure(&self, pass: &mut LayoutPass<'_>, id: NodeId) {
        match self {
            Self::Stack(params) => stack::measure(params, pass, id),
            Self::Linear(params) => flex::measure(&params.to_flex(), true, pass, id),
            Self::Flex(params) => flex::measure(params, false, pass, id),
            Self::Wrap(params) => wrap::measure(params, pass, id),
            Self::Relative => relative::measure(pass, id),
        }
    }

    /// Position `id`'s children and lay them out.
    pub(crate) fn layout(&self, pass: &mut LayoutPass<'_>, id: NodeId) {
        match self {
            Self::Stack(params) => stack::layout(params, pass, id),
            Self::Linear(params) => flex::layout(&params.to_flex(), pass, id),
            Self::Flex(params) => flex::layout(params, pass, id),
            Self::Wrap(params) => wrap::layout(params, pass, id),
            Self::Relative => relative::layout(pass, id),
        }
    }
}

/// Scratch carried from measure to layout.
#[derive(Debug, Clone, PartialEq)]
pub enum AlgorithmState {
    /// Flex accounting.
    Flex(FlexState),
    /// Wrap lines.
    Wrap(WrapState),
    /// Resolved anchor offsets.
    Relative(RelativeState),
}

/// Offset of a child within `available` space.
fn align_offset(child: f32, available: f32, align: Align) -> f32 {
    match align {
        Align::Start => 0.0,
        Align::Center => (available - child) / 2.0,
        Align::End => available - child,
    }
}
