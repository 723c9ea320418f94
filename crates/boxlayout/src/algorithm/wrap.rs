use std::mem;

use geom::{Axis, LayoutConstraint, Offset, Size, is_infinite, near_equal};
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use super::{
    AlgorithmState,
    flex::{MainAlign, calculate_space},
};
use crate::{NodeId, pass::LayoutPass};

/// Flow direction of items within a line.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapDirection {
    /// Left to right, lines stacked downward.
    #[default]
    Horizontal,
    /// Right to left, lines stacked downward.
    HorizontalReverse,
    /// Top to bottom, lines stacked rightward.
    Vertical,
    /// Bottom to top, lines stacked rightward.
    VerticalReverse,
}

impl WrapDirection {
    /// Main axis of a line.
    pub fn axis(self) -> Axis {
        match self {
            Self::Horizontal | Self::HorizontalReverse => Axis::Horizontal,
            Self::Vertical | Self::VerticalReverse => Axis::Vertical,
        }
    }

    /// True if items run from the far main edge.
    pub fn is_reverse(self) -> bool {
        matches!(self, Self::HorizontalReverse | Self::VerticalReverse)
    }
}

/// Alignment used for lines, items within a line, and items across a line.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapAlignment {
    /// Leading edge.
    #[default]
    Start,
    /// Centered.
    Center,
    /// Trailing edge.
    End,
    /// Equal space around each entry.
    SpaceAround,
    /// Free space between entries only.
    SpaceBetween,
    /// Equal space between and around entries.
    SpaceEvenly,
    /// Items fill the line's cross extent.
    Stretch,
    /// Accepted, positioned as `Start`.
    Baseline,
}

impl WrapAlignment {
    /// Free-space distribution for this mode.
    fn distribution(self) -> MainAlign {
        match self {
            Self::Start | Self::Stretch | Self::Baseline => MainAlign::Start,
            Self::Center => MainAlign::Center,
            Self::End => MainAlign::End,
            Self::SpaceAround => MainAlign::SpaceAround,
            Self::SpaceBetween => MainAlign::SpaceBetween,
            Self::SpaceEvenly => MainAlign::SpaceEvenly,
        }
    }
}

/// Wrap container parameters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WrapParams {
    /// Item flow direction.
    pub direction: WrapDirection,
    /// Distribution of lines across the cross axis.
    pub alignment: WrapAlignment,
    /// Distribution of items within a line.
    pub main_alignment: WrapAlignment,
    /// Placement of items across their line.
    pub cross_alignment: WrapAlignment,
    /// Gap between items in a line.
    pub spacing: f32,
    /// Gap between lines.
    pub content_space: f32,
}

/// One content line.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WrapLine {
    /// Items in order.
    pub items: Vec<NodeId>,
    /// Sum of item main extents and the spacing between them.
    pub main: f32,
    /// Largest item cross extent.
    pub cross: f32,
}

/// Lines kept from measure for layout.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WrapState {
    /// Lines in cross-axis order.
    pub lines: Vec<WrapLine>,
    /// Sum of line cross extents and the space between lines.
    pub total_cross: f32,
}

/// Break items into lines and size the container.
pub fn measure(params: &WrapParams, pass: &mut LayoutPass<'_>, id: NodeId) {
    let axis = params.direction.axis();
    let children = pass.visible_children(id);
    if children.is_empty() {
        let size = pass.resolve_frame_size(id, Size::ZERO);
        pass.set_frame_size(id, size);
        pass.set_state(id, AlgorithmState::Wrap(WrapState::default()));
        return;
    }

    let layout_constraint = pass.layout_constraint(id);
    let padding = pass.padding_border(id);
    let main_limit = (layout_constraint
        .ideal_size()
        .main(axis)
        .unwrap_or(layout_constraint.max_size.main(axis))
        - padding.along(axis))
    .max(0.0);
    let child_constraint = pass.content_constraint(id);

    let mut lines = Vec::new();
    let mut line = WrapLine::default();
    for child in children {
        pass.measure(child, Some(child_constraint));
        let size = pass.geometry(child).margin_frame_size();
        let (main, cross) = (size.main(axis), size.cross(axis));
        let needed = line.main + params.spacing + main;
        if !line.items.is_empty() && needed > main_limit && !near_equal(needed, main_limit) {
            lines.push(close_line(params, pass, child_constraint, mem::take(&mut line)));
        }
        line.main = if line.items.is_empty() { main } else { needed };
        line.cross = line.cross.max(cross);
        line.items.push(child);
    }
    lines.push(close_line(params, pass, child_constraint, line));

    let gaps = params.content_space * lines.len().saturating_sub(1) as f32;
    let total_cross = gaps + lines.iter().map(|l| l.cross).sum::<f32>();
    let longest = lines.iter().map(|l| l.main).fold(0.0, f32::max);
    let main = if is_infinite(main_limit) { longest } else { main_limit };
    trace!(lines = lines.len(), main, total_cross, "wrapped");

    let size = pass.resolve_frame_size(id, Size::from_main_cross(axis, main, total_cross));
    pass.set_frame_size(id, size);
    let state = WrapState { lines, total_cross };
    if let Some((first, offset)) = placements(params, pass, id, &state).first().copied() {
        pass.inherit_baseline(id, first, offset);
    }
    pass.set_state(id, AlgorithmState::Wrap(state));
}

/// Finish a line, stretching short items to the line's cross extent.
fn close_line(
    params: &WrapParams,
    pass: &mut LayoutPass<'_>,
    child_constraint: LayoutConstraint,
    line: WrapLine,
) -> WrapLine {
    if params.cross_alignment == WrapAlignment::Stretch {
        let axis = params.direction.axis();
        for item in &line.items {
            let cross = pass.geometry(*item).margin_frame_size().cross(axis);
            if line.cross > cross && !near_equal(line.cross, cross) {
                let mut constraint = child_constraint;
                constraint.set_ideal_cross(axis, line.cross);
                pass.measure(*item, Some(constraint));
            }
        }
    }
    line
}

/// Margin-box offsets of every item within the content box.
fn placements(
    params: &WrapParams,
    pass: &LayoutPass<'_>,
    id: NodeId,
    state: &WrapState,
) -> Vec<(NodeId, Offset)> {
    let axis = params.direction.axis();
    let reverse = params.direction.is_reverse();
    let content = pass.geometry(id).content_size();
    let main_limit = content.main(axis);
    let cross_remain = (content.cross(axis) - state.total_cross).max(0.0);
    let (front, extra) =
        calculate_space(params.alignment.distribution(), cross_remain, 0.0, state.lines.len());

    let mut out = Vec::new();
    let mut line_pos = front;
    for line in &state.lines {
        let remain = (main_limit - line.main).max(0.0);
        let (lead, gap) =
            calculate_space(params.main_alignment.distribution(), remain, 0.0, line.items.len());
        let between = params.spacing + gap;
        let mut cursor = if reverse { main_limit - lead } else { lead };
        for item in &line.items {
            let size = pass.geometry(*item).margin_frame_size();
            let (main, cross) = (size.main(axis), size.cross(axis));
            let main_pos = if reverse {
                cursor -= main;
                let pos = cursor;
                cursor -= between;
                pos
            } else {
                let pos = cursor;
                cursor += main + between;
                pos
            };
            let cross_pos = line_pos
                + match params.cross_alignment {
                    WrapAlignment::End => line.cross - cross,
                    WrapAlignment::Center => (line.cross - cross) / 2.0,
                    _ => 0.0,
                };
            out.push((*item, Offset::from_main_cross(axis, main_pos, cross_pos)));
        }
        line_pos += line.cross + params.content_space + extra;
    }
    out
}

/// Position every item, then lay them out.
pub fn layout(params: &WrapParams, pass: &mut LayoutPass<'_>, id: NodeId) {
    let Some(AlgorithmState::Wrap(state)) = pass.state(id).cloned() else {
        warn!("wrap layout without measure state");
        return;
    };
    for (child, offset) in placements(params, pass, id, &state) {
        pass.set_margin_frame_offset(child, offset);
        pass.layout(child);
    }
}

#[cfg(test)]
mod tests {
    use geom::{Dimension, Rect};

    use super::*;
    use crate::{Algorithm, LayoutContext, LayoutTree, NodeBuilder, Result, host::HostPool};

    fn wrap_of(params: WrapParams, sizes: &[(f32, f32)], hosts: &mut HostPool) -> NodeBuilder {
        NodeBuilder::new(hosts.node("wrap"))
            .algorithm(Algorithm::Wrap(params))
            .children(
                sizes
                    .iter()
                    .enumerate()
                    .map(|(i, (w, h))| NodeBuilder::new(hosts.node(&format!("item{i}"))).size(*w, *h)),
            )
    }

    fn child_frames(tree: &LayoutTree, parent: NodeId) -> Vec<Rect> {
        tree.children_in_order(parent)
            .iter()
            .filter_map(|c| tree.geometry(*c).map(|g| g.frame))
            .collect()
    }

    fn run(tree: &mut LayoutTree) -> Result<()> {
        tree.run(&LayoutContext::new(Size::new(100.0, 500.0)))
    }

    #[test]
    fn breaks_lines_with_spacing() -> Result<()> {
        let mut hosts = HostPool::default();
        let mut tree = LayoutTree::new();
        let params = WrapParams {
            spacing: 10.0,
            content_space: 5.0,
            ..WrapParams::default()
        };
        let root = tree.insert_root(wrap_of(
            params,
            &[(40.0, 10.0), (50.0, 20.0), (30.0, 10.0), (60.0, 15.0)],
            &mut hosts,
        ));
        run(&mut tree)?;
        let frames = child_frames(&tree, root);
        assert_eq!(frames[0].offset, Offset::new(0.0, 0.0));
        assert_eq!(frames[1].offset, Offset::new(50.0, 0.0));
        assert_eq!(frames[2].offset, Offset::new(0.0, 25.0));
        assert_eq!(frames[3].offset, Offset::new(40.0, 25.0));
        assert_eq!(
            tree.geometry(root).map(|g| g.frame.size),
            Some(Size::new(100.0, 40.0))
        );
        Ok(())
    }

    #[test]
    fn oversized_item_gets_its_own_line() -> Result<()> {
        let mut hosts = HostPool::default();
        let mut tree = LayoutTree::new();
        let root = tree.insert_root(wrap_of(
            WrapParams::default(),
            &[(150.0, 10.0), (20.0, 10.0)],
            &mut hosts,
        ));
        run(&mut tree)?;
        let Some(AlgorithmState::Wrap(state)) = tree.node(root).and_then(|n| n.state.clone()) else {
            panic!("wrap state missing");
        };
        assert_eq!(state.lines.len(), 2);
        assert!(state.lines.iter().all(|l| !l.items.is_empty()));
        Ok(())
    }

    #[test]
    fn reverse_runs_from_far_edge() -> Result<()> {
        let mut hosts = HostPool::default();
        let mut tree = LayoutTree::new();
        let root = tree.insert_root(wrap_of(
            WrapParams {
                direction: WrapDirection::HorizontalReverse,
                main_alignment: WrapAlignment::Center,
                ..WrapParams::default()
            },
            &[(30.0, 10.0), (30.0, 10.0)],
            &mut hosts,
        ));
        run(&mut tree)?;
        let frames = child_frames(&tree, root);
        assert_eq!(frames[0].offset.x, 50.0);
        assert_eq!(frames[1].offset.x, 20.0);
        Ok(())
    }

    #[test]
    fn stretch_and_center_across_line() -> Result<()> {
        let mut hosts = HostPool::default();
        let mut tree = LayoutTree::new();
        let root = tree.insert_root(wrap_of(
            WrapParams {
                cross_alignment: WrapAlignment::Stretch,
                ..WrapParams::default()
            },
            &[(30.0, 10.0), (30.0, 24.0)],
            &mut hosts,
        ));
        run(&mut tree)?;
        assert_eq!(child_frames(&tree, root)[0].size.height, 24.0);

        let root = tree.insert_root(wrap_of(
            WrapParams {
                cross_alignment: WrapAlignment::Center,
                ..WrapParams::default()
            },
            &[(30.0, 10.0), (30.0, 24.0)],
            &mut hosts,
        ));
        run(&mut tree)?;
        assert_eq!(child_frames(&tree, root)[0].offset.y, 7.0);
        Ok(())
    }

    #[test]
    fn lines_distributed_when_cross_is_fixed() -> Result<()> {
        let mut hosts = HostPool::default();
        let mut tree = LayoutTree::new();
        let root = tree.insert_root(
            wrap_of(
                WrapParams {
                    direction: WrapDirection::Vertical,
                    alignment: WrapAlignment::SpaceBetween,
                    ..WrapParams::default()
                },
                &[(20.0, 60.0), (20.0, 60.0)],
                &mut hosts,
            )
            .with_props(|p| {
                p.width = Some(Dimension::Px(100.0));
                p.height = Some(Dimension::Px(100.0));
            }),
        );
        run(&mut tree)?;
        let frames = child_frames(&tree, root);
        assert_eq!(frames[0].offset, Offset::new(0.0, 0.0));
        assert_eq!(frames[1].offset, Offset::new(80.0, 0.0));
        Ok(())
    }
}
