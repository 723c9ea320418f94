use geom::{Offset, Size};
use serde::{Deserialize, Serialize};

use super::align_offset;
use crate::{NodeId, context::TextDirection, pass::LayoutPass, props::Align};

/// Alignment of overlaid children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackParams {
    /// Horizontal alignment. Start is the reading-direction start.
    pub horizontal: Align,
    /// Vertical alignment.
    pub vertical: Align,
}

impl Default for StackParams {
    fn default() -> Self {
        Self {
            horizontal: Align::Center,
            vertical: Align::Center,
        }
    }
}

/// Size to the leaf content and the largest child margin box.
pub fn measure(params: &StackParams, pass: &mut LayoutPass<'_>, id: NodeId) {
    let children = pass.visible_children(id);
    let child_constraint = pass.content_constraint(id);
    let mut extent = pass.measure_content(id).unwrap_or(Size::ZERO);
    for child in &children {
        pass.measure(*child, Some(child_constraint));
        if pass.position(*child).is_none() {
            extent = extent.max(pass.geometry(*child).margin_frame_size());
        }
    }
    let size = pass.resolve_frame_size(id, extent);
    pass.set_frame_size(id, size);

    let content = pass.geometry(id).content_size();
    if let Some(first) = children.first() {
        let offset = child_offset(params, pass, *first, content);
        pass.inherit_baseline(id, *first, offset);
    }
}

/// Align each child in the content box.
pub fn layout(params: &StackParams, pass: &mut LayoutPass<'_>, id: NodeId) {
    let content = pass.geometry(id).content_size();
    for child in pass.visible_children(id) {
        let offset = child_offset(params, pass, child, content);
        pass.set_margin_frame_offset(child, offset);
        pass.layout(child);
    }
}

/// Margin-box offset of `child`. A declared position wins over alignment.
fn child_offset(params: &StackParams, pass: &LayoutPass<'_>, child: NodeId, content: Size) -> Offset {
    if let Some(position) = pass.position(child) {
        return position;
    }
    let size = pass.geometry(child).margin_frame_size();
    let horizontal = match (pass.direction(TextDirection::Auto), params.horizontal) {
        (TextDirection::Rtl, Align::Start) => Align::End,
        (TextDirection::Rtl, Align::End) => Align::Start,
        (_, align) => align,
    };
    Offset::new(
        align_offset(size.width, content.width, horizontal),
        align_offset(size.height, content.height, params.vertical),
    )
}

#[cfg(test)]
mod tests {
    use geom::{Edges, Rect};

    use super::*;
    use crate::{
        Algorithm, LayoutContext, LayoutTree, NodeBuilder, Result, content::FixedContent,
        host::HostPool,
    };

    #[test]
    fn children_centered_in_padded_box() -> Result<()> {
        let mut hosts = HostPool::default();
        let mut tree = LayoutTree::new();
        let root = tree.insert_root(
            NodeBuilder::new(hosts.node("box"))
                .with_props(|p| p.padding = Edges::all(5.0))
                .child(NodeBuilder::new(hosts.node("a")).size(20.0, 10.0))
                .child(
                    NodeBuilder::new(hosts.node("b"))
                        .content(FixedContent::new(40.0, 30.0))
                        .with_props(|p| p.margin = Edges::all(2.0)),
                ),
        );
        tree.run(&LayoutContext::new(Size::new(200.0, 200.0)))?;
        let children = tree.children_in_order(root);
        assert_eq!(
            tree.geometry(root).map(|g| g.frame),
            Some(Rect::new(0.0, 0.0, 54.0, 44.0))
        );
        assert_eq!(
            tree.geometry(children[0]).map(|g| g.frame),
            Some(Rect::new(12.0, 12.0, 20.0, 10.0))
        );
        assert_eq!(
            tree.geometry(children[1]).map(|g| g.frame),
            Some(Rect::new(2.0, 2.0, 40.0, 30.0))
        );
        Ok(())
    }

    #[test]
    fn rtl_flips_start() -> Result<()> {
        let mut hosts = HostPool::default();
        let mut tree = LayoutTree::new();
        let root = tree.insert_root(
            NodeBuilder::new(hosts.node("box"))
                .size(100.0, 50.0)
                .algorithm(Algorithm::Stack(StackParams {
                    horizontal: Align::Start,
                    vertical: Align::End,
                }))
                .child(NodeBuilder::new(hosts.node("a")).size(20.0, 10.0)),
        );
        let cx = LayoutContext::new(Size::new(200.0, 200.0))
            .with_direction(TextDirection::Rtl);
        tree.run(&cx)?;
        let child = tree.children_in_order(root)[0];
        assert_eq!(
            tree.geometry(child).map(|g| g.frame.offset),
            Some(Offset::new(80.0, 40.0))
        );
        Ok(())
    }
}
