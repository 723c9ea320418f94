use geom::{Dimension, Edges, LayoutConstraint, Offset, OptionalSize, Size, is_infinite};
use tracing::{debug, debug_span, trace, warn};

use crate::{
    NodeId,
    algorithm::AlgorithmState,
    context::{LayoutContext, TextDirection},
    geometry::Geometry,
    host::Visibility,
    props::{FlexItem, LayoutProps, MeasureType},
    tree::LayoutTree,
};

/// One measure or layout traversal over a tree.
///
/// Algorithms read and write node state only through this type, which
/// enforces that a node mutates its own geometry and its children's
/// offsets, and nothing else.
pub struct LayoutPass<'a> {
    /// Tree being updated.
    tree: &'a mut LayoutTree,
    /// Explicit context for this pass.
    cx: &'a LayoutContext,
}

impl<'a> LayoutPass<'a> {
    /// Begin a pass.
    pub fn new(tree: &'a mut LayoutTree, cx: &'a LayoutContext) -> Self {
        Self { tree, cx }
    }

    /// The context for this pass.
    pub fn context(&self) -> &LayoutContext {
        self.cx
    }

    /// Measure a node.
    pub fn measure(&mut self, id: NodeId, constraint: Option<LayoutConstraint>) {
        let Some(node) = self.tree.nodes.get_mut(id) else {
            warn!(?id, "measure: unknown node");
            return;
        };
        let Some(host) = node.host.upgrade() else {
            warn!(?id, "measure: host released, skipping");
            return;
        };
        let _span = debug_span!("measure", tag = host.tag(), depth = host.depth()).entered();

        if host.visibility() == Visibility::Gone {
            node.geometry = Geometry {
                margin: node.props.margin,
                ..Geometry::default()
            };
            node.measured = true;
            node.needs_layout = false;
            node.dirty = false;
            node.child_dirty = false;
            debug!("gone, collapsed");
            return;
        }
        let Some(algorithm) = node.algorithm.clone() else {
            warn!("measure: no algorithm bound, skipping");
            return;
        };

        let parent_constraint = constraint.unwrap_or_else(|| self.cx.root_constraint());
        let layout_constraint = resolve_constraint(&node.props, &parent_constraint);
        let padding_border = node.props.padding_border();
        let content_constraint = layout_constraint.child_constraint(padding_border);

        let geometry = &node.geometry;
        let unchanged = node.measured
            && geometry.parent_constraint == Some(parent_constraint)
            && geometry.layout_constraint == Some(layout_constraint)
            && geometry.content_constraint == Some(content_constraint);
        let skip = unchanged && !node.dirty && !node.child_dirty;
        node.constraint_unchanged = unchanged;
        node.skip_measure_content = skip;
        if skip {
            debug!("constraint unchanged, skipping");
            return;
        }

        node.geometry.margin = node.props.margin;
        node.geometry.padding_border = padding_border;
        node.geometry.parent_constraint = Some(parent_constraint);
        node.geometry.layout_constraint = Some(layout_constraint);
        node.geometry.content_constraint = Some(content_constraint);
        node.geometry.baseline = None;
        let aspect_ratio = node.props.aspect_ratio.filter(|r| *r > 0.0);

        algorithm.measure(self, id);

        let Some(node) = self.tree.nodes.get_mut(id) else {
            return;
        };
        if let Some(ratio) = aspect_ratio {
            let mut size = node.geometry.frame.size;
            size.height = size.width / ratio;
            node.geometry.set_frame_size(size);
        }
        node.measured = true;
        node.needs_layout = true;
        node.dirty = false;
        node.child_dirty = false;
        debug!(size = ?node.geometry.frame.size, "measured");
    }

    /// Position a node's children and lay them out.
    pub fn layout(&mut self, id: NodeId) {
        let Some(node) = self.tree.nodes.get(id) else {
            warn!(?id, "layout: unknown node");
            return;
        };
        let Some(host) = node.host.upgrade() else {
            warn!(?id, "layout: host released, skipping");
            return;
        };
        let _span = debug_span!("layout", tag = host.tag(), depth = host.depth()).entered();
        if host.visibility() == Visibility::Gone {
            return;
        }
        if !node.measured {
            debug!("layout before measure, measuring with root constraint");
            self.measure(id, None);
        }
        let Some(node) = self.tree.nodes.get(id) else {
            return;
        };
        if !node.needs_layout {
            trace!("layout up to date");
            return;
        }
        let Some(algorithm) = node.algorithm.clone() else {
            warn!("layout: no algorithm bound, skipping");
            return;
        };
        algorithm.layout(self, id);
        if let Some(node) = self.tree.nodes.get_mut(id) {
            node.needs_layout = false;
        }
    }

    /// Place the root at the origin, inside its margin.
    pub fn place_root(&mut self, id: NodeId) {
        self.set_margin_frame_offset(id, Offset::ZERO);
    }

    /// A node's properties.
    pub fn props(&self, id: NodeId) -> Option<&LayoutProps> {
        self.tree.nodes.get(id).map(|n| &n.props)
    }

    /// A node's flex item metadata.
    pub fn flex_item(&self, id: NodeId) -> FlexItem {
        self.props(id).map(|p| p.flex).unwrap_or_default()
    }

    /// Declared out-of-flow position.
    pub fn position(&self, id: NodeId) -> Option<Offset> {
        self.props(id).and_then(|p| p.position)
    }

    /// A copy of a node's geometry.
    pub fn geometry(&self, id: NodeId) -> Geometry {
        self.tree
            .nodes
            .get(id)
            .map(|n| n.geometry)
            .unwrap_or_default()
    }

    /// Host visibility, with a missing host counting as gone.
    pub fn visibility(&self, id: NodeId) -> Visibility {
        self.tree
            .nodes
            .get(id)
            .map_or(Visibility::Gone, |n| n.visibility())
    }

    /// Resolved direction for a declared text direction.
    pub fn direction(&self, declared: TextDirection) -> TextDirection {
        self.cx.resolve_direction(declared)
    }

    /// All children, built and added to the render set, excluding gone ones.
    pub fn visible_children(&mut self, id: NodeId) -> Vec<NodeId> {
        let children = self.tree.all_children_with_build(id);
        let mut visible = Vec::with_capacity(children.len());
        for child in children {
            self.tree.set_active(child, true);
            if self.visibility(child) == Visibility::Gone {
                self.collapse(child);
            } else {
                visible.push(child);
            }
        }
        visible
    }

    /// Constraint this node resolved for itself.
    pub fn layout_constraint(&self, id: NodeId) -> LayoutConstraint {
        self.geometry(id).layout_constraint.unwrap_or_default()
    }

    /// Constraint offered to this node's children.
    pub fn content_constraint(&self, id: NodeId) -> LayoutConstraint {
        self.geometry(id).content_constraint.unwrap_or_default()
    }

    /// Padding plus border.
    pub fn padding_border(&self, id: NodeId) -> Edges {
        self.geometry(id).padding_border
    }

    /// Measure the node's leaf content, if it has any.
    ///
    /// The content baseline, when reported, becomes the node's baseline.
    pub fn measure_content(&mut self, id: NodeId) -> Option<Size> {
        let node = self.tree.nodes.get_mut(id)?;
        let pb = node.geometry.padding_border;
        let constraint = node.geometry.layout_constraint.unwrap_or_default().deflate(pb);
        let content = node.content.as_mut()?;
        let size = content.measure(&constraint);
        let baseline = content.baseline(size);
        node.measure_count += 1;
        node.geometry.baseline = baseline.map(|b| b + pb.top);
        Some(size)
    }

    /// Frame size from content extents: ideal axes are kept, the rest wrap
    /// the content plus padding, and the result is clamped.
    pub fn resolve_frame_size(&self, id: NodeId, content: Size) -> Size {
        let geometry = self.geometry(id);
        let constraint = geometry.layout_constraint.unwrap_or_default();
        let natural = content.inflate(geometry.padding_border);
        constraint.clamp(constraint.ideal_size().unwrap_or(natural))
    }

    /// Set a node's frame size.
    pub fn set_frame_size(&mut self, id: NodeId, size: Size) {
        if let Some(node) = self.tree.nodes.get_mut(id) {
            node.geometry.set_frame_size(size);
        }
    }

    /// Position a node by its margin box, relative to its parent's content
    /// origin.
    pub fn set_margin_frame_offset(&mut self, id: NodeId, offset: Offset) {
        if let Some(node) = self.tree.nodes.get_mut(id) {
            node.geometry.set_margin_frame_offset(offset);
            trace!(?id, offset = ?node.geometry.frame.offset, "placed");
        }
    }

    /// Add or remove a node from the render set.
    pub fn set_active(&mut self, id: NodeId, active: bool) {
        self.tree.set_active(id, active);
    }

    /// Collapse a node to zero size and force its next measure to run.
    pub fn collapse(&mut self, id: NodeId) {
        if let Some(node) = self.tree.nodes.get_mut(id) {
            node.geometry.collapse();
            node.measured = false;
            node.needs_layout = false;
        }
    }

    /// Take the scratch a node's algorithm stored during measure.
    pub fn state(&self, id: NodeId) -> Option<&AlgorithmState> {
        self.tree.nodes.get(id).and_then(|n| n.state.as_ref())
    }

    /// Store algorithm scratch for the layout step.
    pub fn set_state(&mut self, id: NodeId, state: AlgorithmState) {
        if let Some(node) = self.tree.nodes.get_mut(id) {
            node.state = Some(state);
        }
    }

    /// Use a child's baseline, placed at `child_offset` within the content
    /// box, unless the node's own content already reported one.
    pub fn inherit_baseline(&mut self, id: NodeId, child: NodeId, child_offset: Offset) {
        let child = self.geometry(child);
        let Some(node) = self.tree.nodes.get_mut(id) else {
            return;
        };
        if node.geometry.baseline.is_some() {
            return;
        }
        node.geometry.baseline = Some(
            node.geometry.padding_border.top
                + child_offset.y
                + child.margin.top
                + child.baseline_distance(),
        );
    }
}

/// Resolve the constraint a node measures itself under.
///
/// The margin is removed from the parent's bounds. A forced ideal size from
/// the parent wins over the node's declared size, which wins over
/// match-parent sizing. Declared min and max sizes narrow the bounds.
fn resolve_constraint(props: &LayoutProps, parent: &LayoutConstraint) -> LayoutConstraint {
    let reference = parent.percent_reference;
    let scale = parent.scale;
    let resolve_w = |d: Option<Dimension>| d.and_then(|d| d.resolve(reference.width, scale));
    let resolve_h = |d: Option<Dimension>| d.and_then(|d| d.resolve(reference.height, scale));

    let mut c = parent.deflate(props.margin);
    c.self_ideal.fill_unset(OptionalSize {
        width: resolve_w(props.width),
        height: resolve_h(props.height),
    });
    if props.measure_type == MeasureType::MatchParent {
        let finite = |v: f32| (!is_infinite(v)).then_some(v);
        let margin = props.margin;
        c.self_ideal.fill_unset(OptionalSize {
            width: parent
                .parent_ideal
                .width
                .map(|w| (w - margin.horizontal()).max(0.0))
                .or_else(|| finite(c.max_size.width)),
            height: parent
                .parent_ideal
                .height
                .map(|h| (h - margin.vertical()).max(0.0))
                .or_else(|| finite(c.max_size.height)),
        });
    }
    if let Some(v) = resolve_w(props.min_width) {
        c.min_size.width = c.min_size.width.max(v);
    }
    if let Some(v) = resolve_h(props.min_height) {
        c.min_size.height = c.min_size.height.max(v);
    }
    if let Some(v) = resolve_w(props.max_width) {
        c.max_size.width = c.max_size.width.min(v);
    }
    if let Some(v) = resolve_h(props.max_height) {
        c.max_size.height = c.max_size.height.min(v);
    }
    if let Some(ratio) = props.aspect_ratio.filter(|r| *r > 0.0)
        && let Some(width) = c.self_ideal.width
        && c.self_ideal.height.is_none()
    {
        c.self_ideal.height = Some(width / ratio);
    }
    c
}
