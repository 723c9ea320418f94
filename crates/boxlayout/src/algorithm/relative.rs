use std::collections::{BTreeSet, HashMap, VecDeque};

use geom::{Axis, LayoutConstraint, Offset, Rect, Size, is_infinite};
use tracing::{debug, warn};

use super::AlgorithmState;
use crate::{
    NodeId,
    pass::LayoutPass,
    props::{Align, AlignDirection, AlignRule, AlignRules},
};

/// Anchor id that names the container itself.
pub const CONTAINER_ID: &str = "__container__";

/// Anchor resolution kept from measure for layout.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RelativeState {
    /// Keyed children in resolution order.
    pub order: Vec<NodeId>,
    /// Margin-box offsets of every placed child.
    pub placed: Vec<(NodeId, Offset)>,
    /// The rules formed a cycle and nothing was resolved.
    pub cyclic: bool,
}

/// Container size: ideal, else finite max, else zero.
fn container_size(pass: &LayoutPass<'_>, id: NodeId) -> Size {
    let constraint = pass.layout_constraint(id);
    let ideal = constraint.ideal_size();
    let finite = |v: f32| if is_infinite(v) { 0.0 } else { v };
    constraint.clamp(Size::new(
        ideal
            .width
            .unwrap_or_else(|| finite(constraint.max_size.width)),
        ideal
            .height
            .unwrap_or_else(|| finite(constraint.max_size.height)),
    ))
}

/// Order keyed children so every anchor precedes its dependents. `None`
/// if the rules form a cycle.
fn topological_order(pass: &LayoutPass<'_>, keyed: &[(String, NodeId)]) -> Option<Vec<usize>> {
    let index: HashMap<&str, usize> = keyed
        .iter()
        .enumerate()
        .map(|(i, (name, _))| (name.as_str(), i))
        .collect();
    let mut in_degree = vec![0_usize; keyed.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); keyed.len()];
    for (i, (name, child)) in keyed.iter().enumerate() {
        let Some(props) = pass.props(*child) else {
            continue;
        };
        let anchors: BTreeSet<usize> = props
            .align_rules
            .values()
            .filter(|rule| rule.anchor != CONTAINER_ID)
            .filter_map(|rule| {
                let found = index.get(rule.anchor.as_str()).copied();
                if found.is_none() {
                    warn!(node = %name, anchor = %rule.anchor, "unknown anchor, rule ignored");
                }
                found
            })
            .collect();
        in_degree[i] = anchors.len();
        for anchor in anchors {
            dependents[anchor].push(i);
        }
    }

    let mut queue: VecDeque<usize> = (0..keyed.len()).filter(|i| in_degree[*i] == 0).collect();
    let mut order = Vec::with_capacity(keyed.len());
    while let Some(i) = queue.pop_front() {
        order.push(i);
        for dependent in &dependents[i] {
            in_degree[*dependent] -= 1;
            if in_degree[*dependent] == 0 {
                queue.push_back(*dependent);
            }
        }
    }
    if order.len() < keyed.len() {
        let stuck: Vec<&str> = keyed
            .iter()
            .enumerate()
            .filter(|(i, _)| in_degree[*i] > 0)
            .map(|(_, (name, _))| name.as_str())
            .collect();
        warn!(nodes = ?stuck, "anchor rules form a cycle");
        return None;
    }
    Some(order)
}

/// Resolved position of the part of an anchor a rule names.
fn anchor_position(
    rule: &AlignRule,
    axis: Axis,
    container: Size,
    resolved: &HashMap<String, Rect>,
) -> Option<f32> {
    let (start, extent) = if rule.anchor == CONTAINER_ID {
        (0.0, container.main(axis))
    } else {
        let rect = resolved.get(&rule.anchor)?;
        (rect.offset.main(axis), rect.size.main(axis))
    };
    Some(
        start
            + match rule.align {
                Align::Start => 0.0,
                Align::Center => extent / 2.0,
                Align::End => extent,
            },
    )
}

/// The first two resolvable rules on an axis, in edge order.
fn axis_edges(
    rules: &AlignRules,
    axis: Axis,
    container: Size,
    resolved: &HashMap<String, Rect>,
) -> Vec<(AlignDirection, f32)> {
    rules
        .iter()
        .filter(|(direction, _)| direction.is_horizontal() == (axis == Axis::Horizontal))
        .filter_map(|(direction, rule)| {
            anchor_position(rule, axis, container, resolved).map(|p| (*direction, p))
        })
        .take(2)
        .collect()
}

/// Extent forced by two bound edges. A midpoint doubles the half-extent.
fn derived_extent(edges: &[(AlignDirection, f32)]) -> Option<f32> {
    let [(first, from), (second, to)] = edges else {
        return None;
    };
    let midpoint = |d: AlignDirection| matches!(d, AlignDirection::Middle | AlignDirection::Center);
    if midpoint(*first) || midpoint(*second) {
        Some(2.0 * (to - from))
    } else {
        Some(to - from)
    }
}

/// Offset placing the edge named by the first rule at its anchor position.
fn edge_offset(edge: Option<&(AlignDirection, f32)>, extent: f32) -> f32 {
    match edge {
        None => 0.0,
        Some((AlignDirection::Left | AlignDirection::Top, p)) => *p,
        Some((AlignDirection::Middle | AlignDirection::Center, p)) => p - extent / 2.0,
        Some((AlignDirection::Right | AlignDirection::Bottom, p)) => p - extent,
    }
}

/// Measure one keyed child against its rules and return its margin box.
fn resolve_child(
    pass: &mut LayoutPass<'_>,
    child: NodeId,
    base: LayoutConstraint,
    container: Size,
    resolved: &HashMap<String, Rect>,
) -> Rect {
    let rules = pass
        .props(child)
        .map(|p| p.align_rules.clone())
        .unwrap_or_default();
    let horizontal = axis_edges(&rules, Axis::Horizontal, container, resolved);
    let vertical = axis_edges(&rules, Axis::Vertical, container, resolved);

    let mut constraint = base;
    constraint.min_size = Size::ZERO;
    constraint.max_size = container;
    for (axis, edges) in [(Axis::Horizontal, &horizontal), (Axis::Vertical, &vertical)] {
        if let Some(mut extent) = derived_extent(edges) {
            if extent < 0.0 {
                warn!(?child, ?axis, extent, "anchors cross, extent clamped to zero");
                extent = 0.0;
            }
            constraint.max_size.set_main(axis, extent);
            constraint.set_ideal_main(axis, extent);
        }
    }
    pass.measure(child, Some(constraint));

    let size = pass.geometry(child).margin_frame_size();
    let offset = Offset::new(
        edge_offset(horizontal.first(), size.width),
        edge_offset(vertical.first(), size.height),
    );
    Rect::from_parts(offset, size)
}

/// Resolve anchor rules and size every child.
pub fn measure(pass: &mut LayoutPass<'_>, id: NodeId) {
    let children = pass.visible_children(id);
    let size = container_size(pass, id);
    pass.set_frame_size(id, size);
    let content = pass.geometry(id).content_size();
    let child_constraint = pass.content_constraint(id);

    let mut keyed: Vec<(String, NodeId)> = Vec::new();
    let mut loose = Vec::new();
    for child in &children {
        match pass.props(*child).and_then(|p| p.id.clone()) {
            Some(name) if keyed.iter().any(|(k, _)| *k == name) => {
                warn!(id = %name, "duplicate anchor id, later node unanchored");
                loose.push(*child);
            }
            Some(name) => keyed.push((name, *child)),
            None => loose.push(*child),
        }
    }

    let Some(order) = topological_order(pass, &keyed) else {
        for child in &children {
            pass.set_active(*child, false);
            pass.collapse(*child);
        }
        pass.set_state(
            id,
            AlgorithmState::Relative(RelativeState {
                cyclic: true,
                ..RelativeState::default()
            }),
        );
        return;
    };

    let mut placed = Vec::with_capacity(children.len());
    for child in loose {
        pass.measure(child, Some(child_constraint));
        placed.push((child, Offset::ZERO));
    }
    let mut resolved: HashMap<String, Rect> = HashMap::new();
    for index in &order {
        let (name, child) = &keyed[*index];
        let rect = resolve_child(pass, *child, child_constraint, content, &resolved);
        debug!(node = %name, ?rect, "anchored");
        resolved.insert(name.clone(), rect);
        placed.push((*child, rect.offset));
    }
    pass.set_state(
        id,
        AlgorithmState::Relative(RelativeState {
            order: order.iter().map(|i| keyed[*i].1).collect(),
            placed,
            cyclic: false,
        }),
    );
}

/// Place children at their resolved offsets, then lay them out.
pub fn layout(pass: &mut LayoutPass<'_>, id: NodeId) {
    let Some(AlgorithmState::Relative(state)) = pass.state(id).cloned() else {
        warn!("relative layout without measure state");
        return;
    };
    for (child, offset) in state.placed {
        pass.set_margin_frame_offset(child, offset);
        pass.layout(child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Algorithm, LayoutContext, LayoutTree, NodeBuilder, Result,
        host::HostPool,
        props::{AlignDirection::*, LayoutProps},
    };

    fn container(hosts: &mut HostPool, children: Vec<NodeBuilder>) -> NodeBuilder {
        NodeBuilder::new(hosts.node("relative"))
            .size(300.0, 200.0)
            .algorithm(Algorithm::Relative)
            .children(children)
    }

    fn frame(tree: &LayoutTree, root: NodeId, index: usize) -> Option<Rect> {
        let child = *tree.children_in_order(root).get(index)?;
        tree.geometry(child).map(|g| g.frame)
    }

    fn run(tree: &mut LayoutTree) -> Result<()> {
        tree.run(&LayoutContext::new(Size::new(1000.0, 1000.0)))
    }

    #[test]
    fn two_rules_derive_width() -> Result<()> {
        let mut hosts = HostPool::default();
        let mut tree = LayoutTree::new();
        let props = LayoutProps::fixed(40.0, 20.0)
            .id("a")
            .align(Left, CONTAINER_ID, Align::Start)
            .align(Right, CONTAINER_ID, Align::Center);
        let child = NodeBuilder::new(hosts.node("a")).props(props);
        let root = tree.insert_root(container(&mut hosts, vec![child]));
        run(&mut tree)?;
        assert_eq!(frame(&tree, root, 0), Some(Rect::new(0.0, 0.0, 150.0, 20.0)));
        Ok(())
    }

    #[test]
    fn middle_with_edge_doubles_half_extent() -> Result<()> {
        let mut hosts = HostPool::default();
        let mut tree = LayoutTree::new();
        let props = LayoutProps::fixed(40.0, 20.0)
            .id("a")
            .align(Left, CONTAINER_ID, Align::Start)
            .align(Middle, CONTAINER_ID, Align::Center)
            .align(Bottom, CONTAINER_ID, Align::End);
        let child = NodeBuilder::new(hosts.node("a")).props(props);
        let root = tree.insert_root(container(&mut hosts, vec![child]));
        run(&mut tree)?;
        assert_eq!(frame(&tree, root, 0), Some(Rect::new(0.0, 180.0, 300.0, 20.0)));
        Ok(())
    }

    #[test]
    fn chained_anchors_resolve_in_dependency_order() -> Result<()> {
        let mut hosts = HostPool::default();
        let mut tree = LayoutTree::new();
        let dependent = LayoutProps::fixed(30.0, 10.0)
            .id("b")
            .align(Left, "a", Align::End)
            .align(Center, "a", Align::Center);
        let anchor = LayoutProps::fixed(50.0, 40.0)
            .id("a")
            .align(Middle, CONTAINER_ID, Align::Center)
            .align(Top, CONTAINER_ID, Align::Start);
        let children = vec![
            NodeBuilder::new(hosts.node("b")).props(dependent),
            NodeBuilder::new(hosts.node("a")).props(anchor),
        ];
        let root = tree.insert_root(container(&mut hosts, children));
        run(&mut tree)?;
        assert_eq!(frame(&tree, root, 1), Some(Rect::new(125.0, 0.0, 50.0, 40.0)));
        assert_eq!(frame(&tree, root, 0), Some(Rect::new(175.0, 15.0, 30.0, 10.0)));

        let children = tree.children_in_order(root);
        let Some(AlgorithmState::Relative(state)) = tree.node(root).and_then(|n| n.state.clone())
        else {
            panic!("relative state missing");
        };
        assert_eq!(state.order, vec![children[1], children[0]]);
        Ok(())
    }

    #[test]
    fn unknown_anchor_is_dropped() -> Result<()> {
        let mut hosts = HostPool::default();
        let mut tree = LayoutTree::new();
        let props = LayoutProps::fixed(40.0, 20.0)
            .id("a")
            .align(Left, "missing", Align::End)
            .align(Top, CONTAINER_ID, Align::Center);
        let child = NodeBuilder::new(hosts.node("a")).props(props);
        let root = tree.insert_root(container(&mut hosts, vec![child]));
        run(&mut tree)?;
        assert_eq!(frame(&tree, root, 0), Some(Rect::new(0.0, 100.0, 40.0, 20.0)));
        Ok(())
    }

    #[test]
    fn cycles_collapse_every_child() -> Result<()> {
        let mut hosts = HostPool::default();
        let mut tree = LayoutTree::new();
        let a = LayoutProps::fixed(40.0, 20.0).id("a").align(Left, "b", Align::End);
        let b = LayoutProps::fixed(40.0, 20.0).id("b").align(Left, "a", Align::End);
        let free = LayoutProps::fixed(10.0, 10.0).id("c");
        let children = vec![
            NodeBuilder::new(hosts.node("a")).props(a),
            NodeBuilder::new(hosts.node("b")).props(b),
            NodeBuilder::new(hosts.node("c")).props(free),
        ];
        let root = tree.insert_root(container(&mut hosts, children));
        run(&mut tree)?;
        for index in 0..3 {
            assert_eq!(frame(&tree, root, index), Some(Rect::default()));
        }
        assert!(tree.active_children(root).is_empty());
        Ok(())
    }

    #[test]
    fn self_reference_is_a_cycle() -> Result<()> {
        let mut hosts = HostPool::default();
        let mut tree = LayoutTree::new();
        let props = LayoutProps::fixed(40.0, 20.0).id("a").align(Top, "a", Align::End);
        let child = NodeBuilder::new(hosts.node("a")).props(props);
        let root = tree.insert_root(container(&mut hosts, vec![child]));
        run(&mut tree)?;
        assert_eq!(frame(&tree, root, 0), Some(Rect::default()));
        Ok(())
    }

    #[test]
    fn crossed_anchors_clamp_to_zero() -> Result<()> {
        let mut hosts = HostPool::default();
        let mut tree = LayoutTree::new();
        let props = LayoutProps::fixed(40.0, 20.0)
            .id("a")
            .align(Left, CONTAINER_ID, Align::End)
            .align(Right, CONTAINER_ID, Align::Start);
        let child = NodeBuilder::new(hosts.node("a")).props(props);
        let root = tree.insert_root(container(&mut hosts, vec![child]));
        run(&mut tree)?;
        assert_eq!(frame(&tree, root, 0).map(|f| f.size.width), Some(0.0));
        Ok(())
    }

    #[test]
    fn derived_extent_rules() {
        assert_eq!(derived_extent(&[(Left, 10.0)]), None);
        assert_eq!(derived_extent(&[(Left, 10.0), (Right, 50.0)]), Some(40.0));
        assert_eq!(derived_extent(&[(Left, 10.0), (Middle, 50.0)]), Some(80.0));
        assert_eq!(derived_extent(&[(Center, 10.0), (Bottom, 50.0)]), Some(80.0));
    }
}
