use std::{collections::HashSet, ops::Range};

use geom::LayoutConstraint;
use slotmap::SlotMap;
use tracing::debug;

use crate::{
    NodeId,
    algorithm::Algorithm,
    builder::NodeBuilder,
    content::Content,
    context::LayoutContext,
    dump::{self, NodeSnapshot},
    error::{Error, Result},
    geometry::Geometry,
    host::Visibility,
    lazy::Slot,
    node::LayoutNode,
    pass::LayoutPass,
    props::{LayoutProps, ThreadClass},
};

/// Arena of layout nodes with an optional root.
#[derive(Default)]
pub struct LayoutTree {
    /// Node storage.
    pub(crate) nodes: SlotMap<NodeId, LayoutNode>,
    /// Root node.
    root: Option<NodeId>,
}

impl LayoutTree {
    /// An empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a detached subtree and return its root id.
    pub fn insert(&mut self, mut builder: NodeBuilder) -> NodeId {
        let id = self.nodes.insert(LayoutNode::new(&mut builder));
        let children: Vec<NodeId> = builder
            .children
            .into_iter()
            .map(|child| self.insert(child))
            .collect();
        for child in &children {
            if let Some(node) = self.nodes.get_mut(*child) {
                node.parent = Some(id);
            }
        }
        if let Some(node) = self.nodes.get_mut(id) {
            node.children = children;
        }
        id
    }

    /// Insert a subtree and make it the root.
    pub fn insert_root(&mut self, builder: NodeBuilder) -> NodeId {
        let id = self.insert(builder);
        self.root = Some(id);
        id
    }

    /// Make a detached node the root.
    pub fn set_root(&mut self, id: NodeId) -> Result<()> {
        let node = self.nodes.get(id).ok_or(Error::NodeNotFound(id))?;
        if node.parent.is_some() {
            return Err(Error::AlreadyAttached(id));
        }
        self.root = Some(id);
        Ok(())
    }

    /// Root node.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the tree holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node.
    pub fn node(&self, id: NodeId) -> Option<&LayoutNode> {
        self.nodes.get(id)
    }

    /// A node's geometry.
    pub fn geometry(&self, id: NodeId) -> Option<&Geometry> {
        self.nodes.get(id).map(|n| &n.geometry)
    }

    /// Edit a node's properties and mark it dirty.
    pub fn with_props(&mut self, id: NodeId, f: impl FnOnce(&mut LayoutProps)) -> Result<()> {
        let node = self.nodes.get_mut(id).ok_or(Error::NodeNotFound(id))?;
        f(&mut node.props);
        self.mark_dirty(id);
        Ok(())
    }

    /// Bind or unbind a strategy.
    pub fn set_algorithm(&mut self, id: NodeId, algorithm: Option<Algorithm>) -> Result<()> {
        let node = self.nodes.get_mut(id).ok_or(Error::NodeNotFound(id))?;
        node.algorithm = algorithm;
        node.state = None;
        self.mark_dirty(id);
        Ok(())
    }

    /// Replace a node's leaf content.
    pub fn set_content(&mut self, id: NodeId, content: Option<Box<dyn Content>>) -> Result<()> {
        let node = self.nodes.get_mut(id).ok_or(Error::NodeNotFound(id))?;
        node.content = content;
        self.mark_dirty(id);
        Ok(())
    }

    /// Change a node's host visibility and mark it dirty.
    pub fn set_visibility(&mut self, id: NodeId, visibility: Visibility) -> Result<()> {
        let node = self.nodes.get(id).ok_or(Error::NodeNotFound(id))?;
        let host = node
            .host
            .upgrade()
            .ok_or_else(|| Error::InvalidOperation("host released".into()))?;
        host.set_visibility(visibility);
        self.mark_dirty(id);
        Ok(())
    }

    /// Flag a node for re-measurement and notify its ancestors.
    pub fn mark_dirty(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        node.dirty = true;
        let mut cursor = node.parent;
        while let Some(parent) = cursor {
            let Some(node) = self.nodes.get_mut(parent) else {
                break;
            };
            node.child_dirty = true;
            cursor = node.parent;
        }
    }

    /// Drop the cached child splice and mark the node dirty.
    fn structure_changed(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.children_cache = None;
        }
        self.mark_dirty(id);
    }

    /// True if `ancestor` is on `node`'s parent chain.
    fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = self.nodes.get(node).and_then(|n| n.parent);
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            cursor = self.nodes.get(id).and_then(|n| n.parent);
        }
        false
    }

    /// Validate that `child` may be attached under `parent`.
    fn check_attach(&self, parent: NodeId, child: NodeId) -> Result<()> {
        if !self.nodes.contains_key(parent) {
            return Err(Error::NodeNotFound(parent));
        }
        let Some(node) = self.nodes.get(child) else {
            return Err(Error::NodeNotFound(child));
        };
        if node.parent.is_some() || self.root == Some(child) {
            return Err(Error::AlreadyAttached(child));
        }
        if parent == child || self.is_ancestor(child, parent) {
            return Err(Error::WouldCreateCycle { parent, child });
        }
        Ok(())
    }

    /// Append a detached node to `parent`'s eager children.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let len = self.nodes.get(parent).map_or(0, |n| n.children.len());
        self.insert_child(parent, len, child)
    }

    /// Insert a detached node at `index` in `parent`'s eager children.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<()> {
        self.check_attach(parent, child)?;
        if let Some(node) = self.nodes.get_mut(parent) {
            let index = index.min(node.children.len());
            node.children.insert(index, child);
        }
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
        }
        self.structure_changed(parent);
        Ok(())
    }

    /// Replace `parent`'s eager children.
    ///
    /// Listed nodes are moved from any previous parent. Previous children
    /// that are not listed become detached.
    pub fn set_children(&mut self, parent: NodeId, children: Vec<NodeId>) -> Result<()> {
        if !self.nodes.contains_key(parent) {
            return Err(Error::NodeNotFound(parent));
        }
        let mut seen = HashSet::with_capacity(children.len());
        for child in &children {
            if !seen.insert(*child) {
                return Err(Error::DuplicateChild {
                    parent,
                    child: *child,
                });
            }
            if !self.nodes.contains_key(*child) {
                return Err(Error::NodeNotFound(*child));
            }
            if *child == parent || self.is_ancestor(*child, parent) {
                return Err(Error::WouldCreateCycle {
                    parent,
                    child: *child,
                });
            }
        }

        for child in &children {
            let old_parent = self.nodes.get(*child).and_then(|n| n.parent);
            if let Some(old_parent) = old_parent
                && old_parent != parent
            {
                self.unlink(old_parent, *child);
            }
        }
        let old_children = self
            .nodes
            .get(parent)
            .map(|n| n.children.clone())
            .unwrap_or_default();
        for child in old_children {
            if let Some(node) = self.nodes.get_mut(child) {
                node.parent = None;
            }
        }
        for child in &children {
            if let Some(node) = self.nodes.get_mut(*child) {
                node.parent = Some(parent);
            }
        }
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children = children;
        }
        self.structure_changed(parent);
        Ok(())
    }

    /// Remove `child` from `parent`'s eager or lazy children.
    fn unlink(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.retain(|id| *id != child);
            if let Some(lazy) = node.lazy.as_mut() {
                lazy.forget(child);
            }
        }
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = None;
        }
        self.structure_changed(parent);
    }

    /// Detach a node from its parent, keeping it in the arena.
    pub fn detach(&mut self, child: NodeId) -> Result<()> {
        let node = self.nodes.get(child).ok_or(Error::NodeNotFound(child))?;
        if let Some(parent) = node.parent {
            self.unlink(parent, child);
        }
        Ok(())
    }

    /// Remove a node and all of its descendants.
    pub fn remove_subtree(&mut self, id: NodeId) -> Result<()> {
        if !self.nodes.contains_key(id) {
            return Err(Error::NodeNotFound(id));
        }
        if let Some(parent) = self.nodes.get(id).and_then(|n| n.parent) {
            self.unlink(parent, id);
        }
        if self.root == Some(id) {
            self.root = None;
        }
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.remove(id) {
                stack.extend(node.children);
                if let Some(lazy) = node.lazy {
                    stack.extend(lazy.built.into_values());
                }
            }
        }
        Ok(())
    }

    /// Materialized children in combined order, without building.
    pub fn children_in_order(&self, id: NodeId) -> Vec<NodeId> {
        let Some(node) = self.nodes.get(id) else {
            return Vec::new();
        };
        if let Some(cached) = &node.children_cache {
            return cached.clone();
        }
        let Some(lazy) = &node.lazy else {
            return node.children.clone();
        };
        let at = lazy.splice_at(node.children.len());
        let mut out = node.children[..at].to_vec();
        out.extend(lazy.built_children().map(|(_, id)| id));
        out.extend_from_slice(&node.children[at..]);
        out
    }

    /// Build one provider child if it is not yet materialized.
    fn build_lazy(&mut self, parent: NodeId, index: usize) -> Option<NodeId> {
        let lazy = self.nodes.get_mut(parent)?.lazy.as_mut()?;
        if let Some(id) = lazy.built(index) {
            return Some(id);
        }
        let builder = lazy.factory.build(index);
        let id = self.insert(builder);
        if let Some(node) = self.nodes.get_mut(id) {
            node.parent = Some(parent);
        }
        let node = self.nodes.get_mut(parent)?;
        if let Some(lazy) = node.lazy.as_mut() {
            lazy.built.insert(index, id);
        }
        node.children_cache = None;
        debug!(index, "built lazy child");
        Some(id)
    }

    /// All children with the provider fully expanded, spliced at its start
    /// index. The result is cached until the next structural change.
    pub fn all_children_with_build(&mut self, id: NodeId) -> Vec<NodeId> {
        let Some(node) = self.nodes.get(id) else {
            return Vec::new();
        };
        if let Some(cached) = &node.children_cache {
            return cached.clone();
        }
        let total = node.lazy.as_ref().map_or(0, |l| l.total_count());
        for index in 0..total {
            self.build_lazy(id, index);
        }
        let out = self.children_in_order(id);
        if let Some(node) = self.nodes.get_mut(id) {
            node.children_cache = Some(out.clone());
        }
        out
    }

    /// The child at a combined index, building it from the provider if
    /// needed. Optionally adds it to the render set.
    pub fn get_or_create_child_by_index(
        &mut self,
        parent: NodeId,
        index: usize,
        add_to_render_tree: bool,
    ) -> Result<NodeId> {
        let node = self.nodes.get(parent).ok_or(Error::NodeNotFound(parent))?;
        let eager_len = node.children.len();
        let slot = match &node.lazy {
            Some(lazy) => lazy.locate(index, eager_len),
            None => (index < eager_len).then_some(Slot::Eager(index)),
        };
        let eager = match slot {
            Some(Slot::Eager(i)) => node.children.get(i).copied(),
            _ => None,
        };
        let id = match slot {
            Some(Slot::Lazy(i)) => self.build_lazy(parent, i),
            _ => eager,
        }
        .ok_or_else(|| Error::Lazy(format!("child index {index} out of range")))?;
        if add_to_render_tree {
            self.set_active(id, true);
        }
        Ok(id)
    }

    /// Move the provider's splice point.
    pub fn set_lazy_start_index(&mut self, parent: NodeId, start_index: usize) -> Result<()> {
        let node = self.nodes.get_mut(parent).ok_or(Error::NodeNotFound(parent))?;
        let lazy = node
            .lazy
            .as_mut()
            .ok_or_else(|| Error::Lazy("node has no provider".into()))?;
        lazy.start_index = start_index;
        self.structure_changed(parent);
        Ok(())
    }

    /// Set the recycle cache window. Negative counts are treated as one.
    pub fn set_lazy_cache_count(&mut self, parent: NodeId, count: i32) -> Result<()> {
        let node = self.nodes.get_mut(parent).ok_or(Error::NodeNotFound(parent))?;
        let lazy = node
            .lazy
            .as_mut()
            .ok_or_else(|| Error::Lazy("node has no provider".into()))?;
        lazy.cache_count = usize::try_from(count).unwrap_or(1);
        Ok(())
    }

    /// Materialized provider children.
    fn built_lazy(&self, parent: NodeId) -> Vec<(usize, NodeId)> {
        self.nodes
            .get(parent)
            .and_then(|n| n.lazy.as_ref())
            .map(|l| l.built_children().collect())
            .unwrap_or_default()
    }

    /// Take every materialized provider child out of the render set.
    pub fn remove_all_lazy_in_render_tree(&mut self, parent: NodeId) -> Result<()> {
        if !self.nodes.contains_key(parent) {
            return Err(Error::NodeNotFound(parent));
        }
        for (_, id) in self.built_lazy(parent) {
            self.set_active(id, false);
        }
        Ok(())
    }

    /// Take provider children outside `visible`, widened by the cache
    /// window, out of the render set. Returns how many were recycled.
    pub fn recycle_lazy_outside(&mut self, parent: NodeId, visible: Range<usize>) -> Result<usize> {
        let cache = self
            .nodes
            .get(parent)
            .ok_or(Error::NodeNotFound(parent))?
            .lazy
            .as_ref()
            .map_or(0, |l| l.cache_count);
        let keep = visible.start.saturating_sub(cache)..visible.end.saturating_add(cache);
        let mut recycled = 0;
        for (index, id) in self.built_lazy(parent) {
            if !keep.contains(&index) && self.nodes.get(id).is_some_and(|n| n.active) {
                self.set_active(id, false);
                recycled += 1;
            }
        }
        Ok(recycled)
    }

    /// Add or remove a node from the render set.
    pub fn set_active(&mut self, id: NodeId, active: bool) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.active = active;
        }
    }

    /// Remove a node from the render set without destroying it.
    pub fn remove_from_render_tree(&mut self, id: NodeId) {
        self.set_active(id, false);
    }

    /// Materialized children currently in the render set.
    pub fn active_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children_in_order(id)
            .into_iter()
            .filter(|c| self.nodes.get(*c).is_some_and(|n| n.active))
            .collect()
    }

    /// True if any node in the subtree must be laid out on the main thread.
    pub fn requires_main_thread(&self, id: NodeId) -> bool {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            if node.props.thread == ThreadClass::Main || node.lazy.is_some() {
                return true;
            }
            stack.extend(self.children_in_order(id));
        }
        false
    }

    /// Measure a node. Without a constraint, one is synthesized from the
    /// context's viewport.
    pub fn measure(&mut self, id: NodeId, constraint: Option<LayoutConstraint>, cx: &LayoutContext) {
        LayoutPass::new(self, cx).measure(id, constraint);
    }

    /// Position a node's children, recursively.
    pub fn layout(&mut self, id: NodeId, cx: &LayoutContext) {
        LayoutPass::new(self, cx).layout(id);
    }

    /// Measure and lay out the whole tree from the root.
    pub fn run(&mut self, cx: &LayoutContext) -> Result<()> {
        let root = self
            .root
            .ok_or_else(|| Error::InvalidOperation("tree has no root".into()))?;
        let mut pass = LayoutPass::new(self, cx);
        pass.measure(root, None);
        pass.place_root(root);
        pass.layout(root);
        Ok(())
    }

    /// Flattened geometry of the materialized subtree under `root`.
    pub fn snapshot(&self, root: NodeId) -> Vec<NodeSnapshot> {
        dump::snapshot(self, root)
    }
}
