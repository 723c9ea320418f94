//! Non-owning links from layout nodes to their visual-tree hosts.

use std::{
    cell::Cell,
    fmt,
    rc::{Rc, Weak},
};

use serde::{Deserialize, Serialize};

/// Host visibility.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Laid out and painted.
    #[default]
    Visible,
    /// Laid out, not painted.
    Invisible,
    /// Excluded from layout entirely.
    Gone,
}

/// The visual-tree node a layout node belongs to.
pub trait Host {
    /// Tag used in diagnostics.
    fn tag(&self) -> &str;
    /// Tree depth, for diagnostics.
    fn depth(&self) -> usize;
    /// Current visibility.
    fn visibility(&self) -> Visibility;
    /// Change visibility. Go through [`LayoutTree::set_visibility`] so the
    /// owning node is re-measured.
    ///
    /// [`LayoutTree::set_visibility`]: crate::LayoutTree::set_visibility
    fn set_visibility(&self, visibility: Visibility);
}

/// Weak handle to a [`Host`]. Never extends the host's lifetime.
#[derive(Clone, Default)]
pub struct HostRef(Option<Weak<dyn Host>>);

impl HostRef {
    /// Link to a live host.
    pub fn new<H: Host + 'static>(host: &Rc<H>) -> Self {
        let weak: Weak<H> = Rc::downgrade(host);
        Self(Some(weak))
    }

    /// An unbound handle.
    pub fn none() -> Self {
        Self(None)
    }

    /// The host, if it is bound and still alive.
    pub fn upgrade(&self) -> Option<Rc<dyn Host>> {
        self.0.as_ref().and_then(Weak::upgrade)
    }
}

impl fmt::Debug for HostRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(host) => write!(f, "HostRef({})", host.tag()),
            None => f.write_str("HostRef(<none>)"),
        }
    }
}

/// A minimal host with mutable visibility.
#[derive(Debug)]
pub struct VisualNode {
    /// Diagnostic tag.
    tag: String,
    /// Depth in the visual tree.
    depth: Cell<usize>,
    /// Current visibility.
    visibility: Cell<Visibility>,
}

impl VisualNode {
    /// A visible node at depth zero.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            depth: Cell::new(0),
            visibility: Cell::new(Visibility::Visible),
        }
    }

    /// Change the recorded depth.
    pub fn set_depth(&self, depth: usize) {
        self.depth.set(depth);
    }
}

impl Host for VisualNode {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn depth(&self) -> usize {
        self.depth.get()
    }

    fn visibility(&self) -> Visibility {
        self.visibility.get()
    }

    fn set_visibility(&self, visibility: Visibility) {
        self.visibility.set(visibility);
    }
}

/// Owns a set of [`VisualNode`]s so that weak handles stay live.
#[derive(Debug, Default)]
pub struct HostPool {
    /// Hosts in creation order.
    nodes: Vec<Rc<VisualNode>>,
}

impl HostPool {
    /// Create a host and return a handle to it.
    pub fn node(&mut self, tag: &str) -> HostRef {
        self.node_at(tag, 0)
    }

    /// Create a host at the given depth and return a handle to it.
    pub fn node_at(&mut self, tag: &str, depth: usize) -> HostRef {
        let node = VisualNode::new(tag);
        node.set_depth(depth);
        self.adopt(node)
    }

    /// Take ownership of a configured host and return a handle to it.
    pub fn adopt(&mut self, node: VisualNode) -> HostRef {
        let node = Rc::new(node);
        let handle = HostRef::new(&node);
        self.nodes.push(node);
        handle
    }

    /// The first host with this tag.
    pub fn find(&self, tag: &str) -> Option<Rc<VisualNode>> {
        self.nodes.iter().find(|n| n.tag == tag).cloned()
    }

    /// Drop the host with this tag, leaving its handles dangling.
    pub fn release(&mut self, tag: &str) {
        self.nodes.retain(|n| n.tag != tag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_does_not_own() {
        let mut pool = HostPool::default();
        let handle = pool.node("a");
        assert_eq!(handle.upgrade().map(|h| h.tag().to_string()), Some("a".into()));
        pool.release("a");
        assert!(handle.upgrade().is_none());
        assert!(HostRef::none().upgrade().is_none());
    }

    #[test]
    fn visibility_is_shared() {
        let mut pool = HostPool::default();
        let handle = pool.node_at("a", 3);
        if let Some(host) = pool.find("a") {
            host.set_visibility(Visibility::Gone);
        }
        let host = handle.upgrade();
        assert_eq!(host.as_ref().map(|h| h.visibility()), Some(Visibility::Gone));
        assert_eq!(host.map(|h| h.depth()), Some(3));
    }
}
