use crate::{
    NodeId,
    algorithm::{Algorithm, AlgorithmState},
    builder::NodeBuilder,
    content::Content,
    geometry::Geometry,
    host::{HostRef, Visibility},
    lazy::LazyChildren,
    props::LayoutProps,
};

/// One node of the layout tree.
pub struct LayoutNode {
    /// Weak link to the visual host.
    pub(crate) host: HostRef,
    /// Property bag.
    pub(crate) props: LayoutProps,
    /// Bound strategy. Absent during construction.
    pub(crate) algorithm: Option<Algorithm>,
    /// Leaf content.
    pub(crate) content: Option<Box<dyn Content>>,
    /// Measurement and layout output.
    pub(crate) geometry: Geometry,
    /// Parent node.
    pub(crate) parent: Option<NodeId>,
    /// Eager children in order.
    pub(crate) children: Vec<NodeId>,
    /// Lazy provider.
    pub(crate) lazy: Option<LazyChildren>,
    /// Cached splice of eager and lazy children.
    pub(crate) children_cache: Option<Vec<NodeId>>,
    /// Member of the render set.
    pub(crate) active: bool,
    /// Measured at least once since the last reset.
    pub(crate) measured: bool,
    /// Last measure saw the same constraints as the one before.
    pub(crate) constraint_unchanged: bool,
    /// Last measure was skipped.
    pub(crate) skip_measure_content: bool,
    /// Measured since the last layout.
    pub(crate) needs_layout: bool,
    /// Own properties changed.
    pub(crate) dirty: bool,
    /// A descendant changed.
    pub(crate) child_dirty: bool,
    /// Per-strategy scratch carried from measure to layout.
    pub(crate) state: Option<AlgorithmState>,
    /// Number of content measurements performed.
    pub(crate) measure_count: usize,
}

impl LayoutNode {
    /// A fresh node from a builder's parts. Children are attached separately.
    pub(crate) fn new(builder: &mut NodeBuilder) -> Self {
        Self {
            host: builder.host.clone(),
            props: builder.props.clone(),
            algorithm: builder.algorithm.take(),
            content: builder.content.take(),
            geometry: Geometry::default(),
            parent: None,
            children: Vec::new(),
            lazy: builder
                .lazy
                .take()
                .map(|(factory, start)| LazyChildren::new(factory, start)),
            children_cache: None,
            active: true,
            measured: false,
            constraint_unchanged: false,
            skip_measure_content: false,
            needs_layout: false,
            dirty: true,
            child_dirty: false,
            state: None,
            measure_count: 0,
        }
    }

    /// Host link.
    pub fn host(&self) -> &HostRef {
        &self.host
    }

    /// Host tag, or a placeholder when the host is gone.
    pub fn tag(&self) -> String {
        self.host
            .upgrade()
            .map(|h| h.tag().to_string())
            .unwrap_or_else(|| "<detached>".into())
    }

    /// Host visibility. A missing host counts as gone.
    pub fn visibility(&self) -> Visibility {
        self.host
            .upgrade()
            .map(|h| h.visibility())
            .unwrap_or(Visibility::Gone)
    }

    /// Property bag.
    pub fn props(&self) -> &LayoutProps {
        &self.props
    }

    /// Bound strategy.
    pub fn algorithm(&self) -> Option<&Algorithm> {
        self.algorithm.as_ref()
    }

    /// Measurement and layout output.
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Parent node.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Eager children.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Lazy provider state.
    pub fn lazy(&self) -> Option<&LazyChildren> {
        self.lazy.as_ref()
    }

    /// Member of the render set.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the last measure saw unchanged constraints.
    pub fn constraint_unchanged(&self) -> bool {
        self.constraint_unchanged
    }

    /// Whether the last measure was skipped.
    pub fn skip_measure_content(&self) -> bool {
        self.skip_measure_content
    }

    /// Pending dirty state.
    pub fn is_dirty(&self) -> bool {
        self.dirty || self.child_dirty
    }

    /// Number of content measurements performed.
    pub fn measure_count(&self) -> usize {
        self.measure_count
    }
}
