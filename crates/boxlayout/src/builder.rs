use geom::Dimension;

use crate::{
    algorithm::{Algorithm, StackParams},
    content::Content,
    host::HostRef,
    lazy::ChildFactory,
    props::LayoutProps,
};

/// Describes a node and its eager children before insertion into a tree.
pub struct NodeBuilder {
    /// Host back-reference.
    pub(crate) host: HostRef,
    /// Property bag.
    pub(crate) props: LayoutProps,
    /// Bound strategy.
    pub(crate) algorithm: Option<Algorithm>,
    /// Leaf content.
    pub(crate) content: Option<Box<dyn Content>>,
    /// Lazy child provider and its splice index.
    pub(crate) lazy: Option<(Box<dyn ChildFactory>, usize)>,
    /// Eager children.
    pub(crate) children: Vec<Self>,
}

impl NodeBuilder {
    /// A stack node bound to `host`.
    pub fn new(host: HostRef) -> Self {
        Self {
            host,
            props: LayoutProps::default(),
            algorithm: Some(Algorithm::Stack(StackParams::default())),
            content: None,
            lazy: None,
            children: Vec::new(),
        }
    }

    /// Replace the property bag.
    pub fn props(mut self, props: LayoutProps) -> Self {
        self.props = props;
        self
    }

    /// Edit the property bag in place.
    pub fn with_props(mut self, f: impl FnOnce(&mut LayoutProps)) -> Self {
        f(&mut self.props);
        self
    }

    /// Set a fixed pixel size.
    pub fn size(mut self, width: f32, height: f32) -> Self {
        self.props.width = Some(Dimension::Px(width));
        self.props.height = Some(Dimension::Px(height));
        self
    }

    /// Bind a strategy.
    pub fn algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = Some(algorithm);
        self
    }

    /// Leave the node without a strategy.
    pub fn unbound(mut self) -> Self {
        self.algorithm = None;
        self
    }

    /// Attach leaf content.
    pub fn content(mut self, content: impl Content + 'static) -> Self {
        self.content = Some(Box::new(content));
        self
    }

    /// Append an eager child.
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Append eager children.
    pub fn children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.children.extend(children);
        self
    }

    /// Attach a lazy provider spliced in before eager child `start_index`.
    pub fn lazy(mut self, factory: impl ChildFactory + 'static, start_index: usize) -> Self {
        self.lazy = Some((Box::new(factory), start_index));
        self
    }
}
