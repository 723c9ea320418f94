//! Lazily materialized children.
//!
//! A provider contributes `total_count` children that are built on first
//! access. They are spliced into the eager child list at `start_index`:
//! combined indices below the splice point address eager children, the next
//! `total_count` address the provider, and the rest address the remaining
//! eager children.

use std::collections::BTreeMap;

use crate::{NodeId, builder::NodeBuilder};

/// Builds children on demand.
pub trait ChildFactory {
    /// Number of children the provider can build.
    fn total_count(&self) -> usize;

    /// Build the child at `index` within the provider's range.
    fn build(&mut self, index: usize) -> NodeBuilder;
}

/// Adapts a count and a closure into a [`ChildFactory`].
pub struct FactoryFn<F> {
    /// Number of children.
    count: usize,
    /// Builder closure.
    build: F,
}

impl<F> FactoryFn<F>
where
    F: FnMut(usize) -> NodeBuilder,
{
    /// A provider of `count` children built by `build`.
    pub fn new(count: usize, build: F) -> Self {
        Self { count, build }
    }
}

impl<F> ChildFactory for FactoryFn<F>
where
    F: FnMut(usize) -> NodeBuilder,
{
    fn total_count(&self) -> usize {
        self.count
    }

    fn build(&mut self, index: usize) -> NodeBuilder {
        (self.build)(index)
    }
}

/// Where a combined child index points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Index into the eager child list.
    Eager(usize),
    /// Index into the provider's range.
    Lazy(usize),
}

/// Provider state owned by a layout node.
pub struct LazyChildren {
    /// The provider.
    pub(crate) factory: Box<dyn ChildFactory>,
    /// Materialized children by provider index.
    pub(crate) built: BTreeMap<usize, NodeId>,
    /// Eager index the provider range is spliced before.
    pub(crate) start_index: usize,
    /// Children kept around the visible range when recycling.
    pub(crate) cache_count: usize,
}

impl LazyChildren {
    /// Wrap a provider.
    pub fn new(factory: Box<dyn ChildFactory>, start_index: usize) -> Self {
        Self {
            factory,
            built: BTreeMap::new(),
            start_index,
            cache_count: 1,
        }
    }

    /// Children the provider can build.
    pub fn total_count(&self) -> usize {
        self.factory.total_count()
    }

    /// The materialized child at a provider index.
    pub fn built(&self, index: usize) -> Option<NodeId> {
        self.built.get(&index).copied()
    }

    /// All materialized children in provider order.
    pub fn built_children(&self) -> impl Iterator<Item = (usize, NodeId)> + '_ {
        self.built.iter().map(|(i, id)| (*i, *id))
    }

    /// Declared splice index.
    pub fn start_index(&self) -> usize {
        self.start_index
    }

    /// Current cache window.
    pub fn cache_count(&self) -> usize {
        self.cache_count
    }

    /// Splice point within `eager_len` eager children.
    pub fn splice_at(&self, eager_len: usize) -> usize {
        self.start_index.min(eager_len)
    }

    /// Resolve a combined index.
    pub fn locate(&self, index: usize, eager_len: usize) -> Option<Slot> {
        let at = self.splice_at(eager_len);
        let total = self.total_count();
        if index < at {
            Some(Slot::Eager(index))
        } else if index < at + total {
            Some(Slot::Lazy(index - at))
        } else if index < eager_len + total {
            Some(Slot::Eager(index - total))
        } else {
            None
        }
    }

    /// Forget a materialized child.
    pub(crate) fn forget(&mut self, id: NodeId) {
        self.built.retain(|_, built| *built != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostRef;

    fn provider(count: usize, start: usize) -> LazyChildren {
        LazyChildren::new(
            Box::new(FactoryFn::new(count, |_| NodeBuilder::new(HostRef::none()))),
            start,
        )
    }

    #[test]
    fn locate_splices_provider_range() {
        let lazy = provider(3, 1);
        assert_eq!(lazy.locate(0, 2), Some(Slot::Eager(0)));
        assert_eq!(lazy.locate(1, 2), Some(Slot::Lazy(0)));
        assert_eq!(lazy.locate(3, 2), Some(Slot::Lazy(2)));
        assert_eq!(lazy.locate(4, 2), Some(Slot::Eager(1)));
        assert_eq!(lazy.locate(5, 2), None);
    }

    #[test]
    fn start_past_eager_end_appends() {
        let lazy = provider(2, 10);
        assert_eq!(lazy.splice_at(1), 1);
        assert_eq!(lazy.locate(0, 1), Some(Slot::Eager(0)));
        assert_eq!(lazy.locate(2, 1), Some(Slot::Lazy(1)));
        assert_eq!(lazy.locate(3, 1), None);
    }
}
