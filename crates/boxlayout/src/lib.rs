//! A retained-tree box layout engine.
//!
//! Nodes live in a [`LayoutTree`] arena. Each node carries declarative
//! [`LayoutProps`], an optional layout [`Algorithm`] and optional leaf
//! [`Content`]. A pass runs in two phases: measure resolves every frame
//! size top-down under a [`geom::LayoutConstraint`], then layout positions
//! children relative to their parent's content origin. Unchanged subtrees
//! are skipped on later passes.
//!
//! Measurement never fails. Missing hosts, absent constraints and cyclic
//! anchor rules degrade to zero-size output; only structural tree edits
//! and scene loading return [`Error`].

pub mod algorithm;
/// Fluent node construction.
pub mod builder;
mod content;
mod context;
/// Geometry snapshots for inspection.
pub mod dump;
/// Error types.
pub mod error;
/// Per-node geometry record.
mod geometry;
pub mod host;
/// Node identifiers.
mod id;
pub mod lazy;
/// Per-node layout state.
pub mod node;
/// The measure and layout traversal.
pub mod pass;
pub mod props;
pub mod scene;
/// Tree arena and structural edits.
pub mod tree;

pub use geom;

pub use algorithm::{
    Algorithm, AlgorithmState, CONTAINER_ID, FlexDirection, FlexParams, FlexState, LinearParams,
    MainAlign, RelativeState, StackParams, WrapAlignment, WrapDirection, WrapLine, WrapParams,
    WrapState,
};
pub use builder::NodeBuilder;
pub use content::{Content, ContentFn, FixedContent, TextContent};
pub use context::{LayoutContext, TextDirection};
pub use dump::{NodeSnapshot, dump};
pub use error::{Error, Result};
pub use geometry::Geometry;
pub use host::{Host, HostPool, HostRef, Visibility, VisualNode};
pub use id::NodeId;
pub use lazy::{ChildFactory, FactoryFn, LazyChildren, Slot};
pub use node::LayoutNode;
pub use pass::LayoutPass;
pub use props::{
    Align, AlignDirection, AlignRule, AlignRules, CrossAlign, FlexItem, LayoutProps, MeasureType,
    ThreadClass,
};
pub use scene::{ContentSpec, LazySpec, NodeSpec, Scene, SceneSpec};
pub use tree::LayoutTree;
