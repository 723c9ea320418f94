//! Declarative scenes loaded from JSON or TOML.
//!
//! A scene pairs a [`LayoutContext`] with a node tree. Loading builds the
//! hosts and layout nodes; [`Scene::run`] performs one measure and layout
//! pass.

use geom::Size;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    NodeId, Result,
    algorithm::Algorithm,
    builder::NodeBuilder,
    content::{FixedContent, TextContent},
    context::LayoutContext,
    dump::NodeSnapshot,
    host::{Host, HostPool, Visibility, VisualNode},
    lazy::ChildFactory,
    props::LayoutProps,
    tree::LayoutTree,
};

/// Leaf content in a scene file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentSpec {
    /// Fixed natural size.
    Fixed {
        /// Natural width.
        width: f32,
        /// Natural height.
        height: f32,
        /// Baseline from the top.
        #[serde(default)]
        baseline: Option<f32>,
    },
    /// Wrapping run of fixed-advance glyphs.
    Text {
        /// Glyph count.
        glyphs: usize,
        /// Advance per glyph.
        glyph_width: f32,
        /// Line height.
        line_height: f32,
        /// Baseline of the first line.
        #[serde(default)]
        ascent: f32,
    },
}

/// A lazily built run of children stamped from a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LazySpec {
    /// Number of children.
    pub count: usize,
    /// Eager index the run is spliced before.
    #[serde(default)]
    pub start_index: usize,
    /// Children kept around the visible range when recycling.
    #[serde(default)]
    pub cache_count: Option<i32>,
    /// Template for every child. Tags get a `#index` suffix.
    pub template: Box<NodeSpec>,
}

/// One node in a scene file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeSpec {
    /// Host tag.
    pub tag: String,
    /// Initial host visibility.
    pub visibility: Visibility,
    /// Layout properties.
    pub props: LayoutProps,
    /// Strategy. Defaults to a centered stack.
    pub algorithm: Option<Algorithm>,
    /// Leaf content.
    pub content: Option<ContentSpec>,
    /// Eager children.
    pub children: Vec<Self>,
    /// Lazy children.
    pub lazy: Option<LazySpec>,
}

/// A scene file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSpec {
    /// Pass configuration.
    pub context: LayoutContext,
    /// Root node.
    pub root: NodeSpec,
}

impl SceneSpec {
    /// Parse a JSON scene.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parse a TOML scene.
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// Stamps lazy children from a template, owning their hosts.
struct TemplateFactory {
    /// Child template.
    template: NodeSpec,
    /// Number of children.
    count: usize,
    /// Depth of the stamped children.
    depth: usize,
    /// Hosts for stamped children.
    hosts: HostPool,
}

impl ChildFactory for TemplateFactory {
    fn total_count(&self) -> usize {
        self.count
    }

    fn build(&mut self, index: usize) -> NodeBuilder {
        let mut spec = self.template.clone();
        spec.tag = format!("{}#{index}", spec.tag);
        debug!(tag = %spec.tag, "stamping lazy child");
        spec.builder(&mut self.hosts, self.depth)
    }
}

impl NodeSpec {
    /// Create hosts and a builder for this subtree.
    fn builder(&self, hosts: &mut HostPool, depth: usize) -> NodeBuilder {
        let host = VisualNode::new(self.tag.clone());
        host.set_depth(depth);
        host.set_visibility(self.visibility);
        let mut builder = NodeBuilder::new(hosts.adopt(host)).props(self.props.clone());
        if let Some(algorithm) = &self.algorithm {
            builder = builder.algorithm(algorithm.clone());
        }
        builder = match self.content {
            Some(ContentSpec::Fixed {
                width,
                height,
                baseline,
            }) => builder.content(FixedContent {
                size: Size::new(width, height),
                baseline,
            }),
            Some(ContentSpec::Text {
                glyphs,
                glyph_width,
                line_height,
                ascent,
            }) => builder.content(TextContent {
                glyphs,
                glyph_width,
                line_height,
                ascent,
            }),
            None => builder,
        };
        if let Some(lazy) = &self.lazy {
            let factory = TemplateFactory {
                template: (*lazy.template).clone(),
                count: lazy.count,
                depth: depth + 1,
                hosts: HostPool::default(),
            };
            builder = builder.lazy(factory, lazy.start_index);
        }
        builder.children(self.children.iter().map(|c| c.builder(hosts, depth + 1)))
    }
}

/// A loaded scene: hosts, tree and context.
pub struct Scene {
    /// Hosts kept alive for the tree's weak links.
    hosts: HostPool,
    /// The layout tree.
    tree: LayoutTree,
    /// Root node.
    root: NodeId,
    /// Pass configuration.
    context: LayoutContext,
}

impl Scene {
    /// Build a scene from its description.
    pub fn new(spec: &SceneSpec) -> Result<Self> {
        let mut hosts = HostPool::default();
        let mut tree = LayoutTree::new();
        let root = tree.insert_root(spec.root.builder(&mut hosts, 0));
        apply_cache_counts(&mut tree, root, &spec.root)?;
        Ok(Self {
            hosts,
            tree,
            root,
            context: spec.context,
        })
    }

    /// Load a JSON scene.
    pub fn from_json(text: &str) -> Result<Self> {
        Self::new(&SceneSpec::from_json(text)?)
    }

    /// Load a TOML scene.
    pub fn from_toml(text: &str) -> Result<Self> {
        Self::new(&SceneSpec::from_toml(text)?)
    }

    /// Run one measure and layout pass.
    pub fn run(&mut self) -> Result<()> {
        self.tree.run(&self.context)
    }

    /// The layout tree.
    pub fn tree(&self) -> &LayoutTree {
        &self.tree
    }

    /// Mutable access for incremental updates between passes.
    pub fn tree_mut(&mut self) -> &mut LayoutTree {
        &mut self.tree
    }

    /// The hosts backing the tree.
    pub fn hosts(&self) -> &HostPool {
        &self.hosts
    }

    /// Root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Pass configuration.
    pub fn context(&self) -> &LayoutContext {
        &self.context
    }

    /// Flattened geometry of the whole tree.
    pub fn snapshot(&self) -> Vec<NodeSnapshot> {
        self.tree.snapshot(self.root)
    }
}

/// Apply declared lazy cache counts, walking eager children in step with
/// their specs.
fn apply_cache_counts(tree: &mut LayoutTree, id: NodeId, spec: &NodeSpec) -> Result<()> {
    if let Some(count) = spec.lazy.as_ref().and_then(|l| l.cache_count) {
        tree.set_lazy_cache_count(id, count)?;
    }
    let eager = tree.node(id).map(|n| n.children().to_vec()).unwrap_or_default();
    for (child, child_spec) in eager.iter().zip(&spec.children) {
        apply_cache_counts(tree, *child, child_spec)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    const JSON: &str = r#"{
        "context": { "viewport": { "width": 400, "height": 300 } },
        "root": {
            "tag": "row",
            "props": { "width": { "px": 200 }, "height": { "px": 40 } },
            "algorithm": { "kind": "flex", "main_align": "space_between" },
            "children": [
                { "tag": "a", "content": { "kind": "fixed", "width": 20, "height": 10 } },
                { "tag": "gone", "visibility": "gone",
                  "content": { "kind": "fixed", "width": 20, "height": 10 } },
                { "tag": "b", "content": { "kind": "fixed", "width": 30, "height": 10 } }
            ]
        }
    }"#;

    const TOML: &str = r#"
        [context.viewport]
        width = 300
        height = 300

        [root]
        tag = "list"
        algorithm = { kind = "linear", axis = "vertical" }

        [root.lazy]
        count = 3
        cache_count = -4

        [root.lazy.template]
        tag = "item"
        content = { kind = "fixed", width = 50, height = 10 }
    "#;

    #[test]
    fn json_scene_runs() -> Result<()> {
        let mut scene = Scene::from_json(JSON)?;
        scene.run()?;
        let rows = scene.snapshot();
        let b = rows.iter().find(|r| r.tag == "b").map(|r| r.frame.offset.x);
        assert_eq!(b, Some(170.0));
        let gone = rows.iter().find(|r| r.tag == "gone").map(|r| r.visibility);
        assert_eq!(gone, Some(Visibility::Gone));
        Ok(())
    }

    #[test]
    fn toml_scene_builds_lazy_children() -> Result<()> {
        let mut scene = Scene::from_toml(TOML)?;
        scene.run()?;
        let rows = scene.snapshot();
        let tags: Vec<&str> = rows.iter().map(|r| r.tag.as_str()).collect();
        assert_eq!(tags, ["list", "item#0", "item#1", "item#2"]);
        assert_eq!(rows[0].frame.size, Size::new(50.0, 30.0));
        assert_eq!(rows[3].frame.offset.y, 20.0);
        let lazy_cache = scene
            .tree()
            .node(scene.root())
            .and_then(|n| n.lazy())
            .map(|l| l.cache_count());
        assert_eq!(lazy_cache, Some(1));
        Ok(())
    }

    #[test]
    fn malformed_scene_is_an_error() {
        assert!(matches!(Scene::from_json("{ \"root\": 3 }"), Err(Error::Scene(_))));
    }
}
