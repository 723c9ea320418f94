use std::io::Write;

use geom::{Offset, Rect};
use serde::Serialize;
use termcolor::{Buffer, Color, ColorSpec, WriteColor};

use crate::{NodeId, Result, host::Visibility, tree::LayoutTree};

/// Geometry of one node, flattened for inspection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSnapshot {
    /// Host tag.
    pub tag: String,
    /// Distance from the snapshot root.
    pub depth: usize,
    /// Frame relative to the parent's content origin.
    pub frame: Rect,
    /// Frame in root coordinates.
    pub absolute: Rect,
    /// Baseline from the frame top, if reported.
    pub baseline: Option<f32>,
    /// Member of the render set.
    pub active: bool,
    /// Host visibility.
    pub visibility: Visibility,
}

/// Walk the materialized subtree under `root` in pre-order.
pub(crate) fn snapshot(tree: &LayoutTree, root: NodeId) -> Vec<NodeSnapshot> {
    let mut out = Vec::new();
    let mut stack = vec![(root, 0, Offset::ZERO)];
    while let Some((id, depth, origin)) = stack.pop() {
        let Some(node) = tree.node(id) else {
            continue;
        };
        let geometry = node.geometry();
        let absolute = Rect::from_parts(origin + geometry.frame.offset, geometry.frame.size);
        let content_origin = absolute.offset + geometry.padding_border.top_left();
        out.push(NodeSnapshot {
            tag: node.tag(),
            depth,
            frame: geometry.frame,
            absolute,
            baseline: geometry.baseline,
            active: node.is_active(),
            visibility: node.visibility(),
        });
        for child in tree.children_in_order(id).into_iter().rev() {
            stack.push((child, depth + 1, content_origin));
        }
    }
    out
}

/// Write one colored label and value.
fn write_field(buffer: &mut Buffer, indent: &str, label: &str, value: &str) -> Result<()> {
    write!(buffer, "{indent}  ")?;
    buffer.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
    write!(buffer, "{label}")?;
    buffer.reset()?;
    writeln!(buffer, " {value}")?;
    Ok(())
}

/// Render the subtree under `root` as indented text, one block per node.
pub fn dump(tree: &LayoutTree, root: NodeId, color: bool) -> Result<String> {
    let mut buffer = if color {
        Buffer::ansi()
    } else {
        Buffer::no_color()
    };
    for row in snapshot(tree, root) {
        let indent = "    ".repeat(row.depth);
        write!(buffer, "{indent}")?;
        buffer.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
        write!(buffer, "{}", row.tag)?;
        buffer.reset()?;
        if !row.active || row.visibility == Visibility::Gone {
            buffer.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
            write!(buffer, " (inactive)")?;
            buffer.reset()?;
        }
        writeln!(buffer)?;

        let f = row.frame;
        write_field(
            &mut buffer,
            &indent,
            "frame:",
            &format!(
                "x: {}, y: {}, w: {}, h: {}",
                f.offset.x, f.offset.y, f.size.width, f.size.height
            ),
        )?;
        let a = row.absolute.offset;
        write_field(&mut buffer, &indent, "absolute:", &format!("({}, {})", a.x, a.y))?;
        if let Some(baseline) = row.baseline {
            write_field(&mut buffer, &indent, "baseline:", &baseline.to_string())?;
        }
    }
    Ok(String::from_utf8_lossy(buffer.as_slice()).into_owned())
}

#[cfg(test)]
mod tests {
    use geom::{Edges, Size};

    use crate::{
        Algorithm, FlexParams, LayoutContext, LayoutTree, NodeBuilder, Result, host::HostPool,
    };

    #[test]
    fn snapshot_accumulates_absolute_offsets() -> Result<()> {
        let mut hosts = HostPool::default();
        let mut tree = LayoutTree::new();
        let root = tree.insert_root(
            NodeBuilder::new(hosts.node("root"))
                .size(100.0, 50.0)
                .with_props(|p| p.padding = Edges::all(4.0))
                .algorithm(Algorithm::Flex(FlexParams::default()))
                .child(NodeBuilder::new(hosts.node("a")).size(10.0, 10.0))
                .child(
                    NodeBuilder::new(hosts.node("b"))
                        .size(20.0, 20.0)
                        .with_props(|p| p.padding = Edges::all(2.0))
                        .child(NodeBuilder::new(hosts.node("c")).size(6.0, 6.0)),
                ),
        );
        tree.run(&LayoutContext::new(Size::new(200.0, 200.0)))?;
        let rows = tree.snapshot(root);
        let tags: Vec<&str> = rows.iter().map(|r| r.tag.as_str()).collect();
        assert_eq!(tags, ["root", "a", "b", "c"]);
        assert_eq!(rows[2].absolute.offset.x, 14.0);
        assert_eq!(rows[3].depth, 2);
        assert_eq!(rows[3].absolute.offset.x, 21.0);
        assert_eq!(rows[3].absolute.offset.y, 11.0);

        let text = super::dump(&tree, root, false)?;
        assert!(text.contains("    a\n"));
        assert!(text.contains("frame: x: 10, y: 0, w: 20, h: 20"));
        Ok(())
    }
}
