//! Property checks over generated layouts.

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use boxlayout::{
        Algorithm, Align, AlignDirection, CONTAINER_ID, FlexParams, HostPool, LayoutContext,
        LayoutProps, LayoutTree, MainAlign, NodeBuilder, NodeId, WrapParams,
        geom::{Dimension, Rect, Size},
    };
    use proptest::{prelude::*, test_runner::TestCaseError};

    fn run(tree: &mut LayoutTree, viewport: Size) -> Result<(), TestCaseError> {
        tree.run(&LayoutContext::new(viewport))
            .map_err(|e| TestCaseError::fail(e.to_string()))
    }

    fn frames(tree: &LayoutTree, parent: NodeId) -> Vec<Rect> {
        tree.children_in_order(parent)
            .iter()
            .filter_map(|c| tree.geometry(*c).map(|g| g.frame))
            .collect()
    }

    fn by_tag(tree: &LayoutTree, root: NodeId) -> BTreeMap<String, Rect> {
        tree.snapshot(root)
            .into_iter()
            .skip(1)
            .map(|row| (row.tag, row.frame))
            .collect()
    }

    fn row(hosts: &mut HostPool, width: f32, params: FlexParams, children: Vec<NodeBuilder>) -> NodeBuilder {
        NodeBuilder::new(hosts.node("row"))
            .size(width, 20.0)
            .algorithm(Algorithm::Flex(params))
            .children(children)
    }

    fn anchor_align() -> impl Strategy<Value = Align> {
        prop_oneof![Just(Align::Start), Just(Align::Center), Just(Align::End)]
    }

    /// Each child anchors its left and top edges to the container or to an
    /// earlier child.
    fn anchored_children(
        hosts: &mut HostPool,
        rules: &[(usize, Align, usize, Align)],
        reversed: bool,
    ) -> Vec<NodeBuilder> {
        let anchor = |i: usize, target: usize| {
            if target % (i + 1) == 0 {
                CONTAINER_ID.to_string()
            } else {
                format!("c{}", target % i)
            }
        };
        let mut children: Vec<_> = rules
            .iter()
            .enumerate()
            .map(|(i, (h, h_align, v, v_align))| {
                let tag = format!("c{i}");
                let props = LayoutProps::fixed(10.0 + i as f32, 8.0)
                    .id(&tag)
                    .align(AlignDirection::Left, &anchor(i, *h), *h_align)
                    .align(AlignDirection::Top, &anchor(i, *v), *v_align);
                NodeBuilder::new(hosts.node(&tag)).props(props)
            })
            .collect();
        if reversed {
            children.reverse();
        }
        children
    }

    fn relative(hosts: &mut HostPool, children: Vec<NodeBuilder>) -> NodeBuilder {
        NodeBuilder::new(hosts.node("relative"))
            .size(500.0, 500.0)
            .algorithm(Algorithm::Relative)
            .children(children)
    }

    proptest! {
        #[test]
        fn space_between_spans_the_line(widths in prop::collection::vec(1.0f32..60.0, 2..6)) {
            let mut hosts = HostPool::default();
            let mut tree = LayoutTree::new();
            let children = widths
                .iter()
                .enumerate()
                .map(|(i, w)| NodeBuilder::new(hosts.node(&format!("c{i}"))).size(*w, 10.0))
                .collect();
            let params = FlexParams {
                main_align: MainAlign::SpaceBetween,
                ..FlexParams::default()
            };
            let root = tree.insert_root(row(&mut hosts, 400.0, params, children));
            run(&mut tree, Size::new(1000.0, 1000.0))?;
            let f = frames(&tree, root);
            let gap = (400.0 - widths.iter().sum::<f32>()) / (widths.len() - 1) as f32;
            prop_assert!(f[0].offset.x.abs() < 1e-3);
            prop_assert!((f[f.len() - 1].right() - 400.0).abs() < 1e-2);
            for pair in f.windows(2) {
                prop_assert!((pair[1].offset.x - pair[0].right() - gap).abs() < 1e-2);
            }
        }

        #[test]
        fn wrap_lines_fit_the_limit(
            widths in prop::collection::vec(1.0f32..200.0, 1..12),
            spacing in 0.0f32..20.0,
        ) {
            let mut hosts = HostPool::default();
            let mut tree = LayoutTree::new();
            let children: Vec<_> = widths
                .iter()
                .enumerate()
                .map(|(i, w)| NodeBuilder::new(hosts.node(&format!("c{i}"))).size(*w, 40.0))
                .collect();
            let root = tree.insert_root(
                NodeBuilder::new(hosts.node("wrap"))
                    .with_props(|p| p.width = Some(Dimension::Px(300.0)))
                    .algorithm(Algorithm::Wrap(WrapParams { spacing, ..WrapParams::default() }))
                    .children(children),
            );
            run(&mut tree, Size::new(300.0, 10000.0))?;
            let mut lines: BTreeMap<u32, Vec<Rect>> = BTreeMap::new();
            for f in frames(&tree, root) {
                lines.entry((f.offset.y / 40.0).round() as u32).or_default().push(f);
            }
            let count = lines.len() as u32;
            prop_assert_eq!(lines.keys().copied().collect::<Vec<_>>(), (0..count).collect::<Vec<_>>());
            for items in lines.values() {
                if items.len() > 1 {
                    let right = items.iter().map(|f| f.right()).fold(0.0, f32::max);
                    prop_assert!(right <= 300.0 + 1e-2, "{items:?}");
                }
                for pair in items.windows(2) {
                    prop_assert!(pair[1].offset.x > pair[0].offset.x);
                }
            }
        }

        #[test]
        fn weights_partition_the_line(weights in prop::collection::vec(0.1f32..5.0, 1..6)) {
            let mut hosts = HostPool::default();
            let mut tree = LayoutTree::new();
            let children = weights
                .iter()
                .enumerate()
                .map(|(i, w)| {
                    let weight = *w;
                    NodeBuilder::new(hosts.node(&format!("c{i}"))).with_props(|p| p.flex.weight = weight)
                })
                .collect();
            let root = tree.insert_root(row(&mut hosts, 300.0, FlexParams::default(), children));
            run(&mut tree, Size::new(1000.0, 1000.0))?;
            let f = frames(&tree, root);
            let total: f32 = weights.iter().sum();
            let sum: f32 = f.iter().map(|r| r.size.width).sum();
            prop_assert!((sum - 300.0).abs() < 1e-2);
            for (rect, w) in f.iter().zip(&weights) {
                prop_assert!((rect.size.width - 300.0 * w / total).abs() < 1e-2);
            }
        }

        #[test]
        fn eviction_follows_priority(
            items in prop::collection::vec((10.0f32..60.0, 1i32..5), 1..7),
        ) {
            let mut hosts = HostPool::default();
            let mut tree = LayoutTree::new();
            let children = items
                .iter()
                .enumerate()
                .map(|(i, (w, priority))| {
                    let priority = *priority;
                    NodeBuilder::new(hosts.node(&format!("c{i}")))
                        .size(*w, 10.0)
                        .with_props(|p| p.flex.display_priority = priority)
                })
                .collect();
            let root = tree.insert_root(row(&mut hosts, 100.0, FlexParams::default(), children));
            run(&mut tree, Size::new(1000.0, 1000.0))?;
            let ids = tree.children_in_order(root);
            let active: Vec<bool> = ids
                .iter()
                .map(|id| tree.node(*id).is_some_and(|n| n.is_active()))
                .collect();
            let top = items.iter().map(|(_, p)| *p).max().unwrap_or(1);
            for (i, (_, p)) in items.iter().enumerate() {
                if *p == top {
                    prop_assert!(active[i]);
                }
                if !active[i] {
                    for (j, (_, q)) in items.iter().enumerate() {
                        if q <= p {
                            prop_assert!(!active[j]);
                        }
                    }
                }
            }
        }

        #[test]
        fn widening_never_evicts(
            items in prop::collection::vec((10.0f32..60.0, 1i32..5), 1..7),
            narrow in 40.0f32..150.0,
            extra in 0.0f32..150.0,
        ) {
            let mut hosts = HostPool::default();
            let mut tree = LayoutTree::new();
            let children = items
                .iter()
                .enumerate()
                .map(|(i, (w, priority))| {
                    let priority = *priority;
                    NodeBuilder::new(hosts.node(&format!("c{i}")))
                        .size(*w, 10.0)
                        .with_props(|p| p.flex.display_priority = priority)
                })
                .collect();
            let root = tree.insert_root(row(&mut hosts, narrow, FlexParams::default(), children));
            run(&mut tree, Size::new(1000.0, 1000.0))?;
            let ids = tree.children_in_order(root);
            let before: Vec<bool> = ids.iter().map(|id| tree.node(*id).is_some_and(|n| n.is_active())).collect();

            tree.with_props(root, |p| p.width = Some(Dimension::Px(narrow + extra)))
                .map_err(|e| TestCaseError::fail(e.to_string()))?;
            run(&mut tree, Size::new(1000.0, 1000.0))?;
            for (id, was_active) in ids.iter().zip(before) {
                if was_active {
                    prop_assert!(tree.node(*id).is_some_and(|n| n.is_active()));
                }
            }
        }

        #[test]
        fn anchors_ignore_declaration_order(
            rules in prop::collection::vec((0usize..8, anchor_align(), 0usize..8, anchor_align()), 1..8),
        ) {
            let mut hosts = HostPool::default();
            let mut forward = LayoutTree::new();
            let children = anchored_children(&mut hosts, &rules, false);
            let root = forward.insert_root(relative(&mut hosts, children));
            run(&mut forward, Size::new(1000.0, 1000.0))?;
            let first = by_tag(&forward, root);

            forward.mark_dirty(root);
            run(&mut forward, Size::new(1000.0, 1000.0))?;
            prop_assert_eq!(&by_tag(&forward, root), &first);

            let mut backward = LayoutTree::new();
            let children = anchored_children(&mut hosts, &rules, true);
            let root = backward.insert_root(relative(&mut hosts, children));
            run(&mut backward, Size::new(1000.0, 1000.0))?;
            prop_assert_eq!(by_tag(&backward, root), first);
        }

        #[test]
        fn anchor_rings_collapse(len in 1usize..6) {
            let mut hosts = HostPool::default();
            let mut tree = LayoutTree::new();
            let children = (0..len)
                .map(|i| {
                    let tag = format!("c{i}");
                    let props = LayoutProps::fixed(10.0, 10.0)
                        .id(&tag)
                        .align(AlignDirection::Left, &format!("c{}", (i + 1) % len), Align::End);
                    NodeBuilder::new(hosts.node(&tag)).props(props)
                })
                .collect();
            let root = tree.insert_root(relative(&mut hosts, children));
            run(&mut tree, Size::new(1000.0, 1000.0))?;
            for rect in frames(&tree, root) {
                prop_assert_eq!(rect, Rect::new(0.0, 0.0, 0.0, 0.0));
            }
        }
    }
}
