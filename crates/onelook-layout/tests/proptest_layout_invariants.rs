//! Property-based invariants for the layout algorithms over random trees.
//!
//! 1. Every coordinate is finite.
//! 2. Tree, org and mind layouts never overlap node boxes.
//! 3. Repeated passes are bit-identical.
//! 4. Connector count equals the number of visible edges (plus the fishbone spine).

use onelook_core::{ConnectionStyle, Document, LayoutKind, MindMapNode, MindTree};
use onelook_layout::{ConnectorKind, LayoutOptions, layout_document, layout_tree};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

/// Builds a tree from `(parent_pick, text_len, cjk, collapsed)` tuples: node `i + 1` attaches to
/// an earlier node chosen by `parent_pick`.
fn build(spec: &[(usize, usize, bool, bool)]) -> MindMapNode {
    let mut flat: Vec<(MindMapNode, Option<usize>)> = vec![(MindMapNode::new("root"), None)];
    for (i, &(pick, len, cjk, collapsed)) in spec.iter().enumerate() {
        let text = if cjk { "节".repeat(len) } else { "w".repeat(len) };
        let mut node = MindMapNode::new(text);
        node.is_expanded = !collapsed;
        flat.push((node, Some(pick % (i + 1))));
    }
    // Attach back to front so every child is complete before it moves into its parent.
    while flat.len() > 1 {
        let (node, parent) = flat.pop().unwrap();
        flat[parent.unwrap()].0.children.insert(0, node);
    }
    flat.pop().unwrap().0
}

fn tree_strategy() -> impl Strategy<Value = MindMapNode> {
    let item = (
        any::<usize>(),
        0usize..40,
        any::<bool>(),
        prop::bool::weighted(0.1),
    );
    prop::collection::vec(item, 0..60).prop_map(|spec| build(&spec))
}

fn kind_strategy() -> impl Strategy<Value = LayoutKind> {
    prop_oneof![
        Just(LayoutKind::Mind),
        Just(LayoutKind::Tree),
        Just(LayoutKind::Org),
        Just(LayoutKind::Fishbone),
    ]
}

// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn coordinates_are_finite(root in tree_strategy(), kind in kind_strategy()) {
        let tree = MindTree::from_node(&root).unwrap();
        let layout = layout_tree(&tree, kind, &LayoutOptions::default());
        for n in layout.flatten() {
            prop_assert!(n.x.is_finite() && n.y.is_finite());
            prop_assert!(n.width >= 60.0 && n.height >= 36.0);
        }
    }

    #[test]
    fn non_fishbone_layouts_never_overlap(
        root in tree_strategy(),
        kind in prop_oneof![Just(LayoutKind::Mind), Just(LayoutKind::Tree), Just(LayoutKind::Org)],
    ) {
        let tree = MindTree::from_node(&root).unwrap();
        let layout = layout_tree(&tree, kind, &LayoutOptions::default());
        let nodes = layout.flatten();
        for (i, a) in nodes.iter().enumerate() {
            for b in &nodes[i + 1..] {
                prop_assert!(!a.overlaps(b), "{:?}: {} overlaps {}", kind, a.id, b.id);
            }
        }
    }

    #[test]
    fn layout_is_deterministic(root in tree_strategy(), kind in kind_strategy()) {
        let mut doc = Document::new_default("p", 0);
        doc.tree = MindTree::from_node(&root).unwrap();
        let options = LayoutOptions::default();
        let a = layout_document(&doc, Some(kind), Some(ConnectionStyle::Curve), &options);
        let b = layout_document(&doc, Some(kind), Some(ConnectionStyle::Curve), &options);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn one_connector_per_visible_edge(root in tree_strategy(), kind in kind_strategy()) {
        let mut doc = Document::new_default("p", 0);
        doc.tree = MindTree::from_node(&root).unwrap();
        let layout = layout_document(&doc, Some(kind), None, &LayoutOptions::default());
        let edges = layout
            .connectors
            .iter()
            .filter(|c| c.kind != ConnectorKind::Spine)
            .count();
        prop_assert_eq!(edges, layout.nodes.len() - 1);
    }
}
