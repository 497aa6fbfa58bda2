//! Top-down tree layout, shared by the `tree` and `org` kinds (they differ only in vertical gap).

use crate::config::Spacing;
use crate::model::{LayoutTree, Point};
use crate::text::NodeMeasurer;
use onelook_core::MindTree;

pub fn layout(
    tree: &MindTree,
    center: Point,
    spacing: &Spacing,
    measurer: &dyn NodeMeasurer,
) -> LayoutTree {
    let mut layout = LayoutTree::build(tree, measurer);
    if layout.is_empty() {
        return layout;
    }
    let h_gap = spacing.horizontal_gap;
    let extents = layout.extents(h_gap, |n| n.width);

    layout.nodes[0].x = center.x;
    layout.nodes[0].y = center.y;

    for i in 0..layout.nodes.len() {
        let span = layout.children_span(i, &extents, h_gap);
        let parent = &layout.nodes[i];
        let (x, bottom) = (parent.x, parent.bottom());
        let children = parent.children.clone();

        let mut cursor = x - span / 2.0;
        for c in children {
            let child = &mut layout.nodes[c];
            child.x = cursor + extents[c] / 2.0;
            child.y = bottom + spacing.vertical_gap + child.height / 2.0;
            cursor += extents[c] + h_gap;
        }
    }
    layout
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::text::HeuristicNodeMeasurer;
    use onelook_core::{LayoutKind, MindMapNode};

    fn node(id: &str, text: &str) -> MindMapNode {
        MindMapNode {
            id: id.into(),
            ..MindMapNode::new(text)
        }
    }

    fn run(root: MindMapNode, kind: LayoutKind) -> LayoutTree {
        let tree = MindTree::from_node(&root).unwrap();
        layout(
            &tree,
            Point::new(100.0, 50.0),
            &LayoutConfig::default().resolve(kind),
            &HeuristicNodeMeasurer,
        )
    }

    #[test]
    fn children_row_is_centred_below_parent() {
        let l = run(
            node("r", "Root").with_children([node("a", "A"), node("b", "B")]),
            LayoutKind::Tree,
        );
        let (a, b) = (l.get("a").unwrap(), l.get("b").unwrap());
        // Two 60-wide leaves with a 60 gap: span 180 centred on x = 100.
        assert_eq!(a.x, 40.0);
        assert_eq!(b.x, 160.0);
        assert_eq!(a.y, 50.0 + 18.0 + 24.0 + 18.0);
        assert_eq!(a.y, b.y);
    }

    #[test]
    fn org_uses_larger_vertical_gap() {
        let l = run(
            node("r", "Root").with_children([node("a", "A")]),
            LayoutKind::Org,
        );
        let a = l.get("a").unwrap();
        assert_eq!(a.x, 100.0);
        assert_eq!(a.y, 50.0 + 18.0 + 60.0 + 18.0);
    }

    #[test]
    fn wide_subtree_pushes_sibling_aside() {
        let l = run(
            node("r", "Root").with_children([
                node("a", "A").with_children([node("a1", "A1"), node("a2", "A2")]),
                node("b", "B"),
            ]),
            LayoutKind::Tree,
        );
        let (a2, b) = (l.get("a2").unwrap(), l.get("b").unwrap());
        assert!(a2.right() + 60.0 <= b.left());
    }
}
