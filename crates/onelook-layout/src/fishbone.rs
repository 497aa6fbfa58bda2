//! Fishbone (Ishikawa) layout.
//!
//! The root is the head; its children become bones alternating above (even index) and below
//! (odd index) a horizontal spine that runs to the right. Every deeper level cascades diagonally
//! away from the spine. Branch spacing uses the nominal `node_height` rather than measured sizes,
//! so no extent pass is needed.

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
    let Spacing {
        horizontal_gap: h_gap,
        vertical_gap: v_gap,
        node_height,
        ..
    } = *spacing;

    layout.nodes[0].x = center.x;
    layout.nodes[0].y = center.y;

    // `true` when the node hangs above the spine.
    let mut above = vec![false; layout.nodes.len()];

    let root = &layout.nodes[0];
    let mut top_y = root.y - v_gap - node_height / 2.0;
    let mut bottom_y = root.y + v_gap + node_height / 2.0;
    let mut cursor_x = root.right() + h_gap;
    let bones = root.children.clone();

    for (i, &c) in bones.iter().enumerate() {
        let is_top = i % 2 == 0;
        let child = &mut layout.nodes[c];
        child.x = cursor_x + child.width / 2.0;
        if is_top {
            child.y = top_y;
            top_y -= v_gap + node_height;
        } else {
            child.y = bottom_y;
            bottom_y += v_gap + node_height;
            cursor_x += 2.0 * h_gap + child.width;
        }
        above[c] = is_top;
    }

    for i in 1..layout.nodes.len() {
        let node = &layout.nodes[i];
        if node.children.is_empty() {
            continue;
        }
        let dir = if above[i] { -1.0 } else { 1.0 };
        let (right, y) = (node.right(), node.y);
        let children = node.children.clone();

        let mut cursor_y = y + dir * (v_gap / 2.0 + node_height / 2.0);
        for c in children {
            let child = &mut layout.nodes[c];
            child.x = right + h_gap / 2.0 + child.width / 2.0;
            child.y = cursor_y + dir * child.height / 2.0;
            cursor_y += dir * (v_gap / 2.0 + child.height);
            above[c] = above[i];
        }
    }
    layout
}
