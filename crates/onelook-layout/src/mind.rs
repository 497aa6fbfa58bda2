//! Horizontal mind-map layout.
//!
//! The root sits at the centre and each branch grows sideways. Subtree heights are accumulated
//! bottom-up, then children are stacked vertically, each centred within its own subtree extent,
//! with the whole block centred on the parent.

use crate::config::{Direction, Spacing};
use crate::model::{LayoutTree, Point};
use crate::text::NodeMeasurer;
use onelook_core::{MindTree, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

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
    let extents = layout.extents(spacing.vertical_gap, |n| n.height);
    let manual: Vec<Option<Position>> = layout
        .nodes
        .iter()
        .map(|n| tree.get(n.id.as_str()).and_then(|r| r.position))
        .collect();
    let mut placer = Placer {
        layout: &mut layout,
        extents: &extents,
        manual: &manual,
        spacing,
    };

    placer.layout.nodes[0].x = center.x;
    placer.layout.nodes[0].y = center.y;

    let root_children = placer.layout.nodes[0].children.clone();
    match spacing.direction {
        Direction::Right => placer.place(0, &root_children, Side::Right),
        Direction::Left => placer.place(0, &root_children, Side::Left),
        Direction::Both => {
            let (right, left) = root_children.split_at(root_children.len().div_ceil(2));
            placer.place(0, right, Side::Right);
            placer.place(0, left, Side::Left);
        }
    }

    // Pre-order: every parent is positioned before its children.
    for i in 1..placer.layout.nodes.len() {
        let node = &placer.layout.nodes[i];
        if node.children.is_empty() {
            continue;
        }
        let side = if node.x < center.x {
            Side::Left
        } else {
            Side::Right
        };
        let children = node.children.clone();
        placer.place(i, &children, side);
    }

    layout
}

struct Placer<'a> {
    layout: &'a mut LayoutTree,
    extents: &'a [f64],
    manual: &'a [Option<Position>],
    spacing: &'a Spacing,
}

impl Placer<'_> {
    /// Stacks `group` (children of `parent`) on one side of it.
    fn place(&mut self, parent: usize, group: &[usize], side: Side) {
        if group.is_empty() {
            return;
        }
        let gap = self.spacing.vertical_gap;
        let span = group.iter().map(|&c| self.extents[c]).sum::<f64>()
            + (group.len() - 1) as f64 * gap;

        let p = &self.layout.nodes[parent];
        let (px, py, half_w) = (p.x, p.y, p.width / 2.0);
        let mut cursor = py - span / 2.0;

        for &c in group {
            let extent = self.extents[c];
            let child = &mut self.layout.nodes[c];
            if let Some(pos) = self.manual[c] {
                child.x = pos.x;
                child.y = pos.y;
            } else {
                let offset = half_w + self.spacing.horizontal_gap + child.width / 2.0;
                child.x = match side {
                    Side::Right => px + offset,
                    Side::Left => px - offset,
                };
                child.y = cursor + extent / 2.0;
            }
            cursor += extent + gap;
        }
    }
}
