//! SVG path data for the edges of a laid-out tree.

use crate::model::{Connector, ConnectorKind, LayoutNode, LayoutTree};
use onelook_core::{ConnectionStyle, LayoutKind};

/// Writes path commands with JS-style number formatting (`10` not `10.0`, never `-0`).
struct PathWriter {
    out: String,
    buf: ryu_js::Buffer,
}

impl PathWriter {
    fn new() -> Self {
        Self {
            out: String::with_capacity(64),
            buf: ryu_js::Buffer::new(),
        }
    }

    fn cmd(&mut self, cmd: char, points: &[(f64, f64)]) -> &mut Self {
        if !self.out.is_empty() {
            self.out.push(' ');
        }
        self.out.push(cmd);
        for (i, &(x, y)) in points.iter().enumerate() {
            self.out.push_str(if i == 0 { " " } else { ", " });
            self.out.push_str(js_number(x, &mut self.buf));
            self.out.push(' ');
            self.out.push_str(js_number(y, &mut self.buf));
        }
        self
    }

    fn finish(&mut self) -> String {
        std::mem::take(&mut self.out)
    }
}

fn js_number(mut v: f64, buf: &mut ryu_js::Buffer) -> &str {
    if !v.is_finite() {
        return "0";
    }
    if v == 0.0 {
        v = 0.0;
    }
    buf.format_finite(v)
}

/// Horizontal edge from `from` to `to` between their facing vertical edges.
///
/// The endpoints are mirrored when `to` lies left of `from`.
pub fn path(from: &LayoutNode, to: &LayoutNode, style: ConnectionStyle) -> String {
    let (sx, ex) = if to.x < from.x {
        (from.left(), to.right())
    } else {
        (from.right(), to.left())
    };
    let (sy, ey) = (from.y, to.y);

    let mut w = PathWriter::new();
    w.cmd('M', &[(sx, sy)]);
    match style {
        ConnectionStyle::Straight => w.cmd('L', &[(ex, ey)]),
        ConnectionStyle::Polyline => {
            let mx = (sx + ex) / 2.0;
            w.cmd('L', &[(mx, sy)]).cmd('L', &[(mx, ey)]).cmd('L', &[(ex, ey)])
        }
        ConnectionStyle::Curve => {
            let d = (ex - sx) / 2.0;
            w.cmd('C', &[(sx + d, sy), (ex - d, ey), (ex, ey)])
        }
    };
    w.finish()
}

/// Orthogonal elbow from the bottom of `from` to the top of `to`.
pub fn tree_path(from: &LayoutNode, to: &LayoutNode) -> String {
    let (px, pb) = (from.x, from.bottom());
    let (cx, ct) = (to.x, to.top());
    let mid_y = (pb + ct) / 2.0;
    PathWriter::new()
        .cmd('M', &[(px, pb)])
        .cmd('L', &[(px, mid_y)])
        .cmd('L', &[(cx, mid_y)])
        .cmd('L', &[(cx, ct)])
        .finish()
}

fn straight(points: &[(f64, f64)]) -> String {
    let mut w = PathWriter::new();
    for (i, &p) in points.iter().enumerate() {
        w.cmd(if i == 0 { 'M' } else { 'L' }, &[p]);
    }
    w.finish()
}

/// One connector per visible parent-child edge, in pre-order of the child.
///
/// Tree and org layouts always draw elbows. Fishbone draws a spine along the root's centre line,
/// a vertical bone from the spine to each root child, then `style` paths below that.
pub fn connectors(layout: &LayoutTree, kind: LayoutKind, style: ConnectionStyle) -> Vec<Connector> {
    let nodes = layout.flatten();
    let mut out = Vec::with_capacity(nodes.len());
    let Some(root) = nodes.first() else {
        return out;
    };

    if kind == LayoutKind::Fishbone {
        let last = root
            .children()
            .iter()
            .map(|&c| &nodes[c])
            .max_by(|a, b| a.x.total_cmp(&b.x));
        if let Some(last) = last {
            out.push(Connector {
                from: root.id.clone(),
                to: last.id.clone(),
                kind: ConnectorKind::Spine,
                path: straight(&[(root.right(), root.y), (last.x, root.y)]),
            });
        }
    }

    for child in nodes.iter().skip(1) {
        let Some(parent) = child.parent_index().map(|p| &nodes[p]) else {
            continue;
        };
        let (connector_kind, d) = match kind {
            LayoutKind::Tree | LayoutKind::Org => (ConnectorKind::Edge, tree_path(parent, child)),
            LayoutKind::Fishbone if parent.parent_index().is_none() => {
                let edge = if child.y < parent.y {
                    child.bottom()
                } else {
                    child.top()
                };
                (
                    ConnectorKind::Bone,
                    straight(&[(child.x, parent.y), (child.x, edge)]),
                )
            }
            LayoutKind::Mind | LayoutKind::Fishbone => {
                (ConnectorKind::Edge, path(parent, child, style))
            }
        };
        out.push(Connector {
            from: parent.id.clone(),
            to: child.id.clone(),
            kind: connector_kind,
            path: d,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use onelook_core::NodeId;

    fn node(x: f64, y: f64, width: f64, height: f64) -> LayoutNode {
        LayoutNode {
            id: NodeId::from("n"),
            x,
            y,
            width,
            height,
            depth: 0,
            parent: None,
            parent_index: None,
            children: Vec::new(),
        }
    }

    #[test]
    fn straight_joins_facing_edges() {
        let a = node(0.0, 0.0, 100.0, 40.0);
        let b = node(200.0, 50.0, 60.0, 40.0);
        assert_eq!(path(&a, &b, ConnectionStyle::Straight), "M 50 0 L 170 50");
    }

    #[test]
    fn polyline_bends_at_horizontal_midpoint() {
        let a = node(0.0, 0.0, 100.0, 40.0);
        let b = node(200.0, 50.0, 60.0, 40.0);
        assert_eq!(
            path(&a, &b, ConnectionStyle::Polyline),
            "M 50 0 L 110 0 L 110 50 L 170 50"
        );
    }

    #[test]
    fn curve_uses_half_distance_control_points() {
        let a = node(0.0, 0.0, 100.0, 40.0);
        let b = node(200.0, 50.0, 60.0, 40.0);
        assert_eq!(
            path(&a, &b, ConnectionStyle::Curve),
            "M 50 0 C 110 0, 110 50, 170 50"
        );
    }

    #[test]
    fn leftward_edges_are_mirrored() {
        let a = node(0.0, 0.0, 100.0, 40.0);
        let b = node(-200.0, 0.0, 60.0, 40.0);
        assert_eq!(path(&a, &b, ConnectionStyle::Straight), "M -50 0 L -170 0");
    }

    #[test]
    fn tree_elbow_meets_in_the_middle() {
        let a = node(0.0, 0.0, 100.0, 40.0);
        let b = node(80.0, 100.0, 60.0, 40.0);
        assert_eq!(tree_path(&a, &b), "M 0 20 L 0 50 L 80 50 L 80 80");
    }

    #[test]
    fn fractional_and_negative_zero_formatting() {
        let a = node(-0.0, 0.5, 0.0, 40.0);
        let b = node(10.25, 0.5, 0.0, 40.0);
        assert_eq!(path(&a, &b, ConnectionStyle::Straight), "M 0 0.5 L 10.25 0.5");
    }
}
