use crate::text::{NodeMeasurer, NodeSize};
use onelook_core::{MindTree, NodeId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        let mut it = points.into_iter();
        let (x0, y0) = it.next()?;
        let mut b = Self {
            min_x: x0,
            min_y: y0,
            max_x: x0,
            max_y: y0,
        };
        for (x, y) in it {
            b.min_x = b.min_x.min(x);
            b.min_y = b.min_y.min(y);
            b.max_x = b.max_x.max(x);
            b.max_y = b.max_y.max(y);
        }
        Some(b)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// A positioned, visible node. `x`/`y` are the centre of its box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutNode {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub depth: usize,
    /// Id of the parent node (absent for the root).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,
    #[serde(skip)]
    pub(crate) parent_index: Option<usize>,
    #[serde(skip)]
    pub(crate) children: Vec<usize>,
}

impl LayoutNode {
    pub fn parent_index(&self) -> Option<usize> {
        self.parent_index
    }

    /// Indices of visible children within the owning [`LayoutTree`].
    pub fn children(&self) -> &[usize] {
        &self.children
    }

    pub fn left(&self) -> f64 {
        self.x - self.width / 2.0
    }

    pub fn right(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn top(&self) -> f64 {
        self.y - self.height / 2.0
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// Whether the boxes of `self` and `other` share interior area.
    pub fn overlaps(&self, other: &LayoutNode) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }
}

/// Visible nodes in pre-order; index 0 is the root.
///
/// The tree is rebuilt from the document on every layout pass and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LayoutTree {
    pub nodes: Vec<LayoutNode>,
}

impl LayoutTree {
    /// Collects the visible part of `tree` (collapsed subtrees excluded) with measured sizes and
    /// all positions zeroed.
    pub fn build(tree: &MindTree, measurer: &dyn NodeMeasurer) -> Self {
        let mut nodes: Vec<LayoutNode> = Vec::with_capacity(tree.len());
        let mut stack: Vec<(&NodeId, Option<usize>, usize)> = vec![(tree.root_id(), None, 0)];

        while let Some((id, parent_index, depth)) = stack.pop() {
            let Some(record) = tree.get(id.as_str()) else {
                continue;
            };
            let NodeSize { width, height } = measurer.measure(record);
            let index = nodes.len();
            nodes.push(LayoutNode {
                id: record.id.clone(),
                x: 0.0,
                y: 0.0,
                width,
                height,
                depth,
                parent: record.parent().cloned(),
                parent_index,
                children: Vec::new(),
            });
            if let Some(p) = parent_index {
                nodes[p].children.push(index);
            }
            for child in record.visible_children().iter().rev() {
                stack.push((child, Some(index), depth + 1));
            }
        }
        Self { nodes }
    }

    pub fn root(&self) -> Option<&LayoutNode> {
        self.nodes.first()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&LayoutNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Every positioned node in pre-order.
    pub fn flatten(&self) -> &[LayoutNode] {
        &self.nodes
    }

    /// Bounding box over every node box.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(
            self.nodes
                .iter()
                .flat_map(|n| [(n.left(), n.top()), (n.right(), n.bottom())]),
        )
    }

    /// Post-order subtree extents along one axis.
    ///
    /// `own` picks the node's size on that axis; a node's extent is the larger of its own size and
    /// the summed extents of its children plus the gaps between them.
    pub(crate) fn extents(&self, gap: f64, own: impl Fn(&LayoutNode) -> f64) -> Vec<f64> {
        let mut extents = vec![0.0; self.nodes.len()];
        // Pre-order guarantees children sit after their parent, so a reverse sweep is post-order.
        for (i, node) in self.nodes.iter().enumerate().rev() {
            extents[i] = own(node).max(self.children_span(i, &extents, gap));
        }
        extents
    }

    /// Summed extents of `index`'s children plus the gaps between them.
    pub(crate) fn children_span(&self, index: usize, extents: &[f64], gap: f64) -> f64 {
        let children = &self.nodes[index].children;
        if children.is_empty() {
            return 0.0;
        }
        children.iter().map(|&c| extents[c]).sum::<f64>() + (children.len() - 1) as f64 * gap
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorKind {
    /// Ordinary parent-child edge.
    #[default]
    Edge,
    /// Fishbone backbone from the head to the furthest bone.
    Spine,
    /// Fishbone link from the spine to a root child.
    Bone,
}

/// A rendered edge between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    pub from: NodeId,
    pub to: NodeId,
    #[serde(default)]
    pub kind: ConnectorKind,
    /// SVG path data.
    pub path: String,
}

/// Complete layout output for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MindMapLayout {
    pub nodes: Vec<LayoutNode>,
    pub connectors: Vec<Connector>,
    pub bounds: Option<Bounds>,
}
