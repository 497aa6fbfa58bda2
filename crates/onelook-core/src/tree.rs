//! Arena-backed mind-map tree.
//!
//! Nodes are stored in an id-keyed map; parent/child relations are id lists, so the parent link
//! is a lookup rather than an owning pointer. The tree always has exactly one root, which cannot
//! be removed or moved.

use crate::model::{MindMapNode, NodeData, NodeId, NodeStyle, NodeSummary, Position};
use crate::{Error, Result};
use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashSet};

type NodeMap = IndexMap<NodeId, NodeRecord, FxBuildHasher>;

#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    pub id: NodeId,
    pub text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    pub is_expanded: bool,
    pub style: Option<NodeStyle>,
    pub data: Option<NodeData>,
    pub summary: Option<NodeSummary>,
    /// Manual position override (set when the node was dragged).
    pub position: Option<Position>,
}

impl NodeRecord {
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_id(NodeId::generate(), text)
    }

    pub fn with_id(id: NodeId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            parent: None,
            children: Vec::new(),
            is_expanded: true,
            style: None,
            data: None,
            summary: None,
            position: None,
        }
    }

    fn from_persisted(node: &MindMapNode, parent: Option<NodeId>) -> Self {
        Self {
            id: node.id.clone(),
            text: node.text.clone(),
            parent,
            children: node.children.iter().map(|c| c.id.clone()).collect(),
            is_expanded: node.is_expanded,
            style: node.style.clone(),
            data: node.data.clone(),
            summary: node.summary.clone(),
            position: node.position,
        }
    }

    pub fn parent(&self) -> Option<&NodeId> {
        self.parent.as_ref()
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Children that take part in layout (none when collapsed).
    pub fn visible_children(&self) -> &[NodeId] {
        if self.is_expanded {
            &self.children
        } else {
            &[]
        }
    }

    /// Keeps `summary` inside `0..children.len()`, dropping it when there are no children.
    fn clamp_summary(&mut self) {
        let len = self.children.len();
        if len == 0 {
            self.summary = None;
            return;
        }
        if let Some(summary) = self.summary.as_mut() {
            summary.end_index = summary.end_index.min(len - 1);
            summary.start_index = summary.start_index.min(summary.end_index);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MindTree {
    root: NodeId,
    nodes: NodeMap,
}

impl MindTree {
    pub fn new(mut root: NodeRecord) -> Self {
        root.parent = None;
        root.children.clear();
        let id = root.id.clone();
        let mut nodes = NodeMap::default();
        nodes.insert(id.clone(), root);
        Self { root: id, nodes }
    }

    /// Builds the arena from the nested persisted shape.
    ///
    /// Parent links are rebuilt from the structure; any stored `parentId` is ignored. Fails when
    /// an id occurs more than once.
    pub fn from_node(root: &MindMapNode) -> Result<Self> {
        let mut nodes = NodeMap::default();
        let mut stack: Vec<(&MindMapNode, Option<NodeId>)> = vec![(root, None)];
        while let Some((node, parent)) = stack.pop() {
            if node.parent_id.is_some() && node.parent_id != parent {
                tracing::debug!(id = %node.id, "rewiring stale parentId");
            }
            let record = NodeRecord::from_persisted(node, parent);
            if nodes.insert(node.id.clone(), record).is_some() {
                return Err(Error::DuplicateNodeId {
                    id: node.id.to_string(),
                });
            }
            for child in node.children.iter().rev() {
                stack.push((child, Some(node.id.clone())));
            }
        }
        let mut tree = Self {
            root: root.id.clone(),
            nodes,
        };
        let ids: Vec<NodeId> = tree.nodes.keys().cloned().collect();
        for id in ids {
            if let Some(record) = tree.nodes.get_mut(&id) {
                record.clamp_summary();
            }
        }
        Ok(tree)
    }

    /// Serializes the whole tree back to the nested persisted shape.
    pub fn to_node(&self) -> MindMapNode {
        self.build_node(self.root.as_str())
            .unwrap_or_else(|| MindMapNode::new(String::new()))
    }

    /// Serializes the subtree rooted at `id`.
    pub fn subtree_to_node(&self, id: &str) -> Option<MindMapNode> {
        self.build_node(id)
    }

    fn build_node(&self, id: &str) -> Option<MindMapNode> {
        let record = self.nodes.get(id)?;
        Some(MindMapNode {
            id: record.id.clone(),
            text: record.text.clone(),
            parent_id: record.parent.clone(),
            children: record
                .children
                .iter()
                .filter_map(|c| self.build_node(c.as_str()))
                .collect(),
            is_expanded: record.is_expanded,
            style: record.style.clone(),
            data: record.data.clone(),
            summary: record.summary.clone(),
            position: record.position,
        })
    }

    pub fn root_id(&self) -> &NodeId {
        &self.root
    }

    pub fn root(&self) -> &NodeRecord {
        &self.nodes[&self.root]
    }

    pub fn get(&self, id: &str) -> Option<&NodeRecord> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut NodeRecord> {
        self.nodes.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn parent_of(&self, id: &str) -> Option<&NodeRecord> {
        let parent = self.nodes.get(id)?.parent.as_ref()?;
        self.nodes.get(parent)
    }

    pub fn index_in_parent(&self, id: &str) -> Option<usize> {
        self.parent_of(id)?
            .children
            .iter()
            .position(|c| c.as_str() == id)
    }

    /// Number of edges between `id` and the root.
    pub fn depth(&self, id: &str) -> Option<usize> {
        let mut node = self.nodes.get(id)?;
        let mut depth = 0;
        while let Some(parent) = node.parent.as_ref() {
            depth += 1;
            node = self.nodes.get(parent)?;
        }
        Some(depth)
    }

    /// Walks up from `node` looking for `ancestor`.
    pub fn is_ancestor_or_self(&self, ancestor: &str, node: &str) -> bool {
        let mut cur = self.nodes.get(node);
        while let Some(record) = cur {
            if record.id.as_str() == ancestor {
                return true;
            }
            cur = record.parent.as_ref().and_then(|p| self.nodes.get(p));
        }
        false
    }

    /// Pre-order traversal over every node (collapsed or not).
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder {
            tree: self,
            stack: vec![&self.root],
        }
    }

    /// Inserts a new leaf under `parent` at `index` (appends when `None` or out of range).
    pub fn insert_child(
        &mut self,
        parent: &str,
        index: Option<usize>,
        mut record: NodeRecord,
    ) -> Option<NodeId> {
        if self.nodes.contains_key(record.id.as_str()) {
            return None;
        }
        let parent_record = self.nodes.get_mut(parent)?;
        let id = record.id.clone();
        insert_at(&mut parent_record.children, index, id.clone());
        record.parent = Some(parent_record.id.clone());
        record.children.clear();
        self.nodes.insert(id.clone(), record);
        Some(id)
    }

    /// Grafts a persisted subtree under `parent`. Every id in `node` must be new to this tree.
    pub fn insert_subtree(
        &mut self,
        parent: &str,
        index: Option<usize>,
        node: &MindMapNode,
    ) -> Result<NodeId> {
        let parent_id = match self.nodes.get(parent) {
            Some(record) => record.id.clone(),
            None => return Err(Error::invalid(parent, "parent node not found")),
        };

        let mut seen = FxHashSet::default();
        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            if self.nodes.contains_key(n.id.as_str()) || !seen.insert(n.id.as_str()) {
                return Err(Error::DuplicateNodeId {
                    id: n.id.to_string(),
                });
            }
            stack.extend(n.children.iter());
        }

        let mut stack: Vec<(&MindMapNode, NodeId)> = vec![(node, parent_id.clone())];
        while let Some((n, p)) = stack.pop() {
            self.nodes
                .insert(n.id.clone(), NodeRecord::from_persisted(n, Some(p)));
            for child in &n.children {
                stack.push((child, n.id.clone()));
            }
        }
        if let Some(record) = self.nodes.get_mut(node.id.as_str()) {
            record.clamp_summary();
        }
        if let Some(parent_record) = self.nodes.get_mut(parent_id.as_str()) {
            insert_at(&mut parent_record.children, index, node.id.clone());
        }
        Ok(node.id.clone())
    }

    /// Detaches and returns the subtree rooted at `id`. The root cannot be removed.
    pub fn remove_subtree(&mut self, id: &str) -> Option<MindMapNode> {
        let parent = self.nodes.get(id)?.parent.clone()?;
        let detached = self.build_node(id)?;

        if let Some(parent_record) = self.nodes.get_mut(&parent) {
            parent_record.children.retain(|c| c.as_str() != id);
            parent_record.clamp_summary();
        }

        let mut stack = vec![NodeId::from(id)];
        while let Some(cur) = stack.pop() {
            if let Some(record) = self.nodes.swap_remove(&cur) {
                stack.extend(record.children);
            }
        }
        Some(detached)
    }

    /// Re-parents `id` under `new_parent`.
    ///
    /// Refuses to move the root or to move a node beneath itself.
    pub fn move_node(&mut self, id: &str, new_parent: &str, index: Option<usize>) -> bool {
        let Some(old_parent) = self.nodes.get(id).and_then(|n| n.parent.clone()) else {
            return false;
        };
        if !self.nodes.contains_key(new_parent) || self.is_ancestor_or_self(id, new_parent) {
            return false;
        }

        if let Some(record) = self.nodes.get_mut(&old_parent) {
            record.children.retain(|c| c.as_str() != id);
            record.clamp_summary();
        }
        let node_id = NodeId::from(id);
        if let Some(record) = self.nodes.get_mut(new_parent) {
            insert_at(&mut record.children, index, node_id.clone());
        }
        if let Some(record) = self.nodes.get_mut(id) {
            record.parent = Some(NodeId::from(new_parent));
        }
        true
    }

    /// Moves `id` to `new_index` among its siblings (clamped to the last slot).
    ///
    /// Returns `false` when the node is the root, is missing, or already sits at `new_index`.
    pub fn reorder(&mut self, id: &str, new_index: usize) -> bool {
        let Some(parent) = self.nodes.get(id).and_then(|n| n.parent.clone()) else {
            return false;
        };
        let Some(record) = self.nodes.get_mut(&parent) else {
            return false;
        };
        let Some(current) = record.children.iter().position(|c| c.as_str() == id) else {
            return false;
        };
        let target = new_index.min(record.children.len() - 1);
        if current == target {
            return false;
        }
        let moved = record.children.remove(current);
        record.children.insert(target, moved);
        true
    }
}

fn insert_at(children: &mut Vec<NodeId>, index: Option<usize>, id: NodeId) {
    match index {
        Some(i) if i <= children.len() => children.insert(i, id),
        _ => children.push(id),
    }
}

pub struct Preorder<'a> {
    tree: &'a MindTree,
    stack: Vec<&'a NodeId>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a NodeRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let record = self.tree.nodes.get(id)?;
        self.stack.extend(record.children.iter().rev());
        Some(record)
    }
}
