//! The mutation core.
//!
//! [`Editor`] exclusively owns the live [`Document`] together with its [`History`], selection and
//! clipboard. Every mutating operation follows the same sequence: validate preconditions, record
//! the prior state, apply the change, stamp `updated_at`, record the new state, then update the
//! selection. Document settings (layout, theme, connector style, rainbow branches) go through the
//! same path, so each change is its own undo step. Lookup failures and invariant violations return `None`/`false` without touching the
//! document.

mod patch;


pub use patch::{FieldPatch, NodeDataPatch, NodeStylePatch};

use crate::Result;
use crate::document::{Document, next_available_name};
use crate::history::{DEFAULT_HISTORY_CAPACITY, History, Snapshot};
use crate::model::{
    ConnectionStyle, LayoutKind, MindMapDocument, MindMapNode, NodeId, NodeSummary, Position,
    Theme, now_millis,
};
use crate::tree::NodeRecord;

/// Text given to nodes created without explicit content.
pub const DEFAULT_NODE_TEXT: &str = "New Node";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorConfig {
    /// Maximum number of retained undo snapshots.
    pub history_capacity: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Editor {
    document: Document,
    history: History,
    selected_ids: Vec<NodeId>,
    focused_id: Option<NodeId>,
    clipboard: Option<MindMapNode>,
    clock: fn() -> i64,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    /// Starts with a fresh default document.
    pub fn new(config: EditorConfig) -> Self {
        Self::with_clock(config, now_millis)
    }

    /// Like [`Editor::new`] but with an injected millisecond clock.
    ///
    /// This exists primarily to make timestamps deterministic in tests.
    pub fn with_clock(config: EditorConfig, clock: fn() -> i64) -> Self {
        let document = Document::new_default(next_available_name(std::iter::empty()), clock());
        Self::with_document(document, config, clock)
    }

    pub fn with_document(document: Document, config: EditorConfig, clock: fn() -> i64) -> Self {
        let mut editor = Self {
            document,
            history: History::new(config.history_capacity),
            selected_ids: Vec::new(),
            focused_id: None,
            clipboard: None,
            clock,
        };
        editor.checkpoint();
        editor
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Serializes the live document to its persisted shape.
    pub fn persisted(&self) -> MindMapDocument {
        self.document.to_persisted()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn find_node(&self, id: &str) -> Option<&NodeRecord> {
        self.document.tree.get(id)
    }

    pub fn node_count(&self) -> usize {
        self.document.tree.len()
    }

    pub fn selected_ids(&self) -> &[NodeId] {
        &self.selected_ids
    }

    pub fn focused_id(&self) -> Option<&NodeId> {
        self.focused_id.as_ref()
    }

    pub fn clipboard(&self) -> Option<&MindMapNode> {
        self.clipboard.as_ref()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_count(&self) -> usize {
        self.history.undo_count()
    }

    pub fn redo_count(&self) -> usize {
        self.history.redo_count()
    }

    fn checkpoint(&mut self) {
        let state = self.document.to_persisted();
        self.record(&state);
    }

    fn record(&mut self, state: &MindMapDocument) {
        if let Err(err) = self.history.record(state) {
            tracing::warn!(%err, "failed to record history snapshot");
        }
    }

    fn touch(&mut self) {
        self.document.updated_at = (self.clock)();
    }

    /// Runs a validated mutation between two history checkpoints.
    ///
    /// When `apply` leaves the document as it was, neither `updated_at` nor the history moves.
    fn mutate<R>(&mut self, op: &'static str, apply: impl FnOnce(&mut Document) -> R) -> R {
        let before = self.document.to_persisted();
        self.record(&before);
        let out = apply(&mut self.document);
        if self.document.to_persisted() == before {
            tracing::debug!(op, "mutation left the document unchanged");
            return out;
        }
        self.touch();
        self.checkpoint();
        tracing::debug!(op, nodes = self.document.tree.len(), "document mutated");
        out
    }

    // Selection

    /// Selects `id`. With `append`, toggles `id` within the current multi-selection instead.
    pub fn select_node(&mut self, id: &str, append: bool) -> bool {
        let Some(record) = self.document.tree.get(id) else {
            return false;
        };
        let id = record.id.clone();
        if append {
            if let Some(pos) = self.selected_ids.iter().position(|s| *s == id) {
                self.selected_ids.remove(pos);
            } else {
                self.selected_ids.push(id.clone());
            }
        } else {
            self.selected_ids = vec![id.clone()];
        }
        self.focused_id = Some(id);
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected_ids.clear();
        self.focused_id = None;
    }

    // Structure

    /// Appends a new child under `parent_id`, expands the parent and selects the new node.
    pub fn add_child(&mut self, parent_id: &str, text: &str) -> Option<NodeId> {
        if !self.document.tree.contains(parent_id) {
            tracing::debug!(parent_id, "add_child: parent not found");
            return None;
        }
        let record = NodeRecord::new(text);
        let id = self.mutate("add_child", |doc| {
            let id = doc.tree.insert_child(parent_id, None, record);
            if let Some(parent) = doc.tree.get_mut(parent_id) {
                parent.is_expanded = true;
            }
            id
        })?;
        self.select_node(id.as_str(), false);
        Some(id)
    }

    /// Inserts a new node right after `node_id`; on the root this degrades to [`Editor::add_child`].
    pub fn add_sibling(&mut self, node_id: &str, text: &str) -> Option<NodeId> {
        let node = self.document.tree.get(node_id)?;
        let Some(parent_id) = node.parent().cloned() else {
            return self.add_child(node_id, text);
        };
        let index = self.document.tree.index_in_parent(node_id)?;
        let record = NodeRecord::new(text);
        let id = self.mutate("add_sibling", |doc| {
            doc.tree.insert_child(parent_id.as_str(), Some(index + 1), record)
        })?;
        self.select_node(id.as_str(), false);
        Some(id)
    }

    /// Removes `node_id` and its subtree. The root is never deleted.
    ///
    /// Afterwards the sibling now at the same index (or the last sibling) is selected, or the
    /// parent when no siblings remain.
    pub fn delete_node(&mut self, node_id: &str) -> bool {
        let Some(parent_id) = self.document.tree.get(node_id).and_then(|n| n.parent().cloned())
        else {
            tracing::debug!(node_id, "delete_node: missing node or root");
            return false;
        };
        let Some(index) = self.document.tree.index_in_parent(node_id) else {
            return false;
        };
        self.mutate("delete_node", |doc| doc.tree.remove_subtree(node_id));

        let next = self
            .document
            .tree
            .get(parent_id.as_str())
            .and_then(|p| {
                let siblings = p.children();
                siblings.get(index.min(siblings.len().saturating_sub(1))).cloned()
            })
            .unwrap_or(parent_id);
        self.select_node(next.as_str(), false);
        true
    }

    /// Deletes every selected node except the root, deepest first, then selects the root.
    ///
    /// Returns the number of subtrees removed.
    pub fn delete_selected_nodes(&mut self) -> usize {
        if self.selected_ids.is_empty() {
            return 0;
        }
        let tree = &self.document.tree;
        let mut targets: Vec<(usize, NodeId)> = self
            .selected_ids
            .iter()
            .filter(|id| tree.get(id.as_str()).is_some_and(|n| !n.is_root()))
            .filter_map(|id| Some((tree.depth(id.as_str())?, id.clone())))
            .collect();
        targets.sort_by(|a, b| b.0.cmp(&a.0));

        let removed = if targets.is_empty() {
            0
        } else {
            self.mutate("delete_selected_nodes", |doc| {
                targets
                    .iter()
                    .filter(|(_, id)| doc.tree.remove_subtree(id.as_str()).is_some())
                    .count()
            })
        };

        self.clear_selection();
        let root = self.document.tree.root_id().clone();
        self.select_node(root.as_str(), false);
        removed
    }

    /// Re-parents `node_id` under `new_parent_id` at `insert_index` (appends when `None`).
    ///
    /// Refuses to move the root or to move a node into its own subtree. Clears the node's manual
    /// position and expands the new parent.
    pub fn move_node(
        &mut self,
        node_id: &str,
        new_parent_id: &str,
        insert_index: Option<usize>,
    ) -> bool {
        let tree = &self.document.tree;
        let movable = tree.get(node_id).is_some_and(|n| !n.is_root());
        if !movable || !tree.contains(new_parent_id) {
            return false;
        }
        if tree.is_ancestor_or_self(node_id, new_parent_id) {
            tracing::warn!(node_id, new_parent_id, "move_node: target is inside the moved subtree");
            return false;
        }
        self.mutate("move_node", |doc| {
            let moved = doc.tree.move_node(node_id, new_parent_id, insert_index);
            if let Some(node) = doc.tree.get_mut(node_id) {
                node.position = None;
            }
            if let Some(parent) = doc.tree.get_mut(new_parent_id) {
                parent.is_expanded = true;
            }
            moved
        })
    }

    /// Moves `node_id` to `new_index` among its siblings and clears its manual position.
    pub fn reorder_node(&mut self, node_id: &str, new_index: usize) -> bool {
        let tree = &self.document.tree;
        let (Some(current), Some(parent)) = (tree.index_in_parent(node_id), tree.parent_of(node_id))
        else {
            return false;
        };
        let target = new_index.min(parent.children().len() - 1);
        if current == target {
            return false;
        }
        self.mutate("reorder_node", |doc| {
            let moved = doc.tree.reorder(node_id, target);
            if let Some(node) = doc.tree.get_mut(node_id) {
                node.position = None;
            }
            moved
        })
    }

    /// Flips the expansion state of a node that has children.
    pub fn toggle_expand(&mut self, node_id: &str) -> bool {
        if !self
            .document
            .tree
            .get(node_id)
            .is_some_and(NodeRecord::has_children)
        {
            return false;
        }
        self.mutate("toggle_expand", |doc| {
            if let Some(node) = doc.tree.get_mut(node_id) {
                node.is_expanded = !node.is_expanded;
            }
        });
        true
    }

    // Content

    pub fn update_node_text(&mut self, node_id: &str, text: &str) -> bool {
        match self.document.tree.get(node_id) {
            Some(node) if node.text != text => {}
            _ => return false,
        }
        self.mutate("update_node_text", |doc| {
            if let Some(node) = doc.tree.get_mut(node_id) {
                node.text = text.to_string();
            }
        });
        true
    }

    /// Merges `patch` into the node's extension data; an emptied record is removed.
    pub fn update_node_data(&mut self, node_id: &str, patch: NodeDataPatch) -> bool {
        if !self.document.tree.contains(node_id) {
            return false;
        }
        self.mutate("update_node_data", |doc| {
            if let Some(node) = doc.tree.get_mut(node_id) {
                let mut data = node.data.take().unwrap_or_default();
                patch.apply_to(&mut data);
                node.data = (!data.is_empty()).then_some(data);
            }
        });
        true
    }

    /// Merges `patch` into the node's style; an emptied style is removed.
    pub fn update_node_style(&mut self, node_id: &str, patch: NodeStylePatch) -> bool {
        if !self.document.tree.contains(node_id) {
            return false;
        }
        self.mutate("update_node_style", |doc| {
            if let Some(node) = doc.tree.get_mut(node_id) {
                let mut style = node.style.take().unwrap_or_default();
                patch.apply_to(&mut style);
                node.style = (!style.is_empty()).then_some(style);
            }
        });
        true
    }

    /// Pins the node at an absolute position (free dragging).
    pub fn update_node_position(&mut self, node_id: &str, x: f64, y: f64) -> bool {
        if !(x.is_finite() && y.is_finite()) || !self.document.tree.contains(node_id) {
            return false;
        }
        self.mutate("update_node_position", |doc| {
            if let Some(node) = doc.tree.get_mut(node_id) {
                node.position = Some(Position { x, y });
            }
        });
        true
    }

    /// Adds or replaces the summary over children `start_index..=end_index` (clamped into range).
    pub fn set_summary(
        &mut self,
        node_id: &str,
        text: &str,
        start_index: usize,
        end_index: usize,
    ) -> bool {
        let Some(len) = self
            .document
            .tree
            .get(node_id)
            .map(|n| n.children().len())
            .filter(|len| *len > 0)
        else {
            return false;
        };
        let end_index = end_index.min(len - 1);
        let summary = NodeSummary {
            text: text.to_string(),
            start_index: start_index.min(end_index),
            end_index,
        };
        self.mutate("set_summary", |doc| {
            if let Some(node) = doc.tree.get_mut(node_id) {
                node.summary = Some(summary);
            }
        });
        true
    }

    pub fn remove_summary(&mut self, node_id: &str) -> bool {
        if !self
            .document
            .tree
            .get(node_id)
            .is_some_and(|n| n.summary.is_some())
        {
            return false;
        }
        self.mutate("remove_summary", |doc| {
            if let Some(node) = doc.tree.get_mut(node_id) {
                node.summary = None;
            }
        });
        true
    }

    // History

    /// Restores the previous committed state and clears the selection.
    ///
    /// The history only steps back once the target snapshot has been restored.
    pub fn undo(&mut self) -> bool {
        let Some(document) = self.history.peek_undo().and_then(|s| restore(s, "undo")) else {
            return false;
        };
        self.history.undo();
        self.install(document);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(document) = self.history.peek_redo().and_then(|s| restore(s, "redo")) else {
            return false;
        };
        self.history.redo();
        self.install(document);
        true
    }

    fn install(&mut self, document: Document) {
        self.document = document;
        self.clear_selection();
    }

    // Clipboard

    /// Copies a deep, independent clone of the subtree at `node_id`.
    pub fn copy_node(&mut self, node_id: &str) -> bool {
        match self.document.tree.subtree_to_node(node_id) {
            Some(node) => {
                self.clipboard = Some(node);
                true
            }
            None => false,
        }
    }

    /// Pastes the clipboard under `parent_id` with fresh ids throughout the subtree.
    pub fn paste_node(&mut self, parent_id: &str) -> Option<NodeId> {
        let mut node = self.clipboard.clone()?;
        let parent = self.document.tree.get(parent_id)?.id.clone();
        node.regenerate_ids(Some(parent));

        let pasted = self.mutate("paste_node", |doc| {
            let pasted = doc.tree.insert_subtree(parent_id, None, &node);
            if let Some(parent) = doc.tree.get_mut(parent_id) {
                parent.is_expanded = true;
            }
            pasted
        });
        match pasted {
            Ok(id) => {
                self.select_node(id.as_str(), false);
                Some(id)
            }
            Err(err) => {
                tracing::warn!(%err, "paste_node failed");
                None
            }
        }
    }

    // Keyboard navigation

    pub fn navigate_to_parent(&mut self) -> bool {
        let Some(parent) = self
            .focused_id
            .as_ref()
            .and_then(|id| self.document.tree.parent_of(id.as_str()))
            .map(|p| p.id.clone())
        else {
            return false;
        };
        self.select_node(parent.as_str(), false)
    }

    pub fn navigate_to_child(&mut self) -> bool {
        let Some(child) = self
            .focused_id
            .as_ref()
            .and_then(|id| self.document.tree.get(id.as_str()))
            .and_then(|n| n.visible_children().first().cloned())
        else {
            return false;
        };
        self.select_node(child.as_str(), false)
    }

    pub fn navigate_to_prev_sibling(&mut self) -> bool {
        self.navigate_sibling(-1)
    }

    pub fn navigate_to_next_sibling(&mut self) -> bool {
        self.navigate_sibling(1)
    }

    fn navigate_sibling(&mut self, step: isize) -> bool {
        let Some(focused) = self.focused_id.clone() else {
            return false;
        };
        let tree = &self.document.tree;
        let (Some(parent), Some(index)) = (
            tree.parent_of(focused.as_str()),
            tree.index_in_parent(focused.as_str()),
        ) else {
            return false;
        };
        let Some(target) = index
            .checked_add_signed(step)
            .and_then(|i| parent.children().get(i))
            .cloned()
        else {
            return false;
        };
        self.select_node(target.as_str(), false)
    }

    // Document settings

    pub fn set_layout(&mut self, layout: LayoutKind) {
        self.mutate("set_layout", |doc| doc.layout = layout);
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.mutate("set_theme", |doc| doc.theme = theme);
    }

    pub fn set_connection_style(&mut self, style: Option<ConnectionStyle>) {
        self.mutate("set_connection_style", |doc| doc.connection_style = style);
    }

    pub fn set_rainbow_branch(&mut self, enabled: bool) {
        self.mutate("set_rainbow_branch", |doc| doc.rainbow_branch = Some(enabled));
    }

    // Document lifecycle

    /// Replaces the document with a fresh default one and resets history.
    pub fn new_document(&mut self, name: Option<&str>) {
        let name = name
            .map(str::to_string)
            .unwrap_or_else(|| next_available_name([self.document.name.as_str()]));
        let document = Document::new_default(name, (self.clock)());
        self.reset(document);
    }

    /// Replaces the document with `doc` and resets history to that single state.
    pub fn load_document(&mut self, doc: &MindMapDocument) -> Result<()> {
        let document = Document::from_persisted(doc)?;
        self.reset(document);
        Ok(())
    }

    fn reset(&mut self, document: Document) {
        self.install(document);
        self.history.clear();
        self.checkpoint();
    }
}

fn restore(snapshot: &Snapshot, op: &'static str) -> Option<Document> {
    match snapshot
        .restore()
        .and_then(|doc| Document::from_persisted(&doc))
    {
        Ok(document) => Some(document),
        Err(err) => {
            tracing::warn!(op, %err, "history snapshot could not be restored");
            None
        }
    }
}
