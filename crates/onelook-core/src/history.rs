//! Snapshot-based undo/redo.
//!
//! Every entry is a complete JSON serialization of a [`MindMapDocument`]. The top of the undo
//! stack is the state the live document was last committed as; undo moves that entry to the
//! redo stack and restores the one below it.
//!
//! Callers restore the entry returned by [`History::peek_undo`] / [`History::peek_redo`] first
//! and only then commit the step, so a snapshot that fails to restore leaves both stacks as they
//! were.

use crate::model::MindMapDocument;
use crate::Result;
use serde::Deserialize;

pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// An immutable serialized document state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot(String);

impl Snapshot {
    pub fn capture(doc: &MindMapDocument) -> Result<Self> {
        Ok(Self(serde_json::to_string(doc)?))
    }

    /// Parses the snapshot back into a document.
    ///
    /// Snapshots are only ever produced by [`Snapshot::capture`], so the parser's nesting limit
    /// is lifted: documents are as deep as the editor allowed them to grow.
    pub fn restore(&self) -> Result<MindMapDocument> {
        let mut de = serde_json::Deserializer::from_str(&self.0);
        de.disable_recursion_limit();
        let doc = MindMapDocument::deserialize(&mut de)?;
        de.end()?;
        Ok(doc)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone)]
pub struct History {
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl History {
    /// `capacity` bounds the undo stack; values below 1 are raised to 1.
    pub fn new(capacity: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records `doc` unless it equals the most recent snapshot.
    ///
    /// Returns `true` when a new entry was pushed. A push clears the redo stack; eviction only
    /// ever drops the oldest undo entries.
    pub fn record(&mut self, doc: &MindMapDocument) -> Result<bool> {
        let snapshot = Snapshot::capture(doc)?;
        if self.undo_stack.last() == Some(&snapshot) {
            return Ok(false);
        }
        self.undo_stack.push(snapshot);
        if self.undo_stack.len() > self.capacity {
            let overflow = self.undo_stack.len() - self.capacity;
            self.undo_stack.drain(..overflow);
        }
        self.redo_stack.clear();
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        self.undo_stack.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// The entry [`History::undo`] would step back to, without moving anything.
    pub fn peek_undo(&self) -> Option<&Snapshot> {
        if !self.can_undo() {
            return None;
        }
        self.undo_stack.get(self.undo_stack.len() - 2)
    }

    /// The entry [`History::redo`] would re-apply, without moving anything.
    pub fn peek_redo(&self) -> Option<&Snapshot> {
        self.redo_stack.last()
    }

    /// Steps back one entry and returns the state to restore.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if !self.can_undo() {
            return None;
        }
        let current = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        self.undo_stack.last()
    }

    /// Re-applies the most recently undone entry and returns it.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(next);
        self.undo_stack.last()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Number of steps `undo` can take.
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len().saturating_sub(1)
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.undo_stack.last()
    }
}
