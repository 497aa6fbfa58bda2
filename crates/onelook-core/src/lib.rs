#![forbid(unsafe_code)]

//! Mind-map document model and editing core (headless).
//!
//! - [`model`]: the persisted JSON shape (`MindMapDocument`, `MindMapNode`, ...)
//! - [`tree`]: the id-keyed node arena used for editing
//! - [`editor`]: mutation operations with selection, clipboard and undo/redo
//! - [`validate`]: structural checks for documents arriving from outside

pub mod document;
pub mod editor;
pub mod error;
pub mod history;
pub mod model;
pub mod tree;
pub mod validate;

pub use document::{Document, next_available_name};
pub use editor::{Editor, EditorConfig, NodeDataPatch, NodeStylePatch};
pub use error::{Error, Result};
pub use history::{History, Snapshot};
pub use model::{
    ConnectionStyle, FontWeight, LayoutKind, MindMapDocument, MindMapNode, NodeData, NodeId,
    NodeShape, NodeStyle, NodeSummary, Position, Theme,
};
pub use tree::{MindTree, NodeRecord};
pub use validate::parse_document_value;
