#![forbid(unsafe_code)]

//! Deterministic mind-map layout (headless).
//!
//! A layout pass collects the visible nodes of a [`MindTree`], sizes them with a [`NodeMeasurer`],
//! positions them with one of four algorithms and finally derives connector paths. Passes are pure:
//! the same document and options always produce bit-identical output.

pub mod config;
pub mod connector;
pub mod fishbone;
pub mod mind;
pub mod model;
pub mod text;
pub mod tree;

pub use config::{Direction, LayoutConfig, Spacing};
pub use model::{Bounds, Connector, ConnectorKind, LayoutNode, LayoutTree, MindMapLayout, Point};
pub use text::{HeuristicNodeMeasurer, NodeMeasurer, NodeSize};

use onelook_core::{ConnectionStyle, Document, LayoutKind, MindTree};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid layout config: {message}")]
    InvalidConfig { message: String },
    #[error("layout config JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone)]
pub struct LayoutOptions {
    pub measurer: Arc<dyn NodeMeasurer + Send + Sync>,
    pub config: LayoutConfig,
    /// Where the root is placed.
    pub center: Point,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            measurer: Arc::new(HeuristicNodeMeasurer),
            config: LayoutConfig::default(),
            center: Point::default(),
        }
    }
}

impl std::fmt::Debug for LayoutOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutOptions")
            .field("config", &self.config)
            .field("center", &self.center)
            .finish_non_exhaustive()
    }
}

/// Positions the visible nodes of `tree` with the algorithm for `kind`.
pub fn layout_tree(tree: &MindTree, kind: LayoutKind, options: &LayoutOptions) -> LayoutTree {
    let spacing = options.config.resolve(kind);
    let measurer = options.measurer.as_ref();
    let layout = match kind {
        LayoutKind::Mind => mind::layout(tree, options.center, &spacing, measurer),
        LayoutKind::Tree | LayoutKind::Org => {
            crate::tree::layout(tree, options.center, &spacing, measurer)
        }
        LayoutKind::Fishbone => fishbone::layout(tree, options.center, &spacing, measurer),
    };
    tracing::debug!(?kind, nodes = layout.len(), "layout pass");
    layout
}

/// Full layout of a document: nodes, connectors and bounds.
///
/// `kind` and `style` default to the document's own settings.
pub fn layout_document(
    document: &Document,
    kind: Option<LayoutKind>,
    style: Option<ConnectionStyle>,
    options: &LayoutOptions,
) -> MindMapLayout {
    let kind = kind.unwrap_or(document.layout);
    let style = style.or(document.connection_style).unwrap_or_default();
    let layout = layout_tree(&document.tree, kind, options);
    let connectors = connector::connectors(&layout, kind, style);
    let bounds = layout.bounds();
    MindMapLayout {
        nodes: layout.nodes,
        connectors,
        bounds,
    }
}
