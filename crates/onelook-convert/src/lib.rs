#![forbid(unsafe_code)]

//! Import and export of OneLook mind maps in foreign and native file formats.
//!
//! Every format implements [`Converter`]. Imports are all-or-nothing: a converter either returns a
//! complete, structurally valid [`MindMapDocument`] or an [`Error`].

mod error;
mod format;

pub mod freemind;
pub mod json;
pub mod markdown;
pub mod olook;
pub mod opml;
pub mod xmind;
mod xml;

pub use error::{Error, Result};
pub use format::{Format, FormatInfo};

use onelook_core::{MindMapDocument, MindMapNode, MindTree};
use std::path::Path;

/// Name given to the root of an import that carries no title of its own.
pub const DEFAULT_IMPORT_TITLE: &str = "Imported Map";

/// Application tag written into exported files.
pub const APP_NAME: &str = "OneLook";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportOptions {
    /// Name of the source file; its stem is the fallback title.
    pub file_name: Option<String>,
}

impl ImportOptions {
    pub fn with_file_name(name: impl Into<String>) -> Self {
        Self {
            file_name: Some(name.into()),
        }
    }

    /// Title used when the imported content has none.
    pub fn fallback_title(&self) -> String {
        self.file_name
            .as_deref()
            .and_then(|n| Path::new(n).file_stem())
            .and_then(|s| s.to_str())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_IMPORT_TITLE)
            .to_string()
    }
}

pub trait Converter {
    fn format(&self) -> Format;

    fn import(&self, bytes: &[u8], options: &ImportOptions) -> Result<MindMapDocument>;

    fn export(&self, document: &MindMapDocument) -> Result<Vec<u8>>;
}

pub fn converter_for(format: Format) -> &'static dyn Converter {
    match format {
        Format::Xmind => &xmind::XmindConverter,
        Format::Freemind => &freemind::FreemindConverter,
        Format::Opml => &opml::OpmlConverter,
        Format::Json => &json::JsonConverter,
        Format::Markdown => &markdown::MarkdownConverter,
        Format::Olook => &olook::OlookConverter,
    }
}

/// Imports `bytes` as `format` and checks that the result loads as a live tree.
pub fn import(format: Format, bytes: &[u8], options: &ImportOptions) -> Result<MindMapDocument> {
    let document = converter_for(format).import(bytes, options)?;
    MindTree::from_node(&document.root)?;
    tracing::debug!(
        %format,
        nodes = document.root.count(),
        name = %document.name,
        "imported document"
    );
    Ok(document)
}

pub fn export(format: Format, document: &MindMapDocument) -> Result<Vec<u8>> {
    let bytes = converter_for(format).export(document)?;
    tracing::debug!(%format, bytes = bytes.len(), "exported document");
    Ok(bytes)
}

/// Wraps an imported root into a fresh document named after it.
pub(crate) fn document_from_root(root: MindMapNode) -> MindMapDocument {
    let name = if root.text.trim().is_empty() {
        DEFAULT_IMPORT_TITLE.to_string()
    } else {
        root.text.clone()
    };
    MindMapDocument::with_root(name, root, onelook_core::model::now_millis())
}

/// Replaces a wrapper root by its only child.
pub(crate) fn promote_single_child(mut root: MindMapNode) -> MindMapNode {
    if root.children.len() != 1 {
        return root;
    }
    match root.children.pop() {
        Some(mut only) => {
            only.parent_id = None;
            only
        }
        None => root,
    }
}
