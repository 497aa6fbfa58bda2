#![forbid(unsafe_code)]

//! `onelook` is a headless mind-map engine.
//!
//! The document model, live node tree, undo/redo history and the [`Editor`] are always available.
//!
//! # Features
//!
//! - `layout`: deterministic layout and connector paths (`onelook::layout`)
//! - `convert`: import/export for JSON, `.olook`, OPML, FreeMind, XMind and Markdown
//!   (`onelook::convert`)
//! - `headless`: both of the above plus one-call helpers (`onelook::headless`)

pub use onelook_core::*;

#[cfg(feature = "layout")]
pub mod layout {
    pub use onelook_layout::*;
}

#[cfg(feature = "convert")]
pub mod convert {
    pub use onelook_convert::*;
}

#[cfg(feature = "headless")]
pub mod headless {
    use onelook_convert::{Format, ImportOptions};
    use onelook_core::{ConnectionStyle, Document, LayoutKind, MindMapDocument};
    use onelook_layout::{LayoutOptions, MindMapLayout};

    #[derive(Debug, thiserror::Error)]
    pub enum HeadlessError {
        #[error(transparent)]
        Document(#[from] onelook_core::Error),
        #[error(transparent)]
        Layout(#[from] onelook_layout::Error),
        #[error(transparent)]
        Convert(#[from] onelook_convert::Error),
    }

    pub type Result<T> = std::result::Result<T, HeadlessError>;

    /// Imports `bytes` and loads the result as a live [`Document`].
    pub fn open(format: Format, bytes: &[u8], options: &ImportOptions) -> Result<Document> {
        let persisted = onelook_convert::import(format, bytes, options)?;
        Ok(Document::from_persisted(&persisted)?)
    }

    /// Imports `bytes` and lays the document out.
    ///
    /// `kind` and `style` default to the settings stored in the file.
    pub fn layout_bytes(
        format: Format,
        bytes: &[u8],
        kind: Option<LayoutKind>,
        style: Option<ConnectionStyle>,
        options: &LayoutOptions,
    ) -> Result<MindMapLayout> {
        let document = open(format, bytes, &ImportOptions::default())?;
        let layout = onelook_layout::layout_document(&document, kind, style, options);
        tracing::debug!(
            %format,
            nodes = layout.nodes.len(),
            connectors = layout.connectors.len(),
            "headless layout"
        );
        Ok(layout)
    }

    /// Re-encodes `bytes` from one format into another.
    pub fn convert(
        from: Format,
        to: Format,
        bytes: &[u8],
        options: &ImportOptions,
    ) -> Result<Vec<u8>> {
        let document: MindMapDocument = onelook_convert::import(from, bytes, options)?;
        Ok(onelook_convert::export(to, &document)?)
    }
}
