use crate::Format;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid {format} file: {message}")]
    InvalidFile { format: Format, message: String },

    #[error("unknown format: {name}")]
    UnknownFormat { name: String },

    #[error("input is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Document(#[from] onelook_core::Error),
}

impl Error {
    pub(crate) fn invalid(format: Format, message: impl Into<String>) -> Self {
        Self::InvalidFile {
            format,
            message: message.into(),
        }
    }

    pub(crate) fn too_deep(path: impl Into<String>) -> Self {
        Self::Document(onelook_core::Error::DepthExceeded {
            path: path.into(),
            max_depth: onelook_core::validate::MAX_IMPORT_DEPTH,
        })
    }
}
