pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("duplicate node id: {id}")]
    DuplicateNodeId { id: String },

    #[error("invalid document at `{path}`: {message}")]
    InvalidDocument { path: String, message: String },

    #[error("node nesting at `{path}` exceeds the maximum depth of {max_depth}")]
    DepthExceeded { path: String, max_depth: usize },

    #[error("document JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidDocument {
            path: path.into(),
            message: message.into(),
        }
    }
}
