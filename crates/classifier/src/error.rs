use thiserror::Error;

/// Result type for classifier operations
pub type Result<T> = std::result::Result<T, ClassifierError>;

/// Errors that can occur while building the declaration classifier
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// Tree-sitter error
    #[error("Tree-sitter error: {0}")]
    TreeSitterError(String),
}

impl ClassifierError {
    /// Create a tree-sitter error
    pub fn tree_sitter(msg: impl Into<String>) -> Self {
        Self::TreeSitterError(msg.into())
    }
}
