use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur while analyzing or rewriting conditional blocks
#[derive(Error, Debug)]
pub enum EngineError {
    /// A `#else`, `#elif` or `#endif` was found with no open `#if`
    #[error("line {line}: `{directive}` without a matching #if")]
    DanglingDirective { directive: String, line: usize },

    /// End of input was reached with conditional blocks still open
    #[error("unterminated conditional: {depth} block(s) still open at end of input")]
    UnterminatedBlock { depth: usize },

    /// A platform identifier outside the modeled range
    #[error("unrecognized platform id: {0}")]
    UnknownPlatform(u8),

    /// An availability kind identifier outside the modeled range
    #[error("unrecognized availability kind id: {0}")]
    UnknownAvailabilityKind(u8),
}

impl EngineError {
    /// Create a dangling-directive error
    pub fn dangling(directive: impl Into<String>, line: usize) -> Self {
        Self::DanglingDirective {
            directive: directive.into(),
            line,
        }
    }

    /// Create an unterminated-block error
    pub fn unterminated(depth: usize) -> Self {
        Self::UnterminatedBlock { depth }
    }
}
