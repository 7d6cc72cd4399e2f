//! Domain-level error taxonomy for opttools.

/// Errors produced by opttools operations.
#[derive(Debug, thiserror::Error)]
pub enum OptToolsError {
    #[error("invalid mode: {mode}")]
    InvalidMode { mode: String },

    #[error("expectation files and targets must pair one-to-one: {files} file(s) vs {targets} target(s)")]
    PairCountMismatch { files: usize, targets: usize },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for opttools domain operations.
pub type Result<T> = std::result::Result<T, OptToolsError>;
