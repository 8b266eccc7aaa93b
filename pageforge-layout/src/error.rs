//! Error types for the layout model

use thiserror::Error;

/// Result type for layout operations
pub type Result<T> = std::result::Result<T, LayoutError>;

/// Errors that can occur while reading or writing page trees
#[derive(Debug, Error)]
pub enum LayoutError {
    /// The serialized page tree could not be parsed
    #[error("failed to parse page tree: {source}")]
    Parse {
        #[from]
        source: serde_json::Error,
    },
}
