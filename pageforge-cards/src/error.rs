//! Error types for collection editing

use thiserror::Error;

/// Result type for card operations
pub type Result<T> = std::result::Result<T, CardsError>;

/// Errors that can occur while editing a collection
#[derive(Debug, Error)]
pub enum CardsError {
    /// No card with the given id in this collection
    #[error("card not found in collection: {id}")]
    UnknownCard { id: String },
}
