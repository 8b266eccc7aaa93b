//! Error types for the migration pipeline

use thiserror::Error;

/// Result type for migration operations
pub type Result<T> = std::result::Result<T, MigrateError>;

/// Errors that can occur in the migration pipeline
#[derive(Debug, Error)]
pub enum MigrateError {
    /// The pipeline was invoked without a content document
    #[error("migration requires a content document, got null")]
    MissingDocument,

    /// Two migrations registered for the same version and type
    #[error("duplicate migration for {type_name} at version {version}")]
    DuplicateMigration { version: u64, type_name: String },

    /// A transform found props that don't match its expected before-shape
    ///
    /// Transforms normally degrade with defaults instead of returning this;
    /// the engine treats it as fail-soft either way (warn, leave the
    /// instance untouched).
    #[error("props for {type_name} don't match expected shape: {detail}")]
    ShapeMismatch { type_name: String, detail: String },

    /// A transform failed to serialize replacement props
    #[error("failed to serialize migrated props: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
}
