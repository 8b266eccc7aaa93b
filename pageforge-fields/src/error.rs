//! Error types for entity field handling

use thiserror::Error;

/// Result type for field operations
pub type Result<T> = std::result::Result<T, FieldsError>;

/// Errors that can occur while parsing entity field references.
///
/// Resolution itself never returns these; a reference that fails to
/// resolve yields `None` with a logged warning. The error form exists for
/// callers that parse raw props and need to distinguish "present but
/// malformed" from "absent".
#[derive(Debug, Error)]
pub enum FieldsError {
    /// A raw value is missing the required `field`/`constantValue` keys
    #[error("malformed entity field reference: missing {missing} key")]
    MalformedReference { missing: &'static str },

    /// A raw value had the required keys but the wrong shape
    #[error("invalid entity field reference: {source}")]
    InvalidReference {
        #[from]
        source: serde_json::Error,
    },
}
