//! Entity field references and their resolution.
//!
//! The atomic data type here is [`EntityField`]: a reference that either
//! names a dot-separated path into a content document or carries an
//! author-supplied constant, never both at once. Resolution happens through
//! a [`DocumentContext`], an explicit handle bundling the document snapshot
//! and the active locale, and covers:
//!
//! - plain field resolution with constant fallback ([`DocumentContext::resolve`]);
//! - struct resolution with per-property constant overrides
//!   ([`DocumentContext::resolve_struct`]);
//! - recursive `[[dot.path]]` embedded-field interpolation inside constant
//!   values ([`DocumentContext::interpolate`]);
//! - locale maps that fail closed: a translatable value missing the
//!   requested locale resolves to the empty string, never to another locale.
//!
//! Resolution never raises for missing data. Absent path segments and
//! malformed references log a warning and yield `None`; errors are reserved
//! for callers that need to reject unparseable references outright.

mod error;
mod interpolate;
mod resolver;
mod translatable;
mod types;

pub use error::{FieldsError, Result};
pub use resolver::DocumentContext;
pub use translatable::{collapse_localized, is_locale_map, localized, LOCALIZED_MARKER};
pub use types::EntityField;
