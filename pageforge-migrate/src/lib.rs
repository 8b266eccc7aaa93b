//! Versioned migrations over serialized page trees.
//!
//! As the component catalog evolves, previously saved layouts keep their
//! old shapes. The migration pipeline brings a stored tree to the current
//! schema on load: an explicit ordered list of
//! `(version, type name) -> action` registrations, each action either
//! rewriting a matching instance's props (possibly renaming its type or
//! introducing nested slot instances) or removing retired instances
//! outright.
//!
//! Every migrated instance is stamped with the migration's version in its
//! props, so re-running the pipeline over already-migrated data is a
//! structural no-op. Transformations are pure functions of
//! `(old props, content document)`; one failing transform logs a warning
//! and leaves that instance untouched; a saved page is never bricked by a
//! migration.

mod catalog;
mod engine;
mod error;
mod registry;

pub use catalog::builtin_migrations;
pub use engine::{schema_version, VERSION_KEY};
pub use error::{MigrateError, Result};
pub use registry::{Migration, MigrationAction, MigrationRegistry, MigrationRegistryBuilder};
