//! Migration registrations: an explicit ordered list, not a stringly map.
//!
//! Each entry names the schema version it produces and the component type
//! it consumes. The builder rejects duplicate `(version, type)` pairs at
//! construction time and orders the list by version with registration
//! order as the tiebreak, so execution order is a property of the registry
//! rather than of call sites.

use std::collections::HashSet;
use std::fmt;

use serde_json::{Map, Value};

use crate::error::{MigrateError, Result};

/// A pure props rewrite: `(old props, content document) -> new props`.
pub type TransformFn =
    Box<dyn Fn(Map<String, Value>, &Value) -> Result<Map<String, Value>> + Send + Sync>;

/// What a migration does to a matching instance.
pub enum MigrationAction {
    /// Rewrite the instance's props in place.
    Updated { transform: TransformFn },
    /// Change the instance's type name, optionally rewriting props too.
    Renamed {
        to: String,
        transform: Option<TransformFn>,
    },
    /// Drop the instance from its parent list entirely.
    Removed,
}

impl fmt::Debug for MigrationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Updated { .. } => f.write_str("Updated"),
            Self::Renamed { to, .. } => f.debug_struct("Renamed").field("to", to).finish(),
            Self::Removed => f.write_str("Removed"),
        }
    }
}

/// One versioned migration for one component type.
#[derive(Debug)]
pub struct Migration {
    pub version: u64,
    pub type_name: String,
    pub action: MigrationAction,
}

/// The ordered migration pipeline.
#[derive(Debug, Default)]
pub struct MigrationRegistry {
    migrations: Vec<Migration>,
}

impl MigrationRegistry {
    pub fn builder() -> MigrationRegistryBuilder {
        MigrationRegistryBuilder {
            migrations: Vec::new(),
        }
    }

    /// The registered migrations in execution order.
    pub fn migrations(&self) -> &[Migration] {
        &self.migrations
    }
}

/// Builder for [`MigrationRegistry`]. Created by
/// [`MigrationRegistry::builder`].
pub struct MigrationRegistryBuilder {
    migrations: Vec<Migration>,
}

impl MigrationRegistryBuilder {
    /// Register a props rewrite for a type at a version.
    pub fn updated<F>(mut self, version: u64, type_name: impl Into<String>, transform: F) -> Self
    where
        F: Fn(Map<String, Value>, &Value) -> Result<Map<String, Value>> + Send + Sync + 'static,
    {
        self.migrations.push(Migration {
            version,
            type_name: type_name.into(),
            action: MigrationAction::Updated {
                transform: Box::new(transform),
            },
        });
        self
    }

    /// Register a type rename at a version.
    pub fn renamed(
        mut self,
        version: u64,
        type_name: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        self.migrations.push(Migration {
            version,
            type_name: type_name.into(),
            action: MigrationAction::Renamed {
                to: to.into(),
                transform: None,
            },
        });
        self
    }

    /// Register a type rename that also rewrites props.
    pub fn renamed_with<F>(
        mut self,
        version: u64,
        type_name: impl Into<String>,
        to: impl Into<String>,
        transform: F,
    ) -> Self
    where
        F: Fn(Map<String, Value>, &Value) -> Result<Map<String, Value>> + Send + Sync + 'static,
    {
        self.migrations.push(Migration {
            version,
            type_name: type_name.into(),
            action: MigrationAction::Renamed {
                to: to.into(),
                transform: Some(Box::new(transform)),
            },
        });
        self
    }

    /// Register removal of a retired type at a version.
    pub fn removed(mut self, version: u64, type_name: impl Into<String>) -> Self {
        self.migrations.push(Migration {
            version,
            type_name: type_name.into(),
            action: MigrationAction::Removed,
        });
        self
    }

    /// Finalize: order by version (registration order breaks ties) and
    /// reject duplicate `(version, type)` registrations.
    pub fn build(mut self) -> Result<MigrationRegistry> {
        let mut seen: HashSet<(u64, &str)> = HashSet::with_capacity(self.migrations.len());
        for migration in &self.migrations {
            if !seen.insert((migration.version, migration.type_name.as_str())) {
                return Err(MigrateError::DuplicateMigration {
                    version: migration.version,
                    type_name: migration.type_name.clone(),
                });
            }
        }
        self.migrations.sort_by_key(|m| m.version);
        Ok(MigrationRegistry {
            migrations: self.migrations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_orders_by_version() {
        let registry = MigrationRegistry::builder()
            .removed(3, "Old")
            .renamed(1, "A", "B")
            .updated(2, "B", |props, _doc| Ok(props))
            .build()
            .unwrap();
        let versions: Vec<u64> = registry.migrations().iter().map(|m| m.version).collect();
        assert_eq!(versions, [1, 2, 3]);
    }

    #[test]
    fn registration_order_breaks_version_ties() {
        let registry = MigrationRegistry::builder()
            .updated(1, "B", |props, _doc| Ok(props))
            .updated(1, "A", |props, _doc| Ok(props))
            .build()
            .unwrap();
        let names: Vec<&str> = registry
            .migrations()
            .iter()
            .map(|m| m.type_name.as_str())
            .collect();
        assert_eq!(names, ["B", "A"]);
    }

    #[test]
    fn duplicate_version_and_type_rejected() {
        let result = MigrationRegistry::builder()
            .updated(2, "Promo", |props, _doc| Ok(props))
            .renamed(2, "Promo", "PromoSection")
            .build();
        assert!(matches!(
            result,
            Err(MigrateError::DuplicateMigration { version: 2, .. })
        ));
    }

    #[test]
    fn same_type_different_versions_allowed() {
        let registry = MigrationRegistry::builder()
            .updated(1, "Promo", |props, _doc| Ok(props))
            .updated(2, "Promo", |props, _doc| Ok(props))
            .build();
        assert!(registry.is_ok());
    }
}
