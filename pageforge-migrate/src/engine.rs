//! The migration engine: one synchronous batch transform per page load.
//!
//! The engine walks the whole tree (content, zones, nested slots) once
//! per migration, in version order. An instance is touched only when its
//! type matches and its stored version stamp is below the migration's
//! version; everything else round-trips byte-for-byte.

use serde_json::Value;
use tracing::{debug, warn};

use pageforge_layout::{Instance, PageTree};

use crate::error::{MigrateError, Result};
use crate::registry::{Migration, MigrationAction, MigrationRegistry};

/// Props key carrying an instance's schema version stamp.
pub const VERSION_KEY: &str = "version";

/// An instance's stored schema version. Unstamped instances are version 0.
pub fn schema_version(inst: &Instance) -> u64 {
    inst.props
        .get(VERSION_KEY)
        .and_then(Value::as_u64)
        .unwrap_or(0)
}

impl MigrationRegistry {
    /// Bring a stored page tree to the current schema.
    ///
    /// Requires a content document; invoking the pipeline without one is
    /// the single fatal configuration error here. Individual transform
    /// failures are not fatal: they warn and leave the instance untouched
    /// and un-stamped, to be retried on a later load.
    pub fn apply_migrations(&self, tree: PageTree, document: &Value) -> Result<PageTree> {
        if document.is_null() {
            return Err(MigrateError::MissingDocument);
        }

        let mut tree = tree;
        let mut migrated = 0usize;
        for migration in self.migrations() {
            match &migration.action {
                MigrationAction::Removed => {
                    migrated += tree.retain_instances(&mut |inst| {
                        inst.type_name != migration.type_name
                            || schema_version(inst) >= migration.version
                    });
                }
                _ => {
                    tree.for_each_mut(&mut |inst| {
                        if migrate_instance(migration, inst, document) {
                            migrated += 1;
                        }
                    });
                }
            }
        }

        debug!(
            migrations = self.migrations().len(),
            instances_migrated = migrated,
            "migration pipeline complete"
        );
        Ok(tree)
    }
}

fn migrate_instance(migration: &Migration, inst: &mut Instance, document: &Value) -> bool {
    if inst.type_name != migration.type_name || schema_version(inst) >= migration.version {
        return false;
    }
    match &migration.action {
        MigrationAction::Updated { transform } => {
            match transform(inst.props.clone(), document) {
                Ok(mut props) => {
                    props.insert(VERSION_KEY.into(), Value::from(migration.version));
                    inst.props = props;
                    true
                }
                Err(e) => {
                    warn!(
                        type_name = %migration.type_name,
                        id = inst.id().unwrap_or("<no id>"),
                        error = %e,
                        "migration transform failed; instance left unmigrated"
                    );
                    false
                }
            }
        }
        MigrationAction::Renamed { to, transform } => {
            let props = match transform {
                Some(transform) => match transform(inst.props.clone(), document) {
                    Ok(props) => props,
                    Err(e) => {
                        warn!(
                            type_name = %migration.type_name,
                            id = inst.id().unwrap_or("<no id>"),
                            error = %e,
                            "rename transform failed; instance left unmigrated"
                        );
                        return false;
                    }
                },
                None => inst.props.clone(),
            };
            inst.props = props;
            inst.props
                .insert(VERSION_KEY.into(), Value::from(migration.version));
            inst.type_name = to.clone();
            true
        }
        // Removal is handled at the tree level.
        MigrationAction::Removed => false,
    }
}
