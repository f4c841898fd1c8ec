//! Dependent-document maintenance.
//!
//! When an entity changes, documents of other types that embed it as a
//! reference projection go stale. This task re-saves those dependents so
//! their embedded summaries are rebuilt from the current state.

use crate::{
    context::DbContext,
    error::Error,
    obs::{self, ObsEvent},
    session::Session,
    value::EntityId,
};
use std::collections::BTreeSet;

///
/// RefreshDependentDocsTask
///
/// Re-saves every document of `dependent` type that references the
/// changed entity through one of the given identifier member paths.
/// Runs under `no_cache` and `read_only_id` so the refresh never
/// pollutes the scope cache and never expands nested references beyond
/// their identifiers.
///

pub struct RefreshDependentDocsTask;

impl RefreshDependentDocsTask {
    /// Refresh all dependents of the entity identified by `id`.
    ///
    /// `id_member_paths` are the dotted element paths inside the dependent
    /// type that carry the changed entity's identifier (`$` for list
    /// segments, `$*` for map values). Each dependent document is replaced
    /// at most once even when several paths match it; replace failures are
    /// counted and skipped.
    ///
    /// # Errors
    /// Fails only when a dependent lookup fails; a type with no registered
    /// repository is a no-op.
    pub fn run(
        ctx: &DbContext,
        session: &Session,
        dependent: &str,
        id_member_paths: &[String],
        id: &EntityId,
    ) -> Result<(), Error> {
        let Some(repo) = ctx.repositories().get(dependent) else {
            return Ok(());
        };

        let _no_cache = session.enable_no_cache();
        let _read_only_id = session.enable_read_only_id();

        let mut refreshed: BTreeSet<EntityId> = BTreeSet::new();
        for path in id_member_paths {
            for entity in repo.find_where_on_store(session, path, id)? {
                let dependent_id = entity
                    .read()
                    .expect("entity lock poisoned")
                    .entity_id();
                let Some(dependent_id) = dependent_id else {
                    continue;
                };
                if !refreshed.insert(dependent_id) {
                    continue;
                }

                if repo.replace_on_store(session, &entity, false).is_err() {
                    obs::record(ObsEvent::RefreshReplaceSuppressed {
                        discriminator: dependent,
                    });
                }
            }
        }

        Ok(())
    }
}
