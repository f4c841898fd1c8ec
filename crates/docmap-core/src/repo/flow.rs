//! Cache-aware read and create flows.
//!
//! These functions sit between callers and the raw store primitives:
//! they consult the session's identity cache first, and reconcile store
//! loads against whatever instance the scope already tracks so that one
//! identifier always maps to one instance.

use crate::{
    context::DbContext,
    error::Error,
    model::SharedEntity,
    resolve::merge_summary,
    session::Session,
    value::EntityId,
};
use std::sync::Arc;

/// Find the entity with `id`, preferring the scope's cached instance.
///
/// A cached full instance short-circuits without touching the store. A
/// cached summary forces a store load whose members are merged into the
/// cached instance, promoting it to full; the cached handle is returned
/// so existing holders observe the promotion.
///
/// # Errors
/// `Error::EntityNotFound` when no document carries `id`.
pub fn find_one(
    ctx: &DbContext,
    session: &Session,
    discriminator: &str,
    id: &EntityId,
) -> Result<SharedEntity, Error> {
    let no_cache = session.no_cache_enabled();

    if !no_cache {
        if let Some(cached) = session.cache().get(id) {
            let is_summary = cached.read().expect("entity lock poisoned").is_summary();
            if !is_summary {
                return Ok(cached);
            }
        }
    }

    let repo = ctx.repositories().require(discriminator)?;
    let loaded = repo.find_on_store(session, id)?;
    loaded
        .write()
        .expect("entity lock poisoned")
        .enable_auditing();

    if no_cache {
        return Ok(loaded);
    }

    // Reconcile against the scope. Deserializing the store document may
    // itself have populated the cache, so re-read rather than reusing the
    // lookup from above.
    match session.cache().get(id) {
        Some(cached) if Arc::ptr_eq(&cached, &loaded) => Ok(cached),
        Some(cached) => {
            // Promote the cached summary: fold in the full load, then drop
            // the summary marking so later lookups short-circuit.
            let mut guard = cached.write().expect("entity lock poisoned");
            merge_summary(&mut *guard, &*loaded.read().expect("entity lock poisoned"));
            guard.clear_setted_members();
            drop(guard);

            Ok(cached)
        }
        None => {
            session.cache().put(id.clone(), loaded.clone());

            Ok(loaded)
        }
    }
}

/// Like [`find_one`], with absence reported as `None` instead of an error.
pub fn try_find_one(
    ctx: &DbContext,
    session: &Session,
    discriminator: &str,
    id: &EntityId,
) -> Result<Option<SharedEntity>, Error> {
    match find_one(ctx, session, discriminator, id) {
        Ok(entity) => Ok(Some(entity)),
        Err(Error::EntityNotFound { .. }) => Ok(None),
        Err(err) => Err(err),
    }
}

/// Persist `entity` and register it in the scope cache.
///
/// # Errors
/// Propagates store failures unchanged.
pub fn create(
    ctx: &DbContext,
    session: &Session,
    discriminator: &str,
    entity: &SharedEntity,
) -> Result<(), Error> {
    let repo = ctx.repositories().require(discriminator)?;
    repo.create_on_store(session, entity)?;

    let mut guard = entity.write().expect("entity lock poisoned");
    guard.reset_changed_members();
    guard.enable_auditing();
    let id = guard.entity_id();
    drop(guard);

    if !session.no_cache_enabled() {
        if let Some(id) = id {
            session.cache().put(id, entity.clone());
        }
    }

    Ok(())
}

/// Persist each entity in turn; stops at the first store failure.
pub fn create_many(
    ctx: &DbContext,
    session: &Session,
    discriminator: &str,
    entities: &[SharedEntity],
) -> Result<(), Error> {
    for entity in entities {
        create(ctx, session, discriminator, entity)?;
    }

    Ok(())
}
