//! Cascade delete.
//!
//! Deleting an entity first walks its registered cascade paths and
//! deletes every referenced entity reachable through them, depth one per
//! path. Leaf deletes are best effort: a failing leaf is counted and
//! skipped, never allowed to abort the root delete.

use crate::{
    context::DbContext,
    error::Error,
    model::{MemberValue, SharedEntity},
    obs::{self, ObsEvent},
    schema::PathStep,
    session::Session,
};

/// Delete `entity`, cascading through its registered reference paths,
/// then detach its reference members, flush, and remove the stored
/// document. The scope cache entry is evicted last.
///
/// # Errors
/// Fails when the entity has no identifier, when no repository serves
/// its type, or when the root flush or delete fails. Leaf failures are
/// suppressed.
pub fn delete(ctx: &DbContext, session: &Session, entity: &SharedEntity) -> Result<(), Error> {
    let guard = entity.read().expect("entity lock poisoned");
    let discriminator = guard.schema().discriminator().to_string();
    let id = guard
        .entity_id()
        .ok_or_else(|| Error::store("cannot delete an entity without an identifier"))?;
    drop(guard);

    let repo = ctx.repositories().require(&discriminator)?;

    // Cascade into referenced entities before touching the root.
    let walker = CascadeWalker { ctx, session };
    let root = MemberValue::Entity(entity.clone());
    for path in ctx.registry().reference_paths_for(&discriminator)?.iter() {
        walker.walk(&root, &path.steps);
    }

    // Sever reference members so the stored document no longer embeds
    // projections of entities this delete may have removed, flush that
    // shape, then drop the document itself.
    entity
        .write()
        .expect("entity lock poisoned")
        .detach_for_delete();
    repo.replace_on_store(session, entity, false)?;
    repo.delete_on_store(session, entity)?;

    session.cache().remove(&id);

    Ok(())
}

///
/// CascadeWalker
/// Follows one reference path through live member values, fanning out
/// over lists and map values, and deletes the entities at the end.
///

struct CascadeWalker<'a> {
    ctx: &'a DbContext,
    session: &'a Session,
}

impl CascadeWalker<'_> {
    fn walk(&self, value: &MemberValue, steps: &[PathStep]) {
        let Some((step, rest)) = steps.split_first() else {
            if let MemberValue::Entity(leaf) = value {
                self.delete_leaf(leaf);
            }
            return;
        };

        match (step, value) {
            (PathStep::Field(name), MemberValue::Entity(entity)) => {
                let member = entity
                    .read()
                    .expect("entity lock poisoned")
                    .get_member(name);
                if let Some(member) = member {
                    self.walk(&member, rest);
                }
            }
            (PathStep::Element, MemberValue::List(items)) => {
                for item in items {
                    self.walk(item, rest);
                }
            }
            (PathStep::Element | PathStep::MapValue, MemberValue::Map(entries)) => {
                for item in entries.values() {
                    self.walk(item, rest);
                }
            }
            // Nulls and shape mismatches terminate the path silently.
            _ => {}
        }
    }

    fn delete_leaf(&self, leaf: &SharedEntity) {
        let discriminator = leaf
            .read()
            .expect("entity lock poisoned")
            .schema()
            .discriminator()
            .to_string();

        obs::record(ObsEvent::CascadeLeafDelete {
            discriminator: &discriminator,
        });
        if delete(self.ctx, self.session, leaf).is_err() {
            obs::record(ObsEvent::CascadeLeafSuppressed {
                discriminator: &discriminator,
            });
        }
    }
}
