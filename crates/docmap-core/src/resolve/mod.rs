//! Reference resolution.
//!
//! The resolver is the deserialization-time decision procedure for embedded
//! references: recover the actual runtime type from the stored
//! discriminator, materialize the body, then either hand back the
//! scope-cached instance (merging summaries as needed) or register the
//! fresh instance in the identity cache.

pub mod merge;


pub use merge::{AuditPause, merge_summary};

use crate::{
    error::Error,
    model::{Auditable, MemberAccess, Referenceable, SharedEntity, share},
    obs::{self, ObsEvent},
    registry::TypeRegistry,
    session::Session,
    value::Value,
};
use std::collections::BTreeSet;

///
/// ReferenceResolver
///
/// Borrowed view over the process-wide registry and one unit-of-work
/// session. Resolution is CPU-bound and never performs I/O; the only locks
/// taken are the registry's read locks, the scope cache lock, and the
/// target entity's own lock during a merge — never across each other.
///

pub struct ReferenceResolver<'a> {
    registry: &'a TypeRegistry,
    session: &'a Session,
}

impl<'a> ReferenceResolver<'a> {
    #[must_use]
    pub const fn new(registry: &'a TypeRegistry, session: &'a Session) -> Self {
        Self { registry, session }
    }

    #[must_use]
    pub const fn registry(&self) -> &'a TypeRegistry {
        self.registry
    }

    #[must_use]
    pub const fn session(&self) -> &'a Session {
        self.session
    }

    /// Resolve one embedded reference value against the declared nominal
    /// type. `Ok(None)` means a null reference or an anonymous embedded
    /// value (no identifier); both are legal and never reference-tracked.
    pub fn resolve(&self, nominal: &str, value: &Value) -> Result<Option<SharedEntity>, Error> {
        let doc = match value {
            Value::Null => return Ok(None),
            Value::Document(doc) => doc,
            other => {
                return Err(Error::UnexpectedShape {
                    expected: "document or null",
                    found: other.kind(),
                });
            }
        };

        // Actual runtime type. A missing or malformed discriminator element
        // is a hard failure, as is a discriminator naming a type outside
        // the declared nominal chain.
        let Some(disc) = doc.discriminator() else {
            return Err(Error::unknown_type(format!(
                "<missing discriminator, nominal {nominal}>"
            )));
        };
        let schema = self.registry.schema_by_discriminator(disc)?;
        if !schema.is_assignable_to(nominal) {
            return Err(Error::unknown_type(format!(
                "{disc}: not assignable to declared type {nominal}"
            )));
        }

        let serializer = self.registry.serializer_for(schema.discriminator())?;
        let mut candidate = serializer.deserialize(doc, self)?;

        // Anonymous embedded values resolve to null.
        let Some(id) = candidate.entity_id() else {
            return Ok(None);
        };

        let no_cache = self.session.no_cache_enabled();
        if !no_cache {
            if let Some(cached) = self.session.cache().get(&id) {
                let cached_is_summary =
                    cached.read().expect("entity lock poisoned").is_summary();
                if cached_is_summary {
                    // Accumulate newly seen members onto the cached summary.
                    let mut guard = cached.write().expect("entity lock poisoned");
                    merge_summary(&mut *guard, &candidate);
                    drop(guard);
                    obs::record(ObsEvent::SummaryMerge { discriminator: disc });
                }
                // Either way the cached instance is authoritative.
                obs::record(ObsEvent::ResolveHit { discriminator: disc });
                return Ok(Some(cached));
            }
        }

        // First sighting within this scope (or an uncached resolution): a
        // reference projection is not the authoritative record, so the
        // instance enters the scope as a summary.
        if self.session.read_only_id_enabled() {
            let id_member = candidate.schema().id_field().name.clone();
            for name in candidate.member_names() {
                if name != id_member {
                    candidate.remove_member(&name);
                }
            }
            candidate.clear_setted_members();
            candidate.set_as_summary(BTreeSet::new());
        } else {
            let populated = candidate.member_names();
            candidate.set_as_summary(populated);
        }
        candidate.enable_auditing();

        let shared = share(candidate);
        if !no_cache {
            self.session.cache().put(id, shared.clone());
        }
        obs::record(ObsEvent::ResolveMiss { discriminator: disc });
        Ok(Some(shared))
    }
}
