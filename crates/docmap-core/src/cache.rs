use crate::{model::SharedEntity, value::EntityId};
use std::{collections::HashMap, sync::Mutex};

///
/// IdentityCache
///
/// Scoped identifier → instance map, lifetime bound to one unit of work.
/// Concurrent reference resolutions within a scope may target the same id,
/// so every operation serializes on one scope-wide lock. Entries are `Arc`
/// clones: eviction never frees an instance a caller still holds, and the
/// cache performs no I/O.
///

#[derive(Default)]
pub struct IdentityCache {
    entries: Mutex<HashMap<EntityId, SharedEntity>>,
}

impl IdentityCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a loaded instance. Absent ids are simply not found.
    #[must_use]
    pub fn get(&self, id: &EntityId) -> Option<SharedEntity> {
        self.lock().get(id).cloned()
    }

    #[must_use]
    pub fn contains(&self, id: &EntityId) -> bool {
        self.lock().contains_key(id)
    }

    /// Insert or overwrite. Callers wanting exactly-once insertion check
    /// existence first; normal resolution flow only inserts on a miss.
    pub fn put(&self, id: EntityId, entity: SharedEntity) {
        self.lock().insert(id, entity);
    }

    /// Evict one id. A no-op when absent.
    pub fn remove(&self, id: &EntityId) {
        self.lock().remove(id);
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<EntityId, SharedEntity>> {
        self.entries
            .lock()
            .expect("identity cache lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DynamicEntity, share};
    use docmap_schema::TypeSchema;
    use std::sync::Arc;

    fn entity() -> SharedEntity {
        share(DynamicEntity::new(Arc::new(
            TypeSchema::builder("User").id().build().unwrap(),
        )))
    }

    #[test]
    fn get_put_remove_clear() {
        let cache = IdentityCache::new();
        let id = EntityId::from("u1");

        assert!(cache.get(&id).is_none());

        let e = entity();
        cache.put(id.clone(), e.clone());
        assert!(Arc::ptr_eq(&cache.get(&id).unwrap(), &e));
        assert_eq!(cache.len(), 1);

        // remove on an absent id is a no-op
        cache.remove(&EntityId::from("nope"));
        assert_eq!(cache.len(), 1);

        cache.remove(&id);
        assert!(cache.get(&id).is_none());

        cache.put(id.clone(), e);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn put_overwrites_existing_entry() {
        let cache = IdentityCache::new();
        let id = EntityId::from("u1");
        let first = entity();
        let second = entity();

        cache.put(id.clone(), first.clone());
        cache.put(id.clone(), second.clone());

        let got = cache.get(&id).unwrap();
        assert!(Arc::ptr_eq(&got, &second));
        assert!(!Arc::ptr_eq(&got, &first));
    }

    #[test]
    fn eviction_does_not_invalidate_held_handles() {
        let cache = IdentityCache::new();
        let id = EntityId::from("u1");
        let e = entity();

        cache.put(id.clone(), e.clone());
        cache.remove(&id);

        // the caller's handle is still alive and usable
        assert!(e.read().unwrap().entity_id().is_none());
    }
}
