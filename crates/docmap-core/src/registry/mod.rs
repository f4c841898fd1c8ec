//! Process-wide type registry.
//!
//! Registration happens at startup and serializer construction converges
//! quickly after warm-up, so reads vastly outnumber writes. Each concern
//! (schema maps, serializer map, path table) sits behind its own
//! read-preferring lock; unrelated lookups never block each other.

#[cfg(test)]
mod tests;

use crate::{error::Error, serialize::DocumentSerializer};
use docmap_schema::{ReferencePath, TypeSchema, derive_reference_paths};
use std::{
    collections::{BTreeSet, HashMap},
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

#[derive(Default)]
struct SchemaMaps {
    by_name: HashMap<String, Arc<TypeSchema>>,
    by_discriminator: HashMap<String, Arc<TypeSchema>>,
}

///
/// TypeRegistry
///
/// Runtime type → structural schema, cascade path table, and one lazily
/// built serializer per concrete type.
///

#[derive(Default)]
pub struct TypeRegistry {
    schemas: RwLock<SchemaMaps>,
    serializers: RwLock<HashMap<String, Arc<DocumentSerializer>>>,
    paths: RwLock<HashMap<String, Arc<[ReferencePath]>>>,
}

impl TypeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a built schema. Fails on duplicate name/discriminator and
    /// when a base schema has not been registered first. The schema's
    /// cascade path table is derived here, once, and frozen.
    pub fn register(&self, schema: TypeSchema) -> Result<Arc<TypeSchema>, Error> {
        let mut maps = write(&self.schemas);

        if maps.by_name.contains_key(schema.name())
            || maps.by_discriminator.contains_key(schema.discriminator())
        {
            return Err(Error::DuplicateRegistration {
                name: schema.name().to_string(),
            });
        }
        if let Some(base) = schema.base() {
            if !maps.by_name.contains_key(base.name()) {
                return Err(Error::unknown_type(base.name()));
            }
        }

        let schema = Arc::new(schema);
        let cascade_paths = derive_cascade_paths(&schema, &maps);

        maps.by_name
            .insert(schema.name().to_string(), schema.clone());
        maps.by_discriminator
            .insert(schema.discriminator().to_string(), schema.clone());
        drop(maps);

        write(&self.paths).insert(schema.discriminator().to_string(), cascade_paths);

        Ok(schema)
    }

    /// Look up a schema by type name.
    pub fn schema_for(&self, name: &str) -> Result<Arc<TypeSchema>, Error> {
        read(&self.schemas)
            .by_name
            .get(name)
            .cloned()
            .ok_or_else(|| Error::unknown_type(name))
    }

    /// Look up a schema by stored discriminator.
    pub fn schema_by_discriminator(&self, discriminator: &str) -> Result<Arc<TypeSchema>, Error> {
        read(&self.schemas)
            .by_discriminator
            .get(discriminator)
            .cloned()
            .ok_or_else(|| Error::unknown_type(discriminator))
    }

    /// The memoized serializer for a concrete type. Built at most once,
    /// even under concurrent first use: a read-lock fast path for the hit
    /// case, then check-then-act under the write lock.
    pub fn serializer_for(&self, discriminator: &str) -> Result<Arc<DocumentSerializer>, Error> {
        if let Some(serializer) = read(&self.serializers).get(discriminator) {
            return Ok(serializer.clone());
        }

        let mut serializers = write(&self.serializers);
        if let Some(serializer) = serializers.get(discriminator) {
            return Ok(serializer.clone());
        }

        let schema = self.schema_by_discriminator(discriminator)?;
        let serializer = Arc::new(DocumentSerializer::new(schema));
        serializers.insert(discriminator.to_string(), serializer.clone());
        Ok(serializer)
    }

    /// Frozen cascade-delete path table for a registered type: cascade
    /// flagged, direct (one entity hop), de-duplicated by path string.
    pub fn reference_paths_for(&self, discriminator: &str) -> Result<Arc<[ReferencePath]>, Error> {
        read(&self.paths)
            .get(discriminator)
            .cloned()
            .ok_or_else(|| Error::unknown_type(discriminator))
    }
}

fn derive_cascade_paths(schema: &Arc<TypeSchema>, maps: &SchemaMaps) -> Arc<[ReferencePath]> {
    let lookup = |name: &str| {
        if name == schema.name() {
            Some(schema.clone())
        } else {
            maps.by_name.get(name).cloned()
        }
    };

    let mut seen = BTreeSet::new();
    derive_reference_paths(schema, &lookup)
        .into_iter()
        .filter(|path| path.cascade)
        .filter(|path| seen.insert(path.to_string()))
        .collect()
}

// Lock poisoning only happens after a panic inside the registry itself;
// there is no recovery worth attempting at that point.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().expect("type registry lock poisoned")
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().expect("type registry lock poisoned")
}
