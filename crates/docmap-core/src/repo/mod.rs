//! Repositories.
//!
//! A `Repository` is the storage seam: everything above it (resolution,
//! identity caching, cascade walking) is storage-agnostic. Backends
//! implement the five `*_on_store` primitives; the free functions in
//! [`flow`] and [`delete`] layer the cache-aware flows on top.

pub mod delete;
pub mod flow;


pub use delete::delete;
pub use flow::{create, create_many, find_one, try_find_one};

use crate::{
    error::Error,
    model::SharedEntity,
    session::Session,
    value::EntityId,
};
use std::{
    collections::HashMap,
    sync::{Arc, RwLock, RwLockReadGuard},
};

///
/// Repository
///
/// Raw storage primitives for one entity type. Implementations perform
/// the actual I/O and deserialize through the registry's serializers;
/// they never consult or mutate the identity cache — that is the flow
/// layer's job.
///

pub trait Repository: Send + Sync {
    /// Load the full document for `id`, deserialized against `session`.
    ///
    /// # Errors
    /// `Error::EntityNotFound` when no document carries `id`.
    fn find_on_store(&self, session: &Session, id: &EntityId) -> Result<SharedEntity, Error>;

    /// Load every document whose `member_path` element equals `id`.
    /// List segments in the path are spelled `$`, map-value segments `$*`.
    fn find_where_on_store(
        &self,
        session: &Session,
        member_path: &str,
        id: &EntityId,
    ) -> Result<Vec<SharedEntity>, Error>;

    /// Persist a new document.
    fn create_on_store(&self, session: &Session, entity: &SharedEntity) -> Result<(), Error>;

    /// Replace the stored document wholesale. When `cascade_sync` is set
    /// the backend also refreshes documents that embed this entity as a
    /// reference projection.
    fn replace_on_store(
        &self,
        session: &Session,
        entity: &SharedEntity,
        cascade_sync: bool,
    ) -> Result<(), Error>;

    /// Remove the stored document.
    fn delete_on_store(&self, session: &Session, entity: &SharedEntity) -> Result<(), Error>;
}

///
/// RepositoryRegister
/// Discriminator-keyed set of repositories, one per concrete entity type.
///

#[derive(Default)]
pub struct RepositoryRegister {
    repos: RwLock<HashMap<String, Arc<dyn Repository>>>,
}

impl RepositoryRegister {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the repository serving `discriminator`.
    ///
    /// # Errors
    /// `Error::DuplicateRegistration` when the discriminator is taken.
    pub fn register(
        &self,
        discriminator: impl Into<String>,
        repo: Arc<dyn Repository>,
    ) -> Result<(), Error> {
        let discriminator = discriminator.into();
        let mut repos = self.write();
        if repos.contains_key(&discriminator) {
            return Err(Error::DuplicateRegistration {
                name: discriminator,
            });
        }
        repos.insert(discriminator, repo);

        Ok(())
    }

    /// Look up the repository for `discriminator`, if one is registered.
    #[must_use]
    pub fn get(&self, discriminator: &str) -> Option<Arc<dyn Repository>> {
        self.read().get(discriminator).cloned()
    }

    /// Look up the repository for `discriminator`.
    ///
    /// # Errors
    /// `Error::UnknownType` when no repository serves the discriminator.
    pub fn require(&self, discriminator: &str) -> Result<Arc<dyn Repository>, Error> {
        self.get(discriminator)
            .ok_or_else(|| Error::unknown_type(discriminator))
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<dyn Repository>>> {
        self.repos.read().expect("repository register lock poisoned")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Arc<dyn Repository>>> {
        self.repos
            .write()
            .expect("repository register lock poisoned")
    }
}
