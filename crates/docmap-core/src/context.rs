//! Mapper context.

use crate::{
    registry::TypeRegistry,
    repo::RepositoryRegister,
    resolve::ReferenceResolver,
    session::Session,
};
use std::sync::Arc;

///
/// DbContext
///
/// Process-wide wiring: the shared type registry plus the repository
/// register. Sessions are created per unit of work and borrow from the
/// context; the context itself holds no per-scope state.
///

#[derive(Clone, Default)]
pub struct DbContext {
    registry: Arc<TypeRegistry>,
    repositories: Arc<RepositoryRegister>,
}

impl DbContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Owning handle to the registry, for repositories that deserialize.
    #[must_use]
    pub fn registry_handle(&self) -> Arc<TypeRegistry> {
        self.registry.clone()
    }

    #[must_use]
    pub fn repositories(&self) -> &RepositoryRegister {
        &self.repositories
    }

    /// Build a resolver over this context's registry and `session`.
    #[must_use]
    pub fn resolver<'a>(&'a self, session: &'a Session) -> ReferenceResolver<'a> {
        ReferenceResolver::new(&self.registry, session)
    }
}
