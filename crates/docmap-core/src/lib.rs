//! Runtime core of the docmap document mapping layer.
//!
//! The core maps typed entities to schema-less documents with identity-aware
//! loading: every entity loaded within one unit-of-work scope is tracked by
//! identifier, embedded references materialize as lightweight summaries that
//! accumulate knowledge across sightings, and declared reference paths drive
//! cascading deletes through a repository capability.
//!
//! ## Crate layout
//! - `value`: wire documents and scalar values.
//! - `model`: entity capability traits and the schema-backed instance type.
//! - `registry`: process-wide type registry (schemas, serializers, paths).
//! - `cache` / `session`: per-scope identity cache and scope modifiers.
//! - `resolve`: reference resolution and summary merging.
//! - `serialize`: per-type document serializers.
//! - `repo`: repository capability, load/create/delete flows, cascade walker.
//! - `task`: dependent-document maintenance.
//! - `obs`: event sink and process counters.

#[macro_use]
pub mod macros;

pub mod cache;
pub mod context;
pub mod error;
pub mod model;
pub mod obs;
pub mod registry;
pub mod repo;
pub mod resolve;
pub mod serialize;
pub mod session;
pub mod task;
pub mod value;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use error::Error;

// Re-exported so downstream code can name schema types through one crate.
pub use docmap_schema as schema;
pub use docmap_schema::{DISCRIMINATOR_KEY, ID_KEY};

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        DISCRIMINATOR_KEY, ID_KEY,
        cache::IdentityCache,
        context::DbContext,
        error::Error,
        model::{
            Auditable, DynamicEntity, EntityModel, MemberAccess, MemberValue, Referenceable,
            SharedEntity, share,
        },
        registry::TypeRegistry,
        repo::{Repository, RepositoryRegister, delete, flow},
        resolve::ReferenceResolver,
        session::Session,
        task::RefreshDependentDocsTask,
        value::{Document, EntityId, Value},
    };
    pub use docmap_schema::{FieldKind, ReferencePath, SchemaBuilder, TypeSchema};
}
