//! docmap — identity-aware mapping between typed entities and
//! schema-less documents.
//!
//! ## Crate layout
//! - `core`: runtime — identity cache, reference resolution, summary
//!   merging, repositories, cascade delete, observability.
//! - `schema`: type schemas, member kinds, and reference-path derivation.
//!
//! The `prelude` module mirrors the surface a typical caller needs.

pub use docmap_core as core;
pub use docmap_schema as schema;

pub use docmap_core::{DISCRIMINATOR_KEY, Error, ID_KEY, doc, list};

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::core::{
        DISCRIMINATOR_KEY, ID_KEY,
        cache::IdentityCache,
        context::DbContext,
        error::Error,
        model::{
            Auditable as _, DynamicEntity, EntityModel, MemberAccess as _, MemberValue,
            Referenceable as _, SharedEntity, share,
        },
        registry::TypeRegistry,
        repo::{Repository, RepositoryRegister, delete, flow},
        resolve::ReferenceResolver,
        session::Session,
        task::RefreshDependentDocsTask,
        value::{Document, EntityId, Value},
    };
    pub use crate::schema::{FieldKind, ReferencePath, SchemaBuilder, TypeSchema};
    pub use crate::{doc, list};
}
