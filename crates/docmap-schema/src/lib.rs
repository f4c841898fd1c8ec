//! Schema layer for the docmap runtime.
//!
//! Type schemas describe the shape of an entity known only at runtime: its
//! ordered member list, the base schema it extends, and the discriminator
//! value used to recover the concrete type from a stored document. Schemas
//! are built once, validated, and frozen; the runtime never mutates them.

pub mod field;
pub mod path;
pub mod schema;

pub use field::{FieldKind, FieldList, FieldSchema};
pub use path::{PathStep, ReferencePath, derive_reference_paths};
pub use schema::{SchemaBuilder, SchemaError, TypeSchema};

/// Document key carrying the entity identifier.
pub const ID_KEY: &str = "_id";

/// Document key carrying the concrete-type discriminator.
pub const DISCRIMINATOR_KEY: &str = "_t";
