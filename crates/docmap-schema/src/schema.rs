use crate::field::{FieldKind, FieldList, FieldSchema};
use std::{collections::BTreeSet, sync::Arc};
use thiserror::Error as ThisError;

///
/// SchemaError
///
/// Construction-time validation failures. These are programmer errors at
/// startup and abort registration.
///

#[derive(Debug, ThisError)]
pub enum SchemaError {
    #[error("schema name is empty")]
    EmptyName,

    #[error("schema '{name}' has an empty discriminator")]
    EmptyDiscriminator { name: String },

    #[error("schema '{name}' declares no identifier member")]
    MissingId { name: String },

    #[error("schema '{name}' declares more than one identifier member")]
    MultipleIds { name: String },

    #[error("schema '{name}' declares member '{field}' more than once across its base chain")]
    DuplicateField { name: String, field: String },
}

///
/// TypeSchema
///
/// Per-type structural schema: ordered members, base-type linkage (single
/// rooted inheritance chain), and the discriminator recovered from stored
/// documents. Immutable once built.
///

#[derive(Clone, Debug)]
pub struct TypeSchema {
    name: String,
    discriminator: String,
    base: Option<Arc<TypeSchema>>,
    fields: FieldList,
}

impl TypeSchema {
    #[must_use]
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder::new(name)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn discriminator(&self) -> &str {
        &self.discriminator
    }

    #[must_use]
    pub const fn base(&self) -> Option<&Arc<TypeSchema>> {
        self.base.as_ref()
    }

    /// Members declared directly on this schema, base members excluded.
    #[must_use]
    pub const fn own_fields(&self) -> &FieldList {
        &self.fields
    }

    /// Full member list: base-chain members first, then own members.
    #[must_use]
    pub fn effective_fields(&self) -> Vec<&FieldSchema> {
        let mut out = match &self.base {
            Some(base) => base.effective_fields(),
            None => Vec::new(),
        };
        out.extend(self.fields.iter());
        out
    }

    /// Look up a member anywhere in the chain.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields
            .get(name)
            .or_else(|| self.base.as_ref().and_then(|base| base.field(name)))
    }

    /// The identifier member. Validation guarantees exactly one exists.
    #[must_use]
    pub fn id_field(&self) -> &FieldSchema {
        self.effective_fields()
            .into_iter()
            .find(|f| f.kind == FieldKind::Id)
            .expect("validated schema always carries an identifier member")
    }

    /// Whether `nominal` names this schema or any schema in its base chain,
    /// by name or by discriminator.
    #[must_use]
    pub fn is_assignable_to(&self, nominal: &str) -> bool {
        if self.name == nominal || self.discriminator == nominal {
            return true;
        }
        self.base
            .as_ref()
            .is_some_and(|base| base.is_assignable_to(nominal))
    }
}

///
/// SchemaBuilder
///
/// Fluent construction for a frozen `TypeSchema`. `build` performs the
/// whole-chain validation pass.
///

pub struct SchemaBuilder {
    name: String,
    discriminator: Option<String>,
    base: Option<Arc<TypeSchema>>,
    fields: Vec<FieldSchema>,
}

impl SchemaBuilder {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            discriminator: None,
            base: None,
            fields: Vec::new(),
        }
    }

    /// Override the discriminator; defaults to the schema name.
    #[must_use]
    pub fn discriminator(mut self, discriminator: impl Into<String>) -> Self {
        self.discriminator = Some(discriminator.into());
        self
    }

    /// Extend a previously built base schema. The base must be registered
    /// before any schema that extends it.
    #[must_use]
    pub fn base(mut self, base: Arc<TypeSchema>) -> Self {
        self.base = Some(base);
        self
    }

    /// Declare the identifier member under the reserved `_id` key.
    #[must_use]
    pub fn id(self) -> Self {
        self.field(crate::ID_KEY, FieldKind::Id)
    }

    #[must_use]
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(FieldSchema::new(name, kind));
        self
    }

    /// Shorthand for a plain scalar member.
    #[must_use]
    pub fn scalar(self, name: impl Into<String>) -> Self {
        self.field(name, FieldKind::Scalar)
    }

    /// Shorthand for a reference member.
    #[must_use]
    pub fn reference(self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.field(
            name,
            FieldKind::Reference {
                target: target.into(),
                cascade: false,
            },
        )
    }

    /// Shorthand for a reference member flagged for cascade delete.
    #[must_use]
    pub fn cascade_reference(self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.field(
            name,
            FieldKind::Reference {
                target: target.into(),
                cascade: true,
            },
        )
    }

    pub fn build(self) -> Result<TypeSchema, SchemaError> {
        let name = self.name;
        if name.is_empty() {
            return Err(SchemaError::EmptyName);
        }

        let discriminator = self.discriminator.unwrap_or_else(|| name.clone());
        if discriminator.is_empty() {
            return Err(SchemaError::EmptyDiscriminator { name });
        }

        let schema = TypeSchema {
            name,
            discriminator,
            base: self.base,
            fields: FieldList {
                fields: self.fields,
            },
        };

        validate(&schema)?;
        Ok(schema)
    }
}

// Whole-chain validation: unique member names, exactly one identifier.
fn validate(schema: &TypeSchema) -> Result<(), SchemaError> {
    let mut seen = BTreeSet::new();
    let mut id_count = 0usize;

    for field in schema.effective_fields() {
        if !seen.insert(field.name.as_str()) {
            return Err(SchemaError::DuplicateField {
                name: schema.name.clone(),
                field: field.name.clone(),
            });
        }
        if field.kind == FieldKind::Id {
            id_count += 1;
        }
    }

    match id_count {
        0 => Err(SchemaError::MissingId {
            name: schema.name.clone(),
        }),
        1 => Ok(()),
        _ => Err(SchemaError::MultipleIds {
            name: schema.name.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_default_discriminator() {
        let schema = TypeSchema::builder("User").id().scalar("name").build().unwrap();

        assert_eq!(schema.name(), "User");
        assert_eq!(schema.discriminator(), "User");
        assert_eq!(schema.id_field().name, crate::ID_KEY);
    }

    #[test]
    fn effective_fields_place_base_members_first() {
        let base = Arc::new(TypeSchema::builder("Entity").id().build().unwrap());
        let schema = TypeSchema::builder("User")
            .base(base)
            .scalar("name")
            .build()
            .unwrap();

        let names: Vec<_> = schema.effective_fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["_id", "name"]);
        assert!(schema.is_assignable_to("Entity"));
        assert!(schema.is_assignable_to("User"));
        assert!(!schema.is_assignable_to("Order"));
    }

    #[test]
    fn rejects_missing_id() {
        let err = TypeSchema::builder("User").scalar("name").build().unwrap_err();
        assert!(matches!(err, SchemaError::MissingId { .. }));
    }

    #[test]
    fn rejects_duplicate_member_across_chain() {
        let base = Arc::new(TypeSchema::builder("Entity").id().scalar("name").build().unwrap());
        let err = TypeSchema::builder("User")
            .base(base)
            .scalar("name")
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateField { .. }));
    }

    #[test]
    fn rejects_multiple_ids() {
        let base = Arc::new(TypeSchema::builder("Entity").id().build().unwrap());
        let err = TypeSchema::builder("User")
            .base(base)
            .field("uid", FieldKind::Id)
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::MultipleIds { .. }));
    }
}
