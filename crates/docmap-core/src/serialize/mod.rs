//! Per-type document serializers.
//!
//! One serializer exists per concrete type, built lazily from the type's
//! schema and memoized by the registry. Deserialization is body-only: the
//! reference resolver owns discriminator dispatch, identity caching, and
//! summary marking, and is re-entered here for nested reference members.


use crate::{
    error::Error,
    model::{DynamicEntity, EntityModel, MemberAccess, MemberValue, share},
    resolve::ReferenceResolver,
    value::{Document, Value},
};
use docmap_schema::{DISCRIMINATOR_KEY, FieldKind, TypeSchema};
use std::{collections::BTreeMap, sync::Arc};

///
/// DocumentSerializer
///

pub struct DocumentSerializer {
    schema: Arc<TypeSchema>,
}

impl DocumentSerializer {
    #[must_use]
    pub const fn new(schema: Arc<TypeSchema>) -> Self {
        Self { schema }
    }

    #[must_use]
    pub const fn schema(&self) -> &Arc<TypeSchema> {
        &self.schema
    }

    /// Materialize a document body as an entity instance. Declared members
    /// convert per their schema kind; undeclared wire elements are parked
    /// as extra elements. The result carries no summary marking.
    pub fn deserialize(
        &self,
        doc: &Document,
        resolver: &ReferenceResolver<'_>,
    ) -> Result<DynamicEntity, Error> {
        let mut entity = DynamicEntity::new(self.schema.clone());

        for (key, value) in doc.iter() {
            if key == DISCRIMINATOR_KEY {
                continue;
            }
            match self.schema.field(key) {
                Some(field) => {
                    let member = convert_member(&field.kind, value, resolver)?;
                    entity.set_member(key, member);
                }
                None => entity.set_extra(key.clone(), value.clone()),
            }
        }

        Ok(entity)
    }

    /// Write an entity back to wire shape. Summary instances write their
    /// setted members only; extra elements are never re-serialized.
    #[must_use]
    pub fn serialize(&self, entity: &dyn EntityModel) -> Document {
        entity_to_document(entity)
    }
}

/// Serialize any entity with its own runtime schema, references included
/// as nested documents.
#[must_use]
pub fn entity_to_document(entity: &dyn EntityModel) -> Document {
    let mut doc = Document::new();
    doc.insert(
        DISCRIMINATOR_KEY.to_string(),
        Value::Text(entity.schema().discriminator().to_string()),
    );

    let names = if entity.is_summary() {
        entity.setted_member_names()
    } else {
        entity.member_names()
    };
    for name in names {
        if let Some(member) = entity.get_member(&name) {
            doc.insert(name, member_to_value(&member));
        }
    }

    doc
}

fn member_to_value(member: &MemberValue) -> Value {
    match member {
        MemberValue::Scalar(value) => value.clone(),
        MemberValue::Entity(entity) => {
            let guard = entity.read().expect("entity lock poisoned");
            Value::Document(entity_to_document(&*guard))
        }
        MemberValue::List(items) => Value::List(items.iter().map(member_to_value).collect()),
        MemberValue::Map(map) => {
            let mut doc = Document::new();
            for (key, value) in map {
                doc.insert(key.clone(), member_to_value(value));
            }
            Value::Document(doc)
        }
    }
}

fn convert_member(
    kind: &FieldKind,
    value: &Value,
    resolver: &ReferenceResolver<'_>,
) -> Result<MemberValue, Error> {
    // A null member is populated-as-null for every kind.
    if value.is_null() {
        return Ok(MemberValue::Scalar(Value::Null));
    }

    match kind {
        FieldKind::Id | FieldKind::Scalar => Ok(MemberValue::Scalar(value.clone())),

        FieldKind::Reference { target, .. } => {
            let resolved = resolver.resolve(target, value)?;
            Ok(resolved.map_or(MemberValue::Scalar(Value::Null), MemberValue::Entity))
        }

        FieldKind::Embedded { target } => {
            let Some(doc) = value.as_document() else {
                return Err(Error::UnexpectedShape {
                    expected: "document",
                    found: value.kind(),
                });
            };
            // Embedded values may themselves be polymorphic.
            let schema = match doc.discriminator() {
                Some(disc) => resolver.registry().schema_by_discriminator(disc)?,
                None => resolver.registry().schema_for(target)?,
            };
            let serializer = resolver.registry().serializer_for(schema.discriminator())?;
            let embedded = serializer.deserialize(doc, resolver)?;
            Ok(MemberValue::Entity(share(embedded)))
        }

        FieldKind::List(inner) => {
            let Value::List(items) = value else {
                return Err(Error::UnexpectedShape {
                    expected: "list",
                    found: value.kind(),
                });
            };
            let members = items
                .iter()
                .map(|item| convert_member(inner, item, resolver))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(MemberValue::List(members))
        }

        FieldKind::Map(inner) => {
            let Some(doc) = value.as_document() else {
                return Err(Error::UnexpectedShape {
                    expected: "document",
                    found: value.kind(),
                });
            };
            let mut members = BTreeMap::new();
            for (key, item) in doc.iter() {
                members.insert(key.clone(), convert_member(inner, item, resolver)?);
            }
            Ok(MemberValue::Map(members))
        }
    }
}
