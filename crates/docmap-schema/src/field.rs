///
/// FieldKind
///
/// Structural kind of a declared member. `Reference` members point at other
/// identified entities and are the only members eligible for cascade
/// delete; `Embedded` members are owned sub-documents described by another
/// registered schema.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FieldKind {
    /// Plain wire scalar (text, number, bool, null).
    Scalar,

    /// The entity identifier member.
    Id,

    /// Owned sub-document, shaped by the named schema.
    Embedded { target: String },

    /// Identified entity reference, materialized via the reference resolver.
    Reference { target: String, cascade: bool },

    /// Homogeneous sequence of the inner kind.
    List(Box<FieldKind>),

    /// String-keyed mapping over the inner kind.
    Map(Box<FieldKind>),
}

impl FieldKind {
    /// Whether this kind reaches an entity reference at any nesting level.
    #[must_use]
    pub fn contains_reference(&self) -> bool {
        match self {
            Self::Scalar | Self::Id | Self::Embedded { .. } => false,
            Self::Reference { .. } => true,
            Self::List(inner) | Self::Map(inner) => inner.contains_reference(),
        }
    }
}

///
/// FieldSchema
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldSchema {
    pub name: String,
    pub kind: FieldKind,
}

impl FieldSchema {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

///
/// FieldList
///
/// Ordered member list as declared. Order matters for schema identity and
/// for deterministic reference-path derivation.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FieldList {
    pub fields: Vec<FieldSchema>,
}

impl FieldList {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    #[must_use]
    pub fn iter(&self) -> std::slice::Iter<'_, FieldSchema> {
        self.fields.iter()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

impl<'a> IntoIterator for &'a FieldList {
    type Item = &'a FieldSchema;
    type IntoIter = std::slice::Iter<'a, FieldSchema>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
