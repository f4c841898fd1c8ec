//! Wire representation: the shapes a document store hands back.
//!
//! `Value` is the full scalar/compound wire surface; `Document` is the
//! string-keyed shape entities and embedded values travel in. `_t` carries
//! the concrete-type discriminator and `_id` the entity identifier.


use derive_more::{Deref, DerefMut, IntoIterator};
use docmap_schema::{DISCRIMINATOR_KEY, ID_KEY};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt::{self, Display},
};

///
/// Value
///

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    I64(i64),
    F64(f64),
    Text(String),
    List(Vec<Value>),
    Document(Document),
}

impl Value {
    /// Wire shape name, for shape-mismatch errors.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::I64(_) => "i64",
            Self::F64(_) => "f64",
            Self::Text(_) => "text",
            Self::List(_) => "list",
            Self::Document(_) => "document",
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub const fn as_text(&self) -> Option<&String> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_document(&self) -> Option<&Document> {
        match self {
            Self::Document(d) => Some(d),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::I64(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::I64(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::F64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::List(v)
    }
}

impl From<Document> for Value {
    fn from(v: Document) -> Self {
        Self::Document(v)
    }
}

impl From<EntityId> for Value {
    fn from(id: EntityId) -> Self {
        match id {
            EntityId::Text(s) => Self::Text(s),
            EntityId::I64(n) => Self::I64(n),
        }
    }
}

///
/// Document
///

#[derive(
    Clone, Debug, Default, PartialEq, Deref, DerefMut, IntoIterator, Serialize, Deserialize,
)]
pub struct Document(#[into_iterator(owned, ref)] BTreeMap<String, Value>);

impl Document {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    #[must_use]
    pub fn get_text(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(Value::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_document(&self, key: &str) -> Option<&Document> {
        match self.0.get(key) {
            Some(Value::Document(d)) => Some(d),
            _ => None,
        }
    }

    /// The discriminator element, when present.
    #[must_use]
    pub fn discriminator(&self) -> Option<&str> {
        self.get_text(DISCRIMINATOR_KEY)
    }

    /// The identifier element, when present and keyable.
    #[must_use]
    pub fn entity_id(&self) -> Option<EntityId> {
        EntityId::from_value(self.0.get(ID_KEY)?)
    }
}

///
/// EntityId
///
/// Keyable scalar identity. Identifiers are the only values the identity
/// cache and repositories key on.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub enum EntityId {
    Text(String),
    I64(i64),
}

impl EntityId {
    /// Extract a keyable identity from a wire value.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Text(s) => Some(Self::Text(s.clone())),
            Value::I64(n) => Some(Self::I64(*n)),
            _ => None,
        }
    }
}

impl Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{s}"),
            Self::I64(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for EntityId {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for EntityId {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<i64> for EntityId {
    fn from(v: i64) -> Self {
        Self::I64(v)
    }
}
