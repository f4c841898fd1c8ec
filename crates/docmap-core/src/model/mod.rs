//! Entity capability surface.
//!
//! The resolver, merge engine, and cascade walker talk to entities only
//! through the capability traits below: member access (the reflection-style
//! accessor), change auditing, and reference marking. `DynamicEntity` is
//! the schema-backed implementation used by the serializers; host
//! frameworks with generated proxy types can implement the same traits.

mod instance;


pub use instance::DynamicEntity;

use crate::value::{EntityId, Value};
use docmap_schema::TypeSchema;
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    sync::{Arc, RwLock},
};

///
/// MemberValue
///
/// Runtime payload of one entity member. References and embedded documents
/// materialize as `Entity` handles so identity-map semantics survive the
/// member graph; everything else stays a wire value.
///

#[derive(Clone)]
pub enum MemberValue {
    Scalar(Value),
    Entity(SharedEntity),
    List(Vec<MemberValue>),
    Map(BTreeMap<String, MemberValue>),
}

impl MemberValue {
    #[must_use]
    pub const fn as_entity(&self) -> Option<&SharedEntity> {
        match self {
            Self::Entity(e) => Some(e),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_scalar(&self) -> Option<&Value> {
        match self {
            Self::Scalar(v) => Some(v),
            _ => None,
        }
    }
}

impl PartialEq for MemberValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Scalar(a), Self::Scalar(b)) => a == b,
            // Entities compare by identity, matching the identity-map law.
            (Self::Entity(a), Self::Entity(b)) => Arc::ptr_eq(a, b),
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for MemberValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(v) => write!(f, "Scalar({v:?})"),
            Self::Entity(e) => {
                let id = e.read().expect("entity lock poisoned").entity_id();
                write!(f, "Entity({id:?})")
            }
            Self::List(items) => f.debug_list().entries(items).finish(),
            Self::Map(map) => f.debug_map().entries(map).finish(),
        }
    }
}

impl From<Value> for MemberValue {
    fn from(v: Value) -> Self {
        Self::Scalar(v)
    }
}

///
/// MemberAccess
///
/// Reflection-style member accessor: read and write members of an entity
/// whose shape is known only through its registered schema.
///

pub trait MemberAccess {
    /// The entity's runtime type.
    fn schema(&self) -> &Arc<TypeSchema>;

    /// The identifier member, when populated and keyable.
    fn entity_id(&self) -> Option<EntityId>;

    /// Current value of a populated member.
    fn get_member(&self, name: &str) -> Option<MemberValue>;

    /// Write a member. Records the change while auditing is enabled.
    fn set_member(&mut self, name: &str, value: MemberValue);

    /// Remove a member. Records the change while auditing is enabled.
    fn remove_member(&mut self, name: &str);

    /// Names of the currently populated members.
    fn member_names(&self) -> BTreeSet<String>;
}

///
/// Auditable
///
/// Change-tracking capability. The merge engine suspends auditing around
/// merges so reconciliation is never recorded as a user edit.
///

pub trait Auditable {
    fn enable_auditing(&mut self);
    fn disable_auditing(&mut self);
    fn is_auditing_enabled(&self) -> bool;
    fn changed_members(&self) -> BTreeSet<String>;
    fn reset_changed_members(&mut self);
}

///
/// Referenceable
///
/// Reference-marking capability carried by every reference-tracked entity:
/// a summary flag plus the set of members actually populated when the
/// instance was last seen as a summary. A summary's setted set always
/// includes the identifier.
///

pub trait Referenceable {
    fn is_summary(&self) -> bool;
    fn setted_member_names(&self) -> BTreeSet<String>;

    /// Mark as summary and extend the setted set with `members` (the
    /// identifier member is always retained).
    fn set_as_summary(&mut self, members: BTreeSet<String>);

    /// Drop summary state entirely; the instance counts as fully loaded.
    fn clear_setted_members(&mut self);
}

///
/// EntityModel
///
/// Full entity contract the core operates on.
///

pub trait EntityModel: MemberAccess + Auditable + Referenceable + Send + Sync {
    /// Sever cross-links to other entities ahead of a physical delete so
    /// the flush before removal persists no dangling references.
    fn detach_for_delete(&mut self);
}

/// Shared entity handle. Reference identity within a scope is `Arc`
/// identity: two loads of one id yield pointer-equal handles.
pub type SharedEntity = Arc<RwLock<dyn EntityModel + Send + Sync>>;

/// Wrap a concrete entity into a shared handle.
pub fn share<E: EntityModel + 'static>(entity: E) -> SharedEntity {
    Arc::new(RwLock::new(entity))
}
