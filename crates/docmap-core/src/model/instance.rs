use crate::{
    model::{Auditable, EntityModel, MemberAccess, MemberValue, Referenceable},
    value::{EntityId, Value},
};
use docmap_schema::TypeSchema;
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

///
/// DynamicEntity
///
/// Schema-backed entity instance. The runtime type is the schema handle;
/// members live in a name-keyed map shaped by the schema's effective field
/// list. Wire elements unknown to the schema are parked in `extra` and
/// never re-serialized.
///
/// Auditing starts disabled: deserialization populates members without
/// recording user edits, and the resolver enables auditing once an
/// instance enters the identity cache.
///

pub struct DynamicEntity {
    schema: Arc<TypeSchema>,
    members: BTreeMap<String, MemberValue>,
    extra: BTreeMap<String, Value>,

    auditing_enabled: bool,
    changed: BTreeSet<String>,

    is_summary: bool,
    setted: BTreeSet<String>,
}

impl DynamicEntity {
    #[must_use]
    pub fn new(schema: Arc<TypeSchema>) -> Self {
        Self {
            schema,
            members: BTreeMap::new(),
            extra: BTreeMap::new(),
            auditing_enabled: false,
            changed: BTreeSet::new(),
            is_summary: false,
            setted: BTreeSet::new(),
        }
    }

    /// Park a wire element the schema does not declare.
    pub fn set_extra(&mut self, key: impl Into<String>, value: Value) {
        self.extra.insert(key.into(), value);
    }

    #[must_use]
    pub const fn extra(&self) -> &BTreeMap<String, Value> {
        &self.extra
    }
}

impl MemberAccess for DynamicEntity {
    fn schema(&self) -> &Arc<TypeSchema> {
        &self.schema
    }

    fn entity_id(&self) -> Option<EntityId> {
        let id_member = self.members.get(&self.schema.id_field().name)?;
        EntityId::from_value(id_member.as_scalar()?)
    }

    fn get_member(&self, name: &str) -> Option<MemberValue> {
        self.members.get(name).cloned()
    }

    fn set_member(&mut self, name: &str, value: MemberValue) {
        self.members.insert(name.to_string(), value);
        if self.auditing_enabled {
            self.changed.insert(name.to_string());
        }
    }

    fn remove_member(&mut self, name: &str) {
        if self.members.remove(name).is_some() && self.auditing_enabled {
            self.changed.insert(name.to_string());
        }
    }

    fn member_names(&self) -> BTreeSet<String> {
        self.members.keys().cloned().collect()
    }
}

impl Auditable for DynamicEntity {
    fn enable_auditing(&mut self) {
        self.auditing_enabled = true;
    }

    fn disable_auditing(&mut self) {
        self.auditing_enabled = false;
    }

    fn is_auditing_enabled(&self) -> bool {
        self.auditing_enabled
    }

    fn changed_members(&self) -> BTreeSet<String> {
        self.changed.clone()
    }

    fn reset_changed_members(&mut self) {
        self.changed.clear();
    }
}

impl Referenceable for DynamicEntity {
    fn is_summary(&self) -> bool {
        self.is_summary
    }

    fn setted_member_names(&self) -> BTreeSet<String> {
        self.setted.clone()
    }

    fn set_as_summary(&mut self, members: BTreeSet<String>) {
        self.is_summary = true;
        self.setted.extend(members);
        // The identifier is part of every summary projection.
        self.setted.insert(self.schema.id_field().name.clone());
    }

    fn clear_setted_members(&mut self) {
        self.is_summary = false;
        self.setted.clear();
    }
}

impl EntityModel for DynamicEntity {
    fn detach_for_delete(&mut self) {
        let severed: Vec<String> = self
            .schema
            .effective_fields()
            .into_iter()
            .filter(|f| f.kind.contains_reference())
            .map(|f| f.name.clone())
            .collect();

        for name in severed {
            self.remove_member(&name);
        }
    }
}
