//! Shared fixtures for core tests: a small Order/LineItem/User domain,
//! an in-memory repository, and an event-capturing obs sink.

use crate::{
    context::DbContext,
    error::Error,
    model::{SharedEntity, share},
    obs::{ObsEvent, ObsSink},
    registry::TypeRegistry,
    resolve::ReferenceResolver,
    serialize::entity_to_document,
    session::Session,
    value::{Document, EntityId, Value},
};
use docmap_schema::{FieldKind, TypeSchema};
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{Arc, Mutex},
};

///
/// Fixture
/// A wired context with one repository per fixture type.
///

pub(crate) struct Fixture {
    pub ctx: DbContext,
    pub session: Session,
    pub orders: Arc<MemRepository>,
    pub line_items: Arc<MemRepository>,
    pub users: Arc<MemRepository>,
}

impl Fixture {
    pub fn resolver(&self) -> ReferenceResolver<'_> {
        self.ctx.resolver(&self.session)
    }
}

pub(crate) fn fixture() -> Fixture {
    let ctx = DbContext::new();

    let user = TypeSchema::builder("User")
        .id()
        .scalar("name")
        .build()
        .unwrap();
    ctx.registry().register(user).unwrap();

    let line_item = TypeSchema::builder("LineItem")
        .id()
        .scalar("sku")
        .scalar("quantity")
        .build()
        .unwrap();
    ctx.registry().register(line_item).unwrap();

    let order = TypeSchema::builder("Order")
        .id()
        .scalar("status")
        .reference("buyer", "User")
        .field(
            "line_items",
            FieldKind::List(Box::new(FieldKind::Reference {
                target: "LineItem".to_string(),
                cascade: true,
            })),
        )
        .build()
        .unwrap();
    ctx.registry().register(order).unwrap();

    let registry = ctx.registry_handle();
    let users = Arc::new(MemRepository::new(registry.clone()));
    let line_items = Arc::new(MemRepository::new(registry.clone()));
    let orders = Arc::new(MemRepository::new(registry));
    ctx.repositories().register("User", users.clone()).unwrap();
    ctx.repositories()
        .register("LineItem", line_items.clone())
        .unwrap();
    ctx.repositories()
        .register("Order", orders.clone())
        .unwrap();

    Fixture {
        ctx,
        session: Session::new(),
        orders,
        line_items,
        users,
    }
}

pub(crate) fn user_doc(id: &str, name: &str) -> Document {
    doc! { "_t" => "User", "_id" => id, "name" => name }
}

pub(crate) fn line_item_doc(id: &str, sku: &str, quantity: i64) -> Document {
    doc! { "_t" => "LineItem", "_id" => id, "sku" => sku, "quantity" => quantity }
}

///
/// MemRepository
/// Document store over a map, with injectable per-id failures.
///

#[derive(Default)]
pub(crate) struct MemRepository {
    registry: Arc<TypeRegistry>,
    docs: Mutex<BTreeMap<EntityId, Document>>,
    fail_replace: Mutex<BTreeSet<EntityId>>,
    fail_delete: Mutex<BTreeSet<EntityId>>,
    pub replace_log: Mutex<Vec<EntityId>>,
    pub delete_log: Mutex<Vec<EntityId>>,
}

impl MemRepository {
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self {
            registry,
            ..Self::default()
        }
    }

    pub fn seed(&self, doc: Document) {
        let id = doc.entity_id().unwrap();
        self.docs.lock().unwrap().insert(id, doc);
    }

    pub fn fail_delete_for(&self, id: impl Into<EntityId>) {
        self.fail_delete.lock().unwrap().insert(id.into());
    }

    pub fn fail_replace_for(&self, id: impl Into<EntityId>) {
        self.fail_replace.lock().unwrap().insert(id.into());
    }

    pub fn stored(&self, id: &EntityId) -> Option<Document> {
        self.docs.lock().unwrap().get(id).cloned()
    }

    pub fn replaced_ids(&self) -> Vec<EntityId> {
        self.replace_log.lock().unwrap().clone()
    }

    pub fn deleted_ids(&self) -> Vec<EntityId> {
        self.delete_log.lock().unwrap().clone()
    }

    fn materialize(&self, session: &Session, doc: &Document) -> Result<SharedEntity, Error> {
        let disc = doc
            .discriminator()
            .ok_or_else(|| Error::unknown_type("<missing discriminator>"))?;
        let serializer = self.registry.serializer_for(disc)?;
        let resolver = ReferenceResolver::new(&self.registry, session);
        let entity = serializer.deserialize(doc, &resolver)?;

        Ok(share(entity))
    }
}

impl crate::repo::Repository for MemRepository {
    fn find_on_store(&self, session: &Session, id: &EntityId) -> Result<SharedEntity, Error> {
        let doc = self
            .stored(id)
            .ok_or_else(|| Error::EntityNotFound { id: id.clone() })?;

        self.materialize(session, &doc)
    }

    fn find_where_on_store(
        &self,
        session: &Session,
        member_path: &str,
        id: &EntityId,
    ) -> Result<Vec<SharedEntity>, Error> {
        let want = Value::from(id.clone());
        let segments: Vec<&str> = member_path.split('.').collect();
        let matching: Vec<Document> = self
            .docs
            .lock()
            .unwrap()
            .values()
            .filter(|doc| element_matches(&Value::Document((*doc).clone()), &segments, &want))
            .cloned()
            .collect();

        matching
            .iter()
            .map(|doc| self.materialize(session, doc))
            .collect()
    }

    fn create_on_store(&self, _session: &Session, entity: &SharedEntity) -> Result<(), Error> {
        let guard = entity.read().unwrap();
        let id = guard
            .entity_id()
            .ok_or_else(|| Error::store("document has no identifier"))?;
        let doc = entity_to_document(&*guard);
        drop(guard);

        self.docs.lock().unwrap().insert(id, doc);
        Ok(())
    }

    fn replace_on_store(
        &self,
        _session: &Session,
        entity: &SharedEntity,
        _cascade_sync: bool,
    ) -> Result<(), Error> {
        let guard = entity.read().unwrap();
        let id = guard
            .entity_id()
            .ok_or_else(|| Error::store("document has no identifier"))?;
        let doc = entity_to_document(&*guard);
        drop(guard);

        if self.fail_replace.lock().unwrap().contains(&id) {
            return Err(Error::store(format!("replace rejected for {id}")));
        }
        self.replace_log.lock().unwrap().push(id.clone());
        self.docs.lock().unwrap().insert(id, doc);
        Ok(())
    }

    fn delete_on_store(&self, _session: &Session, entity: &SharedEntity) -> Result<(), Error> {
        let id = entity
            .read()
            .unwrap()
            .entity_id()
            .ok_or_else(|| Error::store("document has no identifier"))?;

        if self.fail_delete.lock().unwrap().contains(&id) {
            return Err(Error::store(format!("delete rejected for {id}")));
        }
        self.delete_log.lock().unwrap().push(id.clone());
        self.docs.lock().unwrap().remove(&id);
        Ok(())
    }
}

// Dotted-path matcher mirroring the wire-path grammar: `$` fans over list
// elements, `$*` over map values.
fn element_matches(value: &Value, segments: &[&str], want: &Value) -> bool {
    let Some((segment, rest)) = segments.split_first() else {
        return value == want;
    };

    match (*segment, value) {
        ("$", Value::List(items)) => items.iter().any(|item| element_matches(item, rest, want)),
        ("$" | "$*", Value::Document(doc)) => {
            doc.values().any(|item| element_matches(item, rest, want))
        }
        (name, Value::Document(doc)) => doc
            .get(name)
            .is_some_and(|item| element_matches(item, rest, want)),
        _ => false,
    }
}

///
/// CountingSink
/// Captures obs events as (kind, discriminator) pairs.
///

#[derive(Default)]
pub(crate) struct CountingSink {
    events: Mutex<Vec<(&'static str, String)>>,
}

impl CountingSink {
    pub fn count(&self, kind: &str) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| *k == kind)
            .count()
    }
}

impl ObsSink for CountingSink {
    fn record(&self, event: ObsEvent<'_>) {
        let (kind, disc) = match event {
            ObsEvent::ResolveHit { discriminator } => ("resolve_hit", discriminator),
            ObsEvent::ResolveMiss { discriminator } => ("resolve_miss", discriminator),
            ObsEvent::SummaryMerge { discriminator } => ("summary_merge", discriminator),
            ObsEvent::CascadeLeafDelete { discriminator } => ("cascade_leaf_delete", discriminator),
            ObsEvent::CascadeLeafSuppressed { discriminator } => {
                ("cascade_leaf_suppressed", discriminator)
            }
            ObsEvent::RefreshReplaceSuppressed { discriminator } => {
                ("refresh_replace_suppressed", discriminator)
            }
        };
        self.events.lock().unwrap().push((kind, disc.to_string()));
    }
}
