use crate::{
    ID_KEY,
    field::FieldKind,
    schema::TypeSchema,
};
use std::{
    collections::BTreeSet,
    fmt::{self, Display},
    sync::Arc,
};

///
/// PathStep
///
/// One step of a reference path. Paths are derived once at registration
/// time and walked generically at delete time.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PathStep {
    /// Read the named member of the current entity or embedded document.
    Field(String),

    /// Fan out over the elements of the current sequence.
    Element,

    /// Fan out over the values of the current mapping.
    MapValue,
}

///
/// ReferencePath
///
/// Ordered route from an owning entity type down to a referenced entity's
/// identifier. A path never passes through another reference: the terminal
/// reference is always exactly one entity hop from the declaring type.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReferencePath {
    pub steps: Vec<PathStep>,
    pub target: String,
    pub cascade: bool,
}

impl Display for ReferencePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            match step {
                PathStep::Field(name) => write!(f, "{name}.")?,
                PathStep::Element => write!(f, "$.")?,
                PathStep::MapValue => write!(f, "$*.")?,
            }
        }
        write!(f, "{ID_KEY}")
    }
}

/// Derive every reference path declared by `schema`, in member order.
///
/// `lookup` resolves embedded target schemas by name; embedded members whose
/// target is not registered contribute no paths. The caller is responsible
/// for cascade filtering and de-duplication by path string.
pub fn derive_reference_paths(
    schema: &TypeSchema,
    lookup: &dyn Fn(&str) -> Option<Arc<TypeSchema>>,
) -> Vec<ReferencePath> {
    let mut out = Vec::new();
    let mut visiting = BTreeSet::from([schema.name().to_string()]);

    collect_schema(schema, &[], &mut out, lookup, &mut visiting);
    out
}

fn collect_schema(
    schema: &TypeSchema,
    prefix: &[PathStep],
    out: &mut Vec<ReferencePath>,
    lookup: &dyn Fn(&str) -> Option<Arc<TypeSchema>>,
    visiting: &mut BTreeSet<String>,
) {
    for field in schema.effective_fields() {
        let mut steps = prefix.to_vec();
        steps.push(PathStep::Field(field.name.clone()));
        collect_kind(&field.kind, steps, out, lookup, visiting);
    }
}

fn collect_kind(
    kind: &FieldKind,
    steps: Vec<PathStep>,
    out: &mut Vec<ReferencePath>,
    lookup: &dyn Fn(&str) -> Option<Arc<TypeSchema>>,
    visiting: &mut BTreeSet<String>,
) {
    match kind {
        FieldKind::Scalar | FieldKind::Id => {}

        // Terminal: paths stop at the first reference, never descending
        // into the target's own references.
        FieldKind::Reference { target, cascade } => out.push(ReferencePath {
            steps,
            target: target.clone(),
            cascade: *cascade,
        }),

        FieldKind::Embedded { target } => {
            let Some(embedded) = lookup(target) else {
                return;
            };
            // Embedded cycles would loop forever; each embedded schema is
            // entered at most once per derivation.
            if !visiting.insert(embedded.name().to_string()) {
                return;
            }
            collect_schema(&embedded, &steps, out, lookup, visiting);
            visiting.remove(embedded.name());
        }

        FieldKind::List(inner) => {
            let mut steps = steps;
            steps.push(PathStep::Element);
            collect_kind(inner, steps, out, lookup, visiting);
        }

        FieldKind::Map(inner) => {
            let mut steps = steps;
            steps.push(PathStep::MapValue);
            collect_kind(inner, steps, out, lookup, visiting);
        }
    }
}
