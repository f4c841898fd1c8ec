use crate::model::EntityModel;
use std::{
    collections::BTreeSet,
    ops::{Deref, DerefMut},
};

///
/// AuditPause
///
/// Scoped suspension of an entity's change auditing. The prior
/// enabled/disabled state is restored on drop, so a panicking merge still
/// leaves auditing the way it found it.
///

pub struct AuditPause<'a> {
    entity: &'a mut dyn EntityModel,
    was_enabled: bool,
}

impl<'a> AuditPause<'a> {
    pub fn new(entity: &'a mut dyn EntityModel) -> Self {
        let was_enabled = entity.is_auditing_enabled();
        entity.disable_auditing();
        Self {
            entity,
            was_enabled,
        }
    }
}

impl<'a> Deref for AuditPause<'a> {
    type Target = dyn EntityModel + 'a;

    fn deref(&self) -> &Self::Target {
        self.entity
    }
}

impl DerefMut for AuditPause<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.entity
    }
}

impl Drop for AuditPause<'_> {
    fn drop(&mut self) {
        if self.was_enabled {
            self.entity.enable_auditing();
        }
    }
}

/// Merge a freshly deserialized candidate into the cached instance for the
/// same identifier, in place, and return the updated setted-member set.
///
/// Only members the cached instance has never seen are copied, so richer
/// data is never overwritten by poorer data and merging the same candidate
/// twice is a no-op the second time. The copy itself runs with auditing
/// paused: reconciliation is not a user edit.
pub fn merge_summary(
    cached: &mut dyn EntityModel,
    candidate: &dyn EntityModel,
) -> BTreeSet<String> {
    // A non-summary candidate (a full load) contributes every populated
    // member; a summary candidate contributes its setted members only.
    let source_members = if candidate.is_summary() {
        candidate.setted_member_names()
    } else {
        candidate.member_names()
    };

    let already_setted = cached.setted_member_names();
    let new_members: BTreeSet<String> = source_members
        .difference(&already_setted)
        .cloned()
        .collect();

    if new_members.is_empty() {
        return already_setted;
    }

    {
        let mut paused = AuditPause::new(cached);
        for name in &new_members {
            if let Some(value) = candidate.get_member(name) {
                paused.set_member(name, value);
            }
        }
    }

    cached.set_as_summary(new_members);
    cached.setted_member_names()
}
