use crate::cache::IdentityCache;
use std::sync::atomic::{AtomicU32, Ordering};

///
/// Session
///
/// One logical unit of work. Owns the scope's identity cache and the
/// ambient resolution modifiers. Scopes are private: nothing here is
/// shared across sessions, and the identity cache dies with the session.
///
/// Modifiers nest: each guard increments a counter on acquire and
/// decrements on drop, so overlapping scoped activations compose and the
/// flag only clears when the last guard releases.
///

#[derive(Default)]
pub struct Session {
    cache: IdentityCache,
    no_cache: AtomicU32,
    read_only_id: AtomicU32,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn cache(&self) -> &IdentityCache {
        &self.cache
    }

    /// While active, every resolution produces a fresh uncached instance.
    #[must_use]
    pub fn enable_no_cache(&self) -> NoCacheGuard<'_> {
        self.no_cache.fetch_add(1, Ordering::AcqRel);
        NoCacheGuard { session: self }
    }

    /// While active, first-sight summaries keep only their identifier.
    #[must_use]
    pub fn enable_read_only_id(&self) -> ReadOnlyIdGuard<'_> {
        self.read_only_id.fetch_add(1, Ordering::AcqRel);
        ReadOnlyIdGuard { session: self }
    }

    #[must_use]
    pub fn no_cache_enabled(&self) -> bool {
        self.no_cache.load(Ordering::Acquire) > 0
    }

    #[must_use]
    pub fn read_only_id_enabled(&self) -> bool {
        self.read_only_id.load(Ordering::Acquire) > 0
    }
}

///
/// NoCacheGuard
///

pub struct NoCacheGuard<'a> {
    session: &'a Session,
}

impl Drop for NoCacheGuard<'_> {
    fn drop(&mut self) {
        self.session.no_cache.fetch_sub(1, Ordering::AcqRel);
    }
}

///
/// ReadOnlyIdGuard
///

pub struct ReadOnlyIdGuard<'a> {
    session: &'a Session,
}

impl Drop for ReadOnlyIdGuard<'_> {
    fn drop(&mut self) {
        self.session.read_only_id.fetch_sub(1, Ordering::AcqRel);
    }
}
