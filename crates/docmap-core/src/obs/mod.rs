//! Observability boundary.
//!
//! Core flows never touch counter state directly; every signal goes
//! through `ObsEvent` and an `ObsSink`. The default sink feeds the
//! process-wide counters below, and tests install a scoped override to
//! capture events. Suppressed best-effort failures (cascade leaves,
//! dependent-document refreshes) are counted here — they never surface as
//! errors anywhere else.

use std::{
    cell::RefCell,
    sync::Mutex,
};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<*const dyn ObsSink>> = const { RefCell::new(None) };
}

///
/// ObsEvent
///

#[derive(Clone, Copy, Debug)]
pub enum ObsEvent<'a> {
    ResolveHit { discriminator: &'a str },
    ResolveMiss { discriminator: &'a str },
    SummaryMerge { discriminator: &'a str },
    CascadeLeafDelete { discriminator: &'a str },
    CascadeLeafSuppressed { discriminator: &'a str },
    RefreshReplaceSuppressed { discriminator: &'a str },
}

///
/// ObsSink
///

pub trait ObsSink {
    fn record(&self, event: ObsEvent<'_>);
}

///
/// ObsCounters
/// Ephemeral, in-memory counters for resolution and cascade activity.
///

#[derive(Clone, Debug, Default)]
pub struct ObsCounters {
    pub resolve_hits: u64,
    pub resolve_misses: u64,
    pub summary_merges: u64,
    pub cascade_leaf_deletes: u64,
    pub cascade_leaf_suppressed: u64,
    pub refresh_replace_suppressed: u64,
}

impl ObsCounters {
    const fn empty() -> Self {
        Self {
            resolve_hits: 0,
            resolve_misses: 0,
            summary_merges: 0,
            cascade_leaf_deletes: 0,
            cascade_leaf_suppressed: 0,
            refresh_replace_suppressed: 0,
        }
    }
}

static COUNTERS: Mutex<ObsCounters> = Mutex::new(ObsCounters::empty());

/// GlobalObsSink
/// Default process-local sink writing into the global counters.

struct GlobalObsSink;

impl ObsSink for GlobalObsSink {
    fn record(&self, event: ObsEvent<'_>) {
        let mut counters = COUNTERS.lock().expect("obs counters lock poisoned");
        match event {
            ObsEvent::ResolveHit { .. } => {
                counters.resolve_hits = counters.resolve_hits.saturating_add(1);
            }
            ObsEvent::ResolveMiss { .. } => {
                counters.resolve_misses = counters.resolve_misses.saturating_add(1);
            }
            ObsEvent::SummaryMerge { .. } => {
                counters.summary_merges = counters.summary_merges.saturating_add(1);
            }
            ObsEvent::CascadeLeafDelete { .. } => {
                counters.cascade_leaf_deletes = counters.cascade_leaf_deletes.saturating_add(1);
            }
            ObsEvent::CascadeLeafSuppressed { .. } => {
                counters.cascade_leaf_suppressed =
                    counters.cascade_leaf_suppressed.saturating_add(1);
            }
            ObsEvent::RefreshReplaceSuppressed { .. } => {
                counters.refresh_replace_suppressed =
                    counters.refresh_replace_suppressed.saturating_add(1);
            }
        }
    }
}

const GLOBAL_OBS_SINK: GlobalObsSink = GlobalObsSink;

pub(crate) fn record(event: ObsEvent<'_>) {
    let override_ptr = SINK_OVERRIDE.with(|cell| *cell.borrow());
    if let Some(ptr) = override_ptr {
        // SAFETY: the pointer was produced from a live `&dyn ObsSink` in
        // `with_obs_sink`, which restores the previous slot on every exit
        // path (including unwind) before the borrow ends, and `record`
        // only dereferences it synchronously as a shared reference.
        unsafe { (*ptr).record(event) };
    } else {
        GLOBAL_OBS_SINK.record(event);
    }
}

/// Snapshot the process counters.
#[must_use]
pub fn counters() -> ObsCounters {
    COUNTERS.lock().expect("obs counters lock poisoned").clone()
}

/// Reset the process counters.
pub fn reset_counters() {
    *COUNTERS.lock().expect("obs counters lock poisoned") = ObsCounters::empty();
}

/// Run a closure with a temporary sink override on this thread. Events
/// recorded inside `f` go to `sink` instead of the process counters;
/// overrides nest, and the previous sink is restored even on panic.
pub fn with_obs_sink<T>(sink: &dyn ObsSink, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<*const dyn ObsSink>);

    impl Drop for Guard {
        fn drop(&mut self) {
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = self.0;
            });
        }
    }

    // SAFETY: the raw pointer never outlives `sink`; the guard restores
    // the previous slot when this frame returns or unwinds, and nothing
    // stores the pointer beyond the thread-local slot.
    let sink_ptr = unsafe { std::mem::transmute::<&dyn ObsSink, *const dyn ObsSink>(sink) };

    let previous = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink_ptr));
    let _guard = Guard(previous);
    f()
}
