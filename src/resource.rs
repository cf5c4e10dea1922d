//! State shared by every worker of one sweep.
//!
//! Mutators take a [`LockGuard`] as a witness that the caller is inside the
//! run's critical section. The fields themselves are atomics accessed with
//! relaxed ordering: exclusion and visibility come from the lock's
//! acquire/release edges, and reads after the workers are joined are ordered
//! by the join.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};

use crate::fingerprint::Target;
use crate::lock::{LockGuard, RawLock};

/// Counter of checksum matches. Never asks workers to stop.
#[derive(Debug, Default)]
pub struct Tally {
    count: AtomicU64,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bump the counter and return its new value, which doubles as the
    /// match's ordinal in list mode.
    #[inline]
    pub fn increment<L: RawLock + ?Sized>(&self, _held: &LockGuard<'_, L>) -> u64 {
        let next = self.count.load(Ordering::Relaxed) + 1;
        self.count.store(next, Ordering::Relaxed);
        next
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}

/// Slot for the first number whose fingerprint equals the target.
#[derive(Debug)]
pub struct Search {
    target: Target,
    found: AtomicBool,
    value: AtomicI64,
}

impl Search {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            found: AtomicBool::new(false),
            value: AtomicI64::new(0),
        }
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Record `number` unless another worker already did.
    ///
    /// Returns whether this call filled the slot. If two numbers collide on
    /// the target, the first worker to take the lock wins.
    pub fn record<L: RawLock + ?Sized>(&self, _held: &LockGuard<'_, L>, number: i64) -> bool {
        if self.found.load(Ordering::Relaxed) {
            return false;
        }
        self.value.store(number, Ordering::Relaxed);
        // Release so a worker that observes the flag also observes the value.
        self.found.store(true, Ordering::Release);
        true
    }

    /// The recorded number, if any.
    pub fn found(&self) -> Option<i64> {
        self.found
            .load(Ordering::Acquire)
            .then(|| self.value.load(Ordering::Relaxed))
    }

    /// Stop signal for the scan loop.
    ///
    /// Intentionally a relaxed, unsynchronized read. A worker that sees a
    /// stale `false` only scans a few extra numbers before the store
    /// propagates, which costs latency but never correctness. Do not
    /// strengthen this to a lock or a SeqCst load: it is read on every
    /// iteration of every worker.
    #[inline]
    pub fn should_stop(&self) -> bool {
        self.found.load(Ordering::Relaxed)
    }
}

/// Mode-dependent shared state of a run.
#[derive(Debug)]
pub enum SharedResource {
    Tally(Tally),
    Search(Search),
}

impl SharedResource {
    pub fn tally() -> Self {
        SharedResource::Tally(Tally::new())
    }

    pub fn search(target: Target) -> Self {
        SharedResource::Search(Search::new(target))
    }

    /// Whether workers should abandon the rest of their sub-range.
    #[inline]
    pub fn should_stop(&self) -> bool {
        match self {
            SharedResource::Tally(_) => false,
            SharedResource::Search(search) => search.should_stop(),
        }
    }

    pub fn as_tally(&self) -> Option<&Tally> {
        match self {
            SharedResource::Tally(tally) => Some(tally),
            SharedResource::Search(_) => None,
        }
    }

    pub fn as_search(&self) -> Option<&Search> {
        match self {
            SharedResource::Search(search) => Some(search),
            SharedResource::Tally(_) => None,
        }
    }
}
