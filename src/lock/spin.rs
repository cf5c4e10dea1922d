use crossbeam::utils::Backoff;
use std::sync::atomic::{AtomicBool, Ordering};

use super::RawLock;

/// Test-and-set spin lock.
///
/// `acquire` swaps the flag to locked and retries while it observes that the
/// flag was already set. Between attempts it only reads the flag, backing off
/// exponentially and eventually yielding, so waiters do not hammer the cache
/// line with writes. No fairness is provided.
#[derive(Debug, Default)]
pub struct SpinLock {
    locked: AtomicBool,
}

impl SpinLock {
    pub const fn new() -> Self {
        Self {
            locked: AtomicBool::new(false),
        }
    }

    /// Relaxed snapshot of the flag; waiters poll it between swaps.
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Relaxed)
    }
}

impl RawLock for SpinLock {
    fn acquire(&self) {
        let backoff = Backoff::new();
        while !self.try_acquire() {
            while self.is_locked() {
                backoff.snooze();
            }
        }
    }

    fn try_acquire(&self) -> bool {
        !self.locked.swap(true, Ordering::Acquire)
    }

    fn release(&self) {
        self.locked.store(false, Ordering::Release);
    }
}
