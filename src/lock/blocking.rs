use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use super::RawLock;

/// Monitor-style lock that suspends waiting threads.
///
/// The `held` flag is guarded by a platform mutex; waiters park on the
/// condition variable until a release clears the flag and wakes one of them.
#[derive(Debug, Default)]
pub struct BlockingLock {
    held: Mutex<bool>,
    released: Condvar,
}

impl BlockingLock {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn is_locked(&self) -> bool {
        *self.state()
    }

    // The inner mutex is never held across user code, so poisoning carries no
    // meaning here.
    fn state(&self) -> MutexGuard<'_, bool> {
        self.held.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RawLock for BlockingLock {
    fn acquire(&self) {
        let mut held = self.state();
        while *held {
            held = self
                .released
                .wait(held)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *held = true;
    }

    fn try_acquire(&self) -> bool {
        let mut held = self.state();
        if *held {
            return false;
        }
        *held = true;
        true
    }

    fn release(&self) {
        *self.state() = false;
        self.released.notify_one();
    }
}
