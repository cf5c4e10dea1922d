//! Pluggable mutual exclusion
//!
//! Sweeps guard their shared state with a lock chosen once per run:
//!
//! ```text
//! ┌──────────────┐     ┌───────────────┐     ┌─────────────────────────┐
//! │ LockKind     │────▶│ Lock (enum)   │────▶│ SpinLock                │
//! │ 0 = spin     │     │ RawLock impl  │     │ atomic swap + backoff   │
//! │ 1 = blocking │     │               │────▶│ BlockingLock            │
//! └──────────────┘     └───────────────┘     │ Mutex<bool> + Condvar   │
//!                                            └─────────────────────────┘
//! ```
//!
//! Both variants expose the same [`RawLock`] capability set. Callers should
//! prefer [`RawLock::lock`], which returns a [`LockGuard`] that releases the
//! lock when it goes out of scope, including on early return and unwinding.
//!
//! Neither variant is reentrant: acquiring twice from the same thread
//! deadlocks.

mod blocking;
mod spin;

pub use blocking::BlockingLock;
pub use spin::SpinLock;

use serde::Serialize;
use std::fmt;

use crate::error::SweepError;

/// Exclusive acquire/release capability shared by every lock variant.
pub trait RawLock: Send + Sync {
    /// Block until this thread holds the lock.
    fn acquire(&self);

    /// Take the lock only if it is free right now.
    fn try_acquire(&self) -> bool;

    /// Give the lock up. Must only be called by the current holder and
    /// never blocks.
    fn release(&self);

    /// Acquire and return a guard that releases on drop.
    fn lock(&self) -> LockGuard<'_, Self>
    where
        Self: Sized,
    {
        self.acquire();
        LockGuard { lock: self }
    }

    /// Non-blocking variant of [`RawLock::lock`].
    #[cfg(test)]
    fn try_lock(&self) -> Option<LockGuard<'_, Self>>
    where
        Self: Sized,
    {
        self.try_acquire().then(|| LockGuard { lock: self })
    }
}

/// Scope-bound hold on a [`RawLock`].
///
/// Holding a guard is also the proof that shared-resource mutators ask for.
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct LockGuard<'a, L: RawLock + ?Sized> {
    lock: &'a L,
}

impl<L: RawLock + ?Sized> Drop for LockGuard<'_, L> {
    fn drop(&mut self) {
        self.lock.release();
    }
}

impl<L: RawLock + ?Sized> fmt::Debug for LockGuard<'_, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockGuard").finish_non_exhaustive()
    }
}

/// Which lock implementation a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LockKind {
    /// Busy-waiting test-and-set lock.
    Spin,
    /// Thread-suspending mutex/condition lock.
    Blocking,
}

impl TryFrom<i64> for LockKind {
    type Error = SweepError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(LockKind::Spin),
            1 => Ok(LockKind::Blocking),
            other => Err(SweepError::InvalidLockKind(other)),
        }
    }
}

impl fmt::Display for LockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockKind::Spin => f.write_str("spin"),
            LockKind::Blocking => f.write_str("blocking"),
        }
    }
}

/// Run-time selected lock.
///
/// Enum dispatch keeps the hot path free of virtual calls while still
/// letting the variant be chosen from configuration.
#[derive(Debug)]
pub enum Lock {
    Spin(SpinLock),
    Blocking(BlockingLock),
}

impl Lock {
    pub fn new(kind: LockKind) -> Self {
        match kind {
            LockKind::Spin => Lock::Spin(SpinLock::new()),
            LockKind::Blocking => Lock::Blocking(BlockingLock::new()),
        }
    }

    pub fn kind(&self) -> LockKind {
        match self {
            Lock::Spin(_) => LockKind::Spin,
            Lock::Blocking(_) => LockKind::Blocking,
        }
    }
}

impl RawLock for Lock {
    #[inline]
    fn acquire(&self) {
        match self {
            Lock::Spin(lock) => lock.acquire(),
            Lock::Blocking(lock) => lock.acquire(),
        }
    }

    #[inline]
    fn try_acquire(&self) -> bool {
        match self {
            Lock::Spin(lock) => lock.try_acquire(),
            Lock::Blocking(lock) => lock.try_acquire(),
        }
    }

    #[inline]
    fn release(&self) {
        match self {
            Lock::Spin(lock) => lock.release(),
            Lock::Blocking(lock) => lock.release(),
        }
    }
}
