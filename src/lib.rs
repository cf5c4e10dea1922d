//! # digitsweep - parallel weighted-digit checksum sweeps
//!
//! Splits a half-open integer range `[lower, upper)` across worker threads.
//! Each worker tests its numbers against a weighted-digit checksum and, for
//! the numbers that pass, does one of three things:
//!
//! - **Tally**: bump a shared counter.
//! - **List**: bump the counter and emit `<ordinal> <number>`.
//! - **Search**: fingerprint the number with SHA-1 and compare it against a
//!   target digest; the first match stops every worker.
//!
//! Shared state is guarded by a pluggable lock: a spin lock or a blocking
//! (mutex and condvar) lock.
//!
//! ## Quick Start
//!
//! ```bash
//! # lock_kind lower upper modulus worker_count mode
//! echo "0 0 20 10 4 0" | digitsweep
//! 2
//! ```

pub mod checksum;
pub mod cli;
pub mod config;
pub mod emit;
pub mod error;
pub mod fingerprint;
pub mod lock;
pub mod partition;
pub mod resource;
pub mod sweep;
pub mod worker;

pub use checksum::{Modulus, passes, weighted_digit_sum};
pub use error::{Result, SweepError};
pub use fingerprint::{Fingerprinter, Target};
pub use lock::{Lock, LockGuard, LockKind, RawLock};
pub use partition::{MAX_WORKERS, Partition};
pub use sweep::{NOT_FOUND, SweepConfig, SweepOutcome, SweepReport, run_sweep};
pub use worker::Mode;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
