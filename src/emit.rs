//! Sinks for list-mode matches.
//!
//! Workers call [`Emitter::emit`] while holding the run's lock, so a sink sees
//! ordinals in the order they were assigned even though the numbers arrive
//! interleaved across workers.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

/// Receives `(ordinal, number)` pairs from list-mode workers.
pub trait Emitter: Send + Sync {
    fn emit(&self, ordinal: u64, number: i64);
}

/// Writes `"<ordinal> <number>"` lines to standard output.
///
/// The first write error is logged and remembered; later lines are dropped.
/// Callers check [`StdoutEmitter::failed`] once the sweep is over.
#[derive(Debug, Default)]
pub struct StdoutEmitter {
    failed: AtomicBool,
}

impl StdoutEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any line could not be written.
    pub fn failed(&self) -> bool {
        self.failed.load(Ordering::Relaxed)
    }

    fn record(&self, written: io::Result<()>) {
        if let Err(e) = written {
            if !self.failed.swap(true, Ordering::Relaxed) {
                tracing::warn!(error = %e, "failed to write list output, dropping further lines");
            }
        }
    }
}

impl Emitter for StdoutEmitter {
    fn emit(&self, ordinal: u64, number: i64) {
        if self.failed() {
            return;
        }
        self.record(writeln!(io::stdout().lock(), "{ordinal} {number}"));
    }
}

/// Discards everything. Used by modes that never emit.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEmitter;

impl Emitter for NullEmitter {
    fn emit(&self, _ordinal: u64, _number: i64) {}
}

/// Keeps every emitted pair in memory, in emission order.
#[derive(Debug, Default)]
pub struct CollectingEmitter {
    lines: Mutex<Vec<(u64, i64)>>,
}

impl CollectingEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the pairs emitted so far.
    pub fn lines(&self) -> Vec<(u64, i64)> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Emitter for CollectingEmitter {
    fn emit(&self, ordinal: u64, number: i64) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((ordinal, number));
    }
}
