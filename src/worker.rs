//! Range-scanning worker threads.
//!
//! A worker owns one [`Partition`] and moves through
//! `Created → Running → Completed`. Its scan loop checks the shared stop
//! signal on every iteration, applies the checksum, and performs the
//! mode-specific work on a pass:
//!
//! - tally: lock, increment, unlock
//! - list: lock, increment, emit `(ordinal, number)`, unlock
//! - search: fingerprint outside the lock; only on a match lock and record

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::checksum::{self, Modulus};
use crate::emit::Emitter;
use crate::error::{Result, SweepError};
use crate::fingerprint::Fingerprinter;
use crate::lock::{Lock, RawLock};
use crate::partition::Partition;
use crate::resource::{Search, SharedResource, Tally};

/// What a worker does with numbers that pass the checksum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Count matches.
    Tally,
    /// Count matches and emit each with its ordinal.
    List,
    /// Find the number whose fingerprint equals the target.
    Search,
}

impl TryFrom<i64> for Mode {
    type Error = SweepError;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            0 => Ok(Mode::Tally),
            1 => Ok(Mode::List),
            2 => Ok(Mode::Search),
            other => Err(SweepError::InvalidMode(other)),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Tally => f.write_str("tally"),
            Mode::List => f.write_str("list"),
            Mode::Search => f.write_str("search"),
        }
    }
}

/// Handles every worker of a run shares.
#[derive(Clone)]
pub struct Shared {
    pub lock: Arc<Lock>,
    pub resource: Arc<SharedResource>,
    pub emitter: Arc<dyn Emitter>,
}

impl fmt::Debug for Shared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shared")
            .field("lock", &self.lock.kind())
            .field("resource", &self.resource)
            .finish_non_exhaustive()
    }
}

/// Lifecycle of a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Created,
    Running,
    Completed,
}

/// Counters a worker reports when it completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkerStats {
    pub worker_id: usize,
    /// Numbers taken from the partition.
    pub scanned: u64,
    /// Numbers that passed the checksum.
    pub passed: u64,
    /// Whether the stop signal ended the scan before the partition did.
    pub stopped_early: bool,
    /// Whether this worker filled the search slot.
    pub recorded: bool,
}

/// One partition, one OS thread.
#[derive(Debug)]
pub struct Worker {
    id: usize,
    partition: Partition,
    modulus: Modulus,
    mode: Mode,
    shared: Shared,
    fingerprinter: Option<Fingerprinter>,
    state: WorkerState,
    handle: Option<JoinHandle<WorkerStats>>,
    stats: Option<WorkerStats>,
}

impl Worker {
    /// Configure a worker. Search mode needs a search resource and builds a
    /// private fingerprinting context of the given width.
    pub fn new(
        id: usize,
        partition: Partition,
        modulus: Modulus,
        mode: Mode,
        shared: Shared,
        fingerprint_width: usize,
    ) -> Result<Self> {
        let fingerprinter = match (mode, shared.resource.as_ref()) {
            (Mode::Search, SharedResource::Search(_)) => {
                Some(Fingerprinter::new(fingerprint_width)?)
            }
            (Mode::Tally | Mode::List, SharedResource::Tally(_)) => None,
            _ => return Err(SweepError::ResourceMismatch { mode }),
        };

        Ok(Self {
            id,
            partition,
            modulus,
            mode,
            shared,
            fingerprinter,
            state: WorkerState::Created,
            handle: None,
            stats: None,
        })
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Spawn the scan thread.
    ///
    /// A worker runs at most once; any further call is a caller bug. It is
    /// logged at error level and returned as [`SweepError::AlreadyStarted`].
    pub fn start(&mut self) -> Result<()> {
        if self.state != WorkerState::Created {
            tracing::error!(worker = self.id, state = ?self.state, "worker started twice");
            return Err(SweepError::AlreadyStarted { worker: self.id });
        }

        let scan = Scan {
            id: self.id,
            partition: self.partition,
            modulus: self.modulus,
            mode: self.mode,
            shared: self.shared.clone(),
            fingerprinter: self.fingerprinter.take(),
        };

        let handle = thread::Builder::new()
            .name(format!("sweep-worker-{}", self.id))
            .spawn(move || scan.run())
            .map_err(|e| SweepError::SpawnFailed {
                worker: self.id,
                reason: e.to_string(),
            })?;

        tracing::trace!(
            worker = self.id,
            start = self.partition.start,
            end = self.partition.end,
            "worker started"
        );
        self.handle = Some(handle);
        self.state = WorkerState::Running;
        Ok(())
    }

    /// Block until the scan finishes.
    ///
    /// Returns `None` for a worker that was never started. Waiting again on a
    /// completed worker returns the same stats.
    pub fn wait(&mut self) -> Result<Option<WorkerStats>> {
        let Some(handle) = self.handle.take() else {
            return Ok(self.stats);
        };

        self.state = WorkerState::Completed;
        let stats = handle
            .join()
            .map_err(|_| SweepError::WorkerPanicked { worker: self.id })?;

        tracing::debug!(
            worker = stats.worker_id,
            scanned = stats.scanned,
            passed = stats.passed,
            stopped_early = stats.stopped_early,
            "worker completed"
        );
        self.stats = Some(stats);
        Ok(self.stats)
    }
}

/// Everything the scan thread owns.
struct Scan {
    id: usize,
    partition: Partition,
    modulus: Modulus,
    mode: Mode,
    shared: Shared,
    fingerprinter: Option<Fingerprinter>,
}

/// Mode-specific work resolved once, before the loop starts.
enum Task<'a> {
    Count(&'a Tally),
    List(&'a Tally, &'a dyn Emitter),
    Search(&'a Search, Fingerprinter),
}

impl Scan {
    fn run(mut self) -> WorkerStats {
        let mut stats = WorkerStats {
            worker_id: self.id,
            ..WorkerStats::default()
        };

        let resource = self.shared.resource.as_ref();
        let lock = self.shared.lock.as_ref();
        let mut task = match (self.mode, resource, self.fingerprinter.take()) {
            (Mode::Tally, SharedResource::Tally(tally), _) => Task::Count(tally),
            (Mode::List, SharedResource::Tally(tally), _) => {
                Task::List(tally, self.shared.emitter.as_ref())
            }
            (Mode::Search, SharedResource::Search(search), Some(fingerprinter)) => {
                Task::Search(search, fingerprinter)
            }
            // Worker::new rejects every other combination.
            _ => return stats,
        };

        for number in self.partition {
            if resource.should_stop() {
                stats.stopped_early = true;
                break;
            }
            stats.scanned += 1;

            if !checksum::passes(number, self.modulus) {
                continue;
            }
            stats.passed += 1;

            match &mut task {
                Task::Count(tally) => {
                    let guard = lock.lock();
                    tally.increment(&guard);
                }
                Task::List(tally, emitter) => {
                    let guard = lock.lock();
                    let ordinal = tally.increment(&guard);
                    emitter.emit(ordinal, number);
                }
                Task::Search(search, fingerprinter) => {
                    if !fingerprinter.matches(number, search.target()) {
                        continue;
                    }
                    let guard = lock.lock();
                    if search.record(&guard, number) {
                        stats.recorded = true;
                        tracing::info!(worker = self.id, number, "fingerprint match recorded");
                    }
                }
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::{CollectingEmitter, NullEmitter};
    use crate::fingerprint::{DEFAULT_FINGERPRINT_WIDTH, Target, digest};
    use crate::lock::LockKind;

    fn shared(resource: SharedResource) -> Shared {
        Shared {
            lock: Arc::new(Lock::new(LockKind::Spin)),
            resource: Arc::new(resource),
            emitter: Arc::new(NullEmitter),
        }
    }

    fn worker(mode: Mode, shared: Shared, start: i64, end: i64) -> Worker {
        Worker::new(
            0,
            Partition { start, end },
            Modulus::new(10).unwrap(),
            mode,
            shared,
            DEFAULT_FINGERPRINT_WIDTH,
        )
        .unwrap()
    }

    #[test]
    fn test_mode_from_selector() {
        assert_eq!(Mode::try_from(0), Ok(Mode::Tally));
        assert_eq!(Mode::try_from(1), Ok(Mode::List));
        assert_eq!(Mode::try_from(2), Ok(Mode::Search));
        assert_eq!(Mode::try_from(3), Err(SweepError::InvalidMode(3)));
    }

    #[test]
    fn test_lifecycle_transitions() {
        let shared = shared(SharedResource::tally());
        let mut w = worker(Mode::Tally, shared.clone(), 0, 20);
        assert_eq!(w.state(), WorkerState::Created);

        w.start().unwrap();
        assert_eq!(w.state(), WorkerState::Running);

        let stats = w.wait().unwrap().unwrap();
        assert_eq!(w.state(), WorkerState::Completed);
        assert_eq!(stats.scanned, 20);
        assert_eq!(stats.passed, 2);
        assert_eq!(shared.resource.as_tally().unwrap().count(), 2);

        // Waiting again is harmless and reports the same stats.
        assert_eq!(w.wait().unwrap(), Some(stats));
    }

    #[test]
    fn test_start_twice_is_rejected() {
        let mut w = worker(Mode::Tally, shared(SharedResource::tally()), 0, 5);
        w.start().unwrap();
        assert_eq!(w.start(), Err(SweepError::AlreadyStarted { worker: 0 }));
        let stats = w.wait().unwrap().unwrap();
        assert_eq!(w.start(), Err(SweepError::AlreadyStarted { worker: 0 }));

        // The rejected calls leave the finished run untouched
        assert_eq!(w.state(), WorkerState::Completed);
        assert_eq!(stats.scanned, 5);
        assert_eq!(w.wait().unwrap().map(|s| s.scanned), Some(5));
        assert!(SweepError::AlreadyStarted { worker: 0 }.to_string().contains("already started"));
    }

    #[test]
    fn test_wait_without_start_returns_immediately() {
        let mut w = worker(Mode::Tally, shared(SharedResource::tally()), 0, 5);
        assert_eq!(w.wait().unwrap(), None);
        assert_eq!(w.state(), WorkerState::Created);
    }

    #[test]
    fn test_list_mode_emits_inside_critical_section() {
        let sink = Arc::new(CollectingEmitter::new());
        let shared = Shared {
            emitter: sink.clone(),
            ..shared(SharedResource::tally())
        };
        let mut w = worker(Mode::List, shared, 0, 40);
        w.start().unwrap();
        w.wait().unwrap();

        let expected: Vec<i64> = (0..40)
            .filter(|&n| checksum::passes(n, Modulus::new(10).unwrap()))
            .collect();
        let lines = sink.lines();
        assert_eq!(lines.iter().map(|&(_, n)| n).collect::<Vec<_>>(), expected);
        assert_eq!(
            lines.iter().map(|&(o, _)| o).collect::<Vec<_>>(),
            (1..=expected.len() as u64).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_search_records_match_and_stops() {
        let target = Target::parse(&digest(18)).unwrap();
        let shared = shared(SharedResource::search(target));
        let mut w = worker(Mode::Search, shared.clone(), 0, 1_000);
        w.start().unwrap();
        let stats = w.wait().unwrap().unwrap();

        assert!(stats.recorded);
        assert!(stats.stopped_early);
        assert_eq!(stats.scanned, 19);
        assert_eq!(shared.resource.as_search().unwrap().found(), Some(18));
    }

    #[test]
    fn test_search_skips_numbers_failing_checksum() {
        // 17 fails mod 10 (7 + 2 = 9), so it is never fingerprinted.
        let target = Target::parse(&digest(17)).unwrap();
        let shared = shared(SharedResource::search(target));
        let mut w = worker(Mode::Search, shared.clone(), 0, 100);
        w.start().unwrap();
        let stats = w.wait().unwrap().unwrap();

        assert!(!stats.recorded);
        assert!(!stats.stopped_early);
        assert_eq!(shared.resource.as_search().unwrap().found(), None);
    }

    #[test]
    fn test_mode_resource_mismatch_rejected() {
        let err = Worker::new(
            0,
            Partition { start: 0, end: 1 },
            Modulus::new(3).unwrap(),
            Mode::Search,
            shared(SharedResource::tally()),
            DEFAULT_FINGERPRINT_WIDTH,
        )
        .unwrap_err();
        assert_eq!(err, SweepError::ResourceMismatch { mode: Mode::Search });
    }

    #[test]
    fn test_empty_partition_completes() {
        let mut w = worker(Mode::Tally, shared(SharedResource::tally()), 5, 5);
        w.start().unwrap();
        let stats = w.wait().unwrap().unwrap();
        assert_eq!(stats.scanned, 0);
    }
}
