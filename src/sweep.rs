//! Sweep orchestration.
//!
//! Builds the lock, the shared resource and one worker per partition, starts
//! every worker before joining any of them (fork-join), then reads the final
//! shared state.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::checksum::Modulus;
use crate::emit::Emitter;
use crate::error::{Result, SweepError};
use crate::fingerprint::{DEFAULT_FINGERPRINT_WIDTH, Target};
use crate::lock::{Lock, LockKind};
use crate::partition::{self, MAX_WORKERS};
use crate::resource::SharedResource;
use crate::worker::{Mode, Shared, Worker, WorkerStats};

/// Value reported by search mode when no number matched.
pub const NOT_FOUND: i64 = -1;

/// Everything one sweep needs to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepConfig {
    pub lock_kind: LockKind,
    pub lower: i64,
    pub upper: i64,
    pub modulus: Modulus,
    pub workers: usize,
    pub mode: Mode,
    /// Required in search mode, ignored otherwise.
    pub target: Option<Target>,
    pub fingerprint_width: usize,
}

impl SweepConfig {
    pub fn new(
        lock_kind: LockKind,
        lower: i64,
        upper: i64,
        modulus: Modulus,
        workers: usize,
        mode: Mode,
    ) -> Self {
        Self {
            lock_kind,
            lower,
            upper,
            modulus,
            workers,
            mode,
            target: None,
            fingerprint_width: DEFAULT_FINGERPRINT_WIDTH,
        }
    }

    pub fn with_target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_fingerprint_width(mut self, width: usize) -> Self {
        self.fingerprint_width = width;
        self
    }

    /// Check every constraint that can be checked before threads exist.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 || self.workers > MAX_WORKERS {
            return Err(SweepError::InvalidWorkerCount(
                i64::try_from(self.workers).unwrap_or(i64::MAX),
            ));
        }
        if self.upper < self.lower {
            return Err(SweepError::InvalidRange {
                lower: self.lower,
                upper: self.upper,
            });
        }
        if self.mode == Mode::Search {
            if self.target.is_none() {
                return Err(SweepError::MissingTarget);
            }
            if self.fingerprint_width == 0 {
                return Err(SweepError::InvalidFingerprintWidth);
            }
        }
        Ok(())
    }
}

/// Final value of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepOutcome {
    /// Tally mode: number of checksum matches.
    Count(u64),
    /// List mode: matches were streamed while the sweep ran; this is their
    /// count.
    Listed(u64),
    /// Search mode: the recorded number, if any.
    Found(Option<i64>),
}

impl SweepOutcome {
    /// The scalar handed back to the caller: the count, the found number, or
    /// [`NOT_FOUND`].
    pub fn value(&self) -> i64 {
        match *self {
            SweepOutcome::Count(n) | SweepOutcome::Listed(n) => {
                i64::try_from(n).unwrap_or(i64::MAX)
            }
            SweepOutcome::Found(found) => found.unwrap_or(NOT_FOUND),
        }
    }

    /// Plain-text rendering written after the sweep.
    ///
    /// Tally prints the count on its own line. Search prints the number with
    /// no trailing newline. List prints nothing more.
    pub fn render(&self) -> Option<String> {
        match self {
            SweepOutcome::Count(n) => Some(format!("{n}\n")),
            SweepOutcome::Listed(_) => None,
            SweepOutcome::Found(_) => Some(self.value().to_string()),
        }
    }
}

impl fmt::Display for SweepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl Serialize for SweepOutcome {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.value())
    }
}

/// Outcome plus the bookkeeping gathered along the way.
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub mode: Mode,
    pub lock: LockKind,
    pub workers: usize,
    #[serde(rename = "result")]
    pub outcome: SweepOutcome,
    #[serde(rename = "elapsed_ms", serialize_with = "as_millis")]
    pub elapsed: Duration,
    #[serde(skip)]
    pub worker_stats: Vec<WorkerStats>,
}

impl SweepReport {
    /// Numbers actually scanned across all workers.
    pub fn scanned(&self) -> u64 {
        self.worker_stats.iter().map(|s| s.scanned).sum()
    }
}

fn as_millis<S: serde::Serializer>(
    elapsed: &Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
}

/// Run one sweep to completion.
///
/// `emitter` receives list-mode matches; other modes never call it.
pub fn run_sweep(config: &SweepConfig, emitter: Arc<dyn Emitter>) -> Result<SweepReport> {
    config.validate()?;
    let partitions = partition::split(config.lower, config.upper, config.workers)?;

    let resource = match (config.mode, &config.target) {
        (Mode::Search, Some(target)) => SharedResource::search(target.clone()),
        (Mode::Search, None) => return Err(SweepError::MissingTarget),
        (Mode::Tally | Mode::List, _) => SharedResource::tally(),
    };
    let shared = Shared {
        lock: Arc::new(Lock::new(config.lock_kind)),
        resource: Arc::new(resource),
        emitter,
    };

    let mut workers = partitions
        .into_iter()
        .enumerate()
        .map(|(id, part)| {
            Worker::new(
                id,
                part,
                config.modulus,
                config.mode,
                shared.clone(),
                config.fingerprint_width,
            )
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::info!(
        mode = %config.mode,
        lock = %config.lock_kind,
        workers = config.workers,
        lower = config.lower,
        upper = config.upper,
        modulus = config.modulus.get(),
        "starting sweep"
    );
    let started = Instant::now();

    let mut first_error = None;
    for worker in &mut workers {
        if let Err(e) = worker.start() {
            first_error = Some(e);
            break;
        }
    }

    // Join everything that did start, even after a failure, so no thread
    // outlives the run.
    let mut worker_stats = Vec::with_capacity(workers.len());
    for worker in &mut workers {
        match worker.wait() {
            Ok(Some(stats)) => worker_stats.push(stats),
            Ok(None) => {}
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }
    if let Some(e) = first_error {
        return Err(e);
    }

    let outcome = match config.mode {
        Mode::Tally => SweepOutcome::Count(shared.resource.as_tally().map_or(0, |t| t.count())),
        Mode::List => SweepOutcome::Listed(shared.resource.as_tally().map_or(0, |t| t.count())),
        Mode::Search => SweepOutcome::Found(shared.resource.as_search().and_then(|s| s.found())),
    };
    let elapsed = started.elapsed();

    tracing::info!(
        result = %outcome,
        elapsed_ms = elapsed.as_millis() as u64,
        "sweep finished"
    );

    Ok(SweepReport {
        mode: config.mode,
        lock: config.lock_kind,
        workers: config.workers,
        outcome,
        elapsed,
        worker_stats,
    })
}
