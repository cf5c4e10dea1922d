//! Error taxonomy for sweeps.
//!
//! Configuration errors are raised before any worker thread starts. Lifecycle
//! errors indicate a caller bug and are propagated, never swallowed.

use crate::worker::Mode;

/// Every failure mode a sweep can report.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SweepError {
    // === Configuration errors ===
    /// The lock selector was neither 0 (spin) nor 1 (blocking).
    #[error("Unknown lock kind {0}: expected 0 (spin) or 1 (blocking)")]
    InvalidLockKind(i64),

    /// The mode selector was not 0 (tally), 1 (list) or 2 (search).
    #[error("Unknown mode {0}: expected 0 (tally), 1 (list) or 2 (search)")]
    InvalidMode(i64),

    /// A sweep needs at least one worker and at most
    /// [`MAX_WORKERS`](crate::partition::MAX_WORKERS).
    #[error("Worker count must be between 1 and {max}, got {0}", max = crate::partition::MAX_WORKERS)]
    InvalidWorkerCount(i64),

    /// The exclusive upper bound lies below the inclusive lower bound.
    #[error("Invalid range: upper bound {upper} is below lower bound {lower}")]
    InvalidRange {
        /// Inclusive lower bound.
        lower: i64,
        /// Exclusive upper bound.
        upper: i64,
    },

    /// Search mode was selected without a target fingerprint.
    #[error("Search mode requires a target fingerprint")]
    MissingTarget,

    /// The target is not a 40 character hexadecimal SHA-1 digest.
    #[error("Invalid target fingerprint {0:?}: expected 40 hexadecimal characters")]
    InvalidFingerprint(String),

    /// The fingerprint padding width cannot be zero.
    #[error("Fingerprint width must be at least 1")]
    InvalidFingerprintWidth,

    /// A scalar in the input stream was missing or unparsable.
    #[error("Malformed input for {field}: {reason}")]
    MalformedInput {
        /// Name of the field being read.
        field: &'static str,
        /// What went wrong.
        reason: String,
    },

    /// The shared resource does not fit the worker's mode.
    #[error("Mode {mode} cannot run against this shared resource")]
    ResourceMismatch {
        /// Mode the worker was configured with.
        mode: Mode,
    },

    // === Arithmetic errors ===
    /// The checksum divisor was zero.
    #[error("Modulus must be nonzero")]
    ZeroModulus,

    // === Lifecycle errors ===
    /// `start()` was called on a worker that is already running or finished.
    #[error("Worker {worker} was already started")]
    AlreadyStarted {
        /// Index of the offending worker.
        worker: usize,
    },

    /// The operating system refused to spawn a worker thread.
    #[error("Failed to spawn worker {worker}: {reason}")]
    SpawnFailed {
        /// Index of the worker.
        worker: usize,
        /// Error reported by the OS.
        reason: String,
    },

    /// A worker thread panicked before completing its scan.
    #[error("Worker {worker} panicked during its scan")]
    WorkerPanicked {
        /// Index of the worker that panicked.
        worker: usize,
    },
}

impl SweepError {
    /// Whether this error was raised while validating configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SweepError::InvalidLockKind(_)
                | SweepError::InvalidMode(_)
                | SweepError::InvalidWorkerCount(_)
                | SweepError::InvalidRange { .. }
                | SweepError::MissingTarget
                | SweepError::InvalidFingerprint(_)
                | SweepError::InvalidFingerprintWidth
                | SweepError::MalformedInput { .. }
                | SweepError::ResourceMismatch { .. }
                | SweepError::ZeroModulus
        )
    }
}

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, SweepError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_classification() {
        assert!(SweepError::InvalidLockKind(7).is_configuration());
        assert!(SweepError::ZeroModulus.is_configuration());
        assert!(!SweepError::AlreadyStarted { worker: 0 }.is_configuration());
        assert!(!SweepError::WorkerPanicked { worker: 3 }.is_configuration());
    }

    #[test]
    fn test_messages_name_the_value() {
        let msg = SweepError::InvalidMode(5).to_string();
        assert!(msg.contains('5'));

        let msg = SweepError::InvalidRange { lower: 10, upper: 2 }.to_string();
        assert!(msg.contains("10") && msg.contains('2'));
    }
}
