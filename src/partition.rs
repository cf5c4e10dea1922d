//! Contiguous splitting of a half-open range across workers.
//!
//! Worker `i` of `p` owns
//! `[lower + (upper-lower)*i/p, lower + (upper-lower)*(i+1)/p)` with floor
//! division. The product is computed in `i128`, so no bounds that fit in
//! `i64` can overflow it.

use serde::Serialize;
use std::ops::Range;

use crate::error::{Result, SweepError};

/// Largest worker count a sweep accepts. Each worker is an OS thread and its
/// partition is allocated up front, so the count is checked before either.
pub const MAX_WORKERS: usize = 4096;

/// Half-open sub-range `[start, end)` owned by one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Partition {
    pub start: i64,
    pub end: i64,
}

impl Partition {
    pub fn len(&self) -> u64 {
        (self.end as i128 - self.start as i128).max(0) as u64
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn contains(&self, number: i64) -> bool {
        self.start <= number && number < self.end
    }

    pub fn range(&self) -> Range<i64> {
        self.start..self.end
    }
}

impl IntoIterator for Partition {
    type Item = i64;
    type IntoIter = Range<i64>;

    fn into_iter(self) -> Self::IntoIter {
        self.range()
    }
}

/// Split `[lower, upper)` into `workers` contiguous partitions.
///
/// Partitions are returned in worker order. Some may be empty when there are
/// more workers than numbers.
pub fn split(lower: i64, upper: i64, workers: usize) -> Result<Vec<Partition>> {
    if workers == 0 || workers > MAX_WORKERS {
        return Err(SweepError::InvalidWorkerCount(
            i64::try_from(workers).unwrap_or(i64::MAX),
        ));
    }
    if upper < lower {
        return Err(SweepError::InvalidRange { lower, upper });
    }

    let span = upper as i128 - lower as i128;
    let p = workers as i128;
    // Every boundary lies within [lower, upper], so the narrowing casts are
    // lossless.
    let boundary = |i: i128| (lower as i128 + span * i / p) as i64;

    Ok((0..p)
        .map(|i| Partition {
            start: boundary(i),
            end: boundary(i + 1),
        })
        .collect())
}
