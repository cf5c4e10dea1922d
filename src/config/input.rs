//! Parsing of the scalar input stream.
//!
//! Tokens are separated by any whitespace, so the values may be given on one
//! line or many. The order is fixed:
//!
//! ```text
//! lock_kind lower upper modulus worker_count mode [target_fingerprint]
//! ```
//!
//! The lock kind and mode selectors are validated as soon as they are read, so
//! an unknown selector is reported ahead of anything that follows it. The
//! target is only read when `mode` is 2 (search). Anything after the last
//! expected token is ignored.

use std::str::SplitWhitespace;

use crate::checksum::Modulus;
use crate::error::{Result, SweepError};
use crate::fingerprint::Target;
use crate::lock::LockKind;
use crate::partition::MAX_WORKERS;
use crate::sweep::SweepConfig;
use crate::worker::Mode;

/// Scalars exactly as read, before any domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawInput {
    pub lock_kind: i64,
    pub lower: i64,
    pub upper: i64,
    pub modulus: i64,
    pub workers: i64,
    pub mode: i64,
    pub target: Option<String>,
}

impl RawInput {
    /// Read the scalars from `text`.
    ///
    /// Fails on a missing or non-numeric token and on an unknown lock kind or
    /// mode. The remaining domain checks happen in [`RawInput::into_config`].
    pub fn parse(text: &str) -> Result<Self> {
        let mut tokens = Tokens::new(text);

        let lock_kind = tokens.integer("lock_kind")?;
        LockKind::try_from(lock_kind)?;
        let lower = tokens.integer("lower")?;
        let upper = tokens.integer("upper")?;
        let modulus = tokens.integer("modulus")?;
        let workers = tokens.integer("worker_count")?;
        let mode = tokens.integer("mode")?;
        let target = if Mode::try_from(mode)? == Mode::Search {
            Some(tokens.word("target_fingerprint")?.to_string())
        } else {
            None
        };

        Ok(Self {
            lock_kind,
            lower,
            upper,
            modulus,
            workers,
            mode,
            target,
        })
    }

    /// Validate every scalar and build the sweep configuration.
    ///
    /// Unknown lock kinds and modes are rejected first, matching the order
    /// the values are read in.
    pub fn into_config(self, fingerprint_width: usize) -> Result<SweepConfig> {
        let lock_kind = LockKind::try_from(self.lock_kind)?;
        let mode = Mode::try_from(self.mode)?;
        let modulus = Modulus::new(self.modulus)?;
        let workers = usize::try_from(self.workers)
            .ok()
            .filter(|n| (1..=MAX_WORKERS).contains(n))
            .ok_or(SweepError::InvalidWorkerCount(self.workers))?;

        let mut config =
            SweepConfig::new(lock_kind, self.lower, self.upper, modulus, workers, mode)
                .with_fingerprint_width(fingerprint_width);

        if mode == Mode::Search {
            let raw = self.target.ok_or(SweepError::MissingTarget)?;
            config = config.with_target(Target::parse(&raw)?);
        }

        config.validate()?;
        Ok(config)
    }
}

/// Parse and validate in one step.
pub fn parse_sweep(text: &str, fingerprint_width: usize) -> Result<SweepConfig> {
    RawInput::parse(text)?.into_config(fingerprint_width)
}

struct Tokens<'a> {
    inner: SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            inner: text.split_whitespace(),
        }
    }

    fn word(&mut self, field: &'static str) -> Result<&'a str> {
        self.inner.next().ok_or_else(|| SweepError::MalformedInput {
            field,
            reason: "unexpected end of input".to_string(),
        })
    }

    fn integer(&mut self, field: &'static str) -> Result<i64> {
        let word = self.word(field)?;
        word.parse().map_err(|e| SweepError::MalformedInput {
            field,
            reason: format!("{word:?} is not an integer ({e})"),
        })
    }
}
