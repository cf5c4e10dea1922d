//! Configuration for digitsweep
//!
//! Two sources feed a run:
//!
//! - [`input`]: the ordered scalar stream describing *what* to sweep (lock,
//!   bounds, modulus, workers, mode, and the search target).
//! - [`settings`]: layered ambient settings describing *how* to run and
//!   report it (fingerprint width, log level, output format).

pub mod input;
pub mod settings;

pub use input::{RawInput, parse_sweep};
pub use settings::{OutputFormat, Settings};
