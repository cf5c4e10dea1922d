//! SHA-1 fingerprints of fixed-width decimal renderings.
//!
//! A number is rendered in decimal, left-padded with zeros to
//! [`DEFAULT_FINGERPRINT_WIDTH`] digits unless configured otherwise, encoded
//! as ASCII and hashed with SHA-1. The digest is reported as 40 lowercase hex
//! characters.
//!
//! The 9 digit width reproduces the behaviour sweeps were first run against,
//! but it has never been confirmed as a requirement. Keep it configurable
//! (`fingerprint_width` in settings, `--fingerprint-width` on the CLI) rather
//! than baking a different guess into the code.

use sha1::{Digest, Sha1};
use std::fmt::{self, Write as _};

use crate::error::{Result, SweepError};

/// Zero-padding width applied before hashing.
pub const DEFAULT_FINGERPRINT_WIDTH: usize = 9;

/// Length in bytes of a SHA-1 digest.
pub const DIGEST_LEN: usize = 20;

/// A validated search target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    hex: String,
    bytes: [u8; DIGEST_LEN],
}

impl Target {
    /// Parse a hex digest. Surrounding whitespace is ignored and upper case
    /// digits are accepted; the stored form is lowercase.
    pub fn parse(raw: &str) -> Result<Self> {
        let hex = raw.trim().to_ascii_lowercase();
        if hex.len() != DIGEST_LEN * 2 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(SweepError::InvalidFingerprint(raw.to_string()));
        }

        let mut bytes = [0u8; DIGEST_LEN];
        for (slot, pair) in bytes.iter_mut().zip(hex.as_bytes().chunks_exact(2)) {
            *slot = (hex_value(pair[0]) << 4) | hex_value(pair[1]);
        }

        Ok(Self { hex, bytes })
    }

    /// Lowercase hex form.
    pub fn as_hex(&self) -> &str {
        &self.hex
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.bytes
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex)
    }
}

fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => 0,
    }
}

/// Per-worker hashing context.
///
/// Owns its SHA-1 state and a reusable text buffer so the search hot loop
/// does not allocate or share a hasher between threads.
#[derive(Debug, Clone)]
pub struct Fingerprinter {
    width: usize,
    hasher: Sha1,
    text: String,
}

impl Fingerprinter {
    pub fn new(width: usize) -> Result<Self> {
        if width == 0 {
            return Err(SweepError::InvalidFingerprintWidth);
        }
        Ok(Self {
            width,
            hasher: Sha1::new(),
            text: String::with_capacity(width.max(20) + 1),
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Raw SHA-1 digest of the padded rendering of `number`.
    pub fn digest_bytes(&mut self, number: i64) -> [u8; DIGEST_LEN] {
        self.render(number);
        self.hasher.update(self.text.as_bytes());
        let mut bytes = [0u8; DIGEST_LEN];
        bytes.copy_from_slice(&self.hasher.finalize_reset());
        bytes
    }

    /// Lowercase hex digest of `number`.
    pub fn digest(&mut self, number: i64) -> String {
        to_hex_lowercase(&self.digest_bytes(number))
    }

    /// Whether `number` hashes to `target`.
    #[inline]
    pub fn matches(&mut self, number: i64, target: &Target) -> bool {
        &self.digest_bytes(number) == target.as_bytes()
    }

    /// Zero-pad the magnitude to `width` digits. A minus sign, if any, is
    /// written in front of the padded digits and does not count toward the
    /// width.
    fn render(&mut self, number: i64) {
        self.text.clear();
        if number < 0 {
            self.text.push('-');
        }
        let _ = write!(
            &mut self.text,
            "{:0width$}",
            number.unsigned_abs(),
            width = self.width
        );
    }
}

impl Default for Fingerprinter {
    fn default() -> Self {
        Self {
            width: DEFAULT_FINGERPRINT_WIDTH,
            hasher: Sha1::new(),
            text: String::with_capacity(21),
        }
    }
}

/// Hex digest of `number` at the default width.
pub fn digest(number: i64) -> String {
    Fingerprinter::default().digest(number)
}

fn to_hex_lowercase(bytes: &[u8]) -> String {
    let mut output = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(&mut output, "{byte:02x}");
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    // sha1("000000000")
    const ZERO_DIGEST: &str = "0f58d5a5515f1a8a9d179aa58858b67b2f8a3388";

    fn reference(text: &str) -> String {
        to_hex_lowercase(&Sha1::digest(text.as_bytes()))
    }

    #[test]
    fn test_renders_nine_digits_by_default() {
        assert_eq!(digest(42), reference("000000042"));
        assert_eq!(digest(123_456_789), reference("123456789"));
        assert_eq!(digest(0), reference("000000000"));
    }

    #[test]
    fn test_known_vector() {
        assert_eq!(reference("abc"), "a9993e364706816aba3e25717850c26c9cd0d89d");
        assert_eq!(digest(0).len(), 40);
        assert_eq!(Target::parse(ZERO_DIGEST).unwrap().as_hex(), ZERO_DIGEST);
    }

    #[test]
    fn test_wider_numbers_are_not_truncated() {
        assert_eq!(digest(1_234_567_890), reference("1234567890"));
    }

    #[test]
    fn test_custom_width() {
        let mut fp = Fingerprinter::new(4).unwrap();
        assert_eq!(fp.digest(7), reference("0007"));
        assert_eq!(fp.width(), 4);
        assert_eq!(Fingerprinter::new(0).unwrap_err(), SweepError::InvalidFingerprintWidth);
    }

    #[test]
    fn test_negative_sign_precedes_padding() {
        assert_eq!(digest(-5), reference("-000000005"));
    }

    #[test]
    fn test_reused_context_is_stable() {
        let mut fp = Fingerprinter::default();
        let first = fp.digest(31_337);
        fp.digest(1);
        assert_eq!(fp.digest(31_337), first);
        assert_eq!(first, digest(31_337));
    }

    #[test]
    fn test_target_parse_and_match() {
        let hex = digest(8_675_309);
        let target = Target::parse(&format!("  {}\n", hex.to_uppercase())).unwrap();
        assert_eq!(target.as_hex(), hex);

        let mut fp = Fingerprinter::default();
        assert!(fp.matches(8_675_309, &target));
        assert!(!fp.matches(8_675_310, &target));
    }

    #[test]
    fn test_target_rejects_bad_input() {
        let not_hex = "g".repeat(40);
        let too_long = "a".repeat(41);
        for bad in ["", "abc", not_hex.as_str(), too_long.as_str()] {
            assert!(matches!(
                Target::parse(bad),
                Err(SweepError::InvalidFingerprint(_))
            ));
        }
    }
}
