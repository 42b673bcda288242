//! Backup identifiers.
//!
//! An identifier is the local time the backup was taken, with the space
//! between date and time replaced by `_`:
//!
//! ```text
//! 2024-01-15_10:30:00.123456
//! ```
//!
//! Every field is zero-padded and ordered most-significant first, so plain
//! string comparison is chronological.  `list`, `latest` and `prune` all rely
//! on that, which is why [`BackupId`] refuses anything that does not have this
//! exact shape.

use std::{fmt, str::FromStr};

use chrono::{Local, NaiveDateTime};
use thiserror::Error;

/// `strftime` format used when generating a new identifier.
const GENERATED_FORMAT: &str = "%Y-%m-%d_%H:%M:%S%.6f";

/// `strftime` format of the mandatory (non-fractional) part.
const STAMP_FORMAT: &str = "%Y-%m-%d_%H:%M:%S";

/// Length of `YYYY-MM-DD_HH:MM:SS`.
const STAMP_LEN: usize = 19;

/// Upper bound on fractional digits (nanosecond precision).
const MAX_FRACTION_DIGITS: usize = 9;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid backup id '{0}': expected a timestamp like 2024-01-15_10:30:00.123456")]
pub struct InvalidBackupId(pub String);

/// A validated, timestamp-shaped backup identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BackupId(String);

impl BackupId {
    /// Identifier for a backup taken right now.
    pub fn now() -> Self {
        Self(Local::now().format(GENERATED_FORMAT).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for BackupId {
    type Err = InvalidBackupId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if is_well_formed(s) {
            Ok(Self(s.to_owned()))
        } else {
            Err(InvalidBackupId(s.to_owned()))
        }
    }
}

impl fmt::Display for BackupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `YYYY-MM-DD_HH:MM:SS` plus an optional `.` and 1–9 digits, naming a real
/// calendar time.
fn is_well_formed(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() < STAMP_LEN {
        return false;
    }
    let (stamp, fraction) = bytes.split_at(STAMP_LEN);

    let stamp_shape = stamp.iter().enumerate().all(|(i, &c)| match i {
        4 | 7 => c == b'-',
        10 => c == b'_',
        13 | 16 => c == b':',
        _ => c.is_ascii_digit(),
    });

    let fraction_shape = match fraction.split_first() {
        None => true,
        Some((b'.', digits)) => {
            (1..=MAX_FRACTION_DIGITS).contains(&digits.len())
                && digits.iter().all(u8::is_ascii_digit)
        },
        Some(_) => false,
    };

    // The shape check guarantees the first STAMP_LEN bytes are ASCII.
    stamp_shape
        && fraction_shape
        && NaiveDateTime::parse_from_str(&s[..STAMP_LEN], STAMP_FORMAT).is_ok()
}

// ─── Tests ────────────────────────────────────────────────────────────────────
