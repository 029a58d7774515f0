//! Simulation timescales with unit parsing and display.

use std::fmt;
use std::str::FromStr;

/// Femtoseconds per picosecond.
pub const FS_PER_PS: u64 = 1_000;
/// Femtoseconds per nanosecond.
pub const FS_PER_NS: u64 = 1_000_000;
/// Femtoseconds per microsecond.
pub const FS_PER_US: u64 = 1_000_000_000;
/// Femtoseconds per millisecond.
pub const FS_PER_MS: u64 = 1_000_000_000_000;
/// Femtoseconds per second.
pub const FS_PER_S: u64 = 1_000_000_000_000_000;

/// A unit of simulated time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimeUnit {
    /// Femtoseconds.
    Fs,
    /// Picoseconds.
    Ps,
    /// Nanoseconds.
    Ns,
    /// Microseconds.
    Us,
    /// Milliseconds.
    Ms,
    /// Seconds.
    S,
}

impl TimeUnit {
    /// Returns the number of femtoseconds in one of this unit.
    pub fn fs_per_unit(self) -> u64 {
        match self {
            TimeUnit::Fs => 1,
            TimeUnit::Ps => FS_PER_PS,
            TimeUnit::Ns => FS_PER_NS,
            TimeUnit::Us => FS_PER_US,
            TimeUnit::Ms => FS_PER_MS,
            TimeUnit::S => FS_PER_S,
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            TimeUnit::Fs => "fs",
            TimeUnit::Ps => "ps",
            TimeUnit::Ns => "ns",
            TimeUnit::Us => "us",
            TimeUnit::Ms => "ms",
            TimeUnit::S => "s",
        }
    }
}

/// The real-time length of one simulation tick, such as `1ns` or `10ps`.
///
/// The magnitude is restricted to 1, 10, or 100 as in a VCD `$timescale`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Timescale {
    magnitude: u32,
    unit: TimeUnit,
}

impl Timescale {
    /// One nanosecond per tick.
    pub const NS: Self = Self {
        magnitude: 1,
        unit: TimeUnit::Ns,
    };

    /// Creates a timescale, returning `None` for magnitudes other than 1, 10, 100.
    pub fn new(magnitude: u32, unit: TimeUnit) -> Option<Self> {
        matches!(magnitude, 1 | 10 | 100).then_some(Self { magnitude, unit })
    }

    /// Returns the magnitude (1, 10, or 100).
    pub fn magnitude(&self) -> u32 {
        self.magnitude
    }

    /// Returns the unit.
    pub fn unit(&self) -> TimeUnit {
        self.unit
    }

    /// Returns the number of femtoseconds in one tick.
    pub fn fs_per_tick(&self) -> u64 {
        self.magnitude as u64 * self.unit.fs_per_unit()
    }
}

impl Default for Timescale {
    fn default() -> Self {
        Self::NS
    }
}

impl fmt::Display for Timescale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.magnitude, self.unit.suffix())
    }
}

/// Error type for parsing timescale strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid timescale: '{input}' (expected 1, 10, or 100 followed by fs, ps, ns, us, ms, or s)")]
pub struct ParseTimescaleError {
    /// The input string that failed to parse.
    pub input: String,
}

impl FromStr for Timescale {
    type Err = ParseTimescaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || ParseTimescaleError {
            input: s.to_string(),
        };

        let digit_end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        if digit_end == 0 {
            return Err(err());
        }
        let magnitude: u32 = s[..digit_end].parse().map_err(|_| err())?;

        let unit = match s[digit_end..].trim().to_ascii_lowercase().as_str() {
            "fs" => TimeUnit::Fs,
            "ps" => TimeUnit::Ps,
            "ns" => TimeUnit::Ns,
            "us" => TimeUnit::Us,
            "ms" => TimeUnit::Ms,
            "s" => TimeUnit::S,
            _ => return Err(err()),
        };

        Timescale::new(magnitude, unit).ok_or_else(err)
    }
}
