//! The simulation clock value.
//!
//! [`SimTime`] is a plain tick count in the bench's timescale unit. The
//! kernel owns the current time and hands it to observers by value; there
//! is no ambient clock.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SimError;

/// A point in simulated time, counted in timescale ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SimTime {
    ticks: u64,
}

impl SimTime {
    /// Time zero.
    pub fn zero() -> Self {
        Self { ticks: 0 }
    }

    /// Creates a time from a tick count.
    pub fn from_ticks(ticks: u64) -> Self {
        Self { ticks }
    }

    /// Returns the tick count.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Returns the time `delta` ticks later.
    pub fn advance_by(&self, delta: u64) -> Result<Self, SimError> {
        self.ticks
            .checked_add(delta)
            .map(Self::from_ticks)
            .ok_or(SimError::TimeOverflow { time: self.ticks })
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ticks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_default() {
        assert_eq!(SimTime::zero(), SimTime::default());
        assert_eq!(SimTime::zero().ticks(), 0);
    }

    #[test]
    fn advance_accumulates() {
        let t = SimTime::zero().advance_by(5).unwrap().advance_by(5).unwrap();
        assert_eq!(t.ticks(), 10);
    }

    #[test]
    fn advance_by_zero_is_identity() {
        let t = SimTime::from_ticks(7);
        assert_eq!(t.advance_by(0).unwrap(), t);
    }

    #[test]
    fn advance_overflow() {
        let t = SimTime::from_ticks(u64::MAX);
        assert!(matches!(
            t.advance_by(1),
            Err(SimError::TimeOverflow { time: u64::MAX })
        ));
    }

    #[test]
    fn ordering() {
        assert!(SimTime::from_ticks(5) < SimTime::from_ticks(10));
    }

    #[test]
    fn display_is_decimal_ticks() {
        assert_eq!(SimTime::from_ticks(15).to_string(), "15");
    }

    #[test]
    fn serde_roundtrip() {
        let t = SimTime::from_ticks(12345);
        let json = serde_json::to_string(&t).unwrap();
        let back: SimTime = serde_json::from_str(&json).unwrap();
        assert_eq!(t, back);
    }
}
