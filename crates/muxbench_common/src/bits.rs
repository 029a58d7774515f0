//! Fixed-width unsigned values for two-state bench signals.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The widest signal a [`Bits`] value can hold.
pub const MAX_WIDTH: u32 = 64;

/// Errors produced when a value does not fit its declared width.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WidthError {
    /// The value has bits set above the declared width.
    #[error("value {value:#x} does not fit in {width} bit(s)")]
    Overflow {
        /// The rejected value.
        value: u64,
        /// The declared width.
        width: u32,
    },

    /// The width itself is outside `1..=64`.
    #[error("unsupported signal width {0} (expected 1..={MAX_WIDTH})")]
    UnsupportedWidth(u32),
}

/// What to do when an assignment carries bits above the target's width.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Reject the assignment and abort the run.
    #[default]
    Error,
    /// Mask the value down to the declared width and continue.
    Truncate,
}

/// An unsigned value together with its declared bit width.
///
/// The invariant `value < 2^width` holds for every constructed `Bits`;
/// [`Bits::new`] enforces it and [`Bits::truncated`] establishes it by masking.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bits {
    width: u32,
    value: u64,
}

impl Bits {
    /// Creates a value, failing if it has bits set above `width`.
    pub fn new(value: u64, width: u32) -> Result<Self, WidthError> {
        check_width(width)?;
        if !Self::fits(value, width) {
            return Err(WidthError::Overflow { value, width });
        }
        Ok(Self { width, value })
    }

    /// Creates a value, silently discarding bits above `width`.
    pub fn truncated(value: u64, width: u32) -> Result<Self, WidthError> {
        check_width(width)?;
        Ok(Self {
            width,
            value: value & mask(width),
        })
    }

    /// Creates an all-zero value of the given width.
    pub fn zero(width: u32) -> Result<Self, WidthError> {
        check_width(width)?;
        Ok(Self { width, value: 0 })
    }

    /// Builds a value under the given overflow policy.
    pub fn with_policy(value: u64, width: u32, policy: OverflowPolicy) -> Result<Self, WidthError> {
        match policy {
            OverflowPolicy::Error => Self::new(value, width),
            OverflowPolicy::Truncate => Self::truncated(value, width),
        }
    }

    /// Returns `true` if `value` can be stored in `width` bits.
    pub fn fits(value: u64, width: u32) -> bool {
        value & !mask(width) == 0
    }

    /// Returns the declared width in bits.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the numeric value.
    pub fn value(&self) -> u64 {
        self.value
    }

    /// Returns bit `index` (0 = least significant).
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn bit(&self, index: u32) -> bool {
        assert!(
            index < self.width,
            "index {index} out of bounds for width {}",
            self.width
        );
        (self.value >> index) & 1 != 0
    }

    /// Returns `true` if every bit is zero.
    pub fn is_zero(&self) -> bool {
        self.value == 0
    }
}

impl fmt::Display for Bits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in (0..self.width).rev() {
            write!(f, "{}", if self.bit(i) { '1' } else { '0' })?;
        }
        Ok(())
    }
}

impl fmt::Debug for Bits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bits({}'b{self})", self.width)
    }
}

fn check_width(width: u32) -> Result<(), WidthError> {
    if width == 0 || width > MAX_WIDTH {
        return Err(WidthError::UnsupportedWidth(width));
    }
    Ok(())
}

fn mask(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}
