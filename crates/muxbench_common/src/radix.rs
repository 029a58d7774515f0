//! Per-field radix and padding modes for trace output.
//!
//! A [`FieldFormat`] names the radix a field is printed in and whether it
//! keeps its full width or drops leading zeros.

use crate::bits::Bits;

/// Number base used when rendering a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Radix {
    /// Base 2.
    Binary,
    /// Base 10.
    Decimal,
    /// Base 16, lowercase digits.
    Hex,
}

/// Whether a rendered field is padded to the width of its signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Padding {
    /// Pad to the digit count of the signal's full width
    /// (zeros for binary and hex, spaces for decimal).
    Full,
    /// Drop leading zeros, keeping at least one digit.
    Suppressed,
}

/// A radix plus padding mode, rendered against a [`Bits`] value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FieldFormat {
    /// The number base.
    pub radix: Radix,
    /// The padding mode.
    pub padding: Padding,
}

impl FieldFormat {
    /// Full-width binary (`%b`).
    pub const BINARY: Self = Self::new(Radix::Binary, Padding::Full);
    /// Binary without leading zeros (`%0b`).
    pub const BINARY_COMPACT: Self = Self::new(Radix::Binary, Padding::Suppressed);
    /// Plain decimal (`%0d`).
    pub const DECIMAL: Self = Self::new(Radix::Decimal, Padding::Suppressed);

    /// Creates a format from its parts.
    pub const fn new(radix: Radix, padding: Padding) -> Self {
        Self { radix, padding }
    }

    /// Renders `bits` according to this format.
    pub fn render(&self, bits: &Bits) -> String {
        let value = bits.value();
        match (self.radix, self.padding) {
            (Radix::Binary, Padding::Full) => bits.to_string(),
            (Radix::Binary, Padding::Suppressed) => format!("{value:b}"),
            (Radix::Hex, Padding::Full) => {
                let digits = bits.width().div_ceil(4) as usize;
                format!("{value:0digits$x}")
            }
            (Radix::Hex, Padding::Suppressed) => format!("{value:x}"),
            (Radix::Decimal, Padding::Full) => {
                let digits = max_decimal_digits(bits.width());
                format!("{value:>digits$}")
            }
            (Radix::Decimal, Padding::Suppressed) => value.to_string(),
        }
    }
}

/// Number of decimal digits in the largest unsigned value of `width` bits.
fn max_decimal_digits(width: u32) -> usize {
    let max = if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    };
    max.to_string().len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(value: u64, width: u32) -> Bits {
        Bits::new(value, width).unwrap()
    }

    #[test]
    fn binary_full_keeps_leading_zeros() {
        assert_eq!(FieldFormat::BINARY.render(&bits(0x3D, 8)), "00111101");
        assert_eq!(FieldFormat::BINARY.render(&bits(0, 8)), "00000000");
        assert_eq!(FieldFormat::BINARY.render(&bits(1, 1)), "1");
    }

    #[test]
    fn binary_compact_drops_leading_zeros() {
        assert_eq!(FieldFormat::BINARY_COMPACT.render(&bits(0x3D, 8)), "111101");
        assert_eq!(FieldFormat::BINARY_COMPACT.render(&bits(0xBD, 8)), "10111101");
    }

    #[test]
    fn binary_compact_zero_keeps_one_digit() {
        assert_eq!(FieldFormat::BINARY_COMPACT.render(&bits(0, 8)), "0");
    }

    #[test]
    fn decimal_modes() {
        assert_eq!(FieldFormat::DECIMAL.render(&bits(7, 8)), "7");
        let full = FieldFormat::new(Radix::Decimal, Padding::Full);
        assert_eq!(full.render(&bits(7, 8)), "  7");
        assert_eq!(full.render(&bits(1, 1)), "1");
    }

    #[test]
    fn hex_modes() {
        let full = FieldFormat::new(Radix::Hex, Padding::Full);
        let compact = FieldFormat::new(Radix::Hex, Padding::Suppressed);
        assert_eq!(full.render(&bits(0x0D, 8)), "0d");
        assert_eq!(full.render(&bits(0x5, 9)), "005");
        assert_eq!(compact.render(&bits(0x0D, 8)), "d");
    }
}
