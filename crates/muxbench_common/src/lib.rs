//! Shared foundational types used across the muxbench workspace.
//!
//! This crate provides fixed-width signal values, per-field radix formatting,
//! the width-overflow policy, and simulation timescales.

#![warn(missing_docs)]

pub mod bits;
pub mod radix;
pub mod timescale;

pub use bits::{Bits, OverflowPolicy, WidthError, MAX_WIDTH};
pub use radix::{FieldFormat, Padding, Radix};
pub use timescale::{ParseTimescaleError, TimeUnit, Timescale};
