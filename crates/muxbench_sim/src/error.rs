//! Simulation error types for the stimulus kernel.
//!
//! All errors that can occur while building a bench or executing its
//! script are represented as variants of [`SimError`]. Every one of them
//! is fatal to the run.

use std::io;

use muxbench_common::WidthError;

/// Errors that can occur during bench setup or execution.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// A script assignment or watched field names a signal that does not exist.
    #[error("unknown signal '{name}'")]
    UnknownSignal {
        /// The name that failed to resolve.
        name: String,
    },

    /// A signal with this name was already declared.
    #[error("signal '{name}' is already declared")]
    DuplicateSignal {
        /// The duplicated name.
        name: String,
    },

    /// A signal width is outside the supported range.
    #[error("invalid signal width: {0}")]
    InvalidWidth(#[from] WidthError),

    /// A scripted value does not fit the width of its target signal.
    #[error("value {value:#x} assigned to '{signal}' at t={time} does not fit in {width} bit(s)")]
    WidthOverflow {
        /// The target signal.
        signal: String,
        /// The rejected value.
        value: u64,
        /// The target's declared width.
        width: u32,
        /// Simulation time of the offending event.
        time: u64,
    },

    /// A device port and the bench signal it binds to disagree on width.
    #[error("port '{port}' of device '{device}' is {port_width} bit(s) but signal is {signal_width} bit(s)")]
    PortMismatch {
        /// The device name.
        device: String,
        /// The port name.
        port: String,
        /// The port's declared width.
        port_width: u32,
        /// The existing signal's width.
        signal_width: u32,
    },

    /// Two devices drive the same output signal.
    #[error("signal '{signal}' is driven by both '{first}' and '{second}'")]
    MultipleDrivers {
        /// The contested signal.
        signal: String,
        /// The device that bound it first.
        first: String,
        /// The device that tried to bind it again.
        second: String,
    },

    /// The stimulus script tried to assign a signal owned by a device output.
    #[error("signal '{signal}' is a device output and cannot be assigned by the script")]
    DrivenOutput {
        /// The device-driven signal.
        signal: String,
    },

    /// A device failed to produce its outputs.
    #[error("device '{device}' failed to evaluate: {reason}")]
    EvalError {
        /// The device name.
        device: String,
        /// Description of what went wrong.
        reason: String,
    },

    /// Outputs kept changing at a single time step, indicating a combinational loop.
    #[error("delta cycle limit exceeded at t={time} (max {max_deltas} deltas)")]
    DeltaCycleLimit {
        /// The time step where the limit was hit.
        time: u64,
        /// The maximum number of settle passes allowed.
        max_deltas: u32,
    },

    /// Accumulating script delays overflowed the clock.
    #[error("simulation time overflow after t={time}")]
    TimeOverflow {
        /// The last representable time before overflow.
        time: u64,
    },

    /// The kernel was asked to run a second time.
    #[error("simulation kernel has already run")]
    AlreadyRun,

    /// An I/O error occurred while writing trace or waveform output.
    #[error("output I/O error: {0}")]
    OutputIo(#[from] io::Error),
}
