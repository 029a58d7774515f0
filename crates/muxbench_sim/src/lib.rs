//! Timed stimulus sequencer and trace monitor for a 2-to-1 multiplexer bench.
//!
//! The bench drives the `a`, `b`, and `sel` inputs of a [`Mux2`] from a
//! [`Stimulus`] script, lets the device output `y` settle after every time
//! step, and reports each observed change through [`Observer`]s.
//!
//! # Architecture
//!
//! [`SimKernel`] owns a flat [`SignalBank`] and a list of attached
//! [`Device`]s. Each step commits one atomic batch of assignments, runs a
//! bounded settle loop over the devices, and then fans out to observers in
//! registration order. [`Monitor`] prints the textual trace and
//! [`VcdRecorder`] writes a VCD waveform.
//!
//! # Usage
//!
//! ```
//! use muxbench_sim::{simulate, SimConfig, Stimulus};
//!
//! let outcome = simulate(&Stimulus::mux2_directed(), &SimConfig::default(), Vec::new())?;
//! assert_eq!(outcome.lines, 4);
//! assert_eq!(outcome.result.final_time.ticks(), 15);
//! # Ok::<(), muxbench_sim::SimError>(())
//! ```

#![warn(missing_docs)]

pub mod device;
pub mod error;
pub mod kernel;
pub mod monitor;
pub mod observer;
pub mod signal;
pub mod stimulus;
pub mod time;
pub mod vcd_loader;
pub mod waveform;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use muxbench_common::{OverflowPolicy, Timescale};
use tracing::info;

pub use device::{Device, Mux2, PortDirection, PortSpec, PortValues};
pub use error::SimError;
pub use kernel::{KernelConfig, SimKernel, SimResult};
pub use monitor::{Monitor, TraceField};
pub use observer::Observer;
pub use signal::{Driver, SignalBank, SignalId, SignalState};
pub use stimulus::{Assignment, ScheduledEvent, Stimulus};
pub use time::SimTime;
pub use vcd_loader::{load_vcd, load_vcd_file, LoadedWaveform, VcdLoadError, VcdSignalDef};
pub use waveform::VcdRecorder;

/// Configuration for a bench run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// How out-of-width script values are handled.
    pub overflow: OverflowPolicy,
    /// Maximum output-changing settle passes per time step.
    pub max_delta: u32,
    /// Timescale written to the waveform header.
    pub timescale: Timescale,
    /// Module scope name for waveform signals.
    pub scope: String,
    /// Where to write the VCD waveform. `None` disables recording.
    pub waveform_path: Option<PathBuf>,
    /// Keep a copy of every trace line in [`SimOutcome::trace`].
    pub retain_trace: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        let kernel = KernelConfig::default();
        Self {
            overflow: kernel.overflow,
            max_delta: kernel.max_delta,
            timescale: Timescale::NS,
            scope: "mux2_tb".to_string(),
            waveform_path: None,
            retain_trace: false,
        }
    }
}

/// What a completed bench run produced.
#[derive(Debug, Clone)]
pub struct SimOutcome {
    /// Kernel statistics.
    pub result: SimResult,
    /// Number of trace lines written.
    pub lines: usize,
    /// The trace lines, without trailing newlines, when `retain_trace` was set.
    pub trace: Vec<String>,
    /// The waveform file, if one was recorded.
    pub waveform_path: Option<PathBuf>,
}

/// High-level entry point: runs a stimulus script against a default 8-bit [`Mux2`].
///
/// Trace lines go to `trace` as they are produced. When
/// `config.waveform_path` is set the run is also recorded as VCD.
pub fn simulate<W: Write>(
    stimulus: &Stimulus,
    config: &SimConfig,
    trace: W,
) -> Result<SimOutcome, SimError> {
    let mut monitor = Monitor::mux2(trace);
    if config.retain_trace {
        monitor = monitor.retain_lines();
    }
    let mut recorder = match &config.waveform_path {
        Some(path) => {
            let writer = BufWriter::new(File::create(path)?);
            Some(VcdRecorder::new(writer, &config.scope, config.timescale))
        }
        None => None,
    };

    let result = {
        let mut kernel = SimKernel::new(KernelConfig {
            overflow: config.overflow,
            max_delta: config.max_delta,
        });
        kernel.attach_device(Box::new(Mux2::default()))?;
        kernel.add_observer(&mut monitor);
        if let Some(rec) = recorder.as_mut() {
            kernel.add_observer(rec);
        }
        kernel.run(stimulus)?
    };

    info!(
        final_time = result.final_time.ticks(),
        steps = result.steps,
        lines = monitor.line_count(),
        "simulation complete"
    );

    Ok(SimOutcome {
        result,
        lines: monitor.line_count(),
        trace: monitor.lines().to_vec(),
        waveform_path: config.waveform_path.clone(),
    })
}
