//! Simulation kernel: stimulus sequencing, combinational settle, and observer fan-out.
//!
//! [`SimKernel`] owns the signal bank and the clock. A run walks the
//! stimulus script one time step at a time: it stages and validates every
//! assignment due at that time, commits them together, re-evaluates the
//! attached devices until their outputs stop changing, and only then
//! notifies observers. After the last event the clock advances by the
//! script's settle delay and observers receive `on_finish`.

use muxbench_common::{Bits, OverflowPolicy, WidthError};
use tracing::{debug, warn};

use crate::device::{Device, PortDirection, PortSpec, PortValues};
use crate::error::SimError;
use crate::observer::Observer;
use crate::signal::{Driver, SignalBank, SignalId, SignalState};
use crate::stimulus::{ScheduledEvent, Stimulus};
use crate::time::SimTime;

/// Tunables for a kernel run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KernelConfig {
    /// How out-of-width script values are handled.
    pub overflow: OverflowPolicy,
    /// Maximum output-changing settle passes per time step.
    pub max_delta: u32,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            overflow: OverflowPolicy::Error,
            max_delta: 1000,
        }
    }
}

/// The result of a completed run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimResult {
    /// Time at which the run ended (last event plus settle delay).
    pub final_time: SimTime,
    /// Number of distinct time steps processed, including time zero.
    pub steps: usize,
    /// Number of scripted events applied.
    pub events_applied: usize,
    /// Total output-changing settle passes across the run.
    pub total_deltas: u64,
}

/// A device with its ports resolved to bench signals.
struct BoundDevice {
    device: Box<dyn Device>,
    inputs: Vec<(String, SignalId)>,
    outputs: Vec<(String, SignalId)>,
}

/// The simulation kernel.
///
/// Observers are borrowed for the kernel's lifetime so the caller keeps
/// ownership of their collected output after the run.
pub struct SimKernel<'a> {
    current_time: SimTime,
    signals: SignalBank,
    devices: Vec<BoundDevice>,
    observers: Vec<&'a mut dyn Observer>,
    config: KernelConfig,
    started: bool,
    total_deltas: u64,
}

impl<'a> SimKernel<'a> {
    /// Creates an empty kernel.
    pub fn new(config: KernelConfig) -> Self {
        Self {
            current_time: SimTime::zero(),
            signals: SignalBank::new(),
            devices: Vec::new(),
            observers: Vec::new(),
            config,
            started: false,
            total_deltas: 0,
        }
    }

    /// Declares a script-driven signal.
    pub fn declare_signal(&mut self, name: &str, width: u32) -> Result<SignalId, SimError> {
        self.signals.declare(name, width)
    }

    /// Attaches a device, binding each port to the signal of the same name.
    ///
    /// Missing signals are declared with the port's width. Output ports take
    /// ownership of their signal; the script may no longer assign it. Every
    /// port is checked before the bank changes, so a rejected device leaves
    /// no signals or drivers behind.
    pub fn attach_device(&mut self, device: Box<dyn Device>) -> Result<(), SimError> {
        let name = device.name().to_string();
        self.check_ports(&name, device.ports())?;

        let mut inputs = Vec::new();
        let mut outputs = Vec::new();
        for port in device.ports() {
            let id = match self.signals.find(&port.name) {
                Some(id) => id,
                None => self.signals.declare(&port.name, port.width)?,
            };
            match port.direction {
                PortDirection::Input => inputs.push((port.name.clone(), id)),
                PortDirection::Output => {
                    self.signals.get_mut(id).driver = Driver::Device(name.clone());
                    outputs.push((port.name.clone(), id));
                }
            }
        }

        debug!(device = %name, inputs = inputs.len(), outputs = outputs.len(), "device attached");
        self.devices.push(BoundDevice {
            device,
            inputs,
            outputs,
        });
        Ok(())
    }

    /// Validates port widths and output drivers without touching the bank.
    fn check_ports(&self, device: &str, ports: &[PortSpec]) -> Result<(), SimError> {
        let mut declared: Vec<(&str, u32)> = Vec::new();
        let mut claimed: Vec<&str> = Vec::new();

        for port in ports {
            let width = match self.signals.find(&port.name) {
                Some(id) => self.signals.get(id).width,
                None => match declared.iter().find(|(n, _)| *n == port.name) {
                    Some(&(_, width)) => width,
                    None => {
                        Bits::zero(port.width)?;
                        declared.push((port.name.as_str(), port.width));
                        port.width
                    }
                },
            };
            if width != port.width {
                return Err(SimError::PortMismatch {
                    device: device.to_string(),
                    port: port.name.clone(),
                    port_width: port.width,
                    signal_width: width,
                });
            }

            if port.direction == PortDirection::Output {
                let existing = self
                    .signals
                    .find(&port.name)
                    .map(|id| &self.signals.get(id).driver);
                let first = match existing {
                    Some(Driver::Device(first)) => Some(first.as_str()),
                    _ if claimed.contains(&port.name.as_str()) => Some(device),
                    _ => None,
                };
                if let Some(first) = first {
                    return Err(SimError::MultipleDrivers {
                        signal: port.name.clone(),
                        first: first.to_string(),
                        second: device.to_string(),
                    });
                }
                claimed.push(port.name.as_str());
            }
        }
        Ok(())
    }

    /// Subscribes an observer. Observers are notified in registration order.
    pub fn add_observer(&mut self, observer: &'a mut dyn Observer) {
        self.observers.push(observer);
    }

    /// Returns the current simulation time.
    pub fn current_time(&self) -> SimTime {
        self.current_time
    }

    /// Returns the signal bank.
    pub fn signals(&self) -> &SignalBank {
        &self.signals
    }

    /// Returns the current value of a signal by name.
    pub fn signal_value(&self, name: &str) -> Option<Bits> {
        self.signals.value_of(name)
    }

    /// Runs the stimulus script to completion.
    ///
    /// A kernel runs at most once; a second call returns [`SimError::AlreadyRun`].
    /// Any error aborts the run immediately.
    pub fn run(&mut self, stimulus: &Stimulus) -> Result<SimResult, SimError> {
        if self.started {
            return Err(SimError::AlreadyRun);
        }
        self.started = true;

        let steps = group_steps(stimulus)?;

        for observer in self.observers.iter_mut() {
            observer.begin(&self.signals)?;
        }

        let mut previous = self.signals.snapshot();
        let mut events_applied = 0;

        for (time, batch) in &steps {
            self.current_time = *time;
            self.apply_batch(*time, batch)?;
            events_applied += batch.len();

            let deltas = self.settle(*time)?;

            let current = self.signals.snapshot();
            let changed: Vec<SignalId> = current
                .iter()
                .zip(&previous)
                .enumerate()
                .filter(|(_, (now, before))| now != before)
                .map(|(i, _)| SignalId::from_raw(i as u32))
                .collect();

            debug!(
                time = time.ticks(),
                events = batch.len(),
                deltas,
                changed = changed.len(),
                "time step settled"
            );

            for observer in self.observers.iter_mut() {
                observer.on_step(*time, &self.signals, &changed)?;
            }
            previous = current;
        }

        let end = stimulus.end_time()?;
        self.current_time = end;

        for observer in self.observers.iter_mut() {
            observer.on_finish(end, &self.signals)?;
        }

        debug!(final_time = end.ticks(), steps = steps.len(), "run finished");

        Ok(SimResult {
            final_time: end,
            steps: steps.len(),
            events_applied,
            total_deltas: self.total_deltas,
        })
    }

    /// Validates every assignment of a time step, then commits them together.
    fn apply_batch(&mut self, time: SimTime, batch: &[&ScheduledEvent]) -> Result<(), SimError> {
        let mut staged: Vec<(SignalId, Bits)> = Vec::new();

        for event in batch {
            for assignment in &event.assignments {
                let id = self.signals.resolve(&assignment.signal)?;
                let state = self.signals.get(id);
                if let Driver::Device(_) = state.driver {
                    return Err(SimError::DrivenOutput {
                        signal: state.name.clone(),
                    });
                }
                let value = stage_value(state, assignment.value, time, self.config.overflow)?;
                staged.push((id, value));
            }
        }

        for (id, value) in staged {
            self.signals.get_mut(id).value = value;
        }
        Ok(())
    }

    /// Re-evaluates devices until no output changes.
    ///
    /// Returns the number of passes that changed at least one output.
    fn settle(&mut self, time: SimTime) -> Result<u32, SimError> {
        let max_deltas = self.config.max_delta;

        for pass in 0..=max_deltas {
            let mut changed = false;

            for bound in &self.devices {
                let mut inputs = PortValues::new();
                for (port, id) in &bound.inputs {
                    inputs.insert(port, self.signals.value(*id));
                }

                let outputs = bound.device.evaluate(&inputs)?;

                for (port, id) in &bound.outputs {
                    let value = outputs.get(port).ok_or_else(|| SimError::EvalError {
                        device: bound.device.name().to_string(),
                        reason: format!("no value produced for output '{port}'"),
                    })?;
                    let state = self.signals.get_mut(*id);
                    if value.width() != state.width {
                        return Err(SimError::PortMismatch {
                            device: bound.device.name().to_string(),
                            port: port.clone(),
                            port_width: value.width(),
                            signal_width: state.width,
                        });
                    }
                    if state.value != value {
                        state.value = value;
                        changed = true;
                    }
                }
            }

            if !changed {
                self.total_deltas += pass as u64;
                return Ok(pass);
            }
        }

        Err(SimError::DeltaCycleLimit {
            time: time.ticks(),
            max_deltas,
        })
    }
}

/// Groups script events by absolute time, always starting with a time-zero step.
fn group_steps(stimulus: &Stimulus) -> Result<Vec<(SimTime, Vec<&ScheduledEvent>)>, SimError> {
    let mut steps: Vec<(SimTime, Vec<&ScheduledEvent>)> = Vec::new();
    for (time, event) in stimulus.schedule()? {
        match steps.last_mut() {
            Some((t, batch)) if *t == time => batch.push(event),
            _ => steps.push((time, vec![event])),
        }
    }
    if steps.first().is_none_or(|(t, _)| *t != SimTime::zero()) {
        steps.insert(0, (SimTime::zero(), Vec::new()));
    }
    Ok(steps)
}

/// Converts a raw script value to the target's width under the overflow policy.
fn stage_value(
    state: &SignalState,
    value: u64,
    time: SimTime,
    policy: OverflowPolicy,
) -> Result<Bits, SimError> {
    if policy == OverflowPolicy::Truncate && !Bits::fits(value, state.width) {
        warn!(
            signal = %state.name,
            value,
            width = state.width,
            time = time.ticks(),
            "truncating out-of-width assignment"
        );
    }
    Bits::with_policy(value, state.width, policy).map_err(|e| match e {
        WidthError::Overflow { value, width } => SimError::WidthOverflow {
            signal: state.name.clone(),
            value,
            width,
            time: time.ticks(),
        },
        other => other.into(),
    })
}
