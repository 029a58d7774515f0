//! The device-under-test boundary.
//!
//! The kernel never looks inside a device. It only knows the device's
//! [`PortSpec`] list and calls [`Device::evaluate`] with the current input
//! values whenever it settles a time step. Devices are pure: the same inputs
//! always produce the same outputs, with zero propagation delay.

use std::collections::BTreeMap;

use muxbench_common::Bits;

use crate::error::SimError;

/// Direction of a device port.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortDirection {
    /// Read by the device.
    Input,
    /// Written by the device.
    Output,
}

/// A named, fixed-width device port.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortSpec {
    /// Port name; binds to the bench signal of the same name.
    pub name: String,
    /// Port direction.
    pub direction: PortDirection,
    /// Port width in bits.
    pub width: u32,
}

impl PortSpec {
    /// Creates an input port.
    pub fn input(name: &str, width: u32) -> Self {
        Self {
            name: name.to_string(),
            direction: PortDirection::Input,
            width,
        }
    }

    /// Creates an output port.
    pub fn output(name: &str, width: u32) -> Self {
        Self {
            name: name.to_string(),
            direction: PortDirection::Output,
            width,
        }
    }
}

/// Port values keyed by port name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PortValues(BTreeMap<String, Bits>);

impl PortValues {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value of a port.
    pub fn insert(&mut self, port: &str, value: Bits) {
        self.0.insert(port.to_string(), value);
    }

    /// Returns the value of a port, if present.
    pub fn get(&self, port: &str) -> Option<Bits> {
        self.0.get(port).copied()
    }

    /// Iterates over `(port, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Bits)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// A combinational device evaluated by the kernel's settle loop.
pub trait Device {
    /// Instance name used in errors and logs.
    fn name(&self) -> &str;

    /// The device's ports, inputs and outputs.
    fn ports(&self) -> &[PortSpec];

    /// Computes every output port from the given input values.
    fn evaluate(&self, inputs: &PortValues) -> Result<PortValues, SimError>;
}

/// A 2-to-1 multiplexer: `y = sel == 0 ? a : b`.
#[derive(Clone, Debug)]
pub struct Mux2 {
    name: String,
    ports: Vec<PortSpec>,
    width: u32,
}

impl Mux2 {
    /// Creates a mux with `width`-bit data buses and a 1-bit select.
    pub fn new(width: u32) -> Self {
        Self {
            name: "mux2".to_string(),
            ports: vec![
                PortSpec::input("a", width),
                PortSpec::input("b", width),
                PortSpec::input("sel", 1),
                PortSpec::output("y", width),
            ],
            width,
        }
    }

    /// Returns the data bus width.
    pub fn width(&self) -> u32 {
        self.width
    }

    fn input(&self, inputs: &PortValues, port: &str) -> Result<Bits, SimError> {
        inputs.get(port).ok_or_else(|| SimError::EvalError {
            device: self.name.clone(),
            reason: format!("missing value for input '{port}'"),
        })
    }
}

impl Default for Mux2 {
    fn default() -> Self {
        Self::new(8)
    }
}

impl Device for Mux2 {
    fn name(&self) -> &str {
        &self.name
    }

    fn ports(&self) -> &[PortSpec] {
        &self.ports
    }

    fn evaluate(&self, inputs: &PortValues) -> Result<PortValues, SimError> {
        let a = self.input(inputs, "a")?;
        let b = self.input(inputs, "b")?;
        let sel = self.input(inputs, "sel")?;

        let mut outputs = PortValues::new();
        outputs.insert("y", if sel.is_zero() { a } else { b });
        Ok(outputs)
    }
}
