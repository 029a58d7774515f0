//! Bench signals and the signal store shared by the kernel and its observers.
//!
//! Every signal has a flat [`SignalId`], a declared width, and a current
//! [`Bits`] value that starts at zero. Only the kernel holds a mutable
//! [`SignalBank`]; devices and observers see it through shared references.

use muxbench_common::Bits;
use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Opaque ID for a bench signal, assigned in declaration order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct SignalId(u32);

impl SignalId {
    /// Creates a `SignalId` from a raw index.
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

/// Who is allowed to write a signal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Driver {
    /// Written by the stimulus script.
    Stimulus,
    /// Written by the named device's output port during settle.
    Device(String),
}

/// The runtime state of one signal.
#[derive(Clone, Debug)]
pub struct SignalState {
    /// Signal name, unique within the bench.
    pub name: String,
    /// Declared width in bits.
    pub width: u32,
    /// Current value.
    pub value: Bits,
    /// The signal's single writer.
    pub driver: Driver,
}

/// An ordered store of bench signals.
#[derive(Clone, Debug, Default)]
pub struct SignalBank {
    signals: Vec<SignalState>,
}

impl SignalBank {
    /// Creates an empty bank.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a zero-initialised signal driven by the stimulus script.
    pub fn declare(&mut self, name: &str, width: u32) -> Result<SignalId, SimError> {
        if self.find(name).is_some() {
            return Err(SimError::DuplicateSignal {
                name: name.to_string(),
            });
        }
        let value = Bits::zero(width)?;
        let id = SignalId::from_raw(self.signals.len() as u32);
        self.signals.push(SignalState {
            name: name.to_string(),
            width,
            value,
            driver: Driver::Stimulus,
        });
        Ok(id)
    }

    /// Finds a signal by name.
    pub fn find(&self, name: &str) -> Option<SignalId> {
        self.signals
            .iter()
            .position(|s| s.name == name)
            .map(|i| SignalId::from_raw(i as u32))
    }

    /// Finds a signal by name, failing with [`SimError::UnknownSignal`].
    pub fn resolve(&self, name: &str) -> Result<SignalId, SimError> {
        self.find(name).ok_or_else(|| SimError::UnknownSignal {
            name: name.to_string(),
        })
    }

    /// Returns the state of a signal.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this bank.
    pub fn get(&self, id: SignalId) -> &SignalState {
        &self.signals[id.as_raw() as usize]
    }

    pub(crate) fn get_mut(&mut self, id: SignalId) -> &mut SignalState {
        &mut self.signals[id.as_raw() as usize]
    }

    /// Returns the current value of a signal.
    pub fn value(&self, id: SignalId) -> Bits {
        self.get(id).value
    }

    /// Returns the current value of a signal by name.
    pub fn value_of(&self, name: &str) -> Option<Bits> {
        self.find(name).map(|id| self.value(id))
    }

    /// Returns a copy of every current value, indexed by raw signal ID.
    pub fn snapshot(&self) -> Vec<Bits> {
        self.signals.iter().map(|s| s.value).collect()
    }

    /// Iterates over signals in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (SignalId, &SignalState)> {
        self.signals
            .iter()
            .enumerate()
            .map(|(i, s)| (SignalId::from_raw(i as u32), s))
    }

    /// Returns the number of signals.
    pub fn len(&self) -> usize {
        self.signals.len()
    }

    /// Returns `true` if no signals have been declared.
    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_id_roundtrip() {
        let id = SignalId::from_raw(42);
        assert_eq!(id.as_raw(), 42);
    }

    #[test]
    fn declare_starts_at_zero() {
        let mut bank = SignalBank::new();
        let a = bank.declare("a", 8).unwrap();
        let s = bank.get(a);
        assert_eq!(s.name, "a");
        assert_eq!(s.width, 8);
        assert!(s.value.is_zero());
        assert_eq!(s.driver, Driver::Stimulus);
    }

    #[test]
    fn ids_follow_declaration_order() {
        let mut bank = SignalBank::new();
        let a = bank.declare("a", 8).unwrap();
        let sel = bank.declare("sel", 1).unwrap();
        assert_eq!(a.as_raw(), 0);
        assert_eq!(sel.as_raw(), 1);
        let names: Vec<_> = bank.iter().map(|(_, s)| s.name.as_str()).collect();
        assert_eq!(names, ["a", "sel"]);
    }

    #[test]
    fn duplicate_rejected() {
        let mut bank = SignalBank::new();
        bank.declare("a", 8).unwrap();
        assert!(matches!(
            bank.declare("a", 4),
            Err(SimError::DuplicateSignal { .. })
        ));
    }

    #[test]
    fn zero_width_rejected() {
        let mut bank = SignalBank::new();
        assert!(matches!(
            bank.declare("bad", 0),
            Err(SimError::InvalidWidth(_))
        ));
        assert!(bank.is_empty());
    }

    #[test]
    fn resolve_unknown() {
        let bank = SignalBank::new();
        assert!(matches!(
            bank.resolve("missing"),
            Err(SimError::UnknownSignal { .. })
        ));
    }

    #[test]
    fn value_lookup_and_snapshot() {
        let mut bank = SignalBank::new();
        let a = bank.declare("a", 8).unwrap();
        bank.declare("b", 8).unwrap();
        bank.get_mut(a).value = Bits::new(0x3D, 8).unwrap();
        assert_eq!(bank.value_of("a").unwrap().value(), 0x3D);
        assert!(bank.value_of("c").is_none());
        let snap = bank.snapshot();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap[0].value(), 0x3D);
        assert_eq!(bank.len(), 2);
    }
}
