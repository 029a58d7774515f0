//! The subscription interface the kernel notifies after every time step.
//!
//! Observers are called synchronously, in registration order, and only
//! after the step's assignment batch has been committed and every device
//! has settled. They get shared access to the signal bank and never see a
//! partially applied batch.

use crate::error::SimError;
use crate::signal::{SignalBank, SignalId};
use crate::time::SimTime;

/// A read-only subscriber to kernel time steps.
pub trait Observer {
    /// Called once before the first step, with every signal declared.
    fn begin(&mut self, signals: &SignalBank) -> Result<(), SimError>;

    /// Called after each settled time step.
    ///
    /// `changed` lists signals whose value differs from the previous step,
    /// in declaration order. The first call happens at time zero.
    fn on_step(
        &mut self,
        time: SimTime,
        signals: &SignalBank,
        changed: &[SignalId],
    ) -> Result<(), SimError>;

    /// Called once when the run ends.
    fn on_finish(&mut self, time: SimTime, signals: &SignalBank) -> Result<(), SimError>;
}
