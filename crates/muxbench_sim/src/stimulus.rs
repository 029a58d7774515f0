//! Scripted stimulus: relative-delay events of atomic signal assignments.
//!
//! A [`Stimulus`] is fixed at construction. Each [`ScheduledEvent`] carries
//! a delay relative to the previous event and a batch of assignments that
//! the kernel commits together. After the last event the run lasts one more
//! `settle_delay` before it ends.

use crate::error::SimError;
use crate::time::SimTime;

/// One signal assignment inside a scheduled event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    /// Target signal name.
    pub signal: String,
    /// Raw value; checked against the target width when applied.
    pub value: u64,
}

/// A batch of assignments applied atomically after `delay` ticks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduledEvent {
    /// Ticks after the previous event (or after time zero for the first).
    pub delay: u64,
    /// Assignments, applied in order; a later write to the same signal wins.
    pub assignments: Vec<Assignment>,
}

impl ScheduledEvent {
    /// Starts an event `delay` ticks after the previous one.
    pub fn after(delay: u64) -> Self {
        Self {
            delay,
            assignments: Vec::new(),
        }
    }

    /// Adds an assignment to the event.
    pub fn assign(mut self, signal: &str, value: u64) -> Self {
        self.assignments.push(Assignment {
            signal: signal.to_string(),
            value,
        });
        self
    }
}

/// A fixed stimulus script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stimulus {
    /// Events in execution order.
    pub events: Vec<ScheduledEvent>,
    /// Ticks between the last event and end of run.
    pub settle_delay: u64,
}

impl Stimulus {
    /// Creates a script from events and a final settle delay.
    pub fn new(events: Vec<ScheduledEvent>, settle_delay: u64) -> Self {
        Self {
            events,
            settle_delay,
        }
    }

    /// The directed script for the 2-to-1 mux bench.
    ///
    /// ```text
    /// t=0   a=0          b=0          sel=0
    /// t=5   a=0b00111101 b=0b10111101 sel=0
    /// t=10  sel=1
    /// t=15  end of run
    /// ```
    pub fn mux2_directed() -> Self {
        Self::new(
            vec![
                ScheduledEvent::after(0)
                    .assign("a", 0)
                    .assign("b", 0)
                    .assign("sel", 0),
                ScheduledEvent::after(5)
                    .assign("a", 0b0011_1101)
                    .assign("b", 0b1011_1101)
                    .assign("sel", 0),
                ScheduledEvent::after(5).assign("sel", 1),
            ],
            5,
        )
    }

    /// Resolves relative delays into absolute times, in script order.
    pub fn schedule(&self) -> Result<Vec<(SimTime, &ScheduledEvent)>, SimError> {
        let mut now = SimTime::zero();
        let mut out = Vec::with_capacity(self.events.len());
        for event in &self.events {
            now = now.advance_by(event.delay)?;
            out.push((now, event));
        }
        Ok(out)
    }

    /// Returns the time at which the run ends.
    pub fn end_time(&self) -> Result<SimTime, SimError> {
        let last = self
            .schedule()?
            .last()
            .map(|(t, _)| *t)
            .unwrap_or_default();
        last.advance_by(self.settle_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_assignments() {
        let ev = ScheduledEvent::after(3).assign("a", 1).assign("b", 2);
        assert_eq!(ev.delay, 3);
        assert_eq!(ev.assignments.len(), 2);
        assert_eq!(ev.assignments[1].signal, "b");
        assert_eq!(ev.assignments[1].value, 2);
    }

    #[test]
    fn directed_script_shape() {
        let s = Stimulus::mux2_directed();
        assert_eq!(s.events.len(), 3);
        assert_eq!(s.settle_delay, 5);
        assert_eq!(s.events[1].assignments[0].value, 0x3D);
        assert_eq!(s.events[1].assignments[1].value, 0xBD);
        assert_eq!(
            s.events[2].assignments,
            vec![Assignment {
                signal: "sel".into(),
                value: 1
            }]
        );
    }

    #[test]
    fn schedule_accumulates_relative_delays() {
        let s = Stimulus::mux2_directed();
        let times: Vec<u64> = s.schedule().unwrap().iter().map(|(t, _)| t.ticks()).collect();
        assert_eq!(times, [0, 5, 10]);
        assert_eq!(s.end_time().unwrap().ticks(), 15);
    }

    #[test]
    fn zero_delays_share_a_time() {
        let s = Stimulus::new(
            vec![
                ScheduledEvent::after(2).assign("a", 1),
                ScheduledEvent::after(0).assign("b", 1),
            ],
            1,
        );
        let times: Vec<u64> = s.schedule().unwrap().iter().map(|(t, _)| t.ticks()).collect();
        assert_eq!(times, [2, 2]);
        assert_eq!(s.end_time().unwrap().ticks(), 3);
    }

    #[test]
    fn empty_script_ends_after_settle() {
        let s = Stimulus::new(Vec::new(), 4);
        assert!(s.schedule().unwrap().is_empty());
        assert_eq!(s.end_time().unwrap().ticks(), 4);
    }

    #[test]
    fn overflowing_delays_rejected() {
        let s = Stimulus::new(
            vec![
                ScheduledEvent::after(u64::MAX),
                ScheduledEvent::after(1),
            ],
            0,
        );
        assert!(matches!(s.schedule(), Err(SimError::TimeOverflow { .. })));
    }
}
