//! The trace monitor: one formatted line per observed change.
//!
//! [`Monitor`] watches an ordered list of [`TraceField`]s. It prints a line
//! on the first time step, on every later step where any watched value
//! differs from the last printed line, and once more when the run ends.
//! Each line is the rendered fields followed by the simulation time in
//! decimal, joined by `", "`.

use std::io::Write;

use muxbench_common::{Bits, FieldFormat};

use crate::error::SimError;
use crate::observer::Observer;
use crate::signal::{SignalBank, SignalId};
use crate::time::SimTime;

const SEPARATOR: &str = ", ";

/// One watched signal and how to print it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceField {
    /// Signal name.
    pub signal: String,
    /// Radix and padding for this field.
    pub format: FieldFormat,
}

impl TraceField {
    /// Creates a field.
    pub fn new(signal: &str, format: FieldFormat) -> Self {
        Self {
            signal: signal.to_string(),
            format,
        }
    }
}

/// Trace-emitting observer.
pub struct Monitor<W: Write> {
    writer: W,
    fields: Vec<TraceField>,
    ids: Vec<SignalId>,
    last_reported: Option<Vec<Bits>>,
    line_count: usize,
    retained: Option<Vec<String>>,
}

impl<W: Write> Monitor<W> {
    /// Creates a monitor over the given fields.
    pub fn new(writer: W, fields: Vec<TraceField>) -> Self {
        Self {
            writer,
            fields,
            ids: Vec::new(),
            last_reported: None,
            line_count: 0,
            retained: None,
        }
    }

    /// The mux bench trace: `a` compact binary, then `b`, `sel`, `y` full-width binary.
    pub fn mux2(writer: W) -> Self {
        Self::new(
            writer,
            vec![
                TraceField::new("a", FieldFormat::BINARY_COMPACT),
                TraceField::new("b", FieldFormat::BINARY),
                TraceField::new("sel", FieldFormat::BINARY),
                TraceField::new("y", FieldFormat::BINARY),
            ],
        )
    }

    /// Also keeps a copy of every emitted line, readable through [`Monitor::lines`].
    pub fn retain_lines(mut self) -> Self {
        self.retained = Some(Vec::new());
        self
    }

    /// Returns the retained lines, without trailing newlines.
    ///
    /// Empty unless [`Monitor::retain_lines`] was called.
    pub fn lines(&self) -> &[String] {
        self.retained.as_deref().unwrap_or_default()
    }

    /// Returns how many lines have been written.
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Consumes the monitor, returning the writer.
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn watched(&self, signals: &SignalBank) -> Vec<Bits> {
        self.ids.iter().map(|id| signals.value(*id)).collect()
    }

    fn format_line(&self, values: &[Bits], time: SimTime) -> String {
        let mut parts: Vec<String> = self
            .fields
            .iter()
            .zip(values)
            .map(|(field, value)| field.format.render(value))
            .collect();
        parts.push(time.to_string());
        parts.join(SEPARATOR)
    }

    fn emit(&mut self, values: Vec<Bits>, time: SimTime) -> Result<(), SimError> {
        let line = self.format_line(&values, time);
        writeln!(self.writer, "{line}")?;
        self.line_count += 1;
        if let Some(retained) = self.retained.as_mut() {
            retained.push(line);
        }
        self.last_reported = Some(values);
        Ok(())
    }
}

impl<W: Write> Observer for Monitor<W> {
    fn begin(&mut self, signals: &SignalBank) -> Result<(), SimError> {
        self.ids = self
            .fields
            .iter()
            .map(|f| signals.resolve(&f.signal))
            .collect::<Result<_, _>>()?;
        Ok(())
    }

    fn on_step(
        &mut self,
        time: SimTime,
        signals: &SignalBank,
        _changed: &[SignalId],
    ) -> Result<(), SimError> {
        let values = self.watched(signals);
        if self.last_reported.as_ref() != Some(&values) {
            self.emit(values, time)?;
        }
        Ok(())
    }

    fn on_finish(&mut self, time: SimTime, signals: &SignalBank) -> Result<(), SimError> {
        let values = self.watched(signals);
        self.emit(values, time)?;
        self.writer.flush()?;
        Ok(())
    }
}
