//! Waveform recording as an IEEE 1364 Value Change Dump (VCD).
//!
//! [`VcdRecorder`] is an [`Observer`]: it declares every bench signal in
//! `begin`, dumps initial values at the first step, writes only the changed
//! signals afterwards, and stamps the end-of-run time in `on_finish`.

use std::io::Write;

use muxbench_common::{Bits, Timescale};

use crate::error::SimError;
use crate::observer::Observer;
use crate::signal::{SignalBank, SignalId};
use crate::time::SimTime;

/// VCD writer for bench signals.
///
/// Identifier codes use printable ASCII starting from `!` (0x21).
pub struct VcdRecorder<W: Write> {
    writer: W,
    scope: String,
    timescale: Timescale,
    codes: Vec<String>,
    dumped_initial: bool,
}

impl<W: Write> VcdRecorder<W> {
    /// Creates a recorder that places all signals under module `scope`.
    pub fn new(writer: W, scope: &str, timescale: Timescale) -> Self {
        Self {
            writer,
            scope: scope.to_string(),
            timescale,
            codes: Vec::new(),
            dumped_initial: false,
        }
    }

    /// Consumes the recorder, returning the writer.
    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Generates a VCD identifier code from a sequential index.
    ///
    /// Multi-character codes are generated for indices >= 94.
    fn make_id_code(index: u32) -> String {
        let mut result = String::new();
        let mut idx = index;
        loop {
            let c = (b'!' + (idx % 94) as u8) as char;
            result.push(c);
            idx /= 94;
            if idx == 0 {
                break;
            }
            idx -= 1;
        }
        result
    }

    fn write_value(&mut self, id: SignalId, value: &Bits) -> Result<(), SimError> {
        let code = &self.codes[id.as_raw() as usize];
        if value.width() == 1 {
            writeln!(self.writer, "{}{code}", if value.bit(0) { '1' } else { '0' })?;
        } else {
            writeln!(self.writer, "b{value} {code}")?;
        }
        Ok(())
    }
}

impl<W: Write> Observer for VcdRecorder<W> {
    fn begin(&mut self, signals: &SignalBank) -> Result<(), SimError> {
        writeln!(self.writer, "$version")?;
        writeln!(self.writer, "  muxbench {}", env!("CARGO_PKG_VERSION"))?;
        writeln!(self.writer, "$end")?;
        writeln!(self.writer, "$timescale")?;
        writeln!(self.writer, "  {}", self.timescale)?;
        writeln!(self.writer, "$end")?;
        writeln!(self.writer, "$scope module {} $end", self.scope)?;

        self.codes.clear();
        for (id, state) in signals.iter() {
            let code = Self::make_id_code(id.as_raw());
            writeln!(
                self.writer,
                "$var wire {} {code} {} $end",
                state.width, state.name
            )?;
            self.codes.push(code);
        }

        writeln!(self.writer, "$upscope $end")?;
        writeln!(self.writer, "$enddefinitions $end")?;
        Ok(())
    }

    fn on_step(
        &mut self,
        time: SimTime,
        signals: &SignalBank,
        changed: &[SignalId],
    ) -> Result<(), SimError> {
        if !self.dumped_initial {
            writeln!(self.writer, "#{time}")?;
            writeln!(self.writer, "$dumpvars")?;
            for (id, state) in signals.iter() {
                self.write_value(id, &state.value)?;
            }
            writeln!(self.writer, "$end")?;
            self.dumped_initial = true;
            return Ok(());
        }

        if changed.is_empty() {
            return Ok(());
        }
        writeln!(self.writer, "#{time}")?;
        for &id in changed {
            self.write_value(id, &signals.value(id))?;
        }
        Ok(())
    }

    fn on_finish(&mut self, time: SimTime, _signals: &SignalBank) -> Result<(), SimError> {
        writeln!(self.writer, "#{time}")?;
        self.writer.flush()?;
        Ok(())
    }
}
