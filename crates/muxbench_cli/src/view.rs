//! `muxbench view-wave`: print a recorded VCD as a value-change table.

use std::io::{self, Write};
use std::path::PathBuf;

use muxbench_sim::{load_vcd_file, LoadedWaveform};
use tracing::debug;

use crate::project::load_bench;
use crate::GlobalArgs;

/// Runs the `muxbench view-wave` command.
///
/// Without an explicit path, reads the configured waveform file from the
/// sim directory.
pub fn run(path: Option<&str>, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let vcd_path = match path {
        Some(p) => PathBuf::from(p),
        None => {
            let bench = load_bench(global)?;
            bench.sim_dir(None)?.join(&bench.config.output.waveform_file)
        }
    };

    if !vcd_path.is_file() {
        return Err(format!(
            "waveform not found: {} (run `muxbench simulate` first)",
            vcd_path.display()
        )
        .into());
    }

    let waveform = load_vcd_file(&vcd_path)?;
    debug!(
        path = %vcd_path.display(),
        signals = waveform.signals.len(),
        end_time = waveform.end_time,
        "waveform loaded"
    );

    let mut out = io::stdout().lock();
    write_table(&waveform, &mut out)?;
    Ok(0)
}

/// Writes one row per change time plus a closing row at the end time.
///
/// Values are printed in full-width binary, one column per signal.
fn write_table<W: Write>(waveform: &LoadedWaveform, out: &mut W) -> io::Result<()> {
    let names: Vec<&str> = waveform
        .signals
        .iter()
        .map(|s| s.name.rsplit('.').next().unwrap_or(&s.name))
        .collect();
    let widths: Vec<usize> = waveform
        .signals
        .iter()
        .zip(&names)
        .map(|(s, n)| (s.width as usize).max(n.len()))
        .collect();

    let mut times = waveform.change_times();
    if times.last() != Some(&waveform.end_time) {
        times.push(waveform.end_time);
    }
    let time_width = times
        .iter()
        .map(|t| t.to_string().len())
        .max()
        .unwrap_or(0)
        .max("time".len());

    write!(out, "{:>time_width$}", "time")?;
    for (name, w) in names.iter().zip(&widths) {
        write!(out, "  {name:>w$}")?;
    }
    writeln!(out)?;

    for t in times {
        write!(out, "{t:>time_width$}")?;
        for (idx, w) in widths.iter().enumerate() {
            match waveform.value_at(idx, t) {
                Some(v) => write!(out, "  {:>w$}", v.to_string())?,
                None => write!(out, "  {:>w$}", "-")?,
            }
        }
        writeln!(out)?;
    }
    Ok(())
}
