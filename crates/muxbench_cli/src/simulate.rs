//! `muxbench simulate`: run the directed mux bench.
//!
//! Loads `muxbench.toml`, creates the sim directory, runs the fixed stimulus
//! script, and writes the trace to stdout and to the configured log file.
//! Unless disabled, the run is also recorded as a VCD waveform.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::time::Instant;

use muxbench_sim::{SimConfig, Stimulus};

use crate::project::load_bench;
use crate::{GlobalArgs, SimulateArgs};

/// Runs the `muxbench simulate` command.
pub fn run(args: &SimulateArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    run_with(args, global, io::stdout().lock())
}

/// Runs the bench, echoing trace lines to `console` unless `--quiet` is set.
fn run_with<W: Write>(
    args: &SimulateArgs,
    global: &GlobalArgs,
    console: W,
) -> Result<i32, Box<dyn std::error::Error>> {
    let bench = load_bench(global)?;
    let config = &bench.config;
    let sim_dir = bench.sim_dir(args.sim_dir.as_deref())?;
    std::fs::create_dir_all(&sim_dir)?;

    if !global.quiet {
        eprintln!("   Simulating {}", config.bench.name);
    }

    let log_path = sim_dir.join(&config.output.log_file);
    let log = BufWriter::new(File::create(&log_path)?);
    let trace = Tee {
        log,
        console: (!global.quiet).then_some(console),
    };

    let record_waveform = config.output.waveform && !args.no_waveform;
    let sim_config = SimConfig {
        overflow: config.sim.overflow,
        max_delta: config.sim.max_delta,
        timescale: config.bench.timescale,
        scope: config.bench.name.clone(),
        waveform_path: record_waveform.then(|| sim_dir.join(&config.output.waveform_file)),
        retain_trace: false,
    };

    let start = Instant::now();
    let outcome = muxbench_sim::simulate(&Stimulus::mux2_directed(), &sim_config, trace)?;
    let elapsed = start.elapsed();

    if !global.quiet {
        eprintln!(
            "   Finished at t={} ({} ticks) in {:.2}s",
            outcome.result.final_time,
            config.bench.timescale,
            elapsed.as_secs_f64()
        );
        eprintln!(
            "   {} trace line(s) written to {}",
            outcome.lines,
            log_path.display()
        );
        if let Some(ref path) = outcome.waveform_path {
            eprintln!("   Waveform written to {}", path.display());
        }
    }

    Ok(0)
}

/// Writes every byte to the log and, when present, the console.
struct Tee<L: Write, C: Write> {
    log: L,
    console: Option<C>,
}

impl<L: Write, C: Write> Write for Tee<L, C> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.log.write_all(buf)?;
        if let Some(console) = self.console.as_mut() {
            console.write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.log.flush()?;
        if let Some(console) = self.console.as_mut() {
            console.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const EXPECTED: &str = "\
0, 00000000, 0, 00000000, 0
111101, 10111101, 0, 00111101, 5
111101, 10111101, 1, 10111101, 10
111101, 10111101, 1, 10111101, 15
";

    fn bench_dir(toml: &str) -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("muxbench.toml"), toml).unwrap();
        tmp
    }

    fn mux2_bench() -> TempDir {
        bench_dir("[bench]\nname = \"mux2\"\n")
    }

    fn global_for(tmp: &TempDir, quiet: bool) -> GlobalArgs {
        GlobalArgs {
            quiet,
            verbose: false,
            color: false,
            config: Some(tmp.path().to_str().unwrap().to_string()),
        }
    }

    fn args(no_waveform: bool, sim_dir: Option<&str>) -> SimulateArgs {
        SimulateArgs {
            no_waveform,
            sim_dir: sim_dir.map(str::to_string),
        }
    }

    #[test]
    fn writes_log_and_console() {
        let tmp = mux2_bench();
        let mut console = Vec::new();
        let code = run_with(&args(false, None), &global_for(&tmp, false), &mut console).unwrap();
        assert_eq!(code, 0);
        assert_eq!(String::from_utf8(console).unwrap(), EXPECTED);

        let sim = tmp.path().join("sim");
        assert_eq!(fs::read_to_string(sim.join("simulation.log")).unwrap(), EXPECTED);
        let vcd = fs::read_to_string(sim.join("waveform.vcd")).unwrap();
        assert!(vcd.contains("$scope module mux2 $end"));
    }

    #[test]
    fn quiet_still_writes_log() {
        let tmp = mux2_bench();
        let mut console = Vec::new();
        run_with(&args(false, None), &global_for(&tmp, true), &mut console).unwrap();
        assert!(console.is_empty());
        let log = fs::read_to_string(tmp.path().join("sim/simulation.log")).unwrap();
        assert_eq!(log, EXPECTED);
    }

    #[test]
    fn no_waveform_flag() {
        let tmp = mux2_bench();
        run_with(&args(true, Some("out")), &global_for(&tmp, true), Vec::new()).unwrap();
        assert!(tmp.path().join("out/simulation.log").is_file());
        assert!(!tmp.path().join("out/waveform.vcd").exists());
    }

    #[test]
    fn config_controls_outputs() {
        let tmp = bench_dir(
            "[bench]\nname = \"mux_tb\"\nsim_dir = \"build\"\n\n[output]\nlog_file = \"trace.txt\"\nwaveform = false\n",
        );
        run_with(&args(false, None), &global_for(&tmp, true), Vec::new()).unwrap();
        let build = tmp.path().join("build");
        assert_eq!(fs::read_to_string(build.join("trace.txt")).unwrap(), EXPECTED);
        assert!(!build.join("waveform.vcd").exists());
    }

    #[test]
    fn mistyped_config_creates_nothing() {
        let tmp = mux2_bench();
        let typo = tmp.path().join("muxbnch.toml");
        let global = GlobalArgs {
            quiet: true,
            verbose: false,
            color: false,
            config: Some(typo.to_str().unwrap().to_string()),
        };
        assert!(run_with(&args(false, None), &global, Vec::new()).is_err());
        assert!(!typo.exists());
        assert!(!tmp.path().join("sim").exists());
    }

    #[test]
    fn escaping_sim_dir_override_rejected() {
        let tmp = mux2_bench();
        let err = run_with(&args(false, Some("..")), &global_for(&tmp, true), Vec::new())
            .unwrap_err();
        assert!(err.to_string().contains("sim_dir '..'"));
        assert!(!tmp.path().join("simulation.log").exists());
    }

    #[test]
    fn tee_without_console() {
        let mut tee: Tee<Vec<u8>, Vec<u8>> = Tee {
            log: Vec::new(),
            console: None,
        };
        tee.write_all(b"abc").unwrap();
        tee.flush().unwrap();
        assert_eq!(tee.log, b"abc");
    }
}
