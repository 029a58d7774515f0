//! muxbench CLI: runs the directed 2-to-1 mux bench and manages its outputs.
//!
//! Provides `muxbench simulate` to run the bench and record its trace and
//! waveform, `muxbench view-wave` to print a recorded waveform as a table,
//! and `muxbench clean` to remove the simulation output directory.

#![warn(missing_docs)]

mod clean;
mod project;
mod simulate;
mod view;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

/// muxbench: a timed stimulus bench for a 2-to-1 multiplexer.
#[derive(Parser, Debug)]
#[command(name = "muxbench", version, about = "2-to-1 mux stimulus bench")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a custom `muxbench.toml` file or the directory containing it.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the directed bench, writing the trace log and waveform.
    Simulate(SimulateArgs),
    /// Print a recorded waveform as a value-change table.
    ViewWave {
        /// VCD file to read. Defaults to the configured waveform in the sim directory.
        path: Option<String>,
    },
    /// Remove the simulation output directory.
    Clean,
}

/// Arguments for the `muxbench simulate` subcommand.
#[derive(Parser, Debug)]
pub struct SimulateArgs {
    /// Disable waveform recording.
    #[arg(long)]
    pub no_waveform: bool,

    /// Override the output directory from `muxbench.toml`.
    #[arg(long)]
    pub sim_dir: Option<String>,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a custom config file or directory.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => std::io::IsTerminal::is_terminal(&std::io::stderr()),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
    };

    init_logging(&global);

    let result = match cli.command {
        Command::Simulate(ref args) => simulate::run(args, &global),
        Command::ViewWave { ref path } => view::run(path.as_deref(), &global),
        Command::Clean => clean::run(&global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Default log directive for the given verbosity flags.
fn log_directive(global: &GlobalArgs) -> &'static str {
    if global.quiet {
        "error"
    } else if global.verbose {
        "debug"
    } else {
        "warn"
    }
}

/// Installs the stderr tracing subscriber. `RUST_LOG` overrides the flags.
fn init_logging(global: &GlobalArgs) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_directive(global)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(global.color)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn global(quiet: bool, verbose: bool) -> GlobalArgs {
        GlobalArgs {
            quiet,
            verbose,
            color: false,
            config: None,
        }
    }

    #[test]
    fn parse_simulate_default() {
        let cli = Cli::parse_from(["muxbench", "simulate"]);
        match cli.command {
            Command::Simulate(ref args) => {
                assert!(!args.no_waveform);
                assert!(args.sim_dir.is_none());
            }
            _ => panic!("expected Simulate command"),
        }
    }

    #[test]
    fn parse_simulate_with_args() {
        let cli = Cli::parse_from(["muxbench", "simulate", "--no-waveform", "--sim-dir", "out"]);
        match cli.command {
            Command::Simulate(ref args) => {
                assert!(args.no_waveform);
                assert_eq!(args.sim_dir.as_deref(), Some("out"));
            }
            _ => panic!("expected Simulate command"),
        }
    }

    #[test]
    fn parse_view_wave() {
        let cli = Cli::parse_from(["muxbench", "view-wave", "sim/waveform.vcd"]);
        match cli.command {
            Command::ViewWave { path } => assert_eq!(path.as_deref(), Some("sim/waveform.vcd")),
            _ => panic!("expected ViewWave command"),
        }
    }

    #[test]
    fn parse_view_wave_default_path() {
        let cli = Cli::parse_from(["muxbench", "view-wave"]);
        assert!(matches!(cli.command, Command::ViewWave { path: None }));
    }

    #[test]
    fn parse_clean() {
        let cli = Cli::parse_from(["muxbench", "clean"]);
        assert!(matches!(cli.command, Command::Clean));
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from(["muxbench", "--quiet", "--color", "never", "simulate"]);
        assert!(cli.quiet);
        assert!(!cli.verbose);
        assert_eq!(cli.color, ColorChoice::Never);
    }

    #[test]
    fn parse_global_flag_after_subcommand() {
        let cli = Cli::parse_from(["muxbench", "clean", "--verbose"]);
        assert!(cli.verbose);
    }

    #[test]
    fn parse_config_path() {
        let cli = Cli::parse_from(["muxbench", "--config", "/path/to/muxbench.toml", "simulate"]);
        assert_eq!(cli.config.as_deref(), Some("/path/to/muxbench.toml"));
    }

    #[test]
    fn missing_subcommand_rejected() {
        assert!(Cli::try_parse_from(["muxbench"]).is_err());
    }

    #[test]
    fn log_directive_levels() {
        assert_eq!(log_directive(&global(false, false)), "warn");
        assert_eq!(log_directive(&global(false, true)), "debug");
        assert_eq!(log_directive(&global(true, true)), "error");
    }
}
