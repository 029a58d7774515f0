//! `muxbench clean`: remove generated simulation outputs.

use std::io::ErrorKind;

use tracing::debug;

use crate::project::load_bench;
use crate::GlobalArgs;

/// Runs the `muxbench clean` command.
///
/// Deletes the configured sim directory. A directory that does not exist is
/// already clean.
pub fn run(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let bench = load_bench(global)?;
    let sim_dir = bench.sim_dir(None)?;

    match std::fs::remove_dir_all(&sim_dir) {
        Ok(()) => {
            if !global.quiet {
                eprintln!("     Removed {}", sim_dir.display());
            }
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(dir = %sim_dir.display(), "nothing to clean");
        }
        Err(e) => return Err(e.into()),
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn bench_dir(toml: &str) -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("muxbench.toml"), toml).unwrap();
        tmp
    }

    fn global_for(tmp: &TempDir) -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            color: false,
            config: Some(tmp.path().to_str().unwrap().to_string()),
        }
    }

    #[test]
    fn removes_sim_dir() {
        let tmp = bench_dir("[bench]\nname = \"m\"\n");
        let sim = tmp.path().join("sim");
        fs::create_dir_all(&sim).unwrap();
        fs::write(sim.join("simulation.log"), "x").unwrap();

        assert_eq!(run(&global_for(&tmp)).unwrap(), 0);
        assert!(!sim.exists());
    }

    #[test]
    fn missing_dir_is_ok() {
        let tmp = bench_dir("[bench]\nname = \"m\"\n");
        assert_eq!(run(&global_for(&tmp)).unwrap(), 0);
    }

    #[test]
    fn respects_configured_dir() {
        let tmp = bench_dir("[bench]\nname = \"m\"\nsim_dir = \"build\"\n");
        fs::create_dir_all(tmp.path().join("build")).unwrap();
        fs::create_dir_all(tmp.path().join("sim")).unwrap();

        run(&global_for(&tmp)).unwrap();
        assert!(!tmp.path().join("build").exists());
        assert!(tmp.path().join("sim").exists());
    }

    #[test]
    fn bench_root_as_sim_dir_is_refused() {
        for dir in [".", "..", "./"] {
            let tmp = bench_dir(&format!("[bench]\nname = \"m\"\nsim_dir = \"{dir}\"\n"));
            fs::write(tmp.path().join("design.v"), "module m; endmodule\n").unwrap();

            assert!(run(&global_for(&tmp)).is_err(), "{dir:?} accepted");
            assert!(tmp.path().join("muxbench.toml").is_file());
            assert!(tmp.path().join("design.v").is_file());
        }
    }
}
