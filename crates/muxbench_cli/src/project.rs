//! Locating the bench directory and its configuration.

use std::path::{Path, PathBuf};

use muxbench_config::{BenchConfig, ConfigError, CONFIG_FILE_NAME};

use crate::GlobalArgs;

/// A loaded bench configuration and the directory it is relative to.
pub struct Bench {
    /// Directory that relative output paths resolve against.
    pub root: PathBuf,
    /// The parsed configuration (defaults when no file exists).
    pub config: BenchConfig,
}

impl Bench {
    /// Returns the simulation output directory, honoring an override.
    ///
    /// An override is held to the same rules as `bench.sim_dir`.
    pub fn sim_dir(&self, override_dir: Option<&str>) -> Result<PathBuf, ConfigError> {
        let dir = match override_dir {
            Some(dir) => {
                muxbench_config::check_sim_dir(dir)?;
                dir
            }
            None => &self.config.bench.sim_dir,
        };
        Ok(self.root.join(dir))
    }
}

/// Loads the bench configuration named by `--config`, or from the working directory.
///
/// `--config` may point at a `muxbench.toml` file or at a directory holding
/// one; either must exist. Without `--config`, a working directory lacking
/// `muxbench.toml` runs with defaults.
pub fn load_bench(global: &GlobalArgs) -> Result<Bench, Box<dyn std::error::Error>> {
    match &global.config {
        Some(config_path) => {
            let p = PathBuf::from(config_path);
            if p.is_file() {
                let root = p
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from("."));
                let config = muxbench_config::load_config_file(&p)?;
                Ok(Bench { root, config })
            } else if p.is_dir() {
                let file = p.join(CONFIG_FILE_NAME);
                if !file.is_file() {
                    return Err(format!("no {CONFIG_FILE_NAME} in {}", p.display()).into());
                }
                let config = muxbench_config::load_config_file(&file)?;
                Ok(Bench { root: p, config })
            } else {
                Err(format!("config path not found: {}", p.display()).into())
            }
        }
        None => {
            let root = std::env::current_dir()?;
            let config = muxbench_config::load_config(&root)?;
            Ok(Bench { root, config })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn global_with(config: &Path) -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            color: false,
            config: Some(config.to_str().unwrap().to_string()),
        }
    }

    fn bench_dir(toml: &str) -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE_NAME), toml).unwrap();
        tmp
    }

    #[test]
    fn load_from_config_file() {
        let tmp = bench_dir("[bench]\nname = \"m\"\nsim_dir = \"build\"\n");
        let bench = load_bench(&global_with(&tmp.path().join(CONFIG_FILE_NAME))).unwrap();
        assert_eq!(bench.root, tmp.path());
        assert_eq!(bench.config.bench.name, "m");
        assert_eq!(bench.sim_dir(None).unwrap(), tmp.path().join("build"));
    }

    #[test]
    fn load_from_config_dir() {
        let tmp = bench_dir("[bench]\nname = \"m\"\n");
        let bench = load_bench(&global_with(tmp.path())).unwrap();
        assert_eq!(bench.root, tmp.path());
        assert_eq!(bench.sim_dir(None).unwrap(), tmp.path().join("sim"));
    }

    #[test]
    fn mistyped_config_file_is_an_error() {
        let tmp = bench_dir("[bench]\nname = \"m\"\n");
        let typo = tmp.path().join("muxbnch.toml");
        let err = load_bench(&global_with(&typo)).err().unwrap();
        assert!(err.to_string().contains("config path not found"));
        assert!(!typo.exists());
    }

    #[test]
    fn config_dir_without_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let err = load_bench(&global_with(tmp.path())).err().unwrap();
        assert!(err.to_string().contains("no muxbench.toml"));
    }

    #[test]
    fn sim_dir_override() {
        let tmp = bench_dir("[bench]\nname = \"m\"\n");
        let bench = load_bench(&global_with(tmp.path())).unwrap();
        assert_eq!(bench.sim_dir(Some("other")).unwrap(), tmp.path().join("other"));
    }

    #[test]
    fn sim_dir_override_cannot_escape() {
        let tmp = bench_dir("[bench]\nname = \"m\"\n");
        let bench = load_bench(&global_with(tmp.path())).unwrap();
        for dir in [".", "..", "../x", "/tmp"] {
            assert!(bench.sim_dir(Some(dir)).is_err(), "{dir:?} accepted");
        }
    }

    #[test]
    fn invalid_config_is_an_error() {
        let tmp = bench_dir("[bench\n");
        assert!(load_bench(&global_with(tmp.path())).is_err());
    }
}
