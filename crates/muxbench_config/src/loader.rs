//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::BenchConfig;
use std::path::{Component, Path};

/// The configuration file name looked up in a bench directory.
pub const CONFIG_FILE_NAME: &str = "muxbench.toml";

/// Loads the configuration for a bench directory.
///
/// Reads `<bench_dir>/muxbench.toml` if it exists. A missing file yields
/// [`BenchConfig::default`]; any other read failure is an error.
pub fn load_config(bench_dir: &Path) -> Result<BenchConfig, ConfigError> {
    let config_path = bench_dir.join(CONFIG_FILE_NAME);
    if !config_path.is_file() {
        return Ok(BenchConfig::default());
    }
    load_config_file(&config_path)
}

/// Loads and validates a configuration from an explicit file path.
pub fn load_config_file(path: &Path) -> Result<BenchConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `muxbench.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<BenchConfig, ConfigError> {
    let config: BenchConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates required fields and value ranges.
fn validate_config(config: &BenchConfig) -> Result<(), ConfigError> {
    if config.bench.name.is_empty() {
        return Err(ConfigError::MissingField("bench.name".to_string()));
    }
    if !is_identifier(&config.bench.name) {
        return Err(ConfigError::ValidationError(format!(
            "bench.name '{}' must be an identifier (letters, digits, '_', not starting with a digit)",
            config.bench.name
        )));
    }
    if config.bench.sim_dir.is_empty() {
        return Err(ConfigError::MissingField("bench.sim_dir".to_string()));
    }
    check_sim_dir(&config.bench.sim_dir)?;
    if config.sim.max_delta == 0 {
        return Err(ConfigError::ValidationError(
            "sim.max_delta must be greater than zero".to_string(),
        ));
    }
    if config.output.log_file.is_empty() {
        return Err(ConfigError::MissingField("output.log_file".to_string()));
    }
    if config.output.waveform && config.output.waveform_file.is_empty() {
        return Err(ConfigError::MissingField(
            "output.waveform_file".to_string(),
        ));
    }
    Ok(())
}

/// Checks that a sim directory names a subdirectory of the bench directory.
///
/// Absolute paths and `..` components are rejected, as is a path that
/// resolves to the bench directory itself.
pub fn check_sim_dir(dir: &str) -> Result<(), ConfigError> {
    let mut has_normal = false;
    for component in Path::new(dir).components() {
        match component {
            Component::Normal(_) => has_normal = true,
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(ConfigError::ValidationError(format!(
                    "sim_dir '{dir}' must be a subdirectory of the bench directory"
                )));
            }
        }
    }
    if !has_normal {
        return Err(ConfigError::ValidationError(format!(
            "sim_dir '{dir}' must name a subdirectory, not the bench directory itself"
        )));
    }
    Ok(())
}

/// Returns `true` for a plain identifier usable as a VCD scope name.
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
