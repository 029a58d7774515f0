//! Parsing and validation of `muxbench.toml` bench configuration files.
//!
//! This crate reads the optional bench configuration and produces a
//! strongly-typed [`BenchConfig`] controlling output locations, the
//! simulation timescale, and kernel limits. The stimulus script itself is
//! fixed in `muxbench_sim` and is not configurable.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{
    check_sim_dir, load_config, load_config_file, load_config_from_str, CONFIG_FILE_NAME,
};
pub use types::*;
