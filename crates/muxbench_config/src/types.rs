//! Configuration types deserialized from `muxbench.toml`.

use muxbench_common::{OverflowPolicy, Timescale};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};

/// The top-level bench configuration parsed from `muxbench.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct BenchConfig {
    /// Bench identity and output locations.
    pub bench: BenchMeta,
    /// Kernel settings (overflow policy, delta limit).
    #[serde(default)]
    pub sim: SimSettings,
    /// Trace log and waveform file settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Core bench metadata.
#[derive(Debug, Deserialize)]
pub struct BenchMeta {
    /// The bench name, used in status output and as the VCD scope.
    pub name: String,
    /// Directory for generated files, relative to the bench directory.
    #[serde(default = "default_sim_dir")]
    pub sim_dir: String,
    /// Length of one simulation tick.
    #[serde(default, deserialize_with = "deserialize_timescale")]
    pub timescale: Timescale,
}

impl Default for BenchMeta {
    fn default() -> Self {
        Self {
            name: "mux2".to_string(),
            sim_dir: default_sim_dir(),
            timescale: Timescale::default(),
        }
    }
}

/// Settings for the simulation kernel.
#[derive(Debug, Deserialize)]
pub struct SimSettings {
    /// What to do when a scripted value exceeds its signal's width.
    #[serde(default)]
    pub overflow: OverflowPolicy,
    /// Maximum settle passes per time step before declaring a combinational loop.
    #[serde(default = "default_max_delta")]
    pub max_delta: u32,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            overflow: OverflowPolicy::default(),
            max_delta: default_max_delta(),
        }
    }
}

/// Output file settings.
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Trace log file name inside the sim directory.
    #[serde(default = "default_log_file")]
    pub log_file: String,
    /// Whether to record a VCD waveform.
    #[serde(default = "default_true")]
    pub waveform: bool,
    /// Waveform file name inside the sim directory.
    #[serde(default = "default_waveform_file")]
    pub waveform_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            log_file: default_log_file(),
            waveform: true,
            waveform_file: default_waveform_file(),
        }
    }
}

fn default_sim_dir() -> String {
    "sim".to_string()
}

fn default_max_delta() -> u32 {
    1000
}

fn default_log_file() -> String {
    "simulation.log".to_string()
}

fn default_waveform_file() -> String {
    "waveform.vcd".to_string()
}

fn default_true() -> bool {
    true
}

/// Deserializes a timescale from a string like `"1ns"` or `"10ps"`.
fn deserialize_timescale<'de, D>(deserializer: D) -> Result<Timescale, D::Error>
where
    D: Deserializer<'de>,
{
    struct TimescaleStr;

    impl Visitor<'_> for TimescaleStr {
        type Value = Timescale;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("a timescale such as \"1ns\" or \"10ps\"")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            v.parse().map_err(E::custom)
        }
    }

    deserializer.deserialize_str(TimescaleStr)
}
