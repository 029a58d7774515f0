//! Errors raised while reading `muxbench.toml`.

/// A `muxbench.toml` that could not be read, parsed, or accepted.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("cannot read muxbench.toml: {0}")]
    IoError(#[from] std::io::Error),

    /// The file is not valid TOML or does not match the bench schema.
    #[error("malformed muxbench.toml: {0}")]
    ParseError(String),

    /// A key the bench needs is absent or empty.
    #[error("muxbench.toml: `{0}` must be set")]
    MissingField(String),

    /// A value is present but unusable for a bench run.
    #[error("muxbench.toml: {0}")]
    ValidationError(String),
}
