use crate::Definition;
use thiserror::Error;

/// Faults found while assembling a definition, before any operation runs.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("effect definition `{name}` has no `pure`")]
    MissingPure { name: String },
    #[error("effect definition `{name}` has no `coerce`, coercion cannot be added")]
    MissingCoerce { name: String },
    #[error("malformed options: {0}")]
    Options(#[from] toml::de::Error),
}

pub type Built = std::result::Result<Definition, ConfigError>;
