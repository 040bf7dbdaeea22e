use std::fmt;

use bimdiff_core::DiffError;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad tolerance, empty identity key, etc.).
    ConfigValidation(String),
    /// An entity record could not be compared (wrong shape, nesting blowout).
    Entity {
        snapshot: String,
        id: String,
        source: DiffError,
    },
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Entity { snapshot, id, source } => {
                write!(f, "snapshot '{snapshot}', entity '{id}': {source}")
            }
        }
    }
}

impl std::error::Error for ReconError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Entity { source, .. } => Some(source),
            _ => None,
        }
    }
}
