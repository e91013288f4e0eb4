use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a preflight check.
///
/// Expected check outcomes (a version mismatch, a missing or malformed API
/// key) are reported as diagnostics instead.
#[derive(Error, Debug)]
pub enum PreflightError {
    /// A required file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Manifest TOML is malformed or lacks `project.version`.
    #[error("invalid manifest {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Catalog JSON is malformed or lacks a required field.
    #[error("invalid catalog {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A structurally valid document is missing a required entry.
    #[error("{}: missing required field `{field}`", path.display())]
    MissingField { path: PathBuf, field: &'static str },
}

/// Convenience alias for `Result<T, PreflightError>`.
pub type Result<T> = std::result::Result<T, PreflightError>;
