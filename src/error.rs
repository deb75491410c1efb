use std::path::PathBuf;

use thiserror::Error;

use crate::registry::BuildError;

/// Errors triggered during registration, configuration and resolution
///
/// Every failure is surfaced synchronously to the caller; nothing is
/// retried. A failed resolution aborts the whole chain, but cache entries
/// committed for fully-resolved nested dependencies are kept.
#[derive(Error, Debug)]
pub enum WiringError {
    #[error("no container has been installed for this process")]
    NotInitialized,
    #[error("a container has already been installed for this process")]
    AlreadyInitialized,
    #[error("configuration is locked once resolution has started")]
    ConfigsLocked,
    #[error("unknown type `{0}`")]
    UnknownType(String),
    #[error("type `{0}` is already registered")]
    DuplicateType(String),
    #[error("missing value for parameter `{param}` of `{type_name}`")]
    MissingParameter { type_name: String, param: String },
    #[error("`{type_name}` does not provide `{capability}`")]
    UnexpectedType {
        type_name: String,
        capability: String,
    },
    #[error("constructing `{type_name}` failed: {source}")]
    ConstructionFailed {
        type_name: String,
        #[source]
        source: BuildError,
    },
    #[error("cyclic resolution: {chain}")]
    CyclicResolution { chain: String },
    #[error("cannot load configuration from {}: {}", .path.display(), .reason)]
    ConfigFile { path: PathBuf, reason: String },
}
