// ABOUTME: Application-wide error types for endrun.
// ABOUTME: Uses thiserror for ergonomic error handling.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no server URL given (pass --url or set it in endrun.yml)")]
    MissingUrl,

    #[error("no remote user given (pass --user, set it in endrun.yml, or export USER)")]
    MissingUser,

    #[error("configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("endpoint discovery failed: {0}")]
    Discovery(#[from] crate::discovery::Error),

    #[error("SSH error: {0}")]
    Ssh(#[from] crate::ssh::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
