// ABOUTME: SSH-specific error types.
// ABOUTME: Covers connection, authentication, host key, and execution failures.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("host key for {host}:{port} rejected")]
    HostKeyRejected { host: String, port: u16 },

    #[error("authentication failed: all offered keys were rejected")]
    AuthenticationFailed,

    #[error("authentication did not complete within {0:?}")]
    AuthTimeout(Duration),

    #[error("failed to load key from {path}: {reason}")]
    KeyLoadFailed { path: PathBuf, reason: String },

    #[error("no usable private keys: {0}")]
    NoKeys(String),

    #[error("invalid client property {name}={value}: {reason}")]
    InvalidProperty {
        name: String,
        value: String,
        reason: String,
    },

    #[error("command execution failed: {0}")]
    CommandFailed(String),

    #[error("command did not complete within {0:?}")]
    ExecTimeout(Duration),

    #[error("channel closed unexpectedly without exit status")]
    ChannelClosed,

    #[error("SSH protocol error: {0}")]
    Protocol(#[from] russh::Error),

    #[error("SSH key error: {0}")]
    Key(#[from] russh::keys::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
