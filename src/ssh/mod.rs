// ABOUTME: SSH client module for running remote commands.
// ABOUTME: Key-based authentication with known_hosts verification and stream passthrough.

mod client;
mod error;
mod keys;
mod properties;

pub use client::{DEFAULT_AUTH_TIMEOUT, Session, SessionConfig};
pub use error::{Error, Result};
pub use keys::KeyProvider;
