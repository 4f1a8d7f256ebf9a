// ABOUTME: End-to-end run operation: resolve endpoint, build command, execute over SSH.
// ABOUTME: Strictly sequential with no retries; first failure aborts.

use crate::command;
use crate::discovery;
use crate::error::Result;
use crate::ssh::{DEFAULT_AUTH_TIMEOUT, KeyProvider, Session, SessionConfig};
use std::path::PathBuf;
use std::time::Duration;

/// Tuning for the SSH leg of a run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub strict_host_key: bool,
    pub known_hosts_path: Option<PathBuf>,
    pub auth_timeout: Duration,
    /// None waits indefinitely for remote completion.
    pub exec_timeout: Option<Duration>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            strict_host_key: false,
            known_hosts_path: None,
            auth_timeout: DEFAULT_AUTH_TIMEOUT,
            exec_timeout: None,
        }
    }
}

/// Result of a run attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The remote command completed with this exit status.
    Completed(u32),
    /// The server does not advertise an SSH endpoint; the caller may fall
    /// back to another transport.
    SshUnavailable,
}

/// Resolve the SSH endpoint advertised by `base_url`, run `args` there as
/// `user`, streaming this process's standard streams, and return the remote
/// exit status.
pub async fn run(
    base_url: &str,
    user: &str,
    args: &[String],
    provider: &KeyProvider,
    opts: &RunOptions,
) -> Result<RunOutcome> {
    let Some(endpoint) = discovery::resolve(base_url).await? else {
        return Ok(RunOutcome::SshUnavailable);
    };

    let built = command::build(args);

    let mut config = SessionConfig::new(endpoint.host, user)
        .port(endpoint.port)
        .strict_host_key(opts.strict_host_key)
        .auth_timeout(opts.auth_timeout)
        .exec_timeout(opts.exec_timeout)
        .properties(built.properties);
    if let Some(path) = &opts.known_hosts_path {
        config = config.known_hosts_path(path);
    }

    let session = Session::connect(config, provider).await?;
    let result = session.run_command(&built.command).await;

    // Teardown is best-effort; the exit status (or the error that preceded
    // it) takes precedence over a disconnect failure.
    if let Err(e) = session.disconnect().await {
        tracing::warn!("failed to cleanly disconnect SSH session: {}", e);
    }

    Ok(RunOutcome::Completed(result?))
}
