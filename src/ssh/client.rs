// ABOUTME: SSH session management using russh.
// ABOUTME: Handles connection, authentication, and exec with standard stream passthrough.

use super::error::{Error, Result};
use super::keys::KeyProvider;
use super::properties;
use russh::client::{self, Config, Handle};
use russh::keys::known_hosts::{
    check_known_hosts, check_known_hosts_path, learn_known_hosts, learn_known_hosts_path,
};
use russh::keys::{PrivateKeyWithHashAlg, ssh_key};
use russh::{ChannelMsg, Disconnect};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Deadline for the whole authentication phase.
pub const DEFAULT_AUTH_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for establishing an SSH session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Remote host to connect to.
    pub host: String,
    /// SSH port (default: 22).
    pub port: u16,
    /// Username for authentication.
    pub user: String,
    /// Reject unknown host keys instead of trusting them on first use.
    pub strict_host_key: bool,
    /// Optional path to known_hosts file.
    /// If None, uses the default ~/.ssh/known_hosts.
    pub known_hosts_path: Option<PathBuf>,
    /// Deadline for authentication (default: 10 seconds).
    pub auth_timeout: Duration,
    /// Deadline for remote command completion. None waits indefinitely.
    pub exec_timeout: Option<Duration>,
    /// Client property overrides applied to the russh configuration.
    pub properties: Vec<(String, String)>,
}

impl SessionConfig {
    pub fn new(host: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 22,
            user: user.into(),
            strict_host_key: false,
            known_hosts_path: None,
            auth_timeout: DEFAULT_AUTH_TIMEOUT,
            exec_timeout: None,
            properties: Vec::new(),
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn strict_host_key(mut self, strict: bool) -> Self {
        self.strict_host_key = strict;
        self
    }

    pub fn known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    pub fn auth_timeout(mut self, timeout: Duration) -> Self {
        self.auth_timeout = timeout;
        self
    }

    pub fn exec_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.exec_timeout = timeout;
        self
    }

    pub fn properties(mut self, properties: Vec<(String, String)>) -> Self {
        self.properties = properties;
        self
    }
}

/// Outcome of the known-hosts lookup, reduced to what the policy needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyCheck {
    Known,
    Unknown,
    Changed,
    CheckFailed,
}

/// What to do with the server key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyDecision {
    Accept,
    AcceptAndLearn,
    Reject,
}

/// Trust policy: known keys pass, changed keys never pass, unknown keys pass
/// unless strict checking is requested.
fn decide(check: KeyCheck, strict: bool) -> KeyDecision {
    match check {
        KeyCheck::Known => KeyDecision::Accept,
        KeyCheck::Changed => KeyDecision::Reject,
        KeyCheck::Unknown if strict => KeyDecision::Reject,
        KeyCheck::Unknown => KeyDecision::AcceptAndLearn,
        // An unreadable known_hosts store is treated like an unknown host,
        // without trying to write back to it.
        KeyCheck::CheckFailed if strict => KeyDecision::Reject,
        KeyCheck::CheckFailed => KeyDecision::Accept,
    }
}

/// SSH client handler for russh.
pub(crate) struct SshHandler {
    host: String,
    port: u16,
    strict_host_key: bool,
    known_hosts_path: Option<PathBuf>,
    rejected: Arc<AtomicBool>,
}

impl client::Handler for SshHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &ssh_key::PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        let check = match &self.known_hosts_path {
            Some(path) => check_known_hosts_path(&self.host, self.port, server_public_key, path),
            None => check_known_hosts(&self.host, self.port, server_public_key),
        };

        let check = match check {
            Ok(true) => KeyCheck::Known,
            Ok(false) => KeyCheck::Unknown,
            Err(russh::keys::Error::KeyChanged { .. }) => KeyCheck::Changed,
            Err(e) => {
                tracing::warn!("known_hosts lookup failed: {}", e);
                KeyCheck::CheckFailed
            }
        };

        if check != KeyCheck::Known {
            tracing::warn!(
                "unknown host key for {}:{} ({:?})",
                self.host,
                self.port,
                check
            );
        }

        match decide(check, self.strict_host_key) {
            KeyDecision::Accept => Ok(true),
            KeyDecision::AcceptAndLearn => {
                let learned = match &self.known_hosts_path {
                    Some(path) => {
                        learn_known_hosts_path(&self.host, self.port, server_public_key, path)
                    }
                    None => learn_known_hosts(&self.host, self.port, server_public_key),
                };
                if let Err(e) = learned {
                    tracing::warn!("failed to save host key to known_hosts: {}", e);
                }
                Ok(true)
            }
            KeyDecision::Reject => {
                self.rejected.store(true, Ordering::SeqCst);
                Ok(false)
            }
        }
    }
}

/// An established SSH session.
pub struct Session {
    config: SessionConfig,
    handle: Handle<SshHandler>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("handle", &"<russh::Handle>")
            .finish()
    }
}

impl Session {
    /// Connect to the remote host and authenticate with the provider's keys.
    pub async fn connect(config: SessionConfig, provider: &KeyProvider) -> Result<Self> {
        let keys = provider.load()?;

        let mut russh_config = Config {
            inactivity_timeout: Some(Duration::from_secs(30)),
            ..Default::default()
        };
        properties::apply(&mut russh_config, &config.properties)?;

        let rejected = Arc::new(AtomicBool::new(false));
        let handler = SshHandler {
            host: config.host.clone(),
            port: config.port,
            strict_host_key: config.strict_host_key,
            known_hosts_path: config.known_hosts_path.clone(),
            rejected: Arc::clone(&rejected),
        };

        let mut handle = client::connect(
            Arc::new(russh_config),
            (config.host.as_str(), config.port),
            handler,
        )
        .await
        .map_err(|e| {
            if rejected.load(Ordering::SeqCst) {
                Error::HostKeyRejected {
                    host: config.host.clone(),
                    port: config.port,
                }
            } else {
                Error::Connection(e.to_string())
            }
        })?;

        let authenticated = tokio::time::timeout(
            config.auth_timeout,
            Self::authenticate(&mut handle, &config.user, &keys),
        )
        .await
        .map_err(|_| Error::AuthTimeout(config.auth_timeout))??;

        if !authenticated {
            return Err(Error::AuthenticationFailed);
        }

        Ok(Self { config, handle })
    }

    /// Offer every key in order; the first one the server accepts wins.
    async fn authenticate(
        handle: &mut Handle<SshHandler>,
        user: &str,
        keys: &nonempty::NonEmpty<Arc<ssh_key::PrivateKey>>,
    ) -> Result<bool> {
        let hash_alg = handle
            .best_supported_rsa_hash()
            .await
            .map_err(Error::Protocol)?
            .flatten();

        for key in keys.iter() {
            tracing::debug!("offering {} private key", key.algorithm());
            let result = handle
                .authenticate_publickey(user, PrivateKeyWithHashAlg::new(Arc::clone(key), hash_alg))
                .await
                .map_err(Error::Protocol)?;
            if result.success() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Run a command on an exec channel bound to this process's standard
    /// streams and return its exit status.
    pub async fn run_command(&self, command: &str) -> Result<u32> {
        match self.config.exec_timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.run_inner(command))
                .await
                .map_err(|_| Error::ExecTimeout(timeout))?,
            None => self.run_inner(command).await,
        }
    }

    async fn run_inner(&self, command: &str) -> Result<u32> {
        let mut channel = self
            .handle
            .channel_open_session()
            .await
            .map_err(|e| Error::CommandFailed(format!("failed to open channel: {e}")))?;

        channel
            .exec(true, command)
            .await
            .map_err(|e| Error::CommandFailed(format!("failed to exec command: {e}")))?;

        // The process streams are inherited, never closed: local stdin EOF is
        // signalled to the remote side with a channel EOF only.
        let mut stdin = tokio::io::stdin();
        let mut stdout = tokio::io::stdout();
        let mut stderr = tokio::io::stderr();

        let mut buf = vec![0u8; 65536];
        let mut stdin_open = true;
        let mut exit_status = None;
        let mut got_eof = false;

        loop {
            tokio::select! {
                r = stdin.read(&mut buf), if stdin_open => match r {
                    Ok(0) => {
                        stdin_open = false;
                        channel.eof().await?;
                    }
                    Ok(n) => {
                        channel.data(&buf[..n]).await?;
                    }
                    Err(e) => {
                        tracing::debug!("stdin read error: {}", e);
                        stdin_open = false;
                        channel.eof().await?;
                    }
                },
                msg = channel.wait() => match msg {
                    Some(ChannelMsg::Data { data }) => {
                        stdout.write_all(&data).await?;
                        stdout.flush().await?;
                    }
                    Some(ChannelMsg::ExtendedData { data, ext }) if ext == 1 => {
                        stderr.write_all(&data).await?;
                        stderr.flush().await?;
                    }
                    Some(ChannelMsg::ExitStatus { exit_status: status }) => {
                        exit_status = Some(status);
                        if got_eof {
                            break;
                        }
                    }
                    Some(ChannelMsg::Eof) => {
                        got_eof = true;
                        if exit_status.is_some() {
                            break;
                        }
                    }
                    Some(ChannelMsg::Close) => break,
                    Some(_) => {}
                    None => break,
                },
            }
        }

        // A channel that went away without reporting an exit status means the
        // remote side terminated abnormally.
        exit_status.ok_or(Error::ChannelClosed)
    }

    /// Disconnect the session.
    pub async fn disconnect(self) -> Result<()> {
        self.handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await
            .map_err(Error::Protocol)?;
        Ok(())
    }
}
