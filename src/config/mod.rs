// ABOUTME: Configuration types and parsing for endrun.yml.
// ABOUTME: Optional file-based defaults that CLI flags override.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "endrun.yml";
pub const CONFIG_FILENAME_ALT: &str = "endrun.yaml";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub user: Option<String>,

    /// Private key files, offered in order during authentication.
    #[serde(default)]
    pub keys: Vec<PathBuf>,

    #[serde(default)]
    pub strict_host_key: bool,

    #[serde(default)]
    pub known_hosts: Option<PathBuf>,

    #[serde(default = "default_auth_timeout", with = "humantime_serde")]
    pub auth_timeout: Duration,

    /// Absent means wait indefinitely for remote completion.
    #[serde(default, with = "humantime_serde")]
    pub exec_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: None,
            user: None,
            keys: Vec::new(),
            strict_host_key: false,
            known_hosts: None,
            auth_timeout: default_auth_timeout(),
            exec_timeout: None,
        }
    }
}

fn default_auth_timeout() -> Duration {
    Duration::from_secs(10)
}

impl Config {
    /// Look for a config file in `dir`. A missing file is not an error.
    pub fn discover(dir: &Path) -> Result<Option<Self>> {
        for name in [CONFIG_FILENAME, CONFIG_FILENAME_ALT] {
            let path = dir.join(name);
            if path.exists() {
                return Self::load(&path).map(Some);
            }
        }
        Ok(None)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::ConfigNotFound(path.to_path_buf()),
            _ => Error::Io(e),
        })?;
        Ok(serde_yaml::from_str(&raw)?)
    }
}
