// ABOUTME: Private key material for public-key authentication.
// ABOUTME: Loads keys from configured paths or the conventional default locations.

use super::error::{Error, Result};
use nonempty::NonEmpty;
use russh::keys::{load_secret_key, ssh_key};
use std::path::PathBuf;
use std::sync::Arc;

/// Supplies the key pairs offered during authentication, in order.
///
/// With explicit paths every path must load; with none, the default
/// `~/.ssh` locations are tried and whichever load is used.
#[derive(Debug, Clone, Default)]
pub struct KeyProvider {
    paths: Vec<PathBuf>,
}

impl KeyProvider {
    pub fn from_paths(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    /// Load the configured keys. The returned list preserves the configured
    /// order, which is also the order they are offered to the server.
    pub fn load(&self) -> Result<NonEmpty<Arc<ssh_key::PrivateKey>>> {
        if self.paths.is_empty() {
            return Self::load_defaults();
        }

        let mut keys = Vec::with_capacity(self.paths.len());
        for path in &self.paths {
            let key = load_secret_key(path, None).map_err(|e| Error::KeyLoadFailed {
                path: path.clone(),
                reason: e.to_string(),
            })?;
            keys.push(Arc::new(key));
        }

        NonEmpty::from_vec(keys)
            .ok_or_else(|| Error::NoKeys("no key paths configured".to_string()))
    }

    fn load_defaults() -> Result<NonEmpty<Arc<ssh_key::PrivateKey>>> {
        let home = std::env::var("HOME")
            .map_err(|_| Error::NoKeys("no key given and HOME not set".to_string()))?;

        let candidates = [
            format!("{home}/.ssh/id_ed25519"),
            format!("{home}/.ssh/id_rsa"),
            format!("{home}/.ssh/id_ecdsa"),
        ];

        let mut keys = Vec::new();
        for path in &candidates {
            if let Ok(key) = load_secret_key(path, None) {
                keys.push(Arc::new(key));
            }
        }

        NonEmpty::from_vec(keys).ok_or_else(|| {
            Error::NoKeys("no key given and no default key found in ~/.ssh".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use russh::keys::ssh_key::LineEnding;
    use russh::keys::{Algorithm, PrivateKey};
    use std::path::Path;

    fn write_fresh_key(path: &Path) -> PrivateKey {
        let key = PrivateKey::random(&mut rand::thread_rng(), Algorithm::Ed25519).unwrap();
        std::fs::write(path, key.to_openssh(LineEnding::LF).unwrap().as_bytes()).unwrap();
        key
    }

    #[test]
    fn keys_are_loaded_in_configured_order() {
        let dir = tempfile::tempdir().unwrap();
        let first_path = dir.path().join("id_first");
        let second_path = dir.path().join("id_second");
        let first = write_fresh_key(&first_path);
        let second = write_fresh_key(&second_path);

        let provider = KeyProvider::from_paths(vec![first_path, second_path]);
        let keys = provider.load().unwrap();

        let loaded: Vec<_> = keys.iter().map(|k| k.public_key().clone()).collect();
        assert_eq!(
            loaded,
            vec![first.public_key().clone(), second.public_key().clone()]
        );
    }

    #[test]
    fn reversing_the_paths_reverses_the_keys() {
        let dir = tempfile::tempdir().unwrap();
        let first_path = dir.path().join("id_first");
        let second_path = dir.path().join("id_second");
        let first = write_fresh_key(&first_path);
        let second = write_fresh_key(&second_path);

        let provider = KeyProvider::from_paths(vec![second_path, first_path]);
        let keys = provider.load().unwrap();

        let loaded: Vec<_> = keys.iter().map(|k| k.public_key().clone()).collect();
        assert_eq!(
            loaded,
            vec![second.public_key().clone(), first.public_key().clone()]
        );
    }

    #[test]
    fn explicit_path_that_does_not_load_is_an_error() {
        let provider = KeyProvider::from_paths(vec![PathBuf::from("/nonexistent/key")]);
        let err = provider.load().unwrap_err();
        assert!(matches!(err, Error::KeyLoadFailed { .. }));
    }

    #[test]
    fn garbage_key_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("id_bogus");
        std::fs::write(&path, "not a private key").unwrap();

        let provider = KeyProvider::from_paths(vec![path.clone()]);
        let err = provider.load().unwrap_err();
        match err {
            Error::KeyLoadFailed { path: p, .. } => assert_eq!(p, path),
            other => panic!("expected KeyLoadFailed, got {other:?}"),
        }
    }
}
