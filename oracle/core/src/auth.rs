//! Auth Session
//!
//! Explicit session object holding the bearer token, passed to the
//! networking layer at construction — no ambient globals. The token is
//! cached under a fixed storage path as plain text, no versioning or
//! migration logic. Lifecycle is explicit: `load`, `save` (on set),
//! `clear` (on logout or auth failure).

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;

struct Inner {
    token: Option<String>,
    path: Option<PathBuf>,
}

/// Shared handle to the authenticated session
///
/// Cheap to clone; all clones observe the same token.
#[derive(Clone)]
pub struct AuthSession {
    inner: Arc<RwLock<Inner>>,
}

impl AuthSession {
    /// Session persisted at the given token file path
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                token: None,
                path: Some(path),
            })),
        }
    }

    /// Memory-only session (offline mode, tests)
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                token: None,
                path: None,
            })),
        }
    }

    /// Load a previously saved token from disk
    ///
    /// Returns whether a token was found. A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Propagates filesystem errors other than `NotFound`.
    pub fn load(&self) -> std::io::Result<bool> {
        let path = match self.inner.read().path.clone() {
            Some(path) => path,
            None => return Ok(false),
        };
        match fs::read_to_string(&path) {
            Ok(raw) => {
                let token = raw.trim().to_string();
                if token.is_empty() {
                    return Ok(false);
                }
                self.inner.write().token = Some(token);
                tracing::debug!("auth token loaded");
                Ok(true)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Store a token and persist it
    ///
    /// # Errors
    ///
    /// Propagates filesystem errors; the in-memory token is set regardless
    /// so the running session stays usable.
    pub fn set_token(&self, token: impl Into<String>) -> std::io::Result<()> {
        let token = token.into();
        let path = {
            let mut inner = self.inner.write();
            inner.token = Some(token.clone());
            inner.path.clone()
        };
        if let Some(path) = path {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, &token)?;
            tracing::info!("auth token saved");
        }
        Ok(())
    }

    /// Current bearer token, if authenticated
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.inner.read().token.clone()
    }

    /// Whether a token is present
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.read().token.is_some()
    }

    /// Forget the token and remove its file
    ///
    /// Used on logout and on a 401/403 from the backend. Removal failures
    /// are logged, not propagated: the in-memory state is authoritative.
    pub fn clear(&self) {
        let path = {
            let mut inner = self.inner.write();
            inner.token = None;
            inner.path.clone()
        };
        if let Some(path) = path {
            if let Err(err) = fs::remove_file(&path) {
                if err.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(error = %err, "failed to remove token file");
                }
            }
        }
        tracing::info!("auth session cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");

        let session = AuthSession::new(path.clone());
        session.set_token("secret-token").unwrap();
        assert!(session.is_authenticated());

        let restored = AuthSession::new(path);
        assert!(restored.load().unwrap());
        assert_eq!(restored.token().as_deref(), Some("secret-token"));
    }

    #[test]
    fn test_load_missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let session = AuthSession::new(dir.path().join("absent"));
        assert!(!session.load().unwrap());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_clear_removes_token_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        let session = AuthSession::new(path.clone());
        session.set_token("secret").unwrap();

        session.clear();
        assert!(!session.is_authenticated());
        assert!(!path.exists());
    }

    #[test]
    fn test_clones_share_state() {
        let session = AuthSession::in_memory();
        let clone = session.clone();
        session.set_token("shared").unwrap();
        assert_eq!(clone.token().as_deref(), Some("shared"));
        clone.clear();
        assert!(!session.is_authenticated());
    }
}
