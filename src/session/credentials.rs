//! Credential persistence
//!
//! Stores the `(token, username)` pair between runs so a later process can
//! restore the session silently. The file backend writes a two-key TOML file:
//!
//! ```toml
//! token = "..."
//! username = "alice"
//! ```

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::SessionError;
use crate::models::Credentials;

/// Key-value storage for the session credential pair
pub trait CredentialStore: Send + Sync {
    /// Read stored credentials, if any
    fn load(&self) -> Result<Option<Credentials>, SessionError>;

    /// Persist credentials, replacing any previous pair
    fn save(&self, credentials: &Credentials) -> Result<(), SessionError>;

    /// Remove stored credentials entirely
    fn clear(&self) -> Result<(), SessionError>;
}

impl<T: CredentialStore + ?Sized> CredentialStore for std::sync::Arc<T> {
    fn load(&self) -> Result<Option<Credentials>, SessionError> {
        (**self).load()
    }

    fn save(&self, credentials: &Credentials) -> Result<(), SessionError> {
        (**self).save(credentials)
    }

    fn clear(&self) -> Result<(), SessionError> {
        (**self).clear()
    }
}

/// Credentials kept in a TOML file
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Credentials>, SessionError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SessionError::Io(e)),
        };

        let credentials: Credentials =
            toml::from_str(&content).map_err(|e| SessionError::Parse {
                path: self.path.clone(),
                error: e.to_string(),
            })?;

        Ok(Some(credentials))
    }

    fn save(&self, credentials: &Credentials) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string(credentials)
            .map_err(|e| SessionError::Serialization(e.to_string()))?;
        std::fs::write(&self.path, content)?;

        tracing::debug!(path = ?self.path, "Saved session credentials");
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionError::Io(e)),
        }
    }
}

/// Credentials kept in process memory only
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slot: Mutex<Option<Credentials>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            slot: Mutex::new(Some(credentials)),
        }
    }

    fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<Credentials>>, SessionError> {
        self.slot
            .lock()
            .map_err(|e| SessionError::Lock(e.to_string()))
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<Credentials>, SessionError> {
        Ok(self.slot()?.clone())
    }

    fn save(&self, credentials: &Credentials) -> Result<(), SessionError> {
        *self.slot()? = Some(credentials.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.slot()? = None;
        Ok(())
    }
}
