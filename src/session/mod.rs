//! Session
//!
//! Application state for one client process and the persistence of its
//! login credentials.
//!
//! ## Lifecycle
//!
//! 1. `AppState::new` with a client and a credential store
//! 2. `start()` fetches the global story list and restores a stored session
//! 3. entity operations mutate the store after each server response
//! 4. `logout()` clears credentials and the user's views

mod credentials;
mod state;

pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use state::AppState;

use std::path::PathBuf;
use thiserror::Error;

use crate::client::{ApiError, Failure};
use crate::models::StoryId;

/// Errors from credential persistence
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse credentials file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Lock error: {0}")]
    Lock(String),
}

/// Errors from application-level operations
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Session storage error: {0}")]
    Session(#[from] SessionError),

    #[error("Not logged in")]
    NotAuthenticated,

    #[error("Session expired, please log in again")]
    SessionExpired,

    #[error("Unknown story: {0}")]
    UnknownStory(StoryId),
}

impl AppError {
    /// Failure classification when the error came from the story service
    pub fn failure(&self) -> Option<Failure> {
        match self {
            AppError::Api(e) => Some(e.failure()),
            AppError::SessionExpired => Some(Failure::ServerResponded),
            _ => None,
        }
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
