//! # Snooze
//!
//! Client for a story-sharing service: authenticate, list stories, and
//! create, edit, delete, and favorite them over the service's REST API.
//!
//! ## Features
//!
//! - **Typed API boundary**: responses are validated into domain types;
//!   malformed bodies fail fast
//! - **Single source of truth**: one record per story, with the global list,
//!   own stories and favorites as ordered views
//! - **Session restore**: the login token is persisted and silently
//!   re-validated on the next start
//!
//! ## Modules
//!
//! - [`client`]: REST client for the story service
//! - [`models`]: Story, StoryList, User and the story store
//! - [`session`]: Application state and credential persistence
//! - [`config`]: TOML and environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use snooze::client::{ClientConfig, StoryClient};
//! use snooze::models::NewStory;
//! use snooze::session::{AppState, FileCredentialStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = StoryClient::new(ClientConfig::default())?;
//!     let mut state = AppState::new(client, FileCredentialStore::new("session.toml"));
//!
//!     // Load stories and restore a saved session, if any
//!     state.start().await?;
//!
//!     if !state.is_authenticated() {
//!         state.login("alice", "secret").await?;
//!     }
//!
//!     let story = state
//!         .add_story(NewStory::new("Rust 2024", "Alice", "https://blog.rust-lang.org"))
//!         .await?;
//!     println!("Posted {} ({})", story.title, story.host_name()?);
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod models;
pub mod session;

// Re-export top-level types for convenience
pub use client::{ApiError, ApiResult, ClientConfig, Failure, StoryClient};

pub use models::{
    Credentials, FavoriteAction, LoginToken, ModelError, NewStory, Removal, Story, StoryId,
    StoryList, StoryStore, User, UserSnapshot, View,
};

pub use session::{
    AppError, AppResult, AppState, CredentialStore, FileCredentialStore, MemoryCredentialStore,
    SessionError,
};

pub use config::{ApiConfig, Config, ConfigError, LoggingConfig, SessionConfig};
