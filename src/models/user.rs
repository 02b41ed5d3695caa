//! User entity
//!
//! The authenticated actor: profile fields plus the login token that
//! signs every user-scoped request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Story;
use crate::client::{ApiResult, StoryClient};

/// Opaque credential issued at authentication
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoginToken(String);

impl LoginToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for LoginToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LoginToken(<redacted>)")
    }
}

/// Persisted (token, username) pair used to restore a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub token: LoginToken,
    pub username: String,
}

/// Direction of a favorite toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteAction {
    Add,
    Remove,
}

/// The currently authenticated user
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub username: String,
    /// Display name
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub token: LoginToken,
}

/// User plus the story lists returned alongside it
#[derive(Debug, Clone)]
pub struct UserSnapshot {
    pub user: User,
    pub favorites: Vec<Story>,
    pub own_stories: Vec<Story>,
}

impl User {
    /// Register a new account
    pub async fn signup(
        client: &StoryClient,
        username: &str,
        password: &str,
        name: &str,
    ) -> ApiResult<UserSnapshot> {
        tracing::debug!(username, "Signing up");
        client.signup(username, password, name).await
    }

    /// Log in with an existing account
    pub async fn login(
        client: &StoryClient,
        username: &str,
        password: &str,
    ) -> ApiResult<UserSnapshot> {
        tracing::debug!(username, "Logging in");
        client.login(username, password).await
    }

    /// Re-validate stored credentials.
    ///
    /// Any failure yields `None`: a stale token must not block startup.
    /// There is exactly one attempt.
    pub async fn restore(client: &StoryClient, credentials: &Credentials) -> Option<UserSnapshot> {
        match client
            .get_user(&credentials.token, &credentials.username)
            .await
        {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!(
                    username = %credentials.username,
                    error = %e,
                    "Session restore failed"
                );
                None
            }
        }
    }

    /// Credentials that restore this user later
    pub fn credentials(&self) -> Credentials {
        Credentials {
            token: self.token.clone(),
            username: self.username.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::FakeService;

    #[test]
    fn test_token_debug_redacted() {
        let token = LoginToken::new("super-secret");
        assert_eq!(format!("{:?}", token), "LoginToken(<redacted>)");

        let creds = Credentials {
            token,
            username: "alice".to_string(),
        };
        assert!(!format!("{:?}", creds).contains("super-secret"));
    }

    #[tokio::test]
    async fn test_signup_and_login() {
        let service = FakeService::start().await;
        let client = service.client();

        let signed_up = User::signup(&client, "alice", "pw", "Alice A").await.unwrap();
        assert_eq!(signed_up.user.name, "Alice A");

        let logged_in = User::login(&client, "alice", "pw").await.unwrap();
        assert_eq!(logged_in.user.username, "alice");
        assert_eq!(logged_in.user.token, FakeService::token_for("alice"));
    }

    #[tokio::test]
    async fn test_restore_valid() {
        let service = FakeService::start().await;
        let client = service.client();
        let snapshot = User::signup(&client, "alice", "pw", "Alice").await.unwrap();

        let restored = User::restore(&client, &snapshot.user.credentials())
            .await
            .unwrap();
        assert_eq!(restored.user, snapshot.user);
    }

    #[tokio::test]
    async fn test_restore_stale_token_is_none_without_retry() {
        let service = FakeService::start().await;
        let client = service.client();
        User::signup(&client, "alice", "pw", "Alice").await.unwrap();
        let before = service.request_count();

        let stale = Credentials {
            token: LoginToken::new("expired"),
            username: "alice".to_string(),
        };

        assert!(User::restore(&client, &stale).await.is_none());
        assert_eq!(service.request_count(), before + 1);
    }
}
