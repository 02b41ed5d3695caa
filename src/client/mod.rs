//! Story Service REST Client
//!
//! HTTP client for the remote story service. Each method performs exactly
//! one request, validates the response into domain types, and never retries.
//!
//! ## Endpoints
//!
//! - `GET /stories` - list stories (unauthenticated)
//! - `POST /stories` - create a story
//! - `PATCH /stories/{id}` - edit a story
//! - `DELETE /stories/{id}` - delete a story
//! - `POST /signup`, `POST /login` - obtain a token
//! - `GET /users/{username}` - fetch a user with a stored token
//! - `POST|DELETE /users/{username}/favorites/{id}` - toggle a favorite

mod dto;
mod error;

#[cfg(test)]
pub(crate) mod fake;

pub use dto::{StoryRecord, UserRecord};
pub use error::{ApiError, ApiResult, Failure};

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::models::{FavoriteAction, LoginToken, NewStory, Story, StoryId, UserSnapshot};
use dto::{
    AuthResponse, LoginFields, LoginRequest, SignupFields, SignupRequest, StoriesResponse,
    StoryRequest, StoryResponse, TokenRequest, UserResponse,
};

/// Default story service endpoint
pub const DEFAULT_BASE_URL: &str = "https://hack-or-snooze-v3.herokuapp.com";

/// Configuration for the story client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the story service (e.g., "https://hack-or-snooze-v3.herokuapp.com")
    pub base_url: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Optional `limit` sent when listing stories
    pub story_limit: Option<u32>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_ms: 30_000,
            story_limit: None,
        }
    }
}

/// Story service REST client
#[derive(Debug, Clone)]
pub struct StoryClient {
    client: Client,
    config: ClientConfig,
}

impl StoryClient {
    /// Create a new client with the given configuration
    pub fn new(mut config: ClientConfig) -> ApiResult<Self> {
        config.base_url = config.base_url.trim_end_matches('/').to_string();

        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .user_agent(concat!("snooze/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::RequestSetup(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Get the current configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    // ==================== Stories ====================

    /// Fetch the global story list, newest first
    pub async fn get_stories(&self) -> ApiResult<Vec<Story>> {
        let mut request = self.client.get(self.endpoint("/stories"));
        if let Some(limit) = self.config.story_limit {
            request = request.query(&[("limit", limit)]);
        }

        let response: StoriesResponse = self.send(request).await?;
        dto::into_stories(response.stories)
    }

    /// Create a story owned by the token's user
    pub async fn create_story(&self, token: &LoginToken, story: &NewStory) -> ApiResult<Story> {
        story.validate()?;

        let request = self
            .client
            .post(self.endpoint("/stories"))
            .json(&StoryRequest {
                token: token.as_str(),
                story,
            });

        let response: StoryResponse = self.send(request).await?;
        Story::try_from(response.story)
    }

    /// Edit a story; the returned story is the server's authoritative version
    pub async fn update_story(
        &self,
        token: &LoginToken,
        id: &StoryId,
        story: &NewStory,
    ) -> ApiResult<Story> {
        story.validate()?;

        let request = self
            .client
            .patch(self.endpoint(&story_path(id)))
            .json(&StoryRequest {
                token: token.as_str(),
                story,
            });

        let response: StoryResponse = self.send(request).await?;
        Story::try_from(response.story)
    }

    /// Delete a story, returning the deleted record
    pub async fn delete_story(&self, token: &LoginToken, id: &StoryId) -> ApiResult<Story> {
        let request = self
            .client
            .delete(self.endpoint(&story_path(id)))
            .json(&TokenRequest {
                token: token.as_str(),
            });

        let response: StoryResponse = self.send(request).await?;
        Story::try_from(response.story)
    }

    // ==================== Users ====================

    /// Register a new account
    pub async fn signup(
        &self,
        username: &str,
        password: &str,
        name: &str,
    ) -> ApiResult<UserSnapshot> {
        let request = self
            .client
            .post(self.endpoint("/signup"))
            .json(&SignupRequest {
                user: SignupFields {
                    username,
                    password,
                    name,
                },
            });

        let response: AuthResponse = self.send(request).await?;
        response.user.into_snapshot(LoginToken::new(response.token))
    }

    /// Log in with existing credentials
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<UserSnapshot> {
        let request = self
            .client
            .post(self.endpoint("/login"))
            .json(&LoginRequest {
                user: LoginFields { username, password },
            });

        let response: AuthResponse = self.send(request).await?;
        response.user.into_snapshot(LoginToken::new(response.token))
    }

    /// Fetch a user with a previously issued token
    pub async fn get_user(&self, token: &LoginToken, username: &str) -> ApiResult<UserSnapshot> {
        let request = self
            .client
            .get(self.endpoint(&user_path(username)))
            .query(&[("token", token.as_str())]);

        let response: UserResponse = self.send(request).await?;
        response.user.into_snapshot(token.clone())
    }

    /// Add or remove a favorite, returning the server's full favorites list
    pub async fn set_favorite(
        &self,
        token: &LoginToken,
        username: &str,
        id: &StoryId,
        action: FavoriteAction,
    ) -> ApiResult<Vec<Story>> {
        let url = self.endpoint(&format!(
            "{}/favorites/{}",
            user_path(username),
            urlencoding::encode(id.as_str())
        ));

        let request = match action {
            FavoriteAction::Add => self.client.post(url),
            FavoriteAction::Remove => self.client.delete(url),
        }
        .json(&TokenRequest {
            token: token.as_str(),
        });

        let response: UserResponse = self.send(request).await?;
        response.user.into_favorites()
    }

    // ==================== Transport ====================

    /// Send a request and decode a successful JSON body
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let response = request.send().await.map_err(ApiError::from_transport)?;
        let status = response.status();
        tracing::debug!(status = status.as_u16(), url = %response.url(), "Story service response");

        let body = response.text().await.map_err(ApiError::from_transport)?;

        if !status.is_success() {
            return Err(ApiError::from_status(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}

fn story_path(id: &StoryId) -> String {
    format!("/stories/{}", urlencoding::encode(id.as_str()))
}

fn user_path(username: &str) -> String {
    format!("/users/{}", urlencoding::encode(username))
}
