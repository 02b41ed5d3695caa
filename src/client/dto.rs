//! Wire DTOs for the story service
//!
//! Request bodies and response envelopes, plus validation of response
//! records into domain types. Fields are required unless the service is
//! known to omit them, so a malformed body fails here instead of producing
//! a half-filled entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::{ApiError, ApiResult};
use crate::models::{LoginToken, NewStory, Story, StoryId, User, UserSnapshot};

// ============================================
// Requests
// ============================================

#[derive(Debug, Serialize)]
pub(crate) struct TokenRequest<'a> {
    pub token: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct StoryRequest<'a> {
    pub token: &'a str,
    pub story: &'a NewStory,
}

#[derive(Debug, Serialize)]
pub(crate) struct SignupRequest<'a> {
    pub user: SignupFields<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SignupFields<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub user: LoginFields<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginFields<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

// ============================================
// Responses
// ============================================

/// Story as sent by the service
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryRecord {
    pub story_id: String,
    pub title: String,
    pub author: String,
    pub url: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<StoryRecord> for Story {
    type Error = ApiError;

    fn try_from(record: StoryRecord) -> ApiResult<Self> {
        if record.story_id.trim().is_empty() {
            return Err(ApiError::InvalidResponse(
                "story record has an empty storyId".to_string(),
            ));
        }

        Ok(Story {
            story_id: StoryId::new(record.story_id),
            title: record.title,
            author: record.author,
            url: record.url,
            username: record.username,
            created_at: record.created_at,
        })
    }
}

/// User as sent by the service
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub username: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub favorites: Vec<StoryRecord>,
    #[serde(default)]
    pub stories: Vec<StoryRecord>,
}

impl UserRecord {
    /// Validate into a snapshot carrying the given token
    pub(crate) fn into_snapshot(self, token: LoginToken) -> ApiResult<UserSnapshot> {
        if self.username.trim().is_empty() {
            return Err(ApiError::InvalidResponse(
                "user record has an empty username".to_string(),
            ));
        }

        Ok(UserSnapshot {
            user: User {
                username: self.username,
                name: self.name,
                created_at: self.created_at,
                token,
            },
            favorites: into_stories(self.favorites)?,
            own_stories: into_stories(self.stories)?,
        })
    }

    pub(crate) fn into_favorites(self) -> ApiResult<Vec<Story>> {
        into_stories(self.favorites)
    }
}

pub(crate) fn into_stories(records: Vec<StoryRecord>) -> ApiResult<Vec<Story>> {
    records.into_iter().map(Story::try_from).collect()
}

#[derive(Debug, Deserialize)]
pub(crate) struct StoriesResponse {
    pub stories: Vec<StoryRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StoryResponse {
    pub story: StoryRecord,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuthResponse {
    pub token: String,
    pub user: UserRecord,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserResponse {
    pub user: UserRecord,
}
