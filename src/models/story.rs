//! Story entity
//!
//! A single submitted link record and the fields a user supplies when
//! creating or editing one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

use super::ModelError;

/// Server-assigned story identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoryId(String);

impl StoryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StoryId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for StoryId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A single story as known to the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    /// Unique identifier, authoritative across every view
    pub story_id: StoryId,
    pub title: String,
    pub author: String,
    /// Link target, kept exactly as the server returned it
    pub url: String,
    /// Username of the submitter
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl Story {
    /// Host component of the story's URL.
    ///
    /// Fails on a malformed URL or one without a host; no partial value is guessed.
    pub fn host_name(&self) -> Result<String, ModelError> {
        let parsed = Url::parse(&self.url).map_err(|e| ModelError::InvalidUrl {
            url: self.url.clone(),
            reason: e.to_string(),
        })?;

        parsed
            .host_str()
            .map(str::to_string)
            .ok_or_else(|| ModelError::InvalidUrl {
                url: self.url.clone(),
                reason: "URL has no host".to_string(),
            })
    }

    /// Assign user-editable fields in place
    pub fn apply(&mut self, fields: &NewStory) {
        self.title = fields.title.clone();
        self.author = fields.author.clone();
        self.url = fields.url.clone();
    }

    /// Editable fields of this story, as a starting point for an edit
    pub fn fields(&self) -> NewStory {
        NewStory {
            title: self.title.clone(),
            author: self.author.clone(),
            url: self.url.clone(),
        }
    }
}

/// User-supplied fields for creating or editing a story
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStory {
    pub title: String,
    pub author: String,
    pub url: String,
}

impl NewStory {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            url: url.into(),
        }
    }

    /// Builder method: replace the title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Builder method: replace the author
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Builder method: replace the url
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Check fields before they are sent anywhere
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.title.trim().is_empty() {
            return Err(ModelError::MissingField("title"));
        }
        if self.author.trim().is_empty() {
            return Err(ModelError::MissingField("author"));
        }

        let parsed = Url::parse(&self.url).map_err(|e| ModelError::InvalidUrl {
            url: self.url.clone(),
            reason: e.to_string(),
        })?;

        match parsed.scheme() {
            "http" | "https" if parsed.host_str().is_some() => Ok(()),
            "http" | "https" => Err(ModelError::InvalidUrl {
                url: self.url.clone(),
                reason: "URL has no host".to_string(),
            }),
            other => Err(ModelError::InvalidUrl {
                url: self.url.clone(),
                reason: format!("unsupported scheme '{}'", other),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn story(url: &str) -> Story {
        Story {
            story_id: StoryId::new("s1"),
            title: "Title".to_string(),
            author: "Author".to_string(),
            url: url.to_string(),
            username: "alice".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_host_name() {
        assert_eq!(story("https://example.com/a/b").host_name().unwrap(), "example.com");
        assert_eq!(story("http://x.com").host_name().unwrap(), "x.com");
        assert_eq!(
            story("https://news.example.org:8443/path?q=1").host_name().unwrap(),
            "news.example.org"
        );
    }

    #[test]
    fn test_host_name_malformed() {
        let err = story("not a url").host_name().unwrap_err();
        assert!(matches!(err, ModelError::InvalidUrl { .. }));

        let err = story("mailto:someone@example.com").host_name().unwrap_err();
        assert!(matches!(err, ModelError::InvalidUrl { .. }));
    }

    #[test]
    fn test_apply_fields() {
        let mut s = story("http://old.com");
        s.apply(&NewStory::new("New", "Someone", "http://new.com"));

        assert_eq!(s.title, "New");
        assert_eq!(s.author, "Someone");
        assert_eq!(s.url, "http://new.com");
        assert_eq!(s.username, "alice");
    }

    #[test]
    fn test_validate() {
        assert!(NewStory::new("T", "A", "http://x.com").validate().is_ok());

        assert!(matches!(
            NewStory::new(" ", "A", "http://x.com").validate(),
            Err(ModelError::MissingField("title"))
        ));
        assert!(matches!(
            NewStory::new("T", "", "http://x.com").validate(),
            Err(ModelError::MissingField("author"))
        ));
        assert!(matches!(
            NewStory::new("T", "A", "x.com").validate(),
            Err(ModelError::InvalidUrl { .. })
        ));
        assert!(matches!(
            NewStory::new("T", "A", "ftp://x.com/file").validate(),
            Err(ModelError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_story_id_serde_transparent() {
        let id: StoryId = serde_json::from_str("\"abc-123\"").unwrap();
        assert_eq!(id.as_str(), "abc-123");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc-123\"");
    }
}
