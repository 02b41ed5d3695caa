//! Story list
//!
//! The global story set as fetched from the service, newest first.

use super::Story;
use crate::client::{ApiResult, StoryClient};

/// Ordered sequence of stories
#[derive(Debug, Clone, Default)]
pub struct StoryList {
    stories: Vec<Story>,
}

impl StoryList {
    pub fn new(stories: Vec<Story>) -> Self {
        Self { stories }
    }

    /// Fetch every story the service lists. No authentication is required.
    pub async fn fetch_all(client: &StoryClient) -> ApiResult<Self> {
        let stories = client.get_stories().await?;
        tracing::debug!(count = stories.len(), "Fetched stories");
        Ok(Self::new(stories))
    }

    pub fn stories(&self) -> &[Story] {
        &self.stories
    }

    pub fn len(&self) -> usize {
        self.stories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }

    pub fn into_stories(self) -> Vec<Story> {
        self.stories
    }
}

impl IntoIterator for StoryList {
    type Item = Story;
    type IntoIter = std::vec::IntoIter<Story>;

    fn into_iter(self) -> Self::IntoIter {
        self.stories.into_iter()
    }
}
