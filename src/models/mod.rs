//! Domain Models
//!
//! Entities of the story service as the client sees them:
//!
//! - **Story**: a single submitted link
//! - **StoryList**: the global set of stories, newest first
//! - **User**: the authenticated actor and its login token
//! - **StoryStore**: one authoritative record per story, with the global,
//!   own-stories and favorites views expressed as ordered id lists

mod store;
mod story;
mod story_list;
mod user;

pub use store::{Removal, StoryStore, View};
pub use story::{NewStory, Story, StoryId};
pub use story_list::StoryList;
pub use user::{Credentials, FavoriteAction, LoginToken, User, UserSnapshot};

use thiserror::Error;

/// Errors raised by entity-level checks
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// URL could not be parsed or lacks a host
    #[error("Invalid story URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Required story field is blank
    #[error("Missing story field: {0}")]
    MissingField(&'static str),
}
