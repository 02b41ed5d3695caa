//! Application State
//!
//! Holds the story client, the authoritative story store, the current user
//! and the credential store for one client process. Every operation follows
//! the same shape: one request, then a local mutation that mirrors the
//! server's answer.

use crate::client::{ApiError, ApiResult, StoryClient};
use crate::models::{
    FavoriteAction, NewStory, Removal, Story, StoryId, StoryList, StoryStore, User, UserSnapshot,
    View,
};

use super::{AppError, AppResult, CredentialStore};

/// State of a running client
pub struct AppState {
    client: StoryClient,
    store: StoryStore,
    user: Option<User>,
    credentials: Box<dyn CredentialStore>,
}

impl AppState {
    /// Create an anonymous state with an empty store
    pub fn new(client: StoryClient, credentials: impl CredentialStore + 'static) -> Self {
        Self {
            client,
            store: StoryStore::new(),
            user: None,
            credentials: Box::new(credentials),
        }
    }

    pub fn client(&self) -> &StoryClient {
        &self.client
    }

    pub fn store(&self) -> &StoryStore {
        &self.store
    }

    pub fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    // ==================== Startup ====================

    /// Fetch the story list and silently restore a stored session
    pub async fn start(&mut self) -> AppResult<()> {
        self.refresh_stories().await?;
        self.restore_session().await;
        Ok(())
    }

    /// Replace the global list with the service's current one
    pub async fn refresh_stories(&mut self) -> AppResult<usize> {
        let list = StoryList::fetch_all(&self.client).await?;
        let count = list.len();
        self.store.replace_view(View::All, list);
        Ok(count)
    }

    /// Restore the user from stored credentials.
    ///
    /// Never fails: missing, unreadable or rejected credentials leave the
    /// state anonymous.
    pub async fn restore_session(&mut self) -> Option<&User> {
        let credentials = match self.credentials.load() {
            Ok(Some(credentials)) => credentials,
            Ok(None) => {
                tracing::debug!("No stored session");
                return None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not read stored session");
                return None;
            }
        };

        let snapshot = User::restore(&self.client, &credentials).await?;
        tracing::info!(username = %snapshot.user.username, "Restored session");
        self.install_user(snapshot);
        self.user.as_ref()
    }

    // ==================== Authentication ====================

    /// Register, log in as the new user and persist the credentials
    pub async fn signup(&mut self, username: &str, password: &str, name: &str) -> AppResult<&User> {
        let snapshot = User::signup(&self.client, username, password, name).await?;
        self.begin_session(snapshot)
    }

    /// Log in and persist the credentials
    pub async fn login(&mut self, username: &str, password: &str) -> AppResult<&User> {
        let snapshot = User::login(&self.client, username, password).await?;
        self.begin_session(snapshot)
    }

    /// Forget the user and clear stored credentials. The global list stays.
    pub fn logout(&mut self) -> AppResult<()> {
        if let Some(user) = &self.user {
            tracing::info!(username = %user.username, "Logging out");
        }
        self.end_session();
        self.credentials.clear()?;
        Ok(())
    }

    fn begin_session(&mut self, snapshot: UserSnapshot) -> AppResult<&User> {
        let credentials = snapshot.user.credentials();
        // Stay anonymous unless the session can be persisted
        self.credentials.save(&credentials)?;
        tracing::info!(username = %credentials.username, "Logged in");

        self.install_user(snapshot);
        self.user.as_ref().ok_or(AppError::NotAuthenticated)
    }

    fn install_user(&mut self, snapshot: UserSnapshot) {
        self.store.replace_view(View::Own, snapshot.own_stories);
        self.store.replace_view(View::Favorites, snapshot.favorites);
        self.user = Some(snapshot.user);
    }

    fn end_session(&mut self) {
        self.user = None;
        self.store.clear_view(View::Own);
        self.store.clear_view(View::Favorites);
    }

    fn require_user(&self) -> AppResult<User> {
        self.user.clone().ok_or(AppError::NotAuthenticated)
    }

    /// Map a user-scoped response, ending the session on a rejected token
    fn authorized<T>(&mut self, result: ApiResult<T>) -> AppResult<T> {
        match result {
            Err(e) if e.is_unauthorized() => {
                tracing::warn!(error = %e, "Token rejected, ending session");
                self.end_session();
                if let Err(clear_err) = self.credentials.clear() {
                    tracing::warn!(error = %clear_err, "Could not clear stored session");
                }
                Err(AppError::SessionExpired)
            }
            other => other.map_err(AppError::from),
        }
    }

    // ==================== Stories ====================

    /// Submit a story: newest in the global list, last in own stories
    pub async fn add_story(&mut self, fields: NewStory) -> AppResult<Story> {
        let user = self.require_user()?;
        tracing::debug!(title = %fields.title, "Adding story");

        let result = self.client.create_story(&user.token, &fields).await;
        let story = self.authorized(result)?;

        self.store.prepend(View::All, story.clone());
        self.store.append(View::Own, story.clone());
        Ok(story)
    }

    /// Edit a story.
    ///
    /// The new fields are applied locally first, then replaced by the
    /// server's record once it answers. A failed request restores the
    /// previous record.
    pub async fn update_story(&mut self, id: &StoryId, fields: NewStory) -> AppResult<Story> {
        let user = self.require_user()?;
        let previous = self
            .store
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::UnknownStory(id.clone()))?;
        fields.validate().map_err(ApiError::from)?;
        tracing::debug!(story_id = %id, "Updating story");

        let mut optimistic = previous.clone();
        optimistic.apply(&fields);
        self.store.upsert(optimistic);

        let result = self
            .client
            .update_story(&user.token, id, &fields)
            .await
            .and_then(|story| {
                if story.story_id == *id {
                    Ok(story)
                } else {
                    Err(ApiError::InvalidResponse(format!(
                        "edited story {} came back as {}",
                        id, story.story_id
                    )))
                }
            });

        match self.authorized(result) {
            Ok(updated) => {
                self.store.upsert(updated.clone());
                Ok(updated)
            }
            Err(e) => {
                if self.store.get(id).is_some() {
                    self.store.upsert(previous);
                }
                Err(e)
            }
        }
    }

    /// Delete a story and every local reference to it
    pub async fn delete_story(&mut self, id: &StoryId) -> AppResult<Removal> {
        let user = self.require_user()?;
        tracing::debug!(story_id = %id, "Deleting story");

        let result = self.client.delete_story(&user.token, id).await;
        self.authorized(result)?;

        let removal = self.store.remove(id);
        tracing::debug!(story_id = %id, views = removal.count(), "Removed story locally");
        Ok(removal)
    }

    // ==================== Favorites ====================

    pub async fn add_favorite(&mut self, id: &StoryId) -> AppResult<()> {
        self.set_favorite(id, FavoriteAction::Add).await
    }

    pub async fn remove_favorite(&mut self, id: &StoryId) -> AppResult<()> {
        self.set_favorite(id, FavoriteAction::Remove).await
    }

    /// Flip a story's favorite state, returning the membership the server reports
    pub async fn toggle_favorite(&mut self, id: &StoryId) -> AppResult<bool> {
        let action = if self.is_favorite(id) {
            FavoriteAction::Remove
        } else {
            FavoriteAction::Add
        };

        self.set_favorite(id, action).await?;
        Ok(self.is_favorite(id))
    }

    /// Send the toggle and adopt the server's favorites list wholesale
    async fn set_favorite(&mut self, id: &StoryId, action: FavoriteAction) -> AppResult<()> {
        let user = self.require_user()?;
        tracing::debug!(story_id = %id, ?action, "Setting favorite");

        let result = self
            .client
            .set_favorite(&user.token, &user.username, id, action)
            .await;
        let favorites = self.authorized(result)?;

        self.store.replace_view(View::Favorites, favorites);
        Ok(())
    }

    // ==================== Views ====================

    pub fn all_stories(&self) -> Vec<&Story> {
        self.store.view(View::All)
    }

    pub fn own_stories(&self) -> Vec<&Story> {
        self.store.view(View::Own)
    }

    pub fn favorites(&self) -> Vec<&Story> {
        self.store.view(View::Favorites)
    }

    pub fn story(&self, id: &StoryId) -> Option<&Story> {
        self.store.get(id)
    }

    pub fn is_favorite(&self, id: &StoryId) -> bool {
        self.store.contains(View::Favorites, id)
    }

    pub fn is_own(&self, id: &StoryId) -> bool {
        self.store.contains(View::Own, id)
    }
}
