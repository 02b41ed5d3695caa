//! Story Store
//!
//! Single authoritative record per story, with the three lists the client
//! shows expressed as ordered id views into it:
//!
//! ```text
//! records:   { s1 -> Story, s2 -> Story, s3 -> Story }
//!
//! All:       [s3, s2, s1]     newest first
//! Own:       [s1, s3]         submission order
//! Favorites: [s2, s3]         server order
//! ```
//!
//! Editing a story replaces its one record, so every view observes the
//! change. Removing a story drops the record and its id from every view.
//! Records no view references are pruned.

use std::collections::HashMap;

use super::{Story, StoryId};

/// One of the ordered story lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    /// Global story list, newest first
    All,
    /// Stories submitted by the current user
    Own,
    /// Stories the current user has favorited
    Favorites,
}

impl View {
    pub fn all() -> &'static [View] {
        &[View::All, View::Own, View::Favorites]
    }
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            View::All => write!(f, "all"),
            View::Own => write!(f, "own"),
            View::Favorites => write!(f, "favorites"),
        }
    }
}

/// Which views held a removed story
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Removal {
    pub all: bool,
    pub own: bool,
    pub favorites: bool,
}

impl Removal {
    /// Number of views the story was removed from
    pub fn count(&self) -> usize {
        [self.all, self.own, self.favorites]
            .iter()
            .filter(|held| **held)
            .count()
    }
}

/// Authoritative story records plus ordered views
#[derive(Debug, Default)]
pub struct StoryStore {
    records: HashMap<StoryId, Story>,
    all: Vec<StoryId>,
    own: Vec<StoryId>,
    favorites: Vec<StoryId>,
}

impl StoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn ids(&self, view: View) -> &Vec<StoryId> {
        match view {
            View::All => &self.all,
            View::Own => &self.own,
            View::Favorites => &self.favorites,
        }
    }

    fn ids_mut(&mut self, view: View) -> &mut Vec<StoryId> {
        match view {
            View::All => &mut self.all,
            View::Own => &mut self.own,
            View::Favorites => &mut self.favorites,
        }
    }

    // ==================== Queries ====================

    /// Look up a story by id
    pub fn get(&self, id: &StoryId) -> Option<&Story> {
        self.records.get(id)
    }

    /// Stories of a view, in view order
    pub fn view(&self, view: View) -> Vec<&Story> {
        self.ids(view)
            .iter()
            .filter_map(|id| self.records.get(id))
            .collect()
    }

    /// Check whether a view holds the given id
    pub fn contains(&self, view: View, id: &StoryId) -> bool {
        self.ids(view).contains(id)
    }

    /// Number of entries in a view
    pub fn len(&self, view: View) -> usize {
        self.ids(view).len()
    }

    /// Number of distinct story records held
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    // ==================== Mutations ====================

    /// Insert or replace the record for a story.
    ///
    /// The replacement is visible through every view holding the id.
    pub fn upsert(&mut self, story: Story) {
        self.records.insert(story.story_id.clone(), story);
    }

    /// Replace a view's contents, keeping the first occurrence of any repeated id
    pub fn replace_view(&mut self, view: View, stories: impl IntoIterator<Item = Story>) {
        let mut ids = Vec::new();
        for story in stories {
            if ids.contains(&story.story_id) {
                continue;
            }
            ids.push(story.story_id.clone());
            self.upsert(story);
        }

        *self.ids_mut(view) = ids;
        self.prune();
    }

    /// Put a story at the front of a view
    pub fn prepend(&mut self, view: View, story: Story) {
        let id = story.story_id.clone();
        self.upsert(story);

        let ids = self.ids_mut(view);
        ids.retain(|existing| *existing != id);
        ids.insert(0, id);
    }

    /// Put a story at the back of a view
    pub fn append(&mut self, view: View, story: Story) {
        let id = story.story_id.clone();
        self.upsert(story);

        let ids = self.ids_mut(view);
        ids.retain(|existing| *existing != id);
        ids.push(id);
    }

    /// Empty a view, dropping records only it referenced
    pub fn clear_view(&mut self, view: View) {
        self.ids_mut(view).clear();
        self.prune();
    }

    /// Remove a story from every view and drop its record
    pub fn remove(&mut self, id: &StoryId) -> Removal {
        let mut removal = Removal::default();

        for view in View::all() {
            let ids = self.ids_mut(*view);
            // ids are unique within a view
            let held = match ids.iter().position(|existing| existing == id) {
                Some(index) => {
                    ids.remove(index);
                    true
                }
                None => false,
            };

            match view {
                View::All => removal.all = held,
                View::Own => removal.own = held,
                View::Favorites => removal.favorites = held,
            }
        }

        self.records.remove(id);
        removal
    }

    /// Drop records that no view references
    fn prune(&mut self) {
        let Self {
            records,
            all,
            own,
            favorites,
        } = self;

        records.retain(|id, _| all.contains(id) || own.contains(id) || favorites.contains(id));
    }
}
