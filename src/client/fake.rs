//! In-process fake story service for tests
//!
//! Implements the service's endpoints over axum on an ephemeral port. It
//! mirrors the real service's observable behaviour: newest-first listing,
//! `{error: {status, title, message}}` bodies, owner checks, and titles
//! trimmed server-side.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;

use super::{ClientConfig, StoryClient, StoryRecord};
use crate::models::{LoginToken, NewStory, StoryId};

const TOKEN_PREFIX: &str = "token-";

#[derive(Default)]
struct FakeState {
    /// Newest first
    stories: Vec<StoryRecord>,
    users: HashMap<String, FakeUser>,
    requests: usize,
    malformed_stories: bool,
    tokens_revoked: bool,
}

struct FakeUser {
    password: String,
    name: String,
    created_at: chrono::DateTime<Utc>,
    favorites: Vec<String>,
}

type Shared = Arc<Mutex<FakeState>>;

/// Running fake service; stops when dropped
pub(crate) struct FakeService {
    addr: SocketAddr,
    state: Shared,
    handle: JoinHandle<()>,
}

impl FakeService {
    pub async fn start() -> Self {
        let state: Shared = Arc::default();

        let app = Router::new()
            .route("/stories", get(list_stories).post(create_story))
            .route("/stories/:id", patch(update_story).delete(delete_story))
            .route("/signup", post(signup))
            .route("/login", post(login))
            .route("/users/:username", get(get_user))
            .route(
                "/users/:username/favorites/:id",
                post(add_favorite).delete(remove_favorite),
            )
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn client(&self) -> StoryClient {
        StoryClient::new(ClientConfig {
            base_url: self.base_url(),
            request_timeout_ms: 5_000,
            story_limit: None,
        })
        .unwrap()
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.state.lock().unwrap().requests
    }

    /// Serve story listings that lack required fields
    pub fn set_malformed_stories(&self, malformed: bool) {
        self.state.lock().unwrap().malformed_stories = malformed;
    }

    /// Reject every token from now on
    pub fn revoke_tokens(&self) {
        self.state.lock().unwrap().tokens_revoked = true;
    }

    /// Token the service issues for a username
    pub fn token_for(username: &str) -> LoginToken {
        LoginToken::new(format!("{}{}", TOKEN_PREFIX, username))
    }

    /// Insert a story directly, bypassing the HTTP surface
    pub fn seed_story(&self, username: &str, fields: &NewStory) -> StoryId {
        let mut state = self.state.lock().unwrap();
        let record = new_record(username, fields);
        let id = StoryId::new(record.story_id.clone());
        state.stories.insert(0, record);
        id
    }

    /// Current server-side title of a story
    pub fn title_of(&self, id: &StoryId) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .stories
            .iter()
            .find(|s| s.story_id == id.as_str())
            .map(|s| s.title.clone())
    }
}

impl Drop for FakeService {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// ============================================
// Helpers
// ============================================

fn enter(state: &Shared) -> MutexGuard<'_, FakeState> {
    let mut guard = state.lock().unwrap();
    guard.requests += 1;
    guard
}

fn error(status: StatusCode, message: &str) -> Response {
    let body = json!({
        "error": {
            "status": status.as_u16(),
            "title": status.canonical_reason().unwrap_or("Error"),
            "message": message,
        }
    });
    (status, Json(body)).into_response()
}

fn new_record(username: &str, fields: &NewStory) -> StoryRecord {
    StoryRecord {
        story_id: uuid::Uuid::new_v4().to_string(),
        title: fields.title.trim().to_string(),
        author: fields.author.clone(),
        url: fields.url.clone(),
        username: username.to_string(),
        created_at: Utc::now(),
    }
}

impl FakeState {
    fn authenticate(&self, token: &str) -> Result<String, Response> {
        let username = token
            .strip_prefix(TOKEN_PREFIX)
            .filter(|name| self.users.contains_key(*name) && !self.tokens_revoked);

        match username {
            Some(name) => Ok(name.to_string()),
            None => Err(error(StatusCode::UNAUTHORIZED, "Invalid token")),
        }
    }

    fn user_json(&self, username: &str) -> Value {
        let user = &self.users[username];
        let favorites: Vec<&StoryRecord> = user
            .favorites
            .iter()
            .filter_map(|id| self.stories.iter().find(|s| &s.story_id == id))
            .collect();
        let own: Vec<&StoryRecord> = self
            .stories
            .iter()
            .rev()
            .filter(|s| s.username == username)
            .collect();

        json!({
            "username": username,
            "name": user.name,
            "createdAt": user.created_at,
            "favorites": favorites,
            "stories": own,
        })
    }
}

// ============================================
// Handlers
// ============================================

#[derive(Deserialize)]
struct ListParams {
    limit: Option<usize>,
}

#[derive(Deserialize)]
struct TokenBody {
    token: String,
}

#[derive(Deserialize)]
struct TokenQuery {
    token: String,
}

#[derive(Deserialize)]
struct StoryBody {
    token: String,
    story: NewStory,
}

#[derive(Deserialize)]
struct SignupBody {
    user: SignupUser,
}

#[derive(Deserialize)]
struct SignupUser {
    username: String,
    password: String,
    name: String,
}

#[derive(Deserialize)]
struct LoginBody {
    user: LoginUser,
}

#[derive(Deserialize)]
struct LoginUser {
    username: String,
    password: String,
}

async fn list_stories(State(state): State<Shared>, Query(params): Query<ListParams>) -> Response {
    let state = enter(&state);

    if state.malformed_stories {
        return Json(json!({ "stories": [{ "storyId": "broken" }] })).into_response();
    }

    let limit = params.limit.unwrap_or(usize::MAX);
    let stories: Vec<&StoryRecord> = state.stories.iter().take(limit).collect();
    Json(json!({ "stories": stories })).into_response()
}

async fn create_story(State(state): State<Shared>, Json(body): Json<StoryBody>) -> Response {
    let mut state = enter(&state);
    let username = match state.authenticate(&body.token) {
        Ok(name) => name,
        Err(resp) => return resp,
    };

    let record = new_record(&username, &body.story);
    state.stories.insert(0, record.clone());
    (StatusCode::CREATED, Json(json!({ "story": record }))).into_response()
}

async fn update_story(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<StoryBody>,
) -> Response {
    let mut state = enter(&state);
    let username = match state.authenticate(&body.token) {
        Ok(name) => name,
        Err(resp) => return resp,
    };

    let Some(record) = state.stories.iter_mut().find(|s| s.story_id == id) else {
        return error(StatusCode::NOT_FOUND, "No story with that ID");
    };
    if record.username != username {
        return error(StatusCode::FORBIDDEN, "Only the story owner can edit it");
    }

    record.title = body.story.title.trim().to_string();
    record.author = body.story.author;
    record.url = body.story.url;
    Json(json!({ "story": record })).into_response()
}

async fn delete_story(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<TokenBody>,
) -> Response {
    let mut state = enter(&state);
    let username = match state.authenticate(&body.token) {
        Ok(name) => name,
        Err(resp) => return resp,
    };

    let Some(index) = state.stories.iter().position(|s| s.story_id == id) else {
        return error(StatusCode::NOT_FOUND, "No story with that ID");
    };
    if state.stories[index].username != username {
        return error(StatusCode::FORBIDDEN, "Only the story owner can delete it");
    }

    let record = state.stories.remove(index);
    for user in state.users.values_mut() {
        user.favorites.retain(|fav| *fav != id);
    }

    Json(json!({ "message": "Deleted story", "story": record })).into_response()
}

async fn signup(State(state): State<Shared>, Json(body): Json<SignupBody>) -> Response {
    let mut state = enter(&state);
    let SignupUser {
        username,
        password,
        name,
    } = body.user;

    if state.users.contains_key(&username) {
        return error(StatusCode::CONFLICT, "Username already taken");
    }

    state.users.insert(
        username.clone(),
        FakeUser {
            password,
            name,
            created_at: Utc::now(),
            favorites: Vec::new(),
        },
    );

    let token = FakeService::token_for(&username);
    let body = json!({ "token": token.as_str(), "user": state.user_json(&username) });
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn login(State(state): State<Shared>, Json(body): Json<LoginBody>) -> Response {
    let state = enter(&state);
    let LoginUser { username, password } = body.user;

    match state.users.get(&username) {
        None => error(StatusCode::NOT_FOUND, "No such user"),
        Some(user) if user.password != password => {
            error(StatusCode::UNAUTHORIZED, "Invalid password")
        }
        Some(_) => {
            let token = FakeService::token_for(&username);
            Json(json!({ "token": token.as_str(), "user": state.user_json(&username) }))
                .into_response()
        }
    }
}

async fn get_user(
    State(state): State<Shared>,
    Path(username): Path<String>,
    Query(query): Query<TokenQuery>,
) -> Response {
    let state = enter(&state);
    match state.authenticate(&query.token) {
        Ok(name) if name == username => {
            Json(json!({ "user": state.user_json(&username) })).into_response()
        }
        Ok(_) => error(StatusCode::UNAUTHORIZED, "Token does not match user"),
        Err(resp) => resp,
    }
}

async fn add_favorite(
    State(state): State<Shared>,
    Path((username, id)): Path<(String, String)>,
    Json(body): Json<TokenBody>,
) -> Response {
    toggle_favorite(state, username, id, body.token, true)
}

async fn remove_favorite(
    State(state): State<Shared>,
    Path((username, id)): Path<(String, String)>,
    Json(body): Json<TokenBody>,
) -> Response {
    toggle_favorite(state, username, id, body.token, false)
}

fn toggle_favorite(
    state: Shared,
    username: String,
    id: String,
    token: String,
    add: bool,
) -> Response {
    let mut state = enter(&state);
    match state.authenticate(&token) {
        Ok(name) if name == username => {}
        Ok(_) => return error(StatusCode::UNAUTHORIZED, "Token does not match user"),
        Err(resp) => return resp,
    }

    if !state.stories.iter().any(|s| s.story_id == id) {
        return error(StatusCode::NOT_FOUND, "No story with that ID");
    }

    if let Some(user) = state.users.get_mut(&username) {
        user.favorites.retain(|fav| *fav != id);
        if add {
            user.favorites.push(id);
        }
    }

    let message = if add { "Favorite Added" } else { "Favorite Removed" };
    Json(json!({ "message": message, "user": state.user_json(&username) })).into_response()
}
