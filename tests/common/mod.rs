#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};

use optima_admin::api::LoginBoundary;
use optima_admin::config::ClientConfig;
use optima_admin::session::storage::{CredentialStorage, MemoryStorage};
use optima_admin::AdminClient;

pub const ADMIN_EMAIL: &str = "ops@optima.app";
pub const ADMIN_PASSWORD: &str = "correct horse";
pub const TOKEN: &str = "token-1";

/// Mutable state of the mock admin API
#[derive(Default)]
pub struct MockState {
    pub users: Mutex<Vec<Value>>,
    pub posts: Mutex<Vec<Value>>,
    pub logs: Mutex<Vec<Value>>,
    pub tasks: Mutex<Vec<Value>>,
    pub categories: Mutex<Vec<Value>>,
    /// Every request as "METHOD /path?query"
    pub requests: Mutex<Vec<String>>,
    /// Authorization headers seen, in order
    pub bearers: Mutex<Vec<Option<String>>>,
    /// Reject every bearer token from now on
    pub revoke_tokens: AtomicBool,
    /// Hold unauthorized responses briefly so concurrent calls overlap
    pub slow_rejects: AtomicBool,
    pub profile_calls: AtomicUsize,
}

impl MockState {
    pub fn seeded() -> Self {
        let state = Self::default();
        *state.users.lock().unwrap() = (1..=5)
            .map(|i| {
                json!({
                    "id": format!("u{i}"),
                    "username": format!("user{i}"),
                    "email": format!("user{i}@example.com"),
                    "suspended": false,
                    "created": {"_seconds": 1_700_000_000 + i, "_nanoseconds": 0},
                    // some records carry a count, others the list
                    "friends": if i == 2 { json!(3) } else { json!(["u1"]) }
                })
            })
            .collect();
        *state.posts.lock().unwrap() = (1..=3)
            .map(|i| {
                json!({
                    "id": format!("p{i}"),
                    "username": "user1",
                    "user_id": "u1",
                    "content": format!("post number {i}"),
                    "createdAt": "2024-05-01T10:00:00Z",
                    "likeCount": i,
                    "commentCount": 2,
                    "comments": [
                        {"id": format!("c{i}a"), "username": "user2", "content": "first!", "created": null},
                        {"id": format!("c{i}b"), "username": "user3", "content": "nice", "createdAt": {"_methodName": "serverTimestamp"}}
                    ]
                })
            })
            .collect();
        *state.logs.lock().unwrap() = (1..=130)
            .map(|i| {
                json!({
                    "id": format!("l{i}"),
                    "admin_id": "a1",
                    "action_type": if i % 2 == 0 { "USER_SUSPENDED" } else { "POST_DELETED" },
                    "details": {"target": format!("t{i}")},
                    "timestamp": 1_700_000_000_000_i64 + i
                })
            })
            .collect();
        *state.tasks.lock().unwrap() = vec![
            json!({
                "id": "t1", "title": "Walk 5k", "category": "Fitness", "reward_minutes": 30,
                "deadline": "2099-01-01T00:00:00Z", "participants": ["u1", "u2"], "completed_by": ["u1"]
            }),
            json!({
                "id": "t2", "title": "Read a book", "category": "Learning", "reward_minutes": 15,
                "deadline": "2000-01-01T00:00:00Z", "participants": [], "completed_by": []
            }),
            json!({
                "id": "t3", "title": "Meditate", "category": "Wellness", "reward_minutes": 10,
                "deadline": null, "participants": ["u3"], "completed_by": []
            }),
        ];
        *state.categories.lock().unwrap() = vec![
            json!({"id": "k1", "category_name": "Fitness", "category_type": "health", "description": "Move more"}),
            json!({"id": "k2", "category_name": "Learning", "category_type": "growth", "description": "Read and study"}),
        ];
        state
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.requests().iter().filter(|r| r.starts_with(prefix)).count()
    }
}

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub state: Arc<MockState>,
}

impl TestServer {
    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == reqwest::StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("mock server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::for_url(self.base_url.clone())
    }

    /// Client over the given storage whose forced logouts are counted
    pub fn client_with(&self, storage: Arc<dyn CredentialStorage>) -> Result<(AdminClient, Arc<CountingBoundary>)> {
        let boundary = Arc::new(CountingBoundary::default());
        let client = AdminClient::new(self.config(), storage, boundary.clone())?;
        Ok((client, boundary))
    }

    pub fn client(&self) -> Result<(AdminClient, Arc<CountingBoundary>, MemoryStorage)> {
        let storage = MemoryStorage::new();
        let (client, boundary) = self.client_with(Arc::new(storage.clone()))?;
        Ok((client, boundary, storage))
    }

    /// Logged-in client
    pub async fn signed_in(&self) -> Result<(AdminClient, Arc<CountingBoundary>, MemoryStorage)> {
        let (client, boundary, storage) = self.client()?;
        client.auth.login(ADMIN_EMAIL, ADMIN_PASSWORD).await?;
        Ok((client, boundary, storage))
    }
}

/// Login boundary that records how often it was asked to redirect
#[derive(Debug, Default)]
pub struct CountingBoundary {
    redirects: AtomicUsize,
}

impl CountingBoundary {
    pub fn redirects(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl LoginBoundary for CountingBoundary {
    fn redirect_to_login(&self) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
    }
}

/// Boot a fresh mock admin API on an unused port. Each test gets its own,
/// since the server lives on the test's runtime.
pub async fn spawn_server() -> Result<TestServer> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let base_url = format!("http://127.0.0.1:{}", port);
    let state = Arc::new(MockState::seeded());

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind mock server")?;
    let app = router(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let server = TestServer { port, base_url, state };
    server.wait_ready(Duration::from_secs(5)).await?;
    Ok(server)
}

type Shared = State<Arc<MockState>>;
type Params = Query<HashMap<String, String>>;

fn router(state: Arc<MockState>) -> Router {
    let admin = Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/profile", get(profile))
        .route("/users", get(list_users))
        .route("/users/:id", get(get_user).delete(delete_user))
        .route("/users/:id/suspend", post(suspend_user))
        .route("/posts", get(list_posts))
        .route("/posts/:id", get(get_post).delete(delete_post))
        .route("/posts/:id/content", put(update_post))
        .route("/posts/:id/comments/:comment", delete(delete_comment))
        .route("/logs", get(list_logs))
        .route("/community-tasks", get(list_tasks).post(create_task))
        .route("/community-tasks/stats", get(task_stats))
        .route("/community-tasks/categories", get(list_categories).post(create_category))
        .route(
            "/community-tasks/categories/:id",
            put(update_category).delete(delete_category),
        )
        .route(
            "/community-tasks/:id",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/analytics/summary", get(analytics));

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest("/api/admin", admin)
        .with_state(state)
}

fn record(state: &MockState, line: String, headers: &HeaderMap) -> Option<String> {
    state.requests.lock().unwrap().push(line);
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.bearers.lock().unwrap().push(bearer.clone());
    bearer
}

fn reply(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn not_found(what: &str) -> Response {
    reply(StatusCode::NOT_FOUND, json!({"success": false, "error": format!("{what} not found")}))
}

async fn authorize(state: &MockState, bearer: Option<String>) -> Result<(), Response> {
    let expected = format!("Bearer {TOKEN}");
    let valid = bearer.as_deref() == Some(expected.as_str()) && !state.revoke_tokens.load(Ordering::SeqCst);
    if valid {
        return Ok(());
    }
    if state.slow_rejects.load(Ordering::SeqCst) {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    Err(reply(
        StatusCode::UNAUTHORIZED,
        json!({"success": false, "error": "Invalid or expired token"}),
    ))
}

fn admin() -> Value {
    json!({"id": "a1", "email": ADMIN_EMAIL, "name": "Ops"})
}

/// startAfter / limit over an ordered list; the cursor is the last id when more remain
fn paginate(items: &[Value], params: &HashMap<String, String>) -> (Vec<Value>, Value) {
    let limit: usize = params.get("limit").and_then(|l| l.parse().ok()).unwrap_or(20);
    let start = match params.get("startAfter") {
        Some(after) => items
            .iter()
            .position(|item| item["id"] == json!(after))
            .map(|i| i + 1)
            .unwrap_or(items.len()),
        None => 0,
    };
    let page: Vec<Value> = items.iter().skip(start).take(limit).cloned().collect();
    let cursor = if start + page.len() < items.len() {
        page.last().map(|item| item["id"].clone()).unwrap_or(Value::Null)
    } else {
        Value::Null
    };
    (page, cursor)
}

fn query_line(method: &str, path: &str, params: &HashMap<String, String>) -> String {
    let mut pairs: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
    pairs.sort();
    if pairs.is_empty() {
        format!("{method} {path}")
    } else {
        format!("{method} {path}?{}", pairs.join("&"))
    }
}

async fn login(State(state): Shared, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    record(&state, "POST /login".into(), &headers);
    if body["email"] == ADMIN_EMAIL && body["password"] == ADMIN_PASSWORD {
        reply(StatusCode::OK, json!({"success": true, "token": TOKEN, "admin": admin()}))
    } else {
        reply(StatusCode::UNAUTHORIZED, json!({"success": false, "error": "invalid credentials"}))
    }
}

async fn register(State(state): Shared, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    record(&state, "POST /register".into(), &headers);
    match body["registrationKey"].as_str() {
        Some("wrong") => reply(
            StatusCode::FORBIDDEN,
            json!({"success": false, "error": "Invalid registration key"}),
        ),
        // The server stored the admin but failed to serialize its timestamp
        Some("degraded") => (
            StatusCode::CREATED,
            [("content-type", "application/json")],
            r#"{"success":true,"admin":{"id":"a2","email":"new@optima.app","createdAt":"#,
        )
            .into_response(),
        _ => reply(
            StatusCode::CREATED,
            json!({
                "success": true,
                "token": TOKEN,
                "admin": {"id": "a2", "email": body["email"], "name": body["name"]}
            }),
        ),
    }
}

async fn profile(State(state): Shared, headers: HeaderMap) -> Response {
    let bearer = record(&state, "GET /profile".into(), &headers);
    state.profile_calls.fetch_add(1, Ordering::SeqCst);
    if let Err(rejected) = authorize(&state, bearer).await {
        return rejected;
    }
    reply(StatusCode::OK, json!({"success": true, "admin": admin()}))
}

async fn list_users(State(state): Shared, headers: HeaderMap, Query(params): Params) -> Response {
    let bearer = record(&state, query_line("GET", "/users", &params), &headers);
    if let Err(rejected) = authorize(&state, bearer).await {
        return rejected;
    }
    let (users, cursor) = paginate(&state.users.lock().unwrap(), &params);
    reply(StatusCode::OK, json!({"success": true, "users": users, "last_user": cursor}))
}

async fn get_user(State(state): Shared, headers: HeaderMap, Path(id): Path<String>) -> Response {
    let bearer = record(&state, format!("GET /users/{id}"), &headers);
    if let Err(rejected) = authorize(&state, bearer).await {
        return rejected;
    }
    let user = state.users.lock().unwrap().iter().find(|u| u["id"] == id).cloned();
    match user {
        Some(mut user) => {
            let posts: Vec<Value> = state
                .posts
                .lock()
                .unwrap()
                .iter()
                .filter(|p| p["user_id"] == id)
                .cloned()
                .collect();
            user["posts"] = json!(posts);
            reply(StatusCode::OK, json!({"success": true, "user": user}))
        }
        None => not_found("User"),
    }
}

async fn suspend_user(
    State(state): Shared,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let bearer = record(&state, format!("POST /users/{id}/suspend"), &headers);
    if let Err(rejected) = authorize(&state, bearer).await {
        return rejected;
    }
    let mut users = state.users.lock().unwrap();
    match users.iter_mut().find(|u| u["id"] == id) {
        Some(user) => {
            user["suspended"] = body["suspended"].clone();
            reply(StatusCode::OK, json!({"success": true}))
        }
        None => not_found("User"),
    }
}

async fn delete_user(State(state): Shared, headers: HeaderMap, Path(id): Path<String>) -> Response {
    let bearer = record(&state, format!("DELETE /users/{id}"), &headers);
    if let Err(rejected) = authorize(&state, bearer).await {
        return rejected;
    }
    let mut users = state.users.lock().unwrap();
    let before = users.len();
    users.retain(|u| u["id"] != id);
    if users.len() == before {
        return not_found("User");
    }
    reply(StatusCode::OK, json!({"success": true, "message": "User deleted"}))
}

async fn list_posts(State(state): Shared, headers: HeaderMap, Query(params): Params) -> Response {
    let bearer = record(&state, query_line("GET", "/posts", &params), &headers);
    if let Err(rejected) = authorize(&state, bearer).await {
        return rejected;
    }
    let (posts, cursor) = paginate(&state.posts.lock().unwrap(), &params);
    let posts: Vec<Value> = posts
        .into_iter()
        .map(|mut p| {
            if let Some(map) = p.as_object_mut() {
                map.remove("comments");
            }
            p
        })
        .collect();
    reply(StatusCode::OK, json!({"success": true, "posts": posts, "last_post": cursor}))
}

async fn get_post(State(state): Shared, headers: HeaderMap, Path(id): Path<String>) -> Response {
    let bearer = record(&state, format!("GET /posts/{id}"), &headers);
    if let Err(rejected) = authorize(&state, bearer).await {
        return rejected;
    }
    match state.posts.lock().unwrap().iter().find(|p| p["id"] == id) {
        Some(post) => reply(StatusCode::OK, json!({"success": true, "post": post})),
        None => not_found("Post"),
    }
}

async fn update_post(
    State(state): Shared,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let bearer = record(&state, format!("PUT /posts/{id}/content"), &headers);
    if let Err(rejected) = authorize(&state, bearer).await {
        return rejected;
    }
    let mut posts = state.posts.lock().unwrap();
    match posts.iter_mut().find(|p| p["id"] == id) {
        Some(post) => {
            post["content"] = body["content"].clone();
            reply(StatusCode::OK, json!({"success": true, "post": post.clone()}))
        }
        None => not_found("Post"),
    }
}

async fn delete_post(State(state): Shared, headers: HeaderMap, Path(id): Path<String>) -> Response {
    let bearer = record(&state, format!("DELETE /posts/{id}"), &headers);
    if let Err(rejected) = authorize(&state, bearer).await {
        return rejected;
    }
    state.posts.lock().unwrap().retain(|p| p["id"] != id);
    reply(StatusCode::OK, json!({"success": true}))
}

async fn delete_comment(
    State(state): Shared,
    headers: HeaderMap,
    Path((id, comment)): Path<(String, String)>,
) -> Response {
    let bearer = record(&state, format!("DELETE /posts/{id}/comments/{comment}"), &headers);
    if let Err(rejected) = authorize(&state, bearer).await {
        return rejected;
    }
    let mut posts = state.posts.lock().unwrap();
    match posts.iter_mut().find(|p| p["id"] == id) {
        Some(post) => {
            if let Some(comments) = post["comments"].as_array_mut() {
                comments.retain(|c| c["id"] != comment);
            }
            reply(StatusCode::OK, json!({"success": true}))
        }
        None => not_found("Post"),
    }
}

async fn list_logs(State(state): Shared, headers: HeaderMap, Query(params): Params) -> Response {
    let bearer = record(&state, query_line("GET", "/logs", &params), &headers);
    if let Err(rejected) = authorize(&state, bearer).await {
        return rejected;
    }
    let limit: usize = params.get("limit").and_then(|l| l.parse().ok()).unwrap_or(100);
    let logs: Vec<Value> = state.logs.lock().unwrap().iter().take(limit).cloned().collect();
    reply(StatusCode::OK, json!({"success": true, "logs": logs}))
}

async fn list_tasks(State(state): Shared, headers: HeaderMap, Query(params): Params) -> Response {
    let bearer = record(&state, query_line("GET", "/community-tasks", &params), &headers);
    if let Err(rejected) = authorize(&state, bearer).await {
        return rejected;
    }
    let (tasks, cursor) = paginate(&state.tasks.lock().unwrap(), &params);
    reply(StatusCode::OK, json!({"success": true, "tasks": tasks, "last_task": cursor}))
}

async fn get_task(State(state): Shared, headers: HeaderMap, Path(id): Path<String>) -> Response {
    let bearer = record(&state, format!("GET /community-tasks/{id}"), &headers);
    if let Err(rejected) = authorize(&state, bearer).await {
        return rejected;
    }
    match state.tasks.lock().unwrap().iter().find(|t| t["id"] == id) {
        Some(task) => reply(StatusCode::OK, json!({"success": true, "task": task})),
        None => not_found("Task"),
    }
}

async fn create_task(State(state): Shared, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let bearer = record(&state, "POST /community-tasks".into(), &headers);
    if let Err(rejected) = authorize(&state, bearer).await {
        return rejected;
    }
    let mut tasks = state.tasks.lock().unwrap();
    let task = json!({
        "id": format!("t{}", tasks.len() + 1),
        "title": body["title"],
        "category": body["category"],
        "reward_minutes": body["reward_minutes"],
        "deadline": body["deadline"],
        "created_at": {"_methodName": "serverTimestamp"},
        "participants": [],
        "completed_by": []
    });
    tasks.insert(0, task.clone());
    reply(StatusCode::CREATED, json!({"success": true, "community_task": task}))
}

async fn update_task(
    State(state): Shared,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let bearer = record(&state, format!("PUT /community-tasks/{id}"), &headers);
    if let Err(rejected) = authorize(&state, bearer).await {
        return rejected;
    }
    let mut tasks = state.tasks.lock().unwrap();
    match tasks.iter_mut().find(|t| t["id"] == id) {
        Some(task) => {
            if let (Some(task), Some(patch)) = (task.as_object_mut(), body.as_object()) {
                for (k, v) in patch {
                    task.insert(k.clone(), v.clone());
                }
            }
            reply(StatusCode::OK, json!({"success": true, "task": task.clone()}))
        }
        None => not_found("Task"),
    }
}

async fn delete_task(State(state): Shared, headers: HeaderMap, Path(id): Path<String>) -> Response {
    let bearer = record(&state, format!("DELETE /community-tasks/{id}"), &headers);
    if let Err(rejected) = authorize(&state, bearer).await {
        return rejected;
    }
    state.tasks.lock().unwrap().retain(|t| t["id"] != id);
    reply(StatusCode::OK, json!({"success": true}))
}

async fn task_stats(State(state): Shared, headers: HeaderMap) -> Response {
    let bearer = record(&state, "GET /community-tasks/stats".into(), &headers);
    if let Err(rejected) = authorize(&state, bearer).await {
        return rejected;
    }
    let total = state.tasks.lock().unwrap().len();
    reply(
        StatusCode::OK,
        json!({
            "success": true,
            "stats": {
                "total_tasks": total,
                "active_tasks": 1,
                "expired_tasks": total - 1,
                "total_participants": 3,
                "completion_rate": 33.3,
                "tasks_by_category": [{"name": "Fitness", "count": 1}]
            }
        }),
    )
}

async fn list_categories(State(state): Shared, headers: HeaderMap) -> Response {
    let bearer = record(&state, "GET /community-tasks/categories".into(), &headers);
    if let Err(rejected) = authorize(&state, bearer).await {
        return rejected;
    }
    let categories = state.categories.lock().unwrap().clone();
    reply(StatusCode::OK, json!({"success": true, "categories": categories}))
}

async fn create_category(State(state): Shared, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let bearer = record(&state, "POST /community-tasks/categories".into(), &headers);
    if let Err(rejected) = authorize(&state, bearer).await {
        return rejected;
    }
    let mut categories = state.categories.lock().unwrap();
    let mut category = body.clone();
    category["id"] = json!(format!("k{}", categories.len() + 1));
    categories.insert(0, category.clone());
    reply(StatusCode::CREATED, json!({"success": true, "category": category}))
}

async fn update_category(
    State(state): Shared,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let bearer = record(&state, format!("PUT /community-tasks/categories/{id}"), &headers);
    if let Err(rejected) = authorize(&state, bearer).await {
        return rejected;
    }
    let mut categories = state.categories.lock().unwrap();
    match categories.iter_mut().find(|c| c["id"] == id) {
        Some(category) => {
            if let (Some(category), Some(patch)) = (category.as_object_mut(), body.as_object()) {
                for (k, v) in patch {
                    category.insert(k.clone(), v.clone());
                }
            }
            reply(StatusCode::OK, json!({"success": true, "category": category.clone()}))
        }
        None => not_found("Category"),
    }
}

async fn delete_category(State(state): Shared, headers: HeaderMap, Path(id): Path<String>) -> Response {
    let bearer = record(&state, format!("DELETE /community-tasks/categories/{id}"), &headers);
    if let Err(rejected) = authorize(&state, bearer).await {
        return rejected;
    }
    state.categories.lock().unwrap().retain(|c| c["id"] != id);
    reply(StatusCode::OK, json!({"success": true}))
}

async fn analytics(State(state): Shared, headers: HeaderMap, Query(params): Params) -> Response {
    let bearer = record(&state, query_line("GET", "/analytics/summary", &params), &headers);
    if let Err(rejected) = authorize(&state, bearer).await {
        return rejected;
    }
    let total_users = state.users.lock().unwrap().len();
    reply(
        StatusCode::OK,
        json!({
            "success": true,
            "summary": {
                "total_users": total_users,
                "total_posts": 3,
                "total_comments": 6,
                "new_users": 1,
                "daily_signups": [0, 1, 0]
            }
        }),
    )
}
