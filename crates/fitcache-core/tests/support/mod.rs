//! In-process fake of the fitness REST backend.
//!
//! Stores resources as JSON per kind, counts requests, and can be told to
//! fail, delay or return garbage for list calls.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Map, Value};

use fitcache_core::{ApiClient, CacheOptions, QueryCache};

pub const USER: &str = "user-123";
pub const OTHER_USER: &str = "user-456";

#[derive(Default)]
struct Store {
    items: HashMap<String, Vec<Value>>,
    next_id: u64,
    requests: HashMap<String, usize>,
    total_requests: usize,
    failing_lists: HashSet<String>,
    garbage_lists: HashSet<String>,
    list_delay: Option<Duration>,
    last_body: HashMap<String, Value>,
}

impl Store {
    fn record(&mut self, route: String) {
        *self.requests.entry(route).or_default() += 1;
        self.total_requests += 1;
    }

    fn assign_id(&mut self, kind: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", kind, self.next_id)
    }
}

#[derive(Clone)]
pub struct FakeBackend {
    store: Arc<Mutex<Store>>,
    pub base_url: String,
}

type Reply = (StatusCode, Json<Value>);

impl FakeBackend {
    /// Bind to port 0 and serve the fake API on a background task.
    pub async fn start() -> Self {
        let store = Arc::new(Mutex::new(Store::default()));
        let app = Router::new()
            .route("/api/:kind", get(list_all).post(create))
            .route("/api/:kind/user/:user_id", get(list_for_user))
            .route("/api/:kind/:id", axum::routing::put(update).delete(remove))
            .with_state(Arc::clone(&store));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            store,
            base_url: format!("http://{addr}/api"),
        }
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.base_url).unwrap()
    }

    pub fn cache(&self) -> QueryCache {
        self.cache_with(CacheOptions::default())
    }

    pub fn cache_with(&self, options: CacheOptions) -> QueryCache {
        QueryCache::new(self.client(), options)
    }

    /// Insert a resource directly, bypassing the HTTP API. Returns its id.
    pub fn seed(&self, kind: &str, mut value: Value) -> String {
        let mut store = self.store.lock().unwrap();
        let id = store.assign_id(kind);
        value["id"] = json!(id);
        store.items.entry(kind.to_string()).or_default().push(value);
        id
    }

    pub fn list_calls(&self, kind: &str) -> usize {
        let store = self.store.lock().unwrap();
        store.requests.get(&format!("GET /{kind}/user")).copied().unwrap_or(0)
    }

    pub fn calls(&self, route: &str) -> usize {
        let store = self.store.lock().unwrap();
        store.requests.get(route).copied().unwrap_or(0)
    }

    pub fn total_requests(&self) -> usize {
        self.store.lock().unwrap().total_requests
    }

    pub fn last_body(&self, route: &str) -> Option<Value> {
        self.store.lock().unwrap().last_body.get(route).cloned()
    }

    pub fn fail_lists(&self, kind: &str) {
        self.store.lock().unwrap().failing_lists.insert(kind.to_string());
    }

    pub fn heal_lists(&self, kind: &str) {
        self.store.lock().unwrap().failing_lists.remove(kind);
    }

    pub fn garble_lists(&self, kind: &str) {
        self.store.lock().unwrap().garbage_lists.insert(kind.to_string());
    }

    pub fn set_list_delay(&self, delay: Duration) {
        self.store.lock().unwrap().list_delay = Some(delay);
    }
}

async fn list_for_user(
    State(store): State<Arc<Mutex<Store>>>,
    Path((kind, user_id)): Path<(String, String)>,
) -> axum::response::Response {
    use axum::response::IntoResponse;

    let delay = {
        let mut store = store.lock().unwrap();
        store.record(format!("GET /{kind}/user"));
        store.list_delay
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let store = store.lock().unwrap();
    if store.failing_lists.contains(&kind) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "database unavailable").into_response();
    }
    if store.garbage_lists.contains(&kind) {
        return (StatusCode::OK, "<html>not json</html>").into_response();
    }
    let items: Vec<Value> = store
        .items
        .get(&kind)
        .into_iter()
        .flatten()
        // Exercises are a shared catalog and carry no owner
        .filter(|item| item.get("userId").map_or(true, |owner| owner == user_id.as_str()))
        .cloned()
        .collect();
    (StatusCode::OK, Json(Value::Array(items))).into_response()
}

async fn list_all(State(store): State<Arc<Mutex<Store>>>, Path(kind): Path<String>) -> Reply {
    let mut store = store.lock().unwrap();
    store.record(format!("GET /{kind}"));
    let items = store.items.get(&kind).cloned().unwrap_or_default();
    (StatusCode::OK, Json(Value::Array(items)))
}

async fn create(
    State(store): State<Arc<Mutex<Store>>>,
    Path(kind): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    let mut store = store.lock().unwrap();
    let route = format!("POST /{kind}");
    store.record(route.clone());
    store.last_body.insert(route, body.clone());

    let mut item = body;
    let id = store.assign_id(&kind);
    item["id"] = json!(id);
    if item.get("date").is_none() && kind != "users" && kind != "exercises" {
        item["date"] = json!("2024-05-27T00:00:00.000Z");
    }
    if kind == "users" {
        if let Some(obj) = item.as_object_mut() {
            obj.remove("passwordHash");
        }
        item["createdAt"] = json!("2024-05-27T00:00:00.000Z");
    }
    if kind == "workouts" {
        let entries = item["entries"].as_array().cloned().unwrap_or_default();
        let mut with_ids = Vec::new();
        for mut entry in entries {
            entry["id"] = json!(store.assign_id("entry"));
            entry["workoutSessionId"] = json!(id);
            with_ids.push(entry);
        }
        item["entries"] = Value::Array(with_ids);
    }
    store.items.entry(kind).or_default().push(item.clone());
    (StatusCode::CREATED, Json(item))
}

async fn update(
    State(store): State<Arc<Mutex<Store>>>,
    Path((kind, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Reply {
    let mut store = store.lock().unwrap();
    let route = format!("PUT /{kind}");
    store.record(route.clone());
    store.last_body.insert(route, body.clone());

    let patch: Map<String, Value> = match body {
        Value::Object(map) => map,
        _ => return (StatusCode::BAD_REQUEST, Json(json!({ "error": "expected object" }))),
    };
    let found = store
        .items
        .get_mut(&kind)
        .and_then(|items| items.iter_mut().find(|item| item["id"] == id.as_str()));
    match found {
        Some(item) => {
            for (field, value) in patch {
                item[field.as_str()] = value;
            }
            (StatusCode::OK, Json(item.clone()))
        }
        None => (StatusCode::NOT_FOUND, Json(json!({ "error": format!("{id} not found") }))),
    }
}

async fn remove(
    State(store): State<Arc<Mutex<Store>>>,
    Path((kind, id)): Path<(String, String)>,
) -> Reply {
    let mut store = store.lock().unwrap();
    store.record(format!("DELETE /{kind}"));
    let items = store.items.entry(kind).or_default();
    let before = items.len();
    items.retain(|item| item["id"] != id.as_str());
    if items.len() == before {
        (StatusCode::NOT_FOUND, Json(json!({ "error": format!("{id} not found") })))
    } else {
        (StatusCode::OK, Json(json!({ "message": "deleted" })))
    }
}
