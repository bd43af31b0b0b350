//! In-process mock of the hosted backend.
//!
//! Implements the subset of the table API, object storage and auth service
//! the remote stores use: `eq.` filters, `or=(name.ilike..,description.ilike..)`
//! search, `order`, `limit`, `offset`, `select` projection, and the `Prefer`
//! header's `return=representation`, `resolution=ignore-duplicates` and
//! `resolution=merge-duplicates` (upsert on `id`).

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde_json::{Map, Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;
use url::form_urlencoded;

/// API key the mock expects on every request.
pub const MOCK_API_KEY: &str = "mock-project-api-key";

/// A user known to the mock auth service.
#[derive(Debug, Clone)]
pub struct MockUser {
    pub id: String,
    pub email: String,
    /// Stored in the `profiles` table; `None` for customers.
    pub role: Option<String>,
}

#[derive(Default)]
struct MockData {
    tables: HashMap<String, Vec<Value>>,
    objects: HashMap<String, Vec<u8>>,
    users: HashMap<String, MockUser>,
    table_requests: HashMap<String, usize>,
    storage_requests: usize,
    unavailable: bool,
}

#[derive(Clone, Default)]
struct MockState {
    data: Arc<Mutex<MockData>>,
}

impl MockState {
    fn lock(&self) -> MutexGuard<'_, MockData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A running mock backend, stopped on drop.
pub struct MockBackend {
    base_url: Url,
    state: MockState,
    server: JoinHandle<()>,
}

impl MockBackend {
    /// Bind an ephemeral port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> Self {
        let state = MockState::default();
        let app = Router::new()
            .route(
                "/rest/v1/{table}",
                get(table_select)
                    .post(table_insert)
                    .patch(table_update)
                    .delete(table_delete),
            )
            .route("/storage/v1/object/{bucket}", delete(storage_delete))
            .route("/storage/v1/object/{bucket}/{*path}", post(storage_upload))
            .route("/auth/v1/user", get(auth_user))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let addr = listener.local_addr().expect("Mock backend has no address");
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            base_url: Url::parse(&format!("http://{addr}/")).expect("Invalid mock URL"),
            state,
            server,
        }
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Public URL prefix of objects in `bucket`.
    #[must_use]
    pub fn public_prefix(&self, bucket: &str) -> String {
        format!("{}storage/v1/object/public/{bucket}/", self.base_url)
    }

    /// Register a user reachable through `token`, with a profile row.
    pub fn add_user(&self, token: &str, user: MockUser) {
        let mut data = self.state.lock();
        let profile = json!({ "id": user.id, "role": user.role });
        data.tables.entry("profiles".to_string()).or_default().push(profile);
        data.users.insert(token.to_string(), user);
    }

    /// Insert a raw row, bypassing the API.
    pub fn insert_row(&self, table: &str, row: Value) {
        self.state
            .lock()
            .tables
            .entry(table.to_string())
            .or_default()
            .push(row);
    }

    /// Current rows of a table.
    #[must_use]
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.state.lock().tables.get(table).cloned().unwrap_or_default()
    }

    /// Number of table API requests received for `table`.
    #[must_use]
    pub fn table_requests(&self, table: &str) -> usize {
        self.state
            .lock()
            .table_requests
            .get(table)
            .copied()
            .unwrap_or_default()
    }

    /// Number of object storage requests received.
    #[must_use]
    pub fn storage_requests(&self) -> usize {
        self.state.lock().storage_requests
    }

    /// Paths of stored objects.
    #[must_use]
    pub fn object_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.state.lock().objects.keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Make every table request answer 503.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.lock().unavailable = unavailable;
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

// =============================================================================
// Request parsing
// =============================================================================

#[derive(Default)]
struct TableQuery {
    filters: Vec<(String, String)>,
    search: Option<String>,
    order: Vec<(String, bool)>,
    select: Option<Vec<String>>,
    limit: Option<usize>,
    offset: usize,
}

impl TableQuery {
    fn parse(raw: Option<&str>) -> Self {
        let mut query = Self::default();
        for (key, value) in form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
            match key.as_ref() {
                "select" if value != "*" => {
                    query.select = Some(value.split(',').map(str::to_string).collect());
                }
                "select" => {}
                "order" => {
                    query.order = value
                        .split(',')
                        .filter_map(|term| {
                            let (column, direction) = term.split_once('.')?;
                            Some((column.to_string(), direction == "asc"))
                        })
                        .collect();
                }
                "limit" => query.limit = value.parse().ok(),
                "offset" => query.offset = value.parse().unwrap_or_default(),
                // (name.ilike.*term*,description.ilike.*term*)
                "or" => {
                    query.search = value.split('*').nth(1).map(str::to_lowercase);
                }
                _ => {
                    if let Some(expected) = value.strip_prefix("eq.") {
                        query.filters.push((key.into_owned(), expected.to_string()));
                    }
                }
            }
        }
        query
    }

    fn matches(&self, row: &Value) -> bool {
        let filters_match = self
            .filters
            .iter()
            .all(|(column, expected)| row.get(column).is_some_and(|v| as_text(v) == *expected));
        let search_match = self.search.as_ref().is_none_or(|term| {
            ["name", "description"].iter().any(|column| {
                row.get(*column)
                    .and_then(Value::as_str)
                    .is_some_and(|text| text.to_lowercase().contains(term))
            })
        });
        filters_match && search_match
    }

    fn compare(&self, a: &Value, b: &Value) -> Ordering {
        for (column, ascending) in &self.order {
            let ordering = compare_values(a.get(column), b.get(column));
            let ordering = if *ascending { ordering } else { ordering.reverse() };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    fn project(&self, row: Value) -> Value {
        match (&self.select, row) {
            (Some(columns), Value::Object(map)) => Value::Object(
                map.into_iter()
                    .filter(|(key, _)| columns.contains(key))
                    .collect::<Map<String, Value>>(),
            ),
            (_, row) => row,
        }
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (a, b) => a.is_some().cmp(&b.is_some()),
    }
}

fn prefer(headers: &HeaderMap) -> String {
    headers
        .get("prefer")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn has_api_key(headers: &HeaderMap) -> bool {
    headers.get("apikey").and_then(|v| v.to_str().ok()) == Some(MOCK_API_KEY)
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

/// Shared preamble for table routes: count, authenticate, honor outages.
fn admit(data: &mut MockData, table: &str, headers: &HeaderMap) -> Option<Response> {
    *data.table_requests.entry(table.to_string()).or_default() += 1;
    if !has_api_key(headers) {
        return Some((StatusCode::UNAUTHORIZED, Json(json!({ "message": "no api key" }))).into_response());
    }
    if data.unavailable {
        return Some(StatusCode::SERVICE_UNAVAILABLE.into_response());
    }
    None
}

// =============================================================================
// Table handlers
// =============================================================================

async fn table_select(
    State(state): State<MockState>,
    Path(table): Path<String>,
    RawQuery(raw): RawQuery,
    headers: HeaderMap,
) -> Response {
    let mut data = state.lock();
    if let Some(rejection) = admit(&mut data, &table, &headers) {
        return rejection;
    }

    let query = TableQuery::parse(raw.as_deref());
    let mut rows: Vec<Value> = data
        .tables
        .get(&table)
        .map(|rows| rows.iter().filter(|row| query.matches(row)).cloned().collect())
        .unwrap_or_default();
    rows.sort_by(|a, b| query.compare(a, b));

    let rows: Vec<Value> = rows
        .into_iter()
        .skip(query.offset)
        .take(query.limit.unwrap_or(usize::MAX))
        .map(|row| query.project(row))
        .collect();
    Json(rows).into_response()
}

async fn table_insert(
    State(state): State<MockState>,
    Path(table): Path<String>,
    headers: HeaderMap,
    Json(mut row): Json<Value>,
) -> Response {
    let mut data = state.lock();
    if let Some(rejection) = admit(&mut data, &table, &headers) {
        return rejection;
    }

    let Some(object) = row.as_object_mut() else {
        return (StatusCode::BAD_REQUEST, Json(json!({ "message": "expected an object" })))
            .into_response();
    };
    if object.get("name").is_some_and(|name| name.as_str() == Some("")) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "name violates check constraint" })),
        )
            .into_response();
    }
    if table != "favorites" && !object.contains_key("id") {
        object.insert("id".to_string(), json!(uuid::Uuid::new_v4().to_string()));
    }

    let prefer = prefer(&headers);
    let rows = data.tables.entry(table).or_default();
    if prefer.contains("resolution=ignore-duplicates") && rows.contains(&row) {
        return StatusCode::CREATED.into_response();
    }
    let upsert = prefer.contains("resolution=merge-duplicates");
    match rows.iter_mut().find(|r| upsert && r.get("id") == row.get("id")) {
        Some(slot) => *slot = row.clone(),
        None => rows.push(row.clone()),
    }

    if prefer.contains("return=representation") {
        (StatusCode::CREATED, Json(vec![row])).into_response()
    } else {
        StatusCode::CREATED.into_response()
    }
}

async fn table_update(
    State(state): State<MockState>,
    Path(table): Path<String>,
    RawQuery(raw): RawQuery,
    headers: HeaderMap,
    Json(patch): Json<Value>,
) -> Response {
    let mut data = state.lock();
    if let Some(rejection) = admit(&mut data, &table, &headers) {
        return rejection;
    }

    let query = TableQuery::parse(raw.as_deref());
    let mut updated = Vec::new();
    for row in data.tables.entry(table).or_default().iter_mut() {
        if !query.matches(row) {
            continue;
        }
        if let (Some(target), Some(changes)) = (row.as_object_mut(), patch.as_object()) {
            for (key, value) in changes {
                target.insert(key.clone(), value.clone());
            }
        }
        updated.push(row.clone());
    }
    Json(updated).into_response()
}

async fn table_delete(
    State(state): State<MockState>,
    Path(table): Path<String>,
    RawQuery(raw): RawQuery,
    headers: HeaderMap,
) -> Response {
    let mut data = state.lock();
    if let Some(rejection) = admit(&mut data, &table, &headers) {
        return rejection;
    }

    let query = TableQuery::parse(raw.as_deref());
    let rows = data.tables.entry(table).or_default();
    let (removed, kept): (Vec<Value>, Vec<Value>) =
        rows.drain(..).partition(|row| query.matches(row));
    *rows = kept;

    if prefer(&headers).contains("return=representation") {
        Json(removed).into_response()
    } else {
        StatusCode::NO_CONTENT.into_response()
    }
}

// =============================================================================
// Storage and auth handlers
// =============================================================================

async fn storage_upload(
    State(state): State<MockState>,
    Path((bucket, path)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let mut data = state.lock();
    data.storage_requests += 1;
    if !has_api_key(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    data.objects.insert(path.clone(), body.to_vec());
    Json(json!({ "Key": format!("{bucket}/{path}") })).into_response()
}

async fn storage_delete(
    State(state): State<MockState>,
    Path(_bucket): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut data = state.lock();
    data.storage_requests += 1;
    if !has_api_key(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let prefixes: Vec<String> = body
        .get("prefixes")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default();
    for prefix in &prefixes {
        data.objects.remove(prefix);
    }
    Json(json!([])).into_response()
}

async fn auth_user(State(state): State<MockState>, headers: HeaderMap) -> Response {
    let data = state.lock();
    match bearer(&headers).and_then(|token| data.users.get(&token).cloned()) {
        Some(user) => Json(json!({ "id": user.id, "email": user.email })).into_response(),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "msg": "invalid JWT" })),
        )
            .into_response(),
    }
}
