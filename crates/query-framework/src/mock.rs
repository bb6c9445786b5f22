//! # Mock Framework & Testing Guide
//!
//! Three test doubles cover the layers of the framework:
//!
//! | Double | Replaces | Use Case |
//! |--------|----------|----------|
//! | [`MockTransport`] | the REST API | Scripted responses, error injection, asserting the exact calls |
//! | [`InMemoryBackend`] | the REST API | A stateful fake server for end-to-end flows |
//! | [`create_mock_client`] | the actor | Testing typed clients without running an actor |
//!
//! ## Pattern 0: Client logic against a scripted actor
//!
//! ```rust
//! use query_framework::mock::{create_mock_client, expect_delete};
//! use query_framework::{MutationOutcome, Resource};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Clone, Debug, Serialize, Deserialize)]
//! struct Role { id: u32 }
//! #[derive(Debug, Serialize)] struct RoleCreate;
//!
//! impl Resource for Role {
//!     type Id = u32; type Create = RoleCreate; type Update = RoleCreate;
//!     const PATH: &'static str = "roles";
//!     fn id(&self) -> u32 { self.id }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let (client, mut receiver) = create_mock_client::<Role>(10);
//!     let task = tokio::spawn(async move { client.delete(7).await });
//!
//!     let (id, respond_to) = expect_delete(&mut receiver).await.unwrap();
//!     assert_eq!(id, 7);
//!     respond_to.send(Ok(MutationOutcome { message: "Deleted".into(), data: None })).unwrap();
//!
//!     assert!(task.await.unwrap().is_ok());
//! }
//! ```
//!
//! ## Pattern 1: Actor against scripted responses
//!
//! ```rust
//! use query_framework::mock::{list_body, MockTransport};
//! use query_framework::{ListQuery, QueryActor, QueryError, Resource};
//! use serde::{Deserialize, Serialize};
//! use std::sync::Arc;
//!
//! #[derive(Clone, Debug, Serialize, Deserialize)]
//! struct Role { id: u32 }
//! #[derive(Debug, Serialize)] struct RoleCreate;
//!
//! impl Resource for Role {
//!     type Id = u32; type Create = RoleCreate; type Update = RoleCreate;
//!     const PATH: &'static str = "roles";
//!     fn id(&self) -> u32 { self.id }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mock = Arc::new(MockTransport::new());
//!     mock.expect_get("roles").return_err(QueryError::Http { status: 500 });
//!
//!     let (actor, client) = QueryActor::<Role>::new(10);
//!     tokio::spawn(actor.run(mock.clone()));
//!
//!     let result = client.list(ListQuery::first(10)).await;
//!     assert_eq!(result.unwrap_err(), QueryError::Http { status: 500 });
//!     mock.verify();
//! }
//! ```
//!
//! ## Pattern 2: Full flows against a fake server
//!
//! [`InMemoryBackend`] answers listings with real paging and searching and applies
//! mutations to its collections. [`InMemoryBackend::hold`] parks listing requests
//! until [`InMemoryBackend::release`], which makes in-flight deduplication observable.
//! See `tests/query_cache_test.rs` for the full set of flows.

use crate::client::QueryClient;
use crate::error::QueryError;
use crate::message::{QueryRequest, Response};
use crate::resource::{ListQuery, Resource};
use crate::transport::{HttpMethod, Transport};
use crate::wire::{ListPage, MutationOutcome};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{mpsc, watch};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A request as the transport saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub method: HttpMethod,
    pub path: String,
    pub params: Vec<(String, String)>,
    pub body: Option<Value>,
}

// =============================================================================
// RESPONSE BODIES
// =============================================================================

/// A successful listing body.
pub fn list_body(rows: Vec<Value>, total: u64, page: u32, limit: u32) -> Value {
    let total_page = total.div_ceil(u64::from(limit.max(1))).max(1);
    json!({
        "status": true,
        "message": "Data retrieved successfully",
        "data": rows,
        "pagination": { "total": total, "page": page, "limit": limit, "totalPage": total_page }
    })
}

/// A successful mutation body.
pub fn mutation_body(message: &str, data: Option<Value>) -> Value {
    json!({ "status": true, "message": message, "data": data })
}

/// A business rejection body.
pub fn rejection_body(message: &str) -> Value {
    json!({ "status": false, "message": message, "data": null })
}

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

enum Expectation {
    Get {
        path: String,
        response: Result<Value, QueryError>,
    },
    Send {
        method: HttpMethod,
        path: String,
        response: Result<Value, QueryError>,
    },
}

/// A transport with expectation tracking for fluent testing.
///
/// Requests are matched in order against the queued expectations. A request that does
/// not match the next expectation panics.
///
/// # Example
/// ```ignore
/// let mock = MockTransport::new();
/// mock.expect_get("units").return_ok(list_body(vec![], 0, 1, 10));
/// mock.expect_send(HttpMethod::Delete, "units/3").return_ok(mutation_body("Deleted", None));
///
/// // Hand `Arc::new(mock)` to an actor...
/// mock.verify(); // Ensures all expectations were met
/// ```
#[derive(Default)]
pub struct MockTransport {
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("pending", &lock(&self.expectations).len())
            .field("calls", &lock(&self.calls).len())
            .finish()
    }
}

impl MockTransport {
    /// Creates a new mock transport with no expectations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects a listing request on `path`.
    pub fn expect_get(&self, path: &str) -> GetExpectationBuilder {
        GetExpectationBuilder {
            path: path.to_string(),
            expectations: self.expectations.clone(),
        }
    }

    /// Expects a mutation request.
    pub fn expect_send(&self, method: HttpMethod, path: &str) -> SendExpectationBuilder {
        SendExpectationBuilder {
            method,
            path: path.to_string(),
            expectations: self.expectations.clone(),
        }
    }

    /// Every request received so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let pending = lock(&self.expectations).len();
        if pending != 0 {
            panic!("Not all expectations were met. {pending} remaining");
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, path: &str, params: &[(String, String)]) -> Result<Value, QueryError> {
        lock(&self.calls).push(RecordedCall {
            method: HttpMethod::Get,
            path: path.to_string(),
            params: params.to_vec(),
            body: None,
        });
        let expectation = lock(&self.expectations).pop_front();
        match expectation {
            Some(Expectation::Get {
                path: expected,
                response,
            }) if expected == path => response,
            _ => panic!("Unexpected request or expectation mismatch: GET {path}"),
        }
    }

    async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, QueryError> {
        lock(&self.calls).push(RecordedCall {
            method,
            path: path.to_string(),
            params: Vec::new(),
            body,
        });
        let expectation = lock(&self.expectations).pop_front();
        match expectation {
            Some(Expectation::Send {
                method: expected_method,
                path: expected,
                response,
            }) if expected_method == method && expected == path => response,
            _ => panic!("Unexpected request or expectation mismatch: {method} {path}"),
        }
    }
}

/// Builder for listing expectations.
pub struct GetExpectationBuilder {
    path: String,
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
}

impl GetExpectationBuilder {
    /// Sets the expectation to return a body.
    pub fn return_ok(self, body: Value) {
        lock(&self.expectations).push_back(Expectation::Get {
            path: self.path,
            response: Ok(body),
        });
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: QueryError) {
        lock(&self.expectations).push_back(Expectation::Get {
            path: self.path,
            response: Err(error),
        });
    }
}

/// Builder for mutation expectations.
pub struct SendExpectationBuilder {
    method: HttpMethod,
    path: String,
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
}

impl SendExpectationBuilder {
    /// Sets the expectation to return a body.
    pub fn return_ok(self, body: Value) {
        lock(&self.expectations).push_back(Expectation::Send {
            method: self.method,
            path: self.path,
            response: Ok(body),
        });
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: QueryError) {
        lock(&self.expectations).push_back(Expectation::Send {
            method: self.method,
            path: self.path,
            response: Err(error),
        });
    }
}

// =============================================================================
// IN-MEMORY BACKEND
// =============================================================================

#[derive(Debug, Default)]
struct Collection {
    rows: Vec<Value>,
    next_id: u64,
}

impl Collection {
    fn insert(&mut self, mut row: Value) -> Value {
        self.next_id += 1;
        if let Value::Object(fields) = &mut row {
            fields
                .entry("id")
                .or_insert_with(|| Value::from(self.next_id));
        }
        self.rows.push(row.clone());
        row
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.rows
            .iter()
            .position(|row| row.get("id").map(cell_text).as_deref() == Some(id))
    }
}

#[derive(Debug)]
enum Injected {
    Fail(QueryError),
    Reject(String),
}

/// A stateful fake of the REST API.
///
/// Collections are keyed by path. Rows get a numeric `id` when they are seeded or
/// created without one. Listings honour `page`, `limit` and `search` (a
/// case-insensitive match against any field). Updates and deletes of unknown ids are
/// rejected with `status: false`.
#[derive(Debug)]
pub struct InMemoryBackend {
    collections: Mutex<HashMap<String, Collection>>,
    calls: Mutex<Vec<RecordedCall>>,
    injected: Mutex<VecDeque<Injected>>,
    gate: watch::Sender<bool>,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBackend {
    pub fn new() -> Self {
        let (gate, _) = watch::channel(true);
        Self {
            collections: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            injected: Mutex::new(VecDeque::new()),
            gate,
        }
    }

    /// Adds rows to a collection.
    pub fn seed(&self, path: &str, rows: impl IntoIterator<Item = Value>) {
        let mut collections = lock(&self.collections);
        let collection = collections.entry(path.to_string()).or_default();
        for row in rows {
            collection.insert(row);
        }
    }

    /// The current rows of a collection.
    pub fn rows(&self, path: &str) -> Vec<Value> {
        lock(&self.collections)
            .get(path)
            .map(|c| c.rows.clone())
            .unwrap_or_default()
    }

    /// Parks listing requests until [`release`](Self::release) is called.
    pub fn hold(&self) {
        self.gate.send_replace(false);
    }

    pub fn release(&self) {
        self.gate.send_replace(true);
    }

    /// The next request fails with `error` without touching any collection.
    pub fn fail_next(&self, error: QueryError) {
        lock(&self.injected).push_back(Injected::Fail(error));
    }

    /// The next request is answered with `status: false` and `message`.
    pub fn reject_next(&self, message: &str) {
        lock(&self.injected).push_back(Injected::Reject(message.to_string()));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    /// Number of requests with `method` on exactly `path`.
    pub fn call_count(&self, method: HttpMethod, path: &str) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|call| call.method == method && call.path == path)
            .count()
    }

    fn record(&self, call: RecordedCall) {
        lock(&self.calls).push(call);
    }

    fn take_injected(&self) -> Option<Result<Value, QueryError>> {
        lock(&self.injected).pop_front().map(|injected| match injected {
            Injected::Fail(error) => Err(error),
            Injected::Reject(message) => Ok(rejection_body(&message)),
        })
    }

    fn list(&self, path: &str, params: &[(String, String)]) -> Result<Value, QueryError> {
        let param = |name: &str| {
            params
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str())
        };
        let page = param("page")
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(1)
            .max(1);
        let limit = param("limit")
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10)
            .max(1);
        let needle = param("search").unwrap_or_default().trim().to_lowercase();

        let collections = lock(&self.collections);
        let collection = collections
            .get(path)
            .ok_or(QueryError::Http { status: 404 })?;
        let matching: Vec<&Value> = collection
            .rows
            .iter()
            .filter(|row| needle.is_empty() || row_matches(row, &needle))
            .collect();

        let start = (page as usize - 1) * limit as usize;
        let rows = matching
            .iter()
            .skip(start)
            .take(limit as usize)
            .map(|row| (*row).clone())
            .collect();
        Ok(list_body(rows, matching.len() as u64, page, limit))
    }

    fn mutate(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, QueryError> {
        let (collection_path, id) = match path.split_once('/') {
            Some((collection, id)) => (collection, Some(id)),
            None => (path, None),
        };

        let mut collections = lock(&self.collections);
        let collection = collections
            .get_mut(collection_path)
            .ok_or(QueryError::Http { status: 404 })?;

        match (method, id) {
            (HttpMethod::Post, None) => {
                let row = collection.insert(body.unwrap_or_else(|| Value::Object(Map::new())));
                Ok(mutation_body("Created successfully", Some(row)))
            }
            (HttpMethod::Put, Some(id)) => match collection.position(id) {
                Some(index) => {
                    let row = &mut collection.rows[index];
                    if let (Value::Object(fields), Some(Value::Object(changes))) = (row, body) {
                        for (key, value) in changes {
                            if !value.is_null() {
                                fields.insert(key, value);
                            }
                        }
                    }
                    let updated = collection.rows[index].clone();
                    Ok(mutation_body("Updated successfully", Some(updated)))
                }
                None => Ok(rejection_body("Record not found")),
            },
            (HttpMethod::Delete, Some(id)) => match collection.position(id) {
                Some(index) => {
                    collection.rows.remove(index);
                    Ok(mutation_body("Deleted successfully", None))
                }
                None => Ok(rejection_body("Record not found")),
            },
            _ => Err(QueryError::Http { status: 405 }),
        }
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn row_matches(row: &Value, needle: &str) -> bool {
    match row {
        Value::Object(fields) => fields
            .values()
            .any(|value| cell_text(value).to_lowercase().contains(needle)),
        other => cell_text(other).to_lowercase().contains(needle),
    }
}

#[async_trait]
impl Transport for InMemoryBackend {
    async fn get(&self, path: &str, params: &[(String, String)]) -> Result<Value, QueryError> {
        self.record(RecordedCall {
            method: HttpMethod::Get,
            path: path.to_string(),
            params: params.to_vec(),
            body: None,
        });
        let mut gate = self.gate.subscribe();
        gate.wait_for(|open| *open)
            .await
            .map_err(|_| QueryError::Transport("backend gone".to_string()))?;

        if let Some(injected) = self.take_injected() {
            return injected;
        }
        self.list(path, params)
    }

    async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, QueryError> {
        self.record(RecordedCall {
            method,
            path: path.to_string(),
            params: Vec::new(),
            body: body.clone(),
        });
        if let Some(injected) = self.take_injected() {
            return injected;
        }
        self.mutate(method, path, body)
    }
}

// =============================================================================
// ACTOR-LESS CLIENT HELPERS
// =============================================================================

/// Creates a client and the receiver its requests arrive on.
///
/// Typed clients can be tested by answering the requests by hand instead of running
/// a `QueryActor`.
pub fn create_mock_client<T: Resource>(
    buffer_size: usize,
) -> (QueryClient<T>, mpsc::Receiver<QueryRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (QueryClient::new(sender), receiver)
}

/// Helper to verify that the next message is a List request
pub async fn expect_list<T: Resource>(
    receiver: &mut mpsc::Receiver<QueryRequest<T>>,
) -> Option<(ListQuery, Response<ListPage<T>>)> {
    match receiver.recv().await {
        Some(QueryRequest::List { query, respond_to }) => Some((query, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Create request
pub async fn expect_create<T: Resource>(
    receiver: &mut mpsc::Receiver<QueryRequest<T>>,
) -> Option<(T::Create, Response<MutationOutcome<T>>)> {
    match receiver.recv().await {
        Some(QueryRequest::Create { params, respond_to }) => Some((params, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Update request
pub async fn expect_update<T: Resource>(
    receiver: &mut mpsc::Receiver<QueryRequest<T>>,
) -> Option<(T::Id, T::Update, Response<MutationOutcome<T>>)> {
    match receiver.recv().await {
        Some(QueryRequest::Update {
            id,
            update,
            respond_to,
        }) => Some((id, update, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Delete request
pub async fn expect_delete<T: Resource>(
    receiver: &mut mpsc::Receiver<QueryRequest<T>>,
) -> Option<(T::Id, Response<MutationOutcome<T>>)> {
    match receiver.recv().await {
        Some(QueryRequest::Delete { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}
