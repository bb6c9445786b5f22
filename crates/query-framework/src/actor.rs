//! # Query Actor
//!
//! This module defines the `QueryActor`, the server side of a per-resource list cache.
//! It processes messages sequentially and owns every cache entry of its resource, so
//! no entry is ever shared behind a lock.
//!
//! ## Cache entries
//!
//! One entry exists per [`ListQuery`]. Since there is one actor per resource, the
//! effective key is `(resource, page, limit, search)`. Each entry holds:
//!
//! * the last successfully fetched page,
//! * a `stale` flag set by invalidation,
//! * the ticket of the fetch currently in flight, if any,
//! * one-shot callers waiting for that fetch,
//! * a `watch` channel publishing [`ListSnapshot`]s to subscribers.
//!
//! ## Fetches and mutations
//!
//! Network work never runs on the actor task. Fetches and mutations are spawned and
//! report back on an internal completion channel, which the run loop polls next to
//! the request channel. While a fetch for a key is in flight, further requests for the
//! same key attach to it instead of starting another one.
//!
//! Invalidation bumps every entry to stale and forgets in-flight tickets. A fetch that
//! was started before the invalidation completes with a ticket the entry no longer
//! knows and is dropped, so it cannot make the entry fresh again. Entries that still
//! have subscribers or waiters are refetched immediately. The others are removed.
//!
//! ## Idle entries
//!
//! An entry nobody subscribes to or waits on is idle. Idle entries stay cached for
//! later reads, but at most `idle_capacity` of them: past that, the least recently
//! used ones are removed.

use crate::client::QueryClient;
use crate::error::QueryError;
use crate::message::{QueryRequest, Response};
use crate::resource::{ListQuery, Resource};
use crate::snapshot::{CacheStats, ListSnapshot};
use crate::transport::{HttpMethod, Transport};
use crate::wire::{decode_list, decode_mutation, ListPage, MutationOutcome};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

struct CacheEntry<T: Resource> {
    page: Option<ListPage<T>>,
    stale: bool,
    in_flight: Option<u64>,
    waiters: Vec<Response<ListPage<T>>>,
    watchers: watch::Sender<ListSnapshot<T>>,
    last_used: u64,
}

impl<T: Resource> CacheEntry<T> {
    fn new() -> Self {
        let (watchers, _) = watch::channel(ListSnapshot::default());
        Self {
            page: None,
            stale: false,
            in_flight: None,
            waiters: Vec::new(),
            watchers,
            last_used: 0,
        }
    }

    fn is_fresh(&self) -> bool {
        self.page.is_some() && !self.stale
    }

    /// Someone is still interested in this listing.
    fn is_wanted(&self) -> bool {
        self.watchers.receiver_count() > 0 || !self.waiters.is_empty()
    }

    fn is_idle(&self) -> bool {
        !self.is_wanted() && self.in_flight.is_none()
    }
}

/// Idle listings kept per resource unless configured otherwise.
pub const DEFAULT_IDLE_CAPACITY: usize = 64;

fn encode<B: Serialize>(body: &B) -> Result<Value, QueryError> {
    serde_json::to_value(body).map_err(|e| QueryError::Decode(e.to_string()))
}

enum Completion<T: Resource> {
    Fetched {
        query: ListQuery,
        ticket: u64,
        result: Result<ListPage<T>, QueryError>,
    },
    Mutated {
        method: HttpMethod,
        result: Result<MutationOutcome<T>, QueryError>,
        respond_to: Response<MutationOutcome<T>>,
    },
}

/// The actor that caches listings of one resource type.
///
/// # Usage Pattern
///
/// 1.  **Create**: Call `QueryActor::new()` to get the `actor` (server) and `client` (interface).
/// 2.  **Wire**: Pass the transport into `actor.run(transport)`.
/// 3.  **Run**: Spawn the actor's run loop in a background task.
///
/// ```rust
/// use query_framework::mock::InMemoryBackend;
/// use query_framework::{ListQuery, QueryActor, Resource};
/// use serde::{Deserialize, Serialize};
/// use std::sync::Arc;
///
/// #[derive(Clone, Debug, Serialize, Deserialize)]
/// struct Unit { id: u32, name: String }
///
/// #[derive(Debug, Serialize)]
/// struct UnitCreate { name: String }
///
/// impl Resource for Unit {
///     type Id = u32;
///     type Create = UnitCreate;
///     type Update = UnitCreate;
///     const PATH: &'static str = "units";
///     fn id(&self) -> u32 { self.id }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let backend = Arc::new(InMemoryBackend::new());
///     backend.seed("units", ["Box", "Piece"].map(|n| serde_json::json!({ "name": n })));
///
///     // 1. Create
///     let (actor, client) = QueryActor::<Unit>::new(10);
///
///     // 2. Wire & Run
///     tokio::spawn(actor.run(backend));
///
///     // 3. Use
///     let page = client.list(ListQuery::first(10)).await.unwrap();
///     assert_eq!(page.rows.len(), 2);
/// }
/// ```
pub struct QueryActor<T: Resource> {
    receiver: mpsc::Receiver<QueryRequest<T>>,
    completions_tx: mpsc::UnboundedSender<Completion<T>>,
    completions_rx: mpsc::UnboundedReceiver<Completion<T>>,
    cache: HashMap<ListQuery, CacheEntry<T>>,
    idle_capacity: usize,
    clock: u64,
    next_ticket: u64,
    fetches: u64,
}

impl<T: Resource> QueryActor<T> {
    /// Creates a new `QueryActor` and its associated `QueryClient`.
    ///
    /// `buffer_size` is the capacity of the request channel. If the channel is full,
    /// calls on the client wait until there is space.
    pub fn new(buffer_size: usize) -> (Self, QueryClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let actor = Self {
            receiver,
            completions_tx,
            completions_rx,
            cache: HashMap::new(),
            idle_capacity: DEFAULT_IDLE_CAPACITY,
            clock: 0,
            next_ticket: 0,
            fetches: 0,
        };
        (actor, QueryClient::new(sender))
    }

    /// Caps the number of idle listings kept in the cache.
    pub fn with_idle_capacity(mut self, capacity: usize) -> Self {
        self.idle_capacity = capacity;
        self
    }

    /// Runs the event loop until every client has been dropped.
    ///
    /// Work still in flight at that point is abandoned. Its completions are never
    /// observed.
    pub async fn run(mut self, transport: Arc<dyn Transport>) {
        let resource = T::PATH;
        info!(resource, "Actor started");

        loop {
            tokio::select! {
                request = self.receiver.recv() => match request {
                    Some(request) => self.handle_request(request, &transport),
                    None => break,
                },
                Some(completion) = self.completions_rx.recv() => {
                    self.handle_completion(completion, &transport);
                }
            }
            self.evict_idle();
        }

        info!(resource, entries = self.cache.len(), fetches = self.fetches, "Shutdown");
    }

    fn handle_request(&mut self, request: QueryRequest<T>, transport: &Arc<dyn Transport>) {
        let resource = T::PATH;
        match request {
            QueryRequest::List { query, respond_to } => {
                let entry = self.touch(&query);
                if let (true, Some(page)) = (entry.is_fresh(), &entry.page) {
                    debug!(resource, ?query, "Cache hit");
                    let _ = respond_to.send(Ok(page.clone()));
                    return;
                }
                entry.waiters.push(respond_to);
                self.ensure_fetch(&query, transport);
            }
            QueryRequest::Subscribe { query, respond_to } => {
                let fresh = self.touch(&query).is_fresh();
                if !fresh {
                    self.ensure_fetch(&query, transport);
                }
                if let Some(entry) = self.cache.get(&query) {
                    let receiver = entry.watchers.subscribe();
                    debug!(
                        resource,
                        ?query,
                        fresh,
                        subscribers = entry.watchers.receiver_count(),
                        "Subscribed"
                    );
                    let _ = respond_to.send(Ok(receiver));
                }
            }
            QueryRequest::Create { params, respond_to } => {
                debug!(resource, ?params, "Create");
                match encode(&params) {
                    Ok(body) => self.spawn_mutation(
                        HttpMethod::Post,
                        T::PATH.to_string(),
                        Some(body),
                        respond_to,
                        transport,
                    ),
                    Err(e) => {
                        let _ = respond_to.send(Err(e));
                    }
                }
            }
            QueryRequest::Update {
                id,
                update,
                respond_to,
            } => {
                debug!(resource, %id, ?update, "Update");
                match encode(&update) {
                    Ok(body) => self.spawn_mutation(
                        HttpMethod::Put,
                        T::item_path(&id),
                        Some(body),
                        respond_to,
                        transport,
                    ),
                    Err(e) => {
                        let _ = respond_to.send(Err(e));
                    }
                }
            }
            QueryRequest::Delete { id, respond_to } => {
                debug!(resource, %id, "Delete");
                self.spawn_mutation(
                    HttpMethod::Delete,
                    T::item_path(&id),
                    None,
                    respond_to,
                    transport,
                );
            }
            QueryRequest::Invalidate { respond_to } => {
                self.invalidate_all(transport);
                let _ = respond_to.send(Ok(()));
            }
            QueryRequest::Stats { respond_to } => {
                let _ = respond_to.send(Ok(self.stats()));
            }
        }
    }

    /// Looks up the entry for `query`, creating it if needed, and marks it as used.
    fn touch(&mut self, query: &ListQuery) -> &mut CacheEntry<T> {
        self.clock += 1;
        let entry = self
            .cache
            .entry(query.clone())
            .or_insert_with(CacheEntry::new);
        entry.last_used = self.clock;
        entry
    }

    /// Starts a fetch for `query` unless one is already running.
    fn ensure_fetch(&mut self, query: &ListQuery, transport: &Arc<dyn Transport>) {
        let resource = T::PATH;
        let Some(entry) = self.cache.get_mut(query) else {
            return;
        };
        if let Some(ticket) = entry.in_flight {
            debug!(resource, ?query, ticket, "Joined in-flight fetch");
            return;
        }

        self.next_ticket += 1;
        self.fetches += 1;
        let ticket = self.next_ticket;
        entry.in_flight = Some(ticket);
        entry.watchers.send_modify(|snapshot| snapshot.is_fetching = true);
        debug!(resource, ?query, ticket, "Fetching");

        let transport = Arc::clone(transport);
        let completions = self.completions_tx.clone();
        let query = query.clone();
        tokio::spawn(async move {
            let result = match transport.get(T::PATH, &query.params()).await {
                Ok(body) => decode_list(body, &query),
                Err(e) => Err(e),
            };
            let _ = completions.send(Completion::Fetched {
                query,
                ticket,
                result,
            });
        });
    }

    fn spawn_mutation(
        &mut self,
        method: HttpMethod,
        path: String,
        body: Option<Value>,
        respond_to: Response<MutationOutcome<T>>,
        transport: &Arc<dyn Transport>,
    ) {
        let transport = Arc::clone(transport);
        let completions = self.completions_tx.clone();
        tokio::spawn(async move {
            let result = match transport.send(method, &path, body).await {
                Ok(response) => decode_mutation(response),
                Err(e) => Err(e),
            };
            let _ = completions.send(Completion::Mutated {
                method,
                result,
                respond_to,
            });
        });
    }

    fn handle_completion(&mut self, completion: Completion<T>, transport: &Arc<dyn Transport>) {
        let resource = T::PATH;
        match completion {
            Completion::Fetched {
                query,
                ticket,
                result,
            } => {
                let Some(entry) = self.cache.get_mut(&query) else {
                    return;
                };
                if entry.in_flight != Some(ticket) {
                    debug!(resource, ?query, ticket, "Dropped superseded fetch");
                    return;
                }
                entry.in_flight = None;
                let waiters = std::mem::take(&mut entry.waiters);

                match result {
                    Ok(page) => {
                        info!(
                            resource,
                            ?query,
                            rows = page.rows.len(),
                            total = page.pagination.total,
                            waiters = waiters.len(),
                            "Fetched"
                        );
                        entry.stale = false;
                        entry.watchers.send_modify(|snapshot| {
                            snapshot.data = Some(page.rows.clone());
                            snapshot.pagination = Some(page.pagination);
                            snapshot.is_fetching = false;
                            snapshot.error = None;
                        });
                        for waiter in waiters {
                            let _ = waiter.send(Ok(page.clone()));
                        }
                        entry.page = Some(page);
                    }
                    Err(e) => {
                        warn!(resource, ?query, error = %e, "Fetch failed");
                        entry.stale = true;
                        entry.watchers.send_modify(|snapshot| {
                            snapshot.is_fetching = false;
                            snapshot.error = Some(e.to_string());
                        });
                        for waiter in waiters {
                            let _ = waiter.send(Err(e.clone()));
                        }
                    }
                }
            }
            Completion::Mutated {
                method,
                result,
                respond_to,
            } => {
                match &result {
                    Ok(outcome) => {
                        info!(resource, %method, message = %outcome.message, "Mutation accepted");
                        self.invalidate_all(transport);
                    }
                    Err(e) => warn!(resource, %method, error = %e, "Mutation failed"),
                }
                let _ = respond_to.send(result);
            }
        }
    }

    /// Refetches the entries somebody is looking at and removes the rest.
    fn invalidate_all(&mut self, transport: &Arc<dyn Transport>) {
        let before = self.cache.len();
        self.cache.retain(|_, entry| entry.is_wanted());
        let mut refetch = Vec::new();
        for (query, entry) in self.cache.iter_mut() {
            entry.stale = true;
            entry.in_flight = None;
            refetch.push(query.clone());
        }
        info!(
            resource = T::PATH,
            removed = before - refetch.len(),
            refetching = refetch.len(),
            "Invalidated"
        );
        for query in refetch {
            self.ensure_fetch(&query, transport);
        }
    }

    /// Removes the least recently used idle entries past `idle_capacity`.
    fn evict_idle(&mut self) {
        let mut idle: Vec<(u64, ListQuery)> = self
            .cache
            .iter()
            .filter(|(_, entry)| entry.is_idle())
            .map(|(query, entry)| (entry.last_used, query.clone()))
            .collect();
        if idle.len() <= self.idle_capacity {
            return;
        }
        idle.sort_unstable_by_key(|(last_used, _)| *last_used);
        let surplus = idle.len() - self.idle_capacity;
        for (_, query) in idle.into_iter().take(surplus) {
            self.cache.remove(&query);
        }
        debug!(resource = T::PATH, evicted = surplus, "Evicted idle listings");
    }

    fn stats(&self) -> CacheStats {
        let entries = self.cache.values();
        CacheStats {
            entries: self.cache.len(),
            fresh: entries.clone().filter(|e| e.is_fresh()).count(),
            in_flight: entries.clone().filter(|e| e.in_flight.is_some()).count(),
            waiting: entries.clone().map(|e| e.waiters.len()).sum(),
            subscribers: entries.map(|e| e.watchers.receiver_count()).sum(),
            fetches: self.fetches,
        }
    }
}
