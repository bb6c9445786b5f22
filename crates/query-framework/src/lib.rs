//! # Query Framework
//!
//! Building blocks for paginated, searchable list screens backed by a REST API:
//! a headless data table, a per-resource list cache running as a Tokio actor, a
//! transport seam with a `reqwest` implementation, and a page container that ties
//! them together behind a permission check.
//!
//! ## Architecture Overview
//!
//! The framework separates concerns into four layers:
//!
//! 1. **Resource Layer** ([`Resource`]) - the record type, its payloads and its path
//! 2. **Runtime Layer** ([`QueryActor`]) - caching, deduplication, invalidation
//! 3. **Interface Layer** ([`QueryClient`], [`ResourceApi`]) - type-safe communication
//! 4. **Screen Layer** ([`PageContainer`], [`DataTable`]) - what the user looks at
//!
//! ## The Listing Contract
//!
//! Every collection is served the same way:
//!
//! ```text
//! GET /<resource>?page=<1-based>&limit=<n>&search=<text>
//!   -> { status, message, data: [..], pagination: { total, page, limit, totalPage } }
//! POST /<resource> | PUT /<resource>/<id> | DELETE /<resource>/<id>
//!   -> { status, message, data }
//! ```
//!
//! `status: false` on a 2xx response is a business rejection ([`QueryError::Rejected`]).
//!
//! ## Query Semantics
//!
//! - Each `(resource, page, limit, search)` is cached independently.
//! - Concurrent requests for the same key share one network call.
//! - Fresh entries are served without a network call. Entries stay fresh until a
//!   mutation or [`QueryClient::invalidate`] marks them stale.
//! - A successful mutation invalidates every listing of its resource *before* the
//!   mutation's caller is answered, and subscribed listings refetch immediately.
//! - A failed refetch keeps the previous rows and reports the error separately.
//!
//! ## Late Binding
//!
//! The transport is injected when the actor starts running, not when it is created:
//!
//! ```rust
//! use query_framework::mock::InMemoryBackend;
//! use query_framework::{AuthContext, Column, PageContainer, QueryActor, Resource};
//! use serde::{Deserialize, Serialize};
//! use std::sync::Arc;
//!
//! #[derive(Clone, Debug, Serialize, Deserialize)]
//! struct Department { id: u32, name: String }
//!
//! #[derive(Debug, Serialize)]
//! struct DepartmentCreate { name: String }
//!
//! impl Resource for Department {
//!     type Id = u32;
//!     type Create = DepartmentCreate;
//!     type Update = DepartmentCreate;
//!     const PATH: &'static str = "departments";
//!     fn id(&self) -> u32 { self.id }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = Arc::new(InMemoryBackend::new());
//!     backend.seed("departments", ["Finance", "Sales"].map(|n| serde_json::json!({ "name": n })));
//!
//!     // 1. Create the actor (no transport yet)
//!     let (actor, client) = QueryActor::<Department>::new(10);
//!
//!     // 2. Wire the transport when starting it
//!     tokio::spawn(actor.run(backend));
//!
//!     // 3. Mount a screen
//!     let auth = AuthContext::full_access("admin", &["departments"]);
//!     let columns = vec![Column::new("name", "Name")];
//!     let mut page = PageContainer::mount(client, auth, columns, 10).await.unwrap();
//!     page.wait_until_settled().await.unwrap();
//!
//!     assert_eq!(page.render().rows, vec![vec!["Finance"], vec!["Sales"]]);
//! }
//! ```
//!
//! ## Testing
//!
//! See the [`mock`] module: [`mock::MockTransport`] for scripted responses,
//! [`mock::InMemoryBackend`] for a stateful fake server, and
//! [`mock::create_mock_client`] for testing typed clients without an actor.

pub mod actor;
pub mod auth;
pub mod client;
pub mod client_trait;
pub mod error;
pub mod http;
pub mod message;
pub mod mock;
pub mod page;
pub mod pagination;
pub mod resource;
pub mod snapshot;
pub mod subscription;
pub mod table;
pub mod telemetry;
pub mod transport;
pub mod wire;

// Re-export core types for convenience
pub use actor::{QueryActor, DEFAULT_IDLE_CAPACITY};
pub use auth::{AuthContext, Permission, PermissionAction, UnknownAction};
pub use client::QueryClient;
pub use client_trait::ResourceApi;
pub use error::{QueryError, TableError};
pub use http::RestTransport;
pub use message::{QueryRequest, Response};
pub use page::{Notice, NoticeLevel, PageContainer};
pub use pagination::{PaginationMeta, PaginationState};
pub use resource::{ListQuery, Resource};
pub use snapshot::{CacheStats, ListSnapshot};
pub use subscription::ListSubscription;
pub use table::{Column, DataTable, Header, RenderedTable, RowToggles, TableEvent};
pub use telemetry::setup_tracing;
pub use transport::{HttpMethod, Transport};
pub use wire::{ListPage, MutationOutcome};
