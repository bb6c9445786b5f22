//! # Observability & Tracing
//!
//! The [`setup_tracing`] function initializes structured logging for the whole
//! dashboard: query actors, transports and page containers all log through `tracing`.
//!
//! ## Configuration
//!
//! Log lines use the compact format and hide the module prefix (`with_target(false)`).
//! Every event carries a `resource` field instead, so filtering by collection is a
//! matter of searching for `resource="units"`.
//!
//! ## What Gets Traced
//!
//! - **Actor Lifecycle**: startup and shutdown, with cache size and fetch count
//! - **Cache Activity**: hits, joined in-flight fetches, fetch results, invalidations
//! - **Mutations**: accepted and failed creates, updates and deletes
//! - **Page Containers**: mounts, listing switches, permission blocks
//!
//! ## Usage Examples
//!
//! ```bash
//! # Fetches, mutations and invalidations
//! RUST_LOG=info cargo run
//!
//! # Cache hits, request payloads and query parameters
//! RUST_LOG=debug cargo run
//!
//! # Only the framework
//! RUST_LOG=query_framework=debug cargo run
//! ```
//!
//! **With `RUST_LOG=info`**:
//!
//! ```text
//! INFO Actor started resource="departments"
//! INFO Page mounted resource="departments" limit=10
//! INFO Fetched resource="departments" query=ListQuery { page: 1, limit: 10, search: "" } rows=10 total=23 waiters=0
//! INFO Mutation accepted resource="departments" method=DELETE message=Deleted successfully
//! INFO Invalidated resource="departments" entries=2 refetching=1
//! ```

/// Installs the global subscriber. Filtering follows `RUST_LOG`.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
