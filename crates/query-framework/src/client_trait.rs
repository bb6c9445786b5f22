//! # ResourceApi Trait
//!
//! Provides a common interface for resource-specific clients, adding default `list`,
//! `subscribe`, `delete` and `invalidate` methods built on top of a generic `QueryClient`.
use crate::{ListPage, ListQuery, ListSubscription, QueryClient, QueryError, Resource};
use async_trait::async_trait;

/// Trait for resource-specific clients to inherit the standard list operations.
///
/// # Example
///
/// ```rust
/// use query_framework::{QueryClient, QueryError, Resource, ResourceApi};
/// use serde::{Deserialize, Serialize};
///
/// // 1. Define the resource
/// #[derive(Clone, Debug, Serialize, Deserialize)]
/// struct Role { id: u32, name: String }
/// #[derive(Debug, Serialize)] struct RoleCreate { name: String }
///
/// impl Resource for Role {
///     type Id = u32;
///     type Create = RoleCreate;
///     type Update = RoleCreate;
///     const PATH: &'static str = "roles";
///     fn id(&self) -> u32 { self.id }
/// }
///
/// #[derive(Debug, thiserror::Error)]
/// #[error("role error: {0}")]
/// struct RoleError(String);
///
/// impl From<QueryError> for RoleError {
///     fn from(e: QueryError) -> Self { RoleError(e.to_string()) }
/// }
///
/// // 2. Define Client Wrapper
/// struct RoleClient { inner: QueryClient<Role> }
///
/// // 3. Implement ResourceApi
/// impl ResourceApi<Role> for RoleClient {
///     type Error = RoleError;
///
///     fn inner(&self) -> &QueryClient<Role> { &self.inner }
///
///     fn map_error(e: QueryError) -> Self::Error { RoleError::from(e) }
/// }
///
/// // 4. Usage: list(), subscribe(), delete() and invalidate() are provided.
/// async fn usage(client: RoleClient) {
///     let _ = client.list(query_framework::ListQuery::first(10)).await;
///     let _ = client.delete(1).await;
/// }
/// ```
#[async_trait]
pub trait ResourceApi<T: Resource>: Send + Sync {
    /// The resource-specific error type.
    type Error: From<QueryError> + Send + Sync;

    /// Access the inner generic QueryClient.
    fn inner(&self) -> &QueryClient<T>;

    /// Map framework errors to the specific resource error type.
    fn map_error(e: QueryError) -> Self::Error;

    /// Fetch one page of the listing.
    #[tracing::instrument(skip(self), fields(resource = T::PATH))]
    async fn list(&self, query: ListQuery) -> Result<ListPage<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().list(query).await.map_err(Self::map_error)
    }

    /// Observe one page of the listing.
    #[tracing::instrument(skip(self), fields(resource = T::PATH))]
    async fn subscribe(&self, query: ListQuery) -> Result<ListSubscription<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().subscribe(query).await.map_err(Self::map_error)
    }

    /// Delete a record by ID.
    #[tracing::instrument(skip(self), fields(resource = T::PATH))]
    async fn delete(&self, id: T::Id) -> Result<(), Self::Error> {
        tracing::debug!("Sending request");
        self.inner()
            .delete(id)
            .await
            .map(|_| ())
            .map_err(Self::map_error)
    }

    /// Mark every cached listing of the resource stale.
    #[tracing::instrument(skip(self), fields(resource = T::PATH))]
    async fn invalidate(&self) -> Result<(), Self::Error> {
        self.inner().invalidate().await.map_err(Self::map_error)
    }
}
