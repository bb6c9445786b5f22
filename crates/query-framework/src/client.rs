//! # Generic Client
//!
//! This module defines the generic client for communicating with query actors.

use crate::error::QueryError;
use crate::message::QueryRequest;
use crate::resource::{ListQuery, Resource};
use crate::snapshot::CacheStats;
use crate::subscription::ListSubscription;
use crate::wire::{ListPage, MutationOutcome};
use tokio::sync::{mpsc, oneshot};

/// A type-safe client for interacting with a `QueryActor`.
///
/// The client holds only a sender, so cloning is inexpensive. Every method resolves to
/// `Result<_, QueryError>`.
#[derive(Clone)]
pub struct QueryClient<T: Resource> {
    sender: mpsc::Sender<QueryRequest<T>>,
}

impl<T: Resource> QueryClient<T> {
    pub fn new(sender: mpsc::Sender<QueryRequest<T>>) -> Self {
        Self { sender }
    }

    /// One page of the listing, served from the cache when it is fresh.
    pub async fn list(&self, query: ListQuery) -> Result<ListPage<T>, QueryError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(QueryRequest::List { query, respond_to })
            .await
            .map_err(|_| QueryError::ActorClosed)?;
        response.await.map_err(|_| QueryError::ActorDropped)?
    }

    /// Starts observing a listing. Dropping the subscription stops observing it.
    pub async fn subscribe(&self, query: ListQuery) -> Result<ListSubscription<T>, QueryError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(QueryRequest::Subscribe {
                query: query.clone(),
                respond_to,
            })
            .await
            .map_err(|_| QueryError::ActorClosed)?;
        let receiver = response.await.map_err(|_| QueryError::ActorDropped)??;
        Ok(ListSubscription::new(query, receiver))
    }

    pub async fn create(&self, params: T::Create) -> Result<MutationOutcome<T>, QueryError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(QueryRequest::Create { params, respond_to })
            .await
            .map_err(|_| QueryError::ActorClosed)?;
        response.await.map_err(|_| QueryError::ActorDropped)?
    }

    pub async fn update(
        &self,
        id: T::Id,
        update: T::Update,
    ) -> Result<MutationOutcome<T>, QueryError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(QueryRequest::Update {
                id,
                update,
                respond_to,
            })
            .await
            .map_err(|_| QueryError::ActorClosed)?;
        response.await.map_err(|_| QueryError::ActorDropped)?
    }

    pub async fn delete(&self, id: T::Id) -> Result<MutationOutcome<T>, QueryError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(QueryRequest::Delete { id, respond_to })
            .await
            .map_err(|_| QueryError::ActorClosed)?;
        response.await.map_err(|_| QueryError::ActorDropped)?
    }

    /// Marks every cached listing stale. Subscribed listings refetch right away.
    pub async fn invalidate(&self) -> Result<(), QueryError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(QueryRequest::Invalidate { respond_to })
            .await
            .map_err(|_| QueryError::ActorClosed)?;
        response.await.map_err(|_| QueryError::ActorDropped)?
    }

    pub async fn stats(&self) -> Result<CacheStats, QueryError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(QueryRequest::Stats { respond_to })
            .await
            .map_err(|_| QueryError::ActorClosed)?;
        response.await.map_err(|_| QueryError::ActorDropped)?
    }
}
