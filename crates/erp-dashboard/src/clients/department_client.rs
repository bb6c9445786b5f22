//! # Department Client
//!
//! Provides a high-level API for interacting with the `Department` query actor.
//! It wraps a `QueryClient<Department>` and exposes domain-specific methods.

use crate::model::{Department, DepartmentCreate, DepartmentId, DepartmentUpdate};
use async_trait::async_trait;
use query_framework::{ListQuery, QueryClient, QueryError, ResourceApi};
use thiserror::Error;
use tracing::{debug, instrument};

/// Errors that can occur during department operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DepartmentError {
    /// The API does not know the department.
    #[error("Department not found")]
    NotFound,

    /// The API refused the request, with its own explanation.
    #[error("{0}")]
    Rejected(String),

    #[error("Department name must not be empty")]
    EmptyName,

    /// The API accepted the request but sent no department back.
    #[error("Server returned no department")]
    MissingRecord,

    #[error("{0}")]
    Forbidden(String),

    /// The API could not be reached or answered with something unusable.
    #[error("Department service unavailable: {0}")]
    Unavailable(String),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<QueryError> for DepartmentError {
    fn from(e: QueryError) -> Self {
        match e {
            QueryError::Http { status: 404 } => Self::NotFound,
            QueryError::Rejected(message) => Self::Rejected(message),
            QueryError::Forbidden { .. } => Self::Forbidden(e.to_string()),
            QueryError::Transport(_) | QueryError::Http { .. } | QueryError::Decode(_) => {
                Self::Unavailable(e.to_string())
            }
            QueryError::ActorClosed | QueryError::ActorDropped | QueryError::Table(_) => {
                Self::ActorCommunicationError(e.to_string())
            }
        }
    }
}

/// Client for interacting with the Department actor.
#[derive(Clone)]
pub struct DepartmentClient {
    inner: QueryClient<Department>,
}

impl DepartmentClient {
    pub fn new(inner: QueryClient<Department>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ResourceApi<Department> for DepartmentClient {
    type Error = DepartmentError;

    fn inner(&self) -> &QueryClient<Department> {
        &self.inner
    }

    fn map_error(e: QueryError) -> Self::Error {
        DepartmentError::from(e)
    }
}

impl DepartmentClient {
    #[instrument(skip(self))]
    pub async fn create_department(
        &self,
        params: DepartmentCreate,
    ) -> Result<Department, DepartmentError> {
        if params.name.trim().is_empty() {
            return Err(DepartmentError::EmptyName);
        }
        debug!("Sending request");
        self.inner
            .create(params)
            .await?
            .data
            .ok_or(DepartmentError::MissingRecord)
    }

    #[instrument(skip(self))]
    pub async fn update_department(
        &self,
        id: DepartmentId,
        update: DepartmentUpdate,
    ) -> Result<Department, DepartmentError> {
        debug!("Sending request");
        self.inner
            .update(id, update)
            .await?
            .data
            .ok_or(DepartmentError::MissingRecord)
    }

    /// Activates or deactivates a department (the row's status switch).
    #[instrument(skip(self))]
    pub async fn set_active(
        &self,
        id: DepartmentId,
        active: bool,
    ) -> Result<Department, DepartmentError> {
        let update = DepartmentUpdate {
            is_active: Some(active),
            ..DepartmentUpdate::default()
        };
        self.update_department(id, update).await
    }

    /// Departments whose fields match `term`, first page only.
    #[instrument(skip(self))]
    pub async fn search(&self, term: &str, limit: u32) -> Result<Vec<Department>, DepartmentError> {
        let page = self.list(ListQuery::new(1, limit, term)).await?;
        Ok(page.rows)
    }
}
