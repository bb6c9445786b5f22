use crate::model::{Unit, UnitCreate, UnitId, UnitUpdate};
use async_trait::async_trait;
use query_framework::{QueryClient, QueryError, ResourceApi};
use thiserror::Error;
use tracing::{debug, instrument};

/// Errors that can occur during unit operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum UnitError {
    #[error("Unit not found")]
    NotFound,

    /// Typically a unit that products still refer to.
    #[error("{0}")]
    Rejected(String),

    #[error("Server returned no unit")]
    MissingRecord,

    #[error("{0}")]
    Forbidden(String),

    #[error("Unit service unavailable: {0}")]
    Unavailable(String),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<QueryError> for UnitError {
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

/// Client for interacting with the Unit actor.
#[derive(Clone)]
pub struct UnitClient {
    inner: QueryClient<Unit>,
}

impl UnitClient {
    pub fn new(inner: QueryClient<Unit>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ResourceApi<Unit> for UnitClient {
    type Error = UnitError;

    fn inner(&self) -> &QueryClient<Unit> {
        &self.inner
    }

    fn map_error(e: QueryError) -> Self::Error {
        UnitError::from(e)
    }
}

impl UnitClient {
    #[instrument(skip(self))]
    pub async fn create_unit(&self, params: UnitCreate) -> Result<Unit, UnitError> {
        debug!("Sending request");
        self.inner
            .create(params)
            .await?
            .data
            .ok_or(UnitError::MissingRecord)
    }

    #[instrument(skip(self))]
    pub async fn rename_unit(
        &self,
        id: UnitId,
        name: String,
        short_name: String,
    ) -> Result<Unit, UnitError> {
        debug!("Sending request");
        let update = UnitUpdate {
            name: Some(name),
            short_name: Some(short_name),
            ..UnitUpdate::default()
        };
        self.inner
            .update(id, update)
            .await?
            .data
            .ok_or(UnitError::MissingRecord)
    }
}
