use crate::model::{Role, RoleCreate, RoleId, RoleUpdate};
use async_trait::async_trait;
use query_framework::{AuthContext, ListQuery, QueryClient, QueryError, ResourceApi};
use thiserror::Error;
use tracing::{debug, info, instrument};

/// Errors that can occur during role operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RoleError {
    #[error("Role not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Rejected(String),

    #[error("Server returned no role")]
    MissingRecord,

    #[error("{0}")]
    Forbidden(String),

    #[error("Role service unavailable: {0}")]
    Unavailable(String),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<QueryError> for RoleError {
    fn from(e: QueryError) -> Self {
        match e {
            QueryError::Http { status: 404 } => Self::NotFound(e.to_string()),
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

/// Client for interacting with the Role actor.
#[derive(Clone)]
pub struct RoleClient {
    inner: QueryClient<Role>,
}

impl RoleClient {
    pub fn new(inner: QueryClient<Role>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ResourceApi<Role> for RoleClient {
    type Error = RoleError;

    fn inner(&self) -> &QueryClient<Role> {
        &self.inner
    }

    fn map_error(e: QueryError) -> Self::Error {
        RoleError::from(e)
    }
}

impl RoleClient {
    #[instrument(skip(self))]
    pub async fn create_role(&self, params: RoleCreate) -> Result<Role, RoleError> {
        debug!("Sending request");
        self.inner
            .create(params)
            .await?
            .data
            .ok_or(RoleError::MissingRecord)
    }

    /// Replaces the grants of a role.
    #[instrument(skip(self))]
    pub async fn set_permissions(
        &self,
        id: RoleId,
        permissions: Vec<String>,
    ) -> Result<Role, RoleError> {
        debug!("Sending request");
        let update = RoleUpdate {
            permissions: Some(permissions),
            ..RoleUpdate::default()
        };
        self.inner
            .update(id, update)
            .await?
            .data
            .ok_or(RoleError::MissingRecord)
    }

    /// Looks a role up by exact name and builds the capability set for `user`.
    #[instrument(skip(self))]
    pub async fn sign_in_as(&self, user: &str, role_name: &str) -> Result<AuthContext, RoleError> {
        let page = self.list(ListQuery::new(1, 50, role_name)).await?;
        let role = page
            .rows
            .into_iter()
            .find(|role| role.name.eq_ignore_ascii_case(role_name))
            .ok_or_else(|| RoleError::NotFound(role_name.to_string()))?;
        info!(user, role = %role.name, grants = role.permissions.len(), "Signed in");
        Ok(role.auth_context(user))
    }
}
