//! # Framework Errors
//!
//! This module defines the common error types used throughout the query framework.
//! Every failure a list screen can observe is one of these variants, so page
//! containers can turn them into notifications without matching on transport details.

use crate::auth::PermissionAction;

/// Errors that can occur while listing or mutating a resource.
///
/// The type is `Clone` because a single failed fetch is reported to every caller
/// that was waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped response channel")]
    ActorDropped,
    /// The request never produced an HTTP response (connection refused, timeout, ...).
    #[error("Request failed: {0}")]
    Transport(String),
    /// The server answered with a non-2xx status.
    #[error("API returned status: {status}")]
    Http { status: u16 },
    /// The body could not be encoded or decoded.
    #[error("Failed to decode response: {0}")]
    Decode(String),
    /// The server answered `status: false` on an otherwise successful response.
    #[error("{0}")]
    Rejected(String),
    /// The local capability set does not allow the action. No request was sent.
    #[error("Permission denied: cannot {action} {resource}")]
    Forbidden {
        resource: String,
        action: PermissionAction,
    },
    #[error(transparent)]
    Table(#[from] TableError),
}

impl QueryError {
    /// Returns true when the error came from the server or the network rather than
    /// from a local guard.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Http { .. } | Self::Decode(_) | Self::Rejected(_)
        )
    }
}

/// Errors raised while configuring a [`DataTable`](crate::table::DataTable).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    #[error("A table needs at least one column")]
    NoColumns,
}
