//! # Transport Seam
//!
//! The query actor never talks HTTP directly. It is handed an `Arc<dyn Transport>`
//! when it starts running, which keeps the cache logic testable against the in-memory
//! backends in [`crate::mock`] and lets the application pick [`RestTransport`](crate::http::RestTransport)
//! in production.

use crate::error::QueryError;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// Moves JSON bodies between the framework and the API.
///
/// Implementations return the decoded response body for any 2xx answer and map
/// everything else into a [`QueryError`]. Envelope handling (`status`, `message`)
/// is done by the caller.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// `GET {path}` with query string parameters.
    async fn get(&self, path: &str, params: &[(String, String)]) -> Result<Value, QueryError>;

    /// A request with an optional JSON body.
    async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, QueryError>;
}
