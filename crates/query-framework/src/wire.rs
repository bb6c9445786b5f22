//! # Wire Envelopes
//!
//! Every endpoint answers with `{ status, message, data }`; listings add a
//! `pagination` object. A `status` of `false` on a 2xx response is a business
//! rejection and is reported as [`QueryError::Rejected`] with the server's message.

use crate::error::QueryError;
use crate::pagination::{total_pages, PaginationMeta};
use crate::resource::ListQuery;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Envelope of `GET /<resource>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListEnvelope<T> {
    pub status: bool,
    #[serde(default)]
    pub message: String,
    pub data: Option<Vec<T>>,
    #[serde(default)]
    pub pagination: Option<PaginationMeta>,
}

/// Envelope of `POST`, `PUT` and `DELETE` requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationEnvelope<T> {
    pub status: bool,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

/// Read before the typed body so that a rejection is reported even when `data`
/// does not match the record shape.
#[derive(Deserialize)]
struct StatusHeader {
    status: bool,
    #[serde(default)]
    message: String,
}

impl StatusHeader {
    fn check(value: &Value) -> Result<(), QueryError> {
        let header =
            StatusHeader::deserialize(value).map_err(|e| QueryError::Decode(e.to_string()))?;
        if header.status {
            return Ok(());
        }
        let message = if header.message.is_empty() {
            "Request was rejected".to_string()
        } else {
            header.message
        };
        Err(QueryError::Rejected(message))
    }
}

/// A decoded listing page.
#[derive(Debug, Clone, PartialEq)]
pub struct ListPage<T> {
    pub rows: Vec<T>,
    pub pagination: PaginationMeta,
}

/// The outcome of an accepted mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationOutcome<T> {
    pub message: String,
    pub data: Option<T>,
}

/// Decodes a listing body for `query`.
///
/// Missing pagination fields are filled from the query. A page with more rows than
/// its `limit` is truncated.
pub fn decode_list<T>(value: Value, query: &ListQuery) -> Result<ListPage<T>, QueryError>
where
    T: DeserializeOwned,
{
    StatusHeader::check(&value)?;
    let envelope: ListEnvelope<T> =
        serde_json::from_value(value).map_err(|e| QueryError::Decode(e.to_string()))?;

    let mut rows = envelope.data.unwrap_or_default();
    let mut meta = envelope.pagination.unwrap_or(PaginationMeta {
        total: rows.len() as u64,
        ..PaginationMeta::default()
    });
    if meta.page == 0 {
        meta.page = query.page();
    }
    if meta.limit == 0 {
        meta.limit = query.limit();
    }
    if meta.total_page == 0 {
        let pages = total_pages(meta.total, meta.limit as usize);
        meta.total_page = u32::try_from(pages).unwrap_or(u32::MAX);
    }

    let limit = meta.limit as usize;
    if rows.len() > limit {
        warn!(
            received = rows.len(),
            limit, "Listing returned more rows than requested, truncating"
        );
        rows.truncate(limit);
    }

    Ok(ListPage {
        rows,
        pagination: meta,
    })
}

/// Decodes a mutation body.
pub fn decode_mutation<T>(value: Value) -> Result<MutationOutcome<T>, QueryError>
where
    T: DeserializeOwned,
{
    StatusHeader::check(&value)?;
    let envelope: MutationEnvelope<T> =
        serde_json::from_value(value).map_err(|e| QueryError::Decode(e.to_string()))?;
    Ok(MutationOutcome {
        message: envelope.message,
        data: envelope.data,
    })
}
