//! # Resource Definition
//!
//! This module defines the `Resource` trait, the contract a listable REST collection
//! must satisfy to be managed by a [`QueryActor`](crate::actor::QueryActor), and the
//! `ListQuery` that identifies one page of it.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// A record type served by a paginated REST collection.
///
/// The framework derives every endpoint from [`Resource::PATH`]:
///
/// | Operation | Request |
/// |-----------|---------|
/// | list      | `GET /{PATH}?page=&limit=&search=` |
/// | create    | `POST /{PATH}` |
/// | update    | `PUT /{PATH}/{id}` |
/// | delete    | `DELETE /{PATH}/{id}` |
///
/// # Example
///
/// ```rust
/// use query_framework::Resource;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Debug, Serialize, Deserialize)]
/// struct Unit { id: u32, name: String }
///
/// #[derive(Debug, Serialize)]
/// struct UnitCreate { name: String }
///
/// impl Resource for Unit {
///     type Id = u32;
///     type Create = UnitCreate;
///     type Update = UnitCreate;
///     const PATH: &'static str = "units";
///
///     fn id(&self) -> u32 { self.id }
/// }
/// ```
pub trait Resource: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// The unique identifier type, rendered into item URLs through `Display`.
    type Id: Clone + Debug + Display + Eq + Hash + Send + Sync + 'static;

    /// Body of a create request.
    type Create: Serialize + Debug + Send + Sync + 'static;

    /// Body of an update request.
    type Update: Serialize + Debug + Send + Sync + 'static;

    /// Collection path relative to the API base URL, without slashes.
    const PATH: &'static str;

    fn id(&self) -> Self::Id;

    /// Path of a single record.
    fn item_path(id: &Self::Id) -> String {
        format!("{}/{}", Self::PATH, id)
    }
}

/// One page of a listing, used as the cache key of a resource actor.
///
/// `page` is one-based. Construction normalizes the values so that two queries that
/// would hit the same URL compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListQuery {
    page: u32,
    limit: u32,
    search: String,
}

impl ListQuery {
    pub fn new(page: u32, limit: u32, search: impl Into<String>) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
            search: search.into().trim().to_string(),
        }
    }

    /// First page with no search term.
    pub fn first(limit: u32) -> Self {
        Self::new(1, limit, "")
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// A new search always starts again from the first page.
    pub fn with_search(&self, search: impl Into<String>) -> Self {
        Self::new(1, self.limit, search)
    }

    /// Query string parameters. `search` is sent even when empty.
    pub fn params(&self) -> Vec<(String, String)> {
        vec![
            ("page".to_string(), self.page.to_string()),
            ("limit".to_string(), self.limit.to_string()),
            ("search".to_string(), self.search.clone()),
        ]
    }
}
