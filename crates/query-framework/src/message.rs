//! # Query Messages
//!
//! This module defines the message types exchanged between the `QueryClient` and
//! the `QueryActor`.

use crate::error::QueryError;
use crate::resource::{ListQuery, Resource};
use crate::snapshot::{CacheStats, ListSnapshot};
use crate::wire::{ListPage, MutationOutcome};
use tokio::sync::{oneshot, watch};

/// Type alias for the one-shot response channel used by actors.
pub type Response<T> = oneshot::Sender<Result<T, QueryError>>;

/// Internal message type sent to the actor.
///
/// Reads go through the cache (`List`, `Subscribe`). Writes (`Create`, `Update`,
/// `Delete`) go to the server and, when accepted, invalidate every cached listing of
/// the resource before the caller is answered.
#[derive(Debug)]
pub enum QueryRequest<T: Resource> {
    List {
        query: ListQuery,
        respond_to: Response<ListPage<T>>,
    },
    Subscribe {
        query: ListQuery,
        respond_to: Response<watch::Receiver<ListSnapshot<T>>>,
    },
    Create {
        params: T::Create,
        respond_to: Response<MutationOutcome<T>>,
    },
    Update {
        id: T::Id,
        update: T::Update,
        respond_to: Response<MutationOutcome<T>>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<MutationOutcome<T>>,
    },
    Invalidate {
        respond_to: Response<()>,
    },
    Stats {
        respond_to: Response<CacheStats>,
    },
}
