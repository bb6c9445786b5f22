//! # List Subscriptions
//!
//! A mounted list screen holds one `ListSubscription`. Dropping it is the unmount:
//! the actor stops counting it as a reason to refetch.

use crate::error::QueryError;
use crate::resource::{ListQuery, Resource};
use crate::snapshot::ListSnapshot;
use tokio::sync::watch;

#[derive(Debug)]
pub struct ListSubscription<T: Resource> {
    query: ListQuery,
    receiver: watch::Receiver<ListSnapshot<T>>,
}

impl<T: Resource> ListSubscription<T> {
    pub(crate) fn new(query: ListQuery, receiver: watch::Receiver<ListSnapshot<T>>) -> Self {
        Self { query, receiver }
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    /// The current snapshot, marking it as seen.
    pub fn latest(&mut self) -> ListSnapshot<T> {
        self.receiver.borrow_and_update().clone()
    }

    /// Waits for the next snapshot.
    pub async fn changed(&mut self) -> Result<ListSnapshot<T>, QueryError> {
        self.receiver
            .changed()
            .await
            .map_err(|_| QueryError::ActorDropped)?;
        Ok(self.latest())
    }

    /// Waits until no fetch is running and the listing has either data or an error.
    pub async fn settled(&mut self) -> Result<ListSnapshot<T>, QueryError> {
        let snapshot = self
            .receiver
            .wait_for(ListSnapshot::is_settled)
            .await
            .map_err(|_| QueryError::ActorDropped)?;
        Ok(snapshot.clone())
    }
}
