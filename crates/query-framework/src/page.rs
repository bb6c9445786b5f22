//! # Page Container
//!
//! One list screen: it owns the page number and search term, feeds the listing for
//! that `(page, limit, search)` into a controlled [`DataTable`], and runs mutations
//! behind the permission guard, turning their outcome into notices.
//!
//! The container never reads a session from global state. The [`AuthContext`] it is
//! mounted with is the only source of permissions.

use crate::auth::{AuthContext, PermissionAction};
use crate::client::QueryClient;
use crate::error::QueryError;
use crate::pagination::{to_api_page, to_page_index, PaginationState};
use crate::resource::{ListQuery, Resource};
use crate::snapshot::ListSnapshot;
use crate::subscription::ListSubscription;
use crate::table::{Column, DataTable, RenderedTable, RowToggles, TableEvent};
use crate::wire::MutationOutcome;
use std::collections::VecDeque;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A transient notification (toast).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

pub struct PageContainer<T: Resource> {
    client: QueryClient<T>,
    auth: AuthContext,
    limit: u32,
    page: u32,
    search: String,
    table: DataTable<T>,
    subscription: ListSubscription<T>,
    toggles: RowToggles<T::Id>,
    notices: VecDeque<Notice>,
    last_error: Option<String>,
}

impl<T: Resource> PageContainer<T> {
    /// Mounts the screen on the first page with an empty search.
    ///
    /// Fails with [`QueryError::Forbidden`] when the user may not view the resource.
    pub async fn mount(
        client: QueryClient<T>,
        auth: AuthContext,
        columns: Vec<Column<T>>,
        limit: u32,
    ) -> Result<Self, QueryError> {
        auth.require(T::PATH, PermissionAction::View)?;
        let limit = limit.max(1);
        let table =
            DataTable::new(columns)?.controlled(PaginationState::new(0, limit as usize, 0));
        let subscription = client.subscribe(ListQuery::first(limit)).await?;
        info!(resource = T::PATH, limit, "Page mounted");

        let mut page = Self {
            client,
            auth,
            limit,
            page: 1,
            search: String::new(),
            table,
            subscription,
            toggles: RowToggles::new(),
            notices: VecDeque::new(),
            last_error: None,
        };
        page.sync();
        Ok(page)
    }

    /// The listing currently on screen.
    pub fn query(&self) -> ListQuery {
        ListQuery::new(self.page, self.limit, self.search.clone())
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn table(&self) -> &DataTable<T> {
        &self.table
    }

    pub fn auth(&self) -> &AuthContext {
        &self.auth
    }

    pub fn can(&self, action: PermissionAction) -> bool {
        self.auth.allows(T::PATH, action)
    }

    pub fn render(&self) -> RenderedTable {
        self.table.render()
    }

    /// Reacts to a table callback.
    ///
    /// `PageChange(i)` moves to page `i + 1`; `Search(term)` stores the term and goes
    /// back to page 1. The rows already shown stay until the new listing arrives.
    pub async fn handle(&mut self, event: TableEvent) -> Result<(), QueryError> {
        self.apply_event(event);
        self.resubscribe().await
    }

    fn apply_event(&mut self, event: TableEvent) {
        match event {
            TableEvent::PageChange(index) => {
                self.page = to_api_page(index);
            }
            TableEvent::Search(term) => {
                self.search = term.trim().to_string();
                self.page = 1;
            }
        }
        let state = self.table.pagination();
        self.table.set_pagination(PaginationState::new(
            to_page_index(self.page),
            state.page_size(),
            state.total_count(),
        ));
    }

    pub async fn next_page(&mut self) -> Result<(), QueryError> {
        match self.table.next_page() {
            Some(event) => self.handle(event).await,
            None => Ok(()),
        }
    }

    pub async fn previous_page(&mut self) -> Result<(), QueryError> {
        match self.table.previous_page() {
            Some(event) => self.handle(event).await,
            None => Ok(()),
        }
    }

    pub async fn go_to_page(&mut self, index: usize) -> Result<(), QueryError> {
        match self.table.go_to_page(index) {
            Some(event) => self.handle(event).await,
            None => Ok(()),
        }
    }

    pub async fn search_for(&mut self, term: &str) -> Result<(), QueryError> {
        let event = self.table.search(term);
        self.handle(event).await
    }

    async fn resubscribe(&mut self) -> Result<(), QueryError> {
        loop {
            let query = self.query();
            if self.subscription.query() == &query {
                return Ok(());
            }
            debug!(resource = T::PATH, ?query, "Switching listing");
            self.subscription = self.client.subscribe(query).await?;
            // Errors are reported once per listing, not once per screen.
            self.last_error = None;
            match self.sync() {
                Some(event) => self.apply_event(event),
                None => return Ok(()),
            }
        }
    }

    /// Applies the latest snapshot to the table.
    ///
    /// Returns a page change when the server total shrank below the current page.
    pub fn sync(&mut self) -> Option<TableEvent> {
        let snapshot = self.subscription.latest();
        self.apply(snapshot)
    }

    fn apply(&mut self, snapshot: ListSnapshot<T>) -> Option<TableEvent> {
        let mut clamp = None;
        if let Some(meta) = snapshot.pagination {
            let requested = to_page_index(self.page);
            let state = PaginationState::new(requested, self.limit as usize, meta.total);
            if state.page_index() != requested && !snapshot.is_fetching {
                clamp = Some(TableEvent::PageChange(state.page_index()));
            }
            self.table.set_pagination(state);
        }

        if let Some(rows) = &snapshot.data {
            self.toggles.retain(|id| rows.iter().any(|row| &row.id() == id));
        }
        self.table.set_data(snapshot.data, snapshot.is_fetching);

        match snapshot.error {
            Some(error) if self.last_error.as_ref() != Some(&error) => {
                warn!(resource = T::PATH, %error, "Listing failed");
                self.notify(NoticeLevel::Error, error.clone());
                self.last_error = Some(error);
            }
            Some(_) => {}
            None => {
                if !snapshot.is_fetching {
                    self.last_error = None;
                }
            }
        }
        clamp
    }

    /// Waits for the listing to change and applies it.
    pub async fn wait_for_update(&mut self) -> Result<(), QueryError> {
        self.subscription.changed().await?;
        if let Some(event) = self.sync() {
            self.handle(event).await?;
        }
        Ok(())
    }

    /// Waits until the listing on screen has finished loading.
    pub async fn wait_until_settled(&mut self) -> Result<(), QueryError> {
        loop {
            self.subscription.settled().await?;
            match self.sync() {
                Some(event) => self.handle(event).await?,
                None => return Ok(()),
            }
        }
    }

    pub async fn create(&mut self, params: T::Create) -> Result<Option<T>, QueryError> {
        self.guard(PermissionAction::Create)?;
        let result = self.client.create(params).await;
        self.report(result, "created").map(|outcome| outcome.data)
    }

    pub async fn update(&mut self, id: T::Id, update: T::Update) -> Result<Option<T>, QueryError> {
        self.guard(PermissionAction::Update)?;
        let result = self.client.update(id, update).await;
        self.report(result, "updated").map(|outcome| outcome.data)
    }

    pub async fn delete(&mut self, id: T::Id) -> Result<(), QueryError> {
        self.guard(PermissionAction::Delete)?;
        let result = self.client.delete(id.clone()).await;
        if result.is_ok() {
            self.toggles.retain(|key| key != &id);
        }
        self.report(result, "deleted").map(|_| ())
    }

    /// Flips a row's toggle (expanded details, status switch) and returns the new value.
    pub fn toggle_row(&mut self, id: T::Id) -> bool {
        self.toggles.toggle(id)
    }

    pub fn is_row_on(&self, id: &T::Id) -> bool {
        self.toggles.is_on(id)
    }

    /// Drains the pending notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    fn guard(&mut self, action: PermissionAction) -> Result<(), QueryError> {
        if let Err(e) = self.auth.require(T::PATH, action) {
            warn!(resource = T::PATH, %action, "Blocked by permissions");
            self.notify(NoticeLevel::Error, e.to_string());
            return Err(e);
        }
        Ok(())
    }

    fn report(
        &mut self,
        result: Result<MutationOutcome<T>, QueryError>,
        verb: &str,
    ) -> Result<MutationOutcome<T>, QueryError> {
        match &result {
            Ok(outcome) if outcome.message.is_empty() => {
                let message = format!("{} {verb}", record_label(T::PATH));
                self.notify(NoticeLevel::Success, message);
            }
            Ok(outcome) => self.notify(NoticeLevel::Success, outcome.message.clone()),
            Err(e) => self.notify(NoticeLevel::Error, e.to_string()),
        }
        result
    }

    fn notify(&mut self, level: NoticeLevel, message: String) {
        self.notices.push_back(Notice { level, message });
    }
}

/// `departments` -> `Department`.
fn record_label(path: &str) -> String {
    let singular = path.strip_suffix('s').unwrap_or(path);
    let mut chars = singular.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
