//! # Data Table
//!
//! A headless table model: columns, rows, search text and pagination, rendered into
//! plain cell strings. Drawing the result is left to the caller.
//!
//! ## Controlled and uncontrolled pagination
//!
//! * **Controlled**: the parent owns the page state (usually because the server
//!   paginates). Navigation only *emits* [`TableEvent::PageChange`]; the rows given to
//!   [`DataTable::set_data`] are shown as-is, never sliced or filtered.
//! * **Uncontrolled**: the table holds every row and paginates and searches locally.
//!
//! Callbacks are returned as [`TableEvent`] values instead of being stored as closures.
//! The parent matches on them and reacts.
//!
//! ## Cells
//!
//! A [`Column`] with a `cell` function renders with it. Without one, the value at
//! `accessor_key` in the row's JSON form is used: strings are unquoted, `null` is empty,
//! and dotted keys (`department.name`) reach into nested objects.

use crate::error::TableError;
use crate::pagination::PaginationState;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

pub const DEFAULT_PAGE_SIZE: usize = 10;

pub type CellFn<R> = Arc<dyn Fn(&R) -> String + Send + Sync>;

/// Column header: fixed text or a render function.
#[derive(Clone)]
pub enum Header {
    Static(String),
    Render(Arc<dyn Fn() -> String + Send + Sync>),
}

impl Header {
    pub fn render(f: impl Fn() -> String + Send + Sync + 'static) -> Self {
        Self::Render(Arc::new(f))
    }

    pub fn text(&self) -> String {
        match self {
            Self::Static(text) => text.clone(),
            Self::Render(f) => f(),
        }
    }
}

impl fmt::Debug for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(text) => f.debug_tuple("Static").field(text).finish(),
            Self::Render(_) => f.write_str("Render(..)"),
        }
    }
}

impl From<&str> for Header {
    fn from(text: &str) -> Self {
        Self::Static(text.to_string())
    }
}

impl From<String> for Header {
    fn from(text: String) -> Self {
        Self::Static(text)
    }
}

pub struct Column<R> {
    accessor_key: String,
    header: Header,
    cell: Option<CellFn<R>>,
}

impl<R> Clone for Column<R> {
    fn clone(&self) -> Self {
        Self {
            accessor_key: self.accessor_key.clone(),
            header: self.header.clone(),
            cell: self.cell.clone(),
        }
    }
}

impl<R> fmt::Debug for Column<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("accessor_key", &self.accessor_key)
            .field("header", &self.header)
            .field("cell", &self.cell.is_some())
            .finish()
    }
}

impl<R> Column<R> {
    pub fn new(accessor_key: impl Into<String>, header: impl Into<Header>) -> Self {
        Self {
            accessor_key: accessor_key.into(),
            header: header.into(),
            cell: None,
        }
    }

    /// Renders the cell with `f` instead of reading `accessor_key`.
    pub fn cell(mut self, f: impl Fn(&R) -> String + Send + Sync + 'static) -> Self {
        self.cell = Some(Arc::new(f));
        self
    }

    pub fn accessor_key(&self) -> &str {
        &self.accessor_key
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    fn render(&self, row: &R, json: &Value) -> String {
        match &self.cell {
            Some(cell) => cell(row),
            None => lookup(json, &self.accessor_key)
                .map(display_value)
                .unwrap_or_default(),
        }
    }
}

fn lookup<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    if let Some(direct) = value.get(key) {
        return Some(direct);
    }
    key.split('.').try_fold(value, |current, part| current.get(part))
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// What the table asks its parent to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEvent {
    /// Move to this zero-based page.
    PageChange(usize),
    /// The search box text changed.
    Search(String),
}

#[derive(Debug, Clone, Copy)]
enum Paging {
    Controlled(PaginationState),
    Uncontrolled { page_index: usize, page_size: usize },
}

/// The pagination footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    pub page_index: usize,
    pub total_pages: usize,
    pub can_previous: bool,
    pub can_next: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// No rows to show; the explicit empty state is rendered.
    pub empty: bool,
    pub is_fetching: bool,
    pub pager: Pager,
}

impl fmt::Display for RenderedTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.headers.join(" | "))?;
        if self.empty {
            writeln!(f, "No results.")?;
        }
        for row in &self.rows {
            writeln!(f, "{}", row.join(" | "))?;
        }
        write!(
            f,
            "Page {} of {}",
            self.pager.page_index + 1,
            self.pager.total_pages
        )?;
        if self.is_fetching {
            write!(f, " (loading)")?;
        }
        Ok(())
    }
}

pub struct DataTable<R> {
    columns: Vec<Column<R>>,
    rows: Vec<R>,
    is_fetching: bool,
    search: String,
    paging: Paging,
}

impl<R: Serialize> DataTable<R> {
    /// An uncontrolled table with [`DEFAULT_PAGE_SIZE`] rows per page.
    pub fn new(columns: Vec<Column<R>>) -> Result<Self, TableError> {
        if columns.is_empty() {
            return Err(TableError::NoColumns);
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
            is_fetching: false,
            search: String::new(),
            paging: Paging::Uncontrolled {
                page_index: 0,
                page_size: DEFAULT_PAGE_SIZE,
            },
        })
    }

    /// Switches to parent-owned pagination.
    pub fn controlled(mut self, state: PaginationState) -> Self {
        self.paging = Paging::Controlled(state);
        self
    }

    /// Switches to local pagination.
    pub fn uncontrolled(mut self, page_size: usize) -> Self {
        self.paging = Paging::Uncontrolled {
            page_index: 0,
            page_size: page_size.max(1),
        };
        self
    }

    pub fn is_controlled(&self) -> bool {
        matches!(self.paging, Paging::Controlled(_))
    }

    pub fn columns(&self) -> &[Column<R>] {
        &self.columns
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn is_fetching(&self) -> bool {
        self.is_fetching
    }

    pub fn search_text(&self) -> &str {
        &self.search
    }

    /// Replaces the parent-owned page state.
    pub fn set_pagination(&mut self, state: PaginationState) {
        self.paging = Paging::Controlled(state);
    }

    /// The effective page state. In uncontrolled mode the total is the number of rows
    /// matching the local search.
    pub fn pagination(&self) -> PaginationState {
        match self.paging {
            Paging::Controlled(state) => state,
            Paging::Uncontrolled {
                page_index,
                page_size,
            } => PaginationState::new(page_index, page_size, self.visible_count() as u64),
        }
    }

    /// Applies a fetch result.
    ///
    /// `Some` always replaces the rows. `None` keeps the rows already shown while a
    /// fetch is running and clears them once fetching has stopped.
    pub fn set_data(&mut self, data: Option<Vec<R>>, is_fetching: bool) {
        match data {
            Some(rows) => self.rows = rows,
            None if is_fetching => {}
            None => self.rows.clear(),
        }
        self.is_fetching = is_fetching;
        self.reclamp();
    }

    pub fn set_fetching(&mut self, is_fetching: bool) {
        self.is_fetching = is_fetching;
    }

    pub fn go_to_page(&mut self, index: usize) -> Option<TableEvent> {
        let state = self.pagination();
        let target = state.clamp_index(index);
        if target == state.page_index() {
            return None;
        }
        match &mut self.paging {
            Paging::Controlled(_) => Some(TableEvent::PageChange(target)),
            Paging::Uncontrolled { page_index, .. } => {
                *page_index = target;
                None
            }
        }
    }

    pub fn next_page(&mut self) -> Option<TableEvent> {
        let current = self.pagination().page_index();
        self.go_to_page(current.saturating_add(1))
    }

    pub fn previous_page(&mut self) -> Option<TableEvent> {
        let current = self.pagination().page_index();
        self.go_to_page(current.saturating_sub(1))
    }

    /// Stores the search text and reports it.
    ///
    /// Uncontrolled tables filter locally and go back to the first page. Controlled
    /// tables leave filtering to whoever handles the event.
    pub fn search(&mut self, term: impl Into<String>) -> TableEvent {
        let term = term.into();
        self.search = term.clone();
        if let Paging::Uncontrolled { page_index, .. } = &mut self.paging {
            *page_index = 0;
        }
        TableEvent::Search(term)
    }

    pub fn set_page_size(&mut self, size: usize) -> Option<TableEvent> {
        match &mut self.paging {
            Paging::Controlled(state) => {
                let resized = state.with_page_size(size);
                let moved = resized.page_index() != state.page_index();
                *state = resized;
                moved.then_some(TableEvent::PageChange(resized.page_index()))
            }
            Paging::Uncontrolled { page_size, .. } => {
                *page_size = size.max(1);
                self.reclamp();
                None
            }
        }
    }

    pub fn render(&self) -> RenderedTable {
        let headers = self.columns.iter().map(|c| c.header.text()).collect();
        let state = self.pagination();

        let rows: Vec<Vec<String>> = match self.paging {
            Paging::Controlled(_) => self.rows.iter().map(|row| self.render_row(row)).collect(),
            Paging::Uncontrolled { .. } => {
                let start = state.page_index() * state.page_size();
                self.filtered_cells()
                    .into_iter()
                    .skip(start)
                    .take(state.page_size())
                    .collect()
            }
        };

        RenderedTable {
            headers,
            empty: rows.is_empty(),
            rows,
            is_fetching: self.is_fetching,
            pager: Pager {
                page_index: state.page_index(),
                total_pages: state.total_pages(),
                can_previous: state.can_previous(),
                can_next: state.can_next(),
            },
        }
    }

    fn render_row(&self, row: &R) -> Vec<String> {
        let json = serde_json::to_value(row).unwrap_or(Value::Null);
        self.columns.iter().map(|c| c.render(row, &json)).collect()
    }

    fn filtered_cells(&self) -> Vec<Vec<String>> {
        let needle = self.search.trim().to_lowercase();
        self.rows
            .iter()
            .map(|row| self.render_row(row))
            .filter(|cells| {
                needle.is_empty()
                    || cells
                        .iter()
                        .any(|cell| cell.to_lowercase().contains(&needle))
            })
            .collect()
    }

    fn visible_count(&self) -> usize {
        match self.paging {
            Paging::Controlled(_) => self.rows.len(),
            Paging::Uncontrolled { .. } => self.filtered_cells().len(),
        }
    }

    fn reclamp(&mut self) {
        if let Paging::Uncontrolled { page_index, .. } = self.paging {
            let clamped = self.pagination().clamp_index(page_index);
            if let Paging::Uncontrolled { page_index, .. } = &mut self.paging {
                *page_index = clamped;
            }
        }
    }
}

/// Per-row UI state (expanded, status switch) owned by the parent and keyed by row id.
#[derive(Debug, Clone)]
pub struct RowToggles<K> {
    states: HashMap<K, bool>,
}

impl<K> Default for RowToggles<K> {
    fn default() -> Self {
        Self {
            states: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash> RowToggles<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_on(&self, key: &K) -> bool {
        self.states.get(key).copied().unwrap_or(false)
    }

    /// Flips the state of `key` and returns the new value.
    pub fn toggle(&mut self, key: K) -> bool {
        let state = self.states.entry(key).or_insert(false);
        *state = !*state;
        *state
    }

    /// Forgets rows that are no longer displayed.
    pub fn retain(&mut self, mut keep: impl FnMut(&K) -> bool) {
        self.states.retain(|key, _| keep(key));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, Serialize)]
    struct Product {
        id: u32,
        name: String,
        price: f64,
        active: bool,
        note: Option<String>,
        unit: Unit,
    }

    #[derive(Debug, Clone, Serialize)]
    struct Unit {
        name: String,
    }

    fn product(id: u32, name: &str) -> Product {
        Product {
            id,
            name: name.to_string(),
            price: 2.5,
            active: id % 2 == 0,
            note: None,
            unit: Unit {
                name: "box".to_string(),
            },
        }
    }

    fn columns() -> Vec<Column<Product>> {
        vec![
            Column::new("name", "Name"),
            Column::new("unit.name", "Unit"),
            Column::new("status", Header::render(|| "Status".to_string())).cell(|p: &Product| {
                if p.active { "Active" } else { "Inactive" }.to_string()
            }),
        ]
    }

    fn catalog(count: u32) -> Vec<Product> {
        (1..=count).map(|i| product(i, &format!("Item {i}"))).collect()
    }

    #[test]
    fn test_rejects_an_empty_column_set() {
        let result = DataTable::<Product>::new(Vec::new());
        assert!(matches!(result, Err(TableError::NoColumns)));
    }

    #[test]
    fn test_default_extraction_reads_serialized_fields() {
        let columns = vec![
            Column::new("name", "Name"),
            Column::new("price", "Price"),
            Column::new("active", "Active"),
            Column::new("note", "Note"),
            Column::new("unit.name", "Unit"),
            Column::new("missing", "Missing"),
        ];
        let mut table = DataTable::new(columns).unwrap();
        table.set_data(Some(vec![product(2, "Bolt")]), false);

        let rendered = table.render();
        assert_eq!(rendered.rows, vec![vec!["Bolt", "2.5", "true", "", "box", ""]]);
    }

    #[test]
    fn test_headers_can_be_rendered_lazily() {
        let table = DataTable::new(columns()).unwrap();
        assert_eq!(table.render().headers, vec!["Name", "Unit", "Status"]);
    }

    #[test]
    fn test_empty_state_is_explicit() {
        let table = DataTable::new(columns()).unwrap();
        let rendered = table.render();
        assert!(rendered.empty);
        assert!(rendered.rows.is_empty());
        assert_eq!(rendered.pager.total_pages, 1);
        assert!(rendered.to_string().contains("No results."));
    }

    #[test]
    fn test_controlled_mode_never_slices_rows() {
        let mut table =
            DataTable::new(columns()).unwrap().controlled(PaginationState::new(1, 2, 25));
        table.set_data(Some(catalog(3)), false);

        let rendered = table.render();
        assert_eq!(rendered.rows.len(), 3);
        assert_eq!(rendered.pager.page_index, 1);
        assert_eq!(rendered.pager.total_pages, 13);
    }

    #[test]
    fn test_controlled_navigation_only_emits_events() {
        let mut table =
            DataTable::new(columns()).unwrap().controlled(PaginationState::new(0, 10, 25));

        assert_eq!(table.next_page(), Some(TableEvent::PageChange(1)));
        // The parent has not applied the change yet.
        assert_eq!(table.pagination().page_index(), 0);
        assert_eq!(table.previous_page(), None);

        table.set_pagination(PaginationState::new(2, 10, 25));
        assert_eq!(table.next_page(), None);
        assert_eq!(table.go_to_page(9), None);
        assert_eq!(table.go_to_page(0), Some(TableEvent::PageChange(0)));
    }

    #[test]
    fn test_go_to_page_clamps_out_of_range_requests() {
        let mut table =
            DataTable::new(columns()).unwrap().controlled(PaginationState::new(0, 10, 25));
        assert_eq!(table.go_to_page(99), Some(TableEvent::PageChange(2)));
    }

    #[test]
    fn test_controlled_search_emits_without_filtering() {
        let mut table =
            DataTable::new(columns()).unwrap().controlled(PaginationState::new(0, 10, 3));
        table.set_data(Some(catalog(3)), false);

        assert_eq!(table.search("Item 2"), TableEvent::Search("Item 2".to_string()));
        assert_eq!(table.search_text(), "Item 2");
        assert_eq!(table.render().rows.len(), 3);
    }

    #[test]
    fn test_uncontrolled_mode_paginates_locally() {
        let mut table = DataTable::new(columns()).unwrap().uncontrolled(2);
        table.set_data(Some(catalog(5)), false);

        assert_eq!(table.render().rows.len(), 2);
        assert_eq!(table.next_page(), None);
        assert_eq!(table.next_page(), None);
        let last = table.render();
        assert_eq!(last.rows, vec![vec!["Item 5", "box", "Inactive"]]);
        assert!(!last.pager.can_next);
        assert_eq!(last.pager.total_pages, 3);
    }

    #[test]
    fn test_uncontrolled_search_filters_and_resets_the_page() {
        let mut table = DataTable::new(columns()).unwrap().uncontrolled(2);
        table.set_data(Some(catalog(12)), false);
        table.go_to_page(3);

        table.search("item 1");
        let rendered = table.render();
        assert_eq!(rendered.pager.page_index, 0);
        // Item 1, 10, 11, 12 match; two per page.
        assert_eq!(rendered.pager.total_pages, 2);
        assert_eq!(rendered.rows[0][0], "Item 1");
        assert_eq!(rendered.rows[1][0], "Item 10");
    }

    #[test]
    fn test_rows_survive_a_refetch_without_data() {
        let mut table = DataTable::new(columns()).unwrap();
        table.set_data(Some(catalog(2)), false);

        table.set_data(None, true);
        let loading = table.render();
        assert_eq!(loading.rows.len(), 2);
        assert!(loading.is_fetching);

        table.set_data(None, false);
        assert!(table.render().empty);
    }

    #[test]
    fn test_set_fetching_leaves_rows_alone() {
        let mut table = DataTable::new(columns()).unwrap();
        table.set_data(Some(catalog(1)), false);
        table.set_fetching(true);
        assert_eq!(table.rows().len(), 1);
        assert!(table.render().to_string().ends_with("(loading)"));
    }

    #[test]
    fn test_shrinking_page_size_in_controlled_mode_reports_the_move() {
        let mut table =
            DataTable::new(columns()).unwrap().controlled(PaginationState::new(4, 5, 25));
        assert_eq!(table.set_page_size(10), Some(TableEvent::PageChange(2)));
        assert_eq!(table.pagination().page_size(), 10);
        assert_eq!(table.set_page_size(10), None);
    }

    #[test]
    fn test_dotted_keys_prefer_a_literal_field() {
        let value = json!({ "a.b": "literal", "a": { "b": "nested" } });
        assert_eq!(lookup(&value, "a.b").map(display_value), Some("literal".to_string()));
    }

    #[test]
    fn test_row_toggles_are_keyed_by_id() {
        let mut toggles = RowToggles::new();
        assert!(!toggles.is_on(&7));
        assert!(toggles.toggle(7));
        assert!(toggles.is_on(&7));
        assert!(!toggles.is_on(&8));
        assert!(!toggles.toggle(7));

        toggles.toggle(8);
        toggles.retain(|id| *id != 8);
        assert!(!toggles.is_on(&8));
    }
}
