//! Synchronous state machine behind the inventory list.
//!
//! `ListState` owns the query and the fetch lifecycle but performs no IO.
//! Every fetch gets a [`RequestId`]; a completion is applied only when it
//! carries the most recently issued id, so out-of-order responses for
//! superseded queries are dropped.

use nooryx_core::DomainResult;
use nooryx_inventory::{ListQuery, ListResult, SortField, SortOrder, StatusFilter};

use crate::error::ApiError;

/// Monotonic identifier of an issued fetch.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl core::fmt::Display for RequestId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A fetch that has been issued and is awaiting completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub id: RequestId,
    pub query: ListQuery,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum FetchState {
    #[default]
    Idle,
    Loading,
    Success(ListResult),
    Error(ApiError),
}

#[derive(Debug, Clone)]
pub struct ListState {
    query: ListQuery,
    /// What the user typed; becomes the query's search once debounced.
    search_input: String,
    fetch: FetchState,
    /// Last successful result, kept visible while a newer fetch runs.
    retained: Option<ListResult>,
    next_id: u64,
    latest: Option<RequestId>,
}

impl ListState {
    pub fn new(query: ListQuery) -> Self {
        Self {
            search_input: query.search().to_string(),
            query,
            fetch: FetchState::Idle,
            retained: None,
            next_id: 0,
            latest: None,
        }
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    pub fn fetch_state(&self) -> &FetchState {
        &self.fetch
    }

    /// Previously fetched data, available while loading or after an error.
    pub fn retained(&self) -> Option<&ListResult> {
        self.retained.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.fetch, FetchState::Loading)
    }

    /// Raw text input; does not touch the effective query.
    pub fn set_search_input(&mut self, text: impl Into<String>) {
        self.search_input = text.into();
    }

    /// Debounced search text becomes effective.
    pub fn apply_search(&mut self, text: impl Into<String>) -> bool {
        self.query.set_search(text)
    }

    pub fn set_sort(&mut self, field: SortField, order: SortOrder) -> bool {
        self.query.set_sort(field, order)
    }

    pub fn toggle_sort(&mut self, field: SortField) -> bool {
        self.query.toggle_sort(field)
    }

    pub fn clear_sort(&mut self) -> bool {
        self.query.clear_sort()
    }

    pub fn set_status_filter(&mut self, filter: StatusFilter) -> bool {
        self.query.set_status_filter(filter)
    }

    pub fn set_page(&mut self, page_index: u32) -> bool {
        self.query.set_page(page_index)
    }

    pub fn set_page_size(&mut self, page_size: u32) -> DomainResult<bool> {
        self.query.set_page_size(page_size)
    }

    /// Replace the whole query (navigation event). Returns whether it changed.
    pub fn replace_query(&mut self, query: ListQuery) -> bool {
        if self.query == query {
            return false;
        }
        self.search_input = query.search().to_string();
        self.query = query;
        true
    }

    /// Issue a fetch for the current query; supersedes any earlier ticket.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.next_id += 1;
        let id = RequestId(self.next_id);
        self.latest = Some(id);
        self.fetch = FetchState::Loading;
        FetchTicket {
            id,
            query: self.query.clone(),
        }
    }

    /// Apply a fetch outcome. Returns `false` if the ticket was superseded.
    pub fn complete(&mut self, id: RequestId, outcome: Result<ListResult, ApiError>) -> bool {
        if self.latest != Some(id) {
            tracing::debug!(request = %id, "dropping result of superseded fetch");
            return false;
        }

        self.fetch = match outcome {
            Ok(result) => {
                self.retained = Some(result.clone());
                FetchState::Success(result)
            }
            Err(e) => FetchState::Error(e),
        };
        true
    }

    /// Rows to display: current result, or retained rows while reloading.
    pub fn visible(&self) -> Option<&ListResult> {
        match &self.fetch {
            FetchState::Success(result) => Some(result),
            FetchState::Loading => self.retained.as_ref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nooryx_inventory::StockStatus;

    fn result(page: u32) -> ListResult {
        ListResult {
            items: Vec::new(),
            total_items: 0,
            total_pages: 0,
            current_page: page,
            page_size: 10,
        }
    }

    #[test]
    fn search_input_does_not_change_query_until_applied() {
        let mut state = ListState::new(ListQuery::default());
        state.set_search_input("wid");
        assert_eq!(state.search_input(), "wid");
        assert_eq!(state.query().search(), "");

        assert!(state.apply_search("wid"));
        assert_eq!(state.query().search(), "wid");
    }

    #[test]
    fn later_fetch_wins_even_when_resolved_first() {
        let mut state = ListState::new(ListQuery::default());

        let a = state.begin_fetch();
        state.set_status_filter(StatusFilter::only([StockStatus::LowStock]));
        let b = state.begin_fetch();
        assert_ne!(a.query, b.query);

        assert!(state.complete(b.id, Ok(result(2))));
        assert!(!state.complete(a.id, Ok(result(1))));

        assert_eq!(state.fetch_state(), &FetchState::Success(result(2)));
    }

    #[test]
    fn stale_error_is_ignored() {
        let mut state = ListState::new(ListQuery::default());
        let a = state.begin_fetch();
        let b = state.begin_fetch();

        assert!(!state.complete(a.id, Err(ApiError::http(500, None))));
        assert!(state.is_loading());
        assert!(state.complete(b.id, Ok(result(1))));
    }

    #[test]
    fn previous_data_stays_visible_while_loading() {
        let mut state = ListState::new(ListQuery::default());
        let first = state.begin_fetch();
        state.complete(first.id, Ok(result(1)));

        state.set_page(1);
        state.begin_fetch();
        assert!(state.is_loading());
        assert_eq!(state.visible(), Some(&result(1)));
    }

    #[test]
    fn error_hides_rows_but_keeps_them_retained() {
        let mut state = ListState::new(ListQuery::default());
        let first = state.begin_fetch();
        state.complete(first.id, Ok(result(1)));

        let second = state.begin_fetch();
        state.complete(second.id, Err(ApiError::Network("down".into())));
        assert_eq!(state.visible(), None);
        assert_eq!(state.retained(), Some(&result(1)));
    }

    #[test]
    fn replace_query_syncs_search_input() {
        let mut state = ListState::new(ListQuery::default());
        let mut next = ListQuery::default();
        next.set_search("bolt");

        assert!(state.replace_query(next.clone()));
        assert_eq!(state.search_input(), "bolt");
        assert!(!state.replace_query(next));
    }
}
