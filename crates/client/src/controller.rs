//! Async driver of the inventory list.
//!
//! The controller is owned by a single view. Fetches run as tokio tasks and
//! report back over a channel; [`ListController::next_update`] applies
//! whatever arrives first (a settled search value or a fetch outcome).
//! Issuing a fetch aborts the one still in flight, and request ids make sure
//! an outcome that slipped through before the abort is ignored.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use nooryx_core::DomainResult;
use nooryx_inventory::{ListQuery, ListResult, SortField, SortOrder, StatusFilter, UrlDefaults, url_state};

use crate::api::InventoryApi;
use crate::config::ClientConfig;
use crate::debounce::Debouncer;
use crate::error::ApiError;
use crate::list_state::{ListState, RequestId};
use crate::preferences::Preferences;
use crate::view::TableView;

type FetchOutcome = (RequestId, Result<ListResult, ApiError>);

/// How a controller starts out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSettings {
    pub initial: ListQuery,
    pub search_debounce: Duration,
    /// Page size for a URL without `size` when URL sync is off.
    pub preferred_page_size: u32,
    /// `Some` when the query is mirrored into a URL query string. Holds the
    /// configured defaults, so written URLs mean the same for every user.
    pub url_sync: Option<UrlDefaults>,
}

impl ControllerSettings {
    /// Page size precedence: URL, then stored preference, then config default.
    pub fn resolve(config: &ClientConfig, prefs: &Preferences, location_query: Option<&str>) -> Self {
        let preferred_page_size = prefs
            .page_size
            .filter(|n| *n > 0)
            .unwrap_or(config.default_page_size);

        let initial = match location_query {
            Some(qs) => decode_query_string(
                qs,
                &UrlDefaults {
                    page_size: preferred_page_size,
                },
            ),
            None => ListQuery::new(preferred_page_size).unwrap_or_default(),
        };

        Self {
            initial,
            search_debounce: config.search_debounce,
            preferred_page_size,
            url_sync: config.url_sync.then_some(UrlDefaults {
                page_size: config.default_page_size,
            }),
        }
    }
}

/// What [`ListController::next_update`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerUpdate {
    /// Debounced search text was applied; `fetch` is set when it changed the query.
    SearchSettled { fetch: Option<RequestId> },
    /// A fetch finished. `applied` is false for superseded requests.
    Fetched { id: RequestId, applied: bool },
}

pub struct ListController<A: InventoryApi + ?Sized + 'static> {
    api: Arc<A>,
    state: ListState,
    debouncer: Debouncer<String>,
    settled: mpsc::UnboundedReceiver<String>,
    results_tx: mpsc::UnboundedSender<FetchOutcome>,
    results_rx: mpsc::UnboundedReceiver<FetchOutcome>,
    in_flight: Option<JoinHandle<()>>,
    preferred_page_size: u32,
    url_sync: Option<UrlDefaults>,
}

impl<A: InventoryApi + ?Sized + 'static> ListController<A> {
    pub fn new(api: Arc<A>, settings: ControllerSettings) -> Self {
        let (debouncer, settled) = Debouncer::new(settings.search_debounce);
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        Self {
            api,
            state: ListState::new(settings.initial),
            debouncer,
            settled,
            results_tx,
            results_rx,
            in_flight: None,
            preferred_page_size: settings.preferred_page_size,
            url_sync: settings.url_sync,
        }
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    pub fn query(&self) -> &ListQuery {
        self.state.query()
    }

    pub fn view(&self) -> TableView {
        TableView::from_state(&self.state)
    }

    /// Issue the initial fetch.
    pub fn start(&mut self) -> RequestId {
        self.issue_fetch()
    }

    /// Re-run the current query (e.g. after an error banner's retry).
    pub fn retry(&mut self) -> RequestId {
        self.issue_fetch()
    }

    /// Raw keystrokes; the query follows once typing pauses.
    pub fn set_search(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.state.set_search_input(text.clone());
        self.debouncer.push(text);
    }

    pub fn set_sort(&mut self, field: SortField, order: SortOrder) -> Option<RequestId> {
        let changed = self.state.set_sort(field, order);
        self.fetch_if(changed)
    }

    pub fn toggle_sort(&mut self, field: SortField) -> Option<RequestId> {
        let changed = self.state.toggle_sort(field);
        self.fetch_if(changed)
    }

    pub fn clear_sort(&mut self) -> Option<RequestId> {
        let changed = self.state.clear_sort();
        self.fetch_if(changed)
    }

    pub fn set_status_filter(&mut self, filter: StatusFilter) -> Option<RequestId> {
        let changed = self.state.set_status_filter(filter);
        self.fetch_if(changed)
    }

    pub fn set_page(&mut self, page_index: u32) -> Option<RequestId> {
        let changed = self.state.set_page(page_index);
        self.fetch_if(changed)
    }

    pub fn set_page_size(&mut self, page_size: u32) -> DomainResult<Option<RequestId>> {
        let changed = self.state.set_page_size(page_size)?;
        Ok(self.fetch_if(changed))
    }

    /// Minimal query string for the current query, when URL sync is on.
    pub fn location_query(&self) -> Option<String> {
        self.url_sync
            .map(|defaults| encode_query_string(self.state.query(), &defaults))
    }

    /// Apply a navigation event (back/forward, pasted link).
    ///
    /// The URL owns the search text afterwards: typed text that is still
    /// waiting, or already settled but not yet applied, is discarded.
    pub fn navigate(&mut self, query_string: &str) -> Option<RequestId> {
        self.debouncer.cancel();
        while self.settled.try_recv().is_ok() {}

        // Written URLs omit `size` relative to the configured default.
        let defaults = self.url_sync.unwrap_or(UrlDefaults {
            page_size: self.preferred_page_size,
        });
        let query = decode_query_string(query_string, &defaults);
        let changed = self.state.replace_query(query);
        if !changed {
            let search = self.state.query().search().to_string();
            self.state.set_search_input(search);
        }
        self.fetch_if(changed)
    }

    /// Wait for the next settled search or fetch outcome and apply it.
    ///
    /// Only await this while [`Self::has_pending_work`] is true; otherwise it
    /// waits until the next user action.
    pub async fn next_update(&mut self) -> Option<ControllerUpdate> {
        let event = tokio::select! {
            Some(outcome) = self.results_rx.recv() => Event::Fetched(outcome),
            Some(text) = self.settled.recv() => Event::SearchSettled(text),
            else => return None,
        };

        let update = match event {
            Event::SearchSettled(text) => {
                tracing::debug!(search = %text, "search settled");
                let changed = self.state.apply_search(text);
                ControllerUpdate::SearchSettled {
                    fetch: self.fetch_if(changed),
                }
            }
            Event::Fetched((id, outcome)) => {
                match &outcome {
                    Ok(result) => tracing::info!(
                        request = %id,
                        items = result.items.len(),
                        total = result.total_items,
                        "inventory page received"
                    ),
                    Err(e) => tracing::warn!(request = %id, "inventory fetch failed: {}", e),
                }
                let applied = self.state.complete(id, outcome);
                ControllerUpdate::Fetched { id, applied }
            }
        };
        Some(update)
    }

    /// A search is waiting to settle or a fetch has not been applied yet.
    pub fn has_pending_work(&self) -> bool {
        self.debouncer.is_pending()
            || !self.settled.is_empty()
            || !self.results_rx.is_empty()
            || self.in_flight.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Drive updates until nothing is pending.
    pub async fn settle(&mut self) -> Vec<ControllerUpdate> {
        let mut updates = Vec::new();
        while self.has_pending_work() {
            match self.next_update().await {
                Some(update) => updates.push(update),
                None => break,
            }
        }
        updates
    }

    fn fetch_if(&mut self, changed: bool) -> Option<RequestId> {
        changed.then(|| self.issue_fetch())
    }

    fn issue_fetch(&mut self) -> RequestId {
        if let Some(previous) = self.in_flight.take() {
            previous.abort();
        }

        let ticket = self.state.begin_fetch();
        tracing::info!(
            request = %ticket.id,
            page = ticket.query.page_number(),
            size = ticket.query.page_size(),
            "fetching inventory"
        );

        let id = ticket.id;
        let api = self.api.clone();
        let tx = self.results_tx.clone();
        self.in_flight = Some(tokio::spawn(async move {
            let outcome = api.list_inventory(&ticket.query).await;
            let _ = tx.send((ticket.id, outcome));
        }));
        id
    }
}

impl<A: InventoryApi + ?Sized + 'static> Drop for ListController<A> {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

enum Event {
    SearchSettled(String),
    Fetched(FetchOutcome),
}

pub fn encode_query_string(query: &ListQuery, defaults: &UrlDefaults) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(url_state::encode(query, defaults))
        .finish()
}

/// Accepts the string with or without its leading `?`.
pub fn decode_query_string(query_string: &str, defaults: &UrlDefaults) -> ListQuery {
    let raw = query_string.strip_prefix('?').unwrap_or(query_string);
    url_state::decode(url::form_urlencoded::parse(raw.as_bytes()), defaults)
}
