//! What the inventory table should show for a given list state.

use nooryx_inventory::{InventoryRow, ListResult};

use crate::list_state::{FetchState, ListState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    /// 1-based page number.
    pub page: u32,
    pub total_pages: u32,
    pub total_items: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl From<&ListResult> for PageInfo {
    fn from(result: &ListResult) -> Self {
        Self {
            page: result.current_page,
            total_pages: result.total_pages,
            total_items: result.total_items,
            has_next: result.has_next_page(),
            has_previous: result.has_previous_page(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableView {
    /// Nothing fetched yet.
    Idle,
    /// First load: placeholder rows.
    Skeleton { rows: u32 },
    /// `stale` is set while newer data is loading.
    Rows {
        items: Vec<InventoryRow>,
        page: PageInfo,
        stale: bool,
    },
    /// Successful fetch with no matching rows.
    Empty,
    /// HTTP 404: inventory has not been provisioned yet.
    NotProvisioned,
    Failed {
        message: String,
        status: Option<u16>,
        retryable: bool,
    },
}

impl TableView {
    pub fn from_state(state: &ListState) -> Self {
        match state.fetch_state() {
            FetchState::Idle => TableView::Idle,
            FetchState::Loading => match state.retained() {
                Some(result) => rows(result, true),
                None => TableView::Skeleton {
                    rows: state.query().page_size(),
                },
            },
            FetchState::Success(result) if result.is_empty() => TableView::Empty,
            FetchState::Success(result) => rows(result, false),
            FetchState::Error(e) if e.is_not_found() => TableView::NotProvisioned,
            FetchState::Error(e) => TableView::Failed {
                message: e.message(),
                status: e.status(),
                retryable: true,
            },
        }
    }
}

fn rows(result: &ListResult, stale: bool) -> TableView {
    TableView::Rows {
        items: result.items.clone(),
        page: PageInfo::from(result),
        stale,
    }
}
