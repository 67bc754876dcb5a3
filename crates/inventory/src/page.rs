use serde::{Deserialize, Serialize};

use crate::row::InventoryRow;

/// One fetched page of inventory rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResult {
    pub items: Vec<InventoryRow>,
    pub total_items: u64,
    pub total_pages: u32,
    /// Page number echoed by the server (1-based).
    pub current_page: u32,
    pub page_size: u32,
}

impl ListResult {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_next_page(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn has_previous_page(&self) -> bool {
        self.current_page > 1
    }
}
