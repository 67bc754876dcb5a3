//! Inventory list domain.
//!
//! This crate contains the rules of the inventory view, implemented purely as
//! deterministic logic (no IO, no HTTP, no timers).

pub mod page;
pub mod query;
pub mod row;
pub mod scan;
pub mod url_state;

pub use page::ListResult;
pub use query::{DEFAULT_PAGE_SIZE, ListQuery, MAX_PAGE_INDEX, SortField, SortOrder, StatusFilter};
pub use row::{InventoryRow, StockStatus};
pub use scan::{OperationKind, ScanMethod};
pub use url_state::UrlDefaults;
