//! Inventory list query: pagination, search, sort and status filter.
//!
//! Every setter reports whether the query actually changed so callers only
//! refetch on real changes. Changing the search text, the sort or the status
//! filter (and the page size) moves the query back to the first page.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use nooryx_core::{DomainError, DomainResult};

use crate::row::StockStatus;

/// Page size used when neither the URL nor a stored preference says otherwise.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest zero-based page index; its 1-based page number still fits in `u32`.
pub const MAX_PAGE_INDEX: u32 = u32::MAX - 1;

/// Columns the backend accepts in `sort_by`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    SkuCode,
    Name,
    Location,
    AvailableQuantity,
    LastTransactionTimestamp,
    Status,
}

impl SortField {
    pub const ALL: [SortField; 6] = [
        SortField::SkuCode,
        SortField::Name,
        SortField::Location,
        SortField::AvailableQuantity,
        SortField::LastTransactionTimestamp,
        SortField::Status,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::SkuCode => "sku_code",
            SortField::Name => "name",
            SortField::Location => "location",
            SortField::AvailableQuantity => "available_quantity",
            SortField::LastTransactionTimestamp => "last_transaction_timestamp",
            SortField::Status => "status",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == value)
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }
}

/// Set of stock statuses to show.
///
/// Never empty: an empty selection means "no filtering" and is stored as the
/// full set, so both spellings produce the same request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<StockStatus>", into = "Vec<StockStatus>")]
pub struct StatusFilter(BTreeSet<StockStatus>);

impl StatusFilter {
    pub fn all() -> Self {
        Self(StockStatus::ALL.into_iter().collect())
    }

    pub fn only(statuses: impl IntoIterator<Item = StockStatus>) -> Self {
        let set: BTreeSet<_> = statuses.into_iter().collect();
        if set.is_empty() { Self::all() } else { Self(set) }
    }

    pub fn is_all(&self) -> bool {
        self.0.len() == StockStatus::ALL.len()
    }

    pub fn contains(&self, status: StockStatus) -> bool {
        self.0.contains(&status)
    }

    /// Flip one status. Deselecting the last remaining status falls back to all.
    pub fn toggle(&self, status: StockStatus) -> Self {
        let mut set = self.0.clone();
        if !set.remove(&status) {
            set.insert(status);
        }
        Self::only(set)
    }

    pub fn iter(&self) -> impl Iterator<Item = StockStatus> + '_ {
        self.0.iter().copied()
    }
}

impl Default for StatusFilter {
    fn default() -> Self {
        Self::all()
    }
}

impl From<Vec<StockStatus>> for StatusFilter {
    fn from(value: Vec<StockStatus>) -> Self {
        Self::only(value)
    }
}

impl From<StatusFilter> for Vec<StockStatus> {
    fn from(value: StatusFilter) -> Self {
        value.0.into_iter().collect()
    }
}

/// The parameters of one inventory list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    page_index: u32,
    page_size: u32,
    search: String,
    sort_field: Option<SortField>,
    sort_order: SortOrder,
    status_filter: StatusFilter,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
            search: String::new(),
            sort_field: None,
            sort_order: SortOrder::Asc,
            status_filter: StatusFilter::all(),
        }
    }
}

impl ListQuery {
    /// First page, no search, unsorted, all statuses.
    pub fn new(page_size: u32) -> DomainResult<Self> {
        ensure_page_size(page_size)?;
        Ok(Self {
            page_size,
            ..Self::default()
        })
    }

    /// Build a query from explicit parts without applying reset rules.
    /// `page_index` is capped at [`MAX_PAGE_INDEX`].
    pub fn from_parts(
        page_index: u32,
        page_size: u32,
        search: impl Into<String>,
        sort: Option<(SortField, SortOrder)>,
        status_filter: StatusFilter,
    ) -> DomainResult<Self> {
        ensure_page_size(page_size)?;
        Ok(Self {
            page_index: page_index.min(MAX_PAGE_INDEX),
            page_size,
            search: search.into(),
            sort_field: sort.map(|(f, _)| f),
            sort_order: sort.map(|(_, o)| o).unwrap_or_default(),
            status_filter,
        })
    }

    pub fn page_index(&self) -> u32 {
        self.page_index
    }

    /// 1-based page number as sent to the backend and shown in URLs.
    pub fn page_number(&self) -> u32 {
        self.page_index + 1
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn sort_field(&self) -> Option<SortField> {
        self.sort_field
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    pub fn status_filter(&self) -> &StatusFilter {
        &self.status_filter
    }

    pub fn set_search(&mut self, search: impl Into<String>) -> bool {
        let search = search.into();
        if self.search == search {
            return false;
        }
        self.search = search;
        self.page_index = 0;
        true
    }

    pub fn set_sort(&mut self, field: SortField, order: SortOrder) -> bool {
        if self.sort_field == Some(field) && self.sort_order == order {
            return false;
        }
        self.sort_field = Some(field);
        self.sort_order = order;
        self.page_index = 0;
        true
    }

    pub fn clear_sort(&mut self) -> bool {
        if self.sort_field.is_none() && self.sort_order == SortOrder::Asc {
            return false;
        }
        self.sort_field = None;
        self.sort_order = SortOrder::Asc;
        self.page_index = 0;
        true
    }

    /// Column-header click: unsorted -> asc -> desc -> unsorted.
    pub fn toggle_sort(&mut self, field: SortField) -> bool {
        match (self.sort_field, self.sort_order) {
            (Some(f), SortOrder::Asc) if f == field => self.set_sort(field, SortOrder::Desc),
            (Some(f), SortOrder::Desc) if f == field => self.clear_sort(),
            _ => self.set_sort(field, SortOrder::Asc),
        }
    }

    pub fn set_status_filter(&mut self, filter: StatusFilter) -> bool {
        if self.status_filter == filter {
            return false;
        }
        self.status_filter = filter;
        self.page_index = 0;
        true
    }

    /// Move to another page; nothing else changes. Capped at [`MAX_PAGE_INDEX`].
    pub fn set_page(&mut self, page_index: u32) -> bool {
        let page_index = page_index.min(MAX_PAGE_INDEX);
        if self.page_index == page_index {
            return false;
        }
        self.page_index = page_index;
        true
    }

    pub fn set_page_size(&mut self, page_size: u32) -> DomainResult<bool> {
        ensure_page_size(page_size)?;
        if self.page_size == page_size {
            return Ok(false);
        }
        self.page_size = page_size;
        self.page_index = 0;
        Ok(true)
    }

    /// Query parameters for `GET /inventory`, in a stable order.
    pub fn request_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page_number().to_string()),
            ("size", self.page_size.to_string()),
        ];

        let search = self.search.trim();
        if !search.is_empty() {
            params.push(("search", search.to_string()));
        }

        if let Some(field) = self.sort_field {
            params.push(("sort_by", field.as_str().to_string()));
            params.push(("order", self.sort_order.as_str().to_string()));
        }

        if !self.status_filter.is_all() {
            for status in self.status_filter.iter() {
                params.push(("stock_status", status.as_str().to_string()));
            }
        }

        params
    }
}

fn ensure_page_size(page_size: u32) -> DomainResult<()> {
    if page_size == 0 {
        return Err(DomainError::validation("page size must be positive"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn on_page(page: u32) -> ListQuery {
        let mut q = ListQuery::default();
        q.set_page(page);
        q
    }

    #[test]
    fn default_query_requests_first_page_only() {
        let params = ListQuery::default().request_params();
        assert_eq!(
            params,
            vec![("page", "1".to_string()), ("size", "10".to_string())]
        );
    }

    #[test]
    fn search_is_trimmed_and_omitted_when_blank() {
        let mut q = ListQuery::default();
        q.set_search("  widget ");
        assert!(q.request_params().contains(&("search", "widget".to_string())));

        q.set_search("   ");
        assert!(q.request_params().iter().all(|(k, _)| *k != "search"));
    }

    #[test]
    fn sort_emits_field_and_order_together() {
        let mut q = ListQuery::default();
        q.set_sort(SortField::AvailableQuantity, SortOrder::Desc);
        let params = q.request_params();
        assert!(params.contains(&("sort_by", "available_quantity".to_string())));
        assert!(params.contains(&("order", "desc".to_string())));
    }

    #[test]
    fn partial_status_filter_repeats_the_parameter() {
        let mut q = ListQuery::default();
        q.set_status_filter(StatusFilter::only([StockStatus::LowStock, StockStatus::OutOfStock]));
        let statuses: Vec<_> = q
            .request_params()
            .into_iter()
            .filter(|(k, _)| *k == "stock_status")
            .map(|(_, v)| v)
            .collect();
        assert_eq!(statuses, vec!["Low Stock", "Out of Stock"]);
    }

    #[test]
    fn empty_and_full_status_selection_are_the_same_request() {
        let mut empty = ListQuery::default();
        empty.set_status_filter(StatusFilter::only([]));
        assert_eq!(empty.request_params(), ListQuery::default().request_params());
    }

    #[test]
    fn toggling_the_last_status_off_selects_all() {
        let only_low = StatusFilter::only([StockStatus::LowStock]);
        assert!(only_low.toggle(StockStatus::LowStock).is_all());
        assert!(!StatusFilter::all().toggle(StockStatus::InStock).is_all());
    }

    #[test]
    fn page_size_change_resets_page() {
        let mut q = on_page(4);
        assert_eq!(q.set_page_size(25), Ok(true));
        assert_eq!(q.page_index(), 0);
        assert!(q.set_page_size(0).is_err());
        assert_eq!(q.page_size(), 25);
    }

    #[test]
    fn unchanged_values_do_not_reset_page() {
        let mut q = on_page(3);
        assert!(!q.set_search(""));
        assert!(!q.set_status_filter(StatusFilter::all()));
        assert!(!q.clear_sort());
        assert_eq!(q.page_index(), 3);
    }

    #[test]
    fn zero_page_size_is_rejected_by_every_constructor() {
        assert!(ListQuery::new(0).is_err());
        assert!(ListQuery::from_parts(0, 0, "", None, StatusFilter::all()).is_err());
        assert!(ListQuery::default().set_page_size(0).is_err());
    }

    #[test]
    fn last_page_index_is_capped() {
        let mut q = ListQuery::default();
        assert!(q.set_page(u32::MAX));
        assert_eq!(q.page_index(), MAX_PAGE_INDEX);
        assert_eq!(q.request_params()[0], ("page", u32::MAX.to_string()));
        assert!(!q.set_page(MAX_PAGE_INDEX));

        let built = ListQuery::from_parts(u32::MAX, 10, "", None, StatusFilter::all()).unwrap();
        assert_eq!(built.page_number(), u32::MAX);
    }

    #[test]
    fn toggle_sort_cycles() {
        let mut q = ListQuery::default();
        q.toggle_sort(SortField::Name);
        assert_eq!((q.sort_field(), q.sort_order()), (Some(SortField::Name), SortOrder::Asc));
        q.toggle_sort(SortField::Name);
        assert_eq!((q.sort_field(), q.sort_order()), (Some(SortField::Name), SortOrder::Desc));
        q.toggle_sort(SortField::Name);
        assert_eq!(q.sort_field(), None);
    }

    fn arb_status_filter() -> impl Strategy<Value = StatusFilter> {
        prop::collection::vec(prop::sample::select(StockStatus::ALL.to_vec()), 0..4)
            .prop_map(StatusFilter::only)
    }

    fn arb_sort_field() -> impl Strategy<Value = SortField> {
        prop::sample::select(SortField::ALL.to_vec())
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: any effective change of search, sort or filter lands on page 0.
        #[test]
        fn filter_changes_reset_page(
            page in 1u32..500,
            search in "[a-z]{1,12}",
            field in arb_sort_field(),
            desc in any::<bool>(),
            filter in arb_status_filter(),
        ) {
            let order = if desc { SortOrder::Desc } else { SortOrder::Asc };

            let mut q = on_page(page);
            prop_assert!(q.set_search(search));
            prop_assert_eq!(q.page_index(), 0);

            let mut q = on_page(page);
            prop_assert!(q.set_sort(field, order));
            prop_assert_eq!(q.page_index(), 0);

            let mut q = on_page(page);
            let changed = q.set_status_filter(filter.clone());
            prop_assert_eq!(changed, !filter.is_all());
            prop_assert_eq!(q.page_index(), if filter.is_all() { page } else { 0 });
        }

        /// Property: `stock_status` is present iff the filter is a strict subset.
        #[test]
        fn stock_status_only_for_strict_subsets(filter in arb_status_filter()) {
            let mut q = ListQuery::default();
            q.set_status_filter(filter.clone());
            let has_status = q.request_params().iter().any(|(k, _)| *k == "stock_status");
            prop_assert_eq!(has_status, !filter.is_all());
        }
    }
}
