//! Mapping between a [`ListQuery`] and shareable URL parameters.
//!
//! Only values that differ from their defaults are written, so a fresh view
//! has an empty query string. Decoding is lenient: unknown keys and values
//! that do not parse are ignored and the default is used instead.

use crate::query::{ListQuery, SortField, SortOrder, StatusFilter};
use crate::row::StockStatus;

/// Defaults that are omitted from the URL.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct UrlDefaults {
    pub page_size: u32,
}

impl Default for UrlDefaults {
    fn default() -> Self {
        Self {
            page_size: crate::query::DEFAULT_PAGE_SIZE,
        }
    }
}

pub const PAGE: &str = "page";
pub const SIZE: &str = "size";
pub const SEARCH: &str = "search";
pub const SORT: &str = "sort";
pub const ORDER: &str = "order";
pub const STATUS: &str = "status";

/// Minimal parameter list for `query`.
pub fn encode(query: &ListQuery, defaults: &UrlDefaults) -> Vec<(String, String)> {
    let mut pairs = Vec::new();

    if query.page_index() > 0 {
        pairs.push((PAGE.to_string(), query.page_number().to_string()));
    }
    if query.page_size() != defaults.page_size {
        pairs.push((SIZE.to_string(), query.page_size().to_string()));
    }
    if !query.search().is_empty() {
        pairs.push((SEARCH.to_string(), query.search().to_string()));
    }
    if let Some(field) = query.sort_field() {
        pairs.push((SORT.to_string(), field.as_str().to_string()));
        if query.sort_order() != SortOrder::Asc {
            pairs.push((ORDER.to_string(), query.sort_order().as_str().to_string()));
        }
    }
    if !query.status_filter().is_all() {
        for status in query.status_filter().iter() {
            pairs.push((STATUS.to_string(), status.as_str().to_string()));
        }
    }

    pairs
}

/// Rebuild a query from URL parameters.
pub fn decode<K, V>(pairs: impl IntoIterator<Item = (K, V)>, defaults: &UrlDefaults) -> ListQuery
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut page_index = 0;
    let mut page_size = defaults.page_size.max(1);
    let mut search = String::new();
    let mut sort_field = None;
    let mut sort_order = SortOrder::Asc;
    let mut statuses = Vec::new();

    for (key, value) in pairs {
        let value = value.as_ref();
        match key.as_ref() {
            PAGE => {
                if let Some(page) = value.parse::<u32>().ok().filter(|p| *p >= 1) {
                    page_index = page - 1;
                }
            }
            SIZE => {
                if let Some(size) = value.parse::<u32>().ok().filter(|s| *s >= 1) {
                    page_size = size;
                }
            }
            SEARCH => search = value.to_string(),
            SORT => sort_field = SortField::parse(value),
            ORDER => sort_order = SortOrder::parse(value).unwrap_or_default(),
            STATUS => statuses.extend(StockStatus::parse(value)),
            _ => {}
        }
    }

    let sort = sort_field.map(|f| (f, sort_order));
    ListQuery::from_parts(page_index, page_size, search, sort, StatusFilter::only(statuses))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_query_has_no_parameters() {
        assert!(encode(&ListQuery::default(), &UrlDefaults::default()).is_empty());
    }

    #[test]
    fn non_default_size_is_relative_to_configured_default() {
        let defaults = UrlDefaults { page_size: 25 };
        let q = ListQuery::new(25).unwrap();
        assert!(encode(&q, &defaults).is_empty());

        let pairs = encode(&ListQuery::default(), &defaults);
        assert_eq!(pairs, vec![("size".to_string(), "10".to_string())]);
    }

    #[test]
    fn decode_ignores_garbage() {
        let q = decode(
            [("page", "zero"), ("size", "0"), ("sort", "colour"), ("status", "Lost"), ("x", "1")],
            &UrlDefaults::default(),
        );
        assert_eq!(q, ListQuery::default());
    }

    #[test]
    fn decode_reads_repeated_status() {
        let q = decode(
            [("status", "Low Stock"), ("status", "Out of Stock"), ("page", "3")],
            &UrlDefaults::default(),
        );
        assert_eq!(q.page_index(), 2);
        assert!(q.status_filter().contains(StockStatus::LowStock));
        assert!(!q.status_filter().contains(StockStatus::InStock));
    }

    #[test]
    fn order_without_sort_is_dropped() {
        let q = decode([("order", "desc")], &UrlDefaults::default());
        assert_eq!(q.sort_field(), None);
        assert_eq!(q.sort_order(), SortOrder::Asc);
    }

    #[test]
    fn last_page_survives_the_url() {
        let mut q = ListQuery::default();
        q.set_page(u32::MAX);
        let pairs = encode(&q, &UrlDefaults::default());
        assert_eq!(pairs, vec![("page".to_string(), u32::MAX.to_string())]);
        assert_eq!(decode(pairs, &UrlDefaults::default()), q);
    }

    fn arb_query() -> impl Strategy<Value = ListQuery> {
        (
            0u32..1000,
            1u32..200,
            "[a-zA-Z0-9 &=%+-]{0,16}",
            prop::option::of((
                prop::sample::select(SortField::ALL.to_vec()),
                prop::sample::select(vec![SortOrder::Asc, SortOrder::Desc]),
            )),
            prop::collection::vec(prop::sample::select(StockStatus::ALL.to_vec()), 0..4),
        )
            .prop_map(|(page, size, search, sort, statuses)| {
                ListQuery::from_parts(page, size, search, sort, StatusFilter::only(statuses))
                    .unwrap()
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 512,
            ..ProptestConfig::default()
        })]

        /// Property: encode followed by decode yields the same query.
        #[test]
        fn url_round_trip(query in arb_query(), default_size in 1u32..200) {
            let defaults = UrlDefaults { page_size: default_size };
            let decoded = decode(encode(&query, &defaults), &defaults);
            prop_assert_eq!(decoded, query);
        }
    }
}
