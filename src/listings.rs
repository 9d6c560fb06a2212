//! Listing query engine
//!
//! Deterministically transforms the property collection plus a query
//! into a page of results and pagination metadata. Filters run first,
//! then the stable sort, then pagination; ties keep the seeded
//! collection order.

use std::cmp::Ordering;
use std::sync::Arc;

use serde::Deserialize;

use crate::models::{Pagination, PropertyListing, SizeBucket, SortKey};
use crate::store::ListingStore;

/// Raw query parameters as they arrive on the wire
///
/// Everything is optional and text; malformed numeric values fall back
/// to defaults instead of producing an HTTP error.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LandsQueryParams {
    pub search: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub size: Option<String>,
    pub location: Option<String>,
    pub sort_by: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Normalized listing query
#[derive(Debug, Clone, PartialEq)]
pub struct ListingQuery {
    pub page: usize,
    pub limit: usize,
    pub search: String,
    pub min_price: i64,
    pub max_price: i64,
    pub size: SizeBucket,
    pub location: String,
    pub sort_by: SortKey,
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 6,
            search: String::new(),
            min_price: 0,
            max_price: 1_000_000,
            size: SizeBucket::Any,
            location: "any".to_string(),
            sort_by: SortKey::Newest,
        }
    }
}

impl ListingQuery {
    pub fn from_params(params: &LandsQueryParams) -> Self {
        let defaults = Self::default();
        Self {
            page: parse_or(&params.page, defaults.page).max(1),
            limit: parse_or(&params.limit, defaults.limit).max(1),
            search: params.search.clone().unwrap_or_default(),
            min_price: parse_or(&params.min_price, defaults.min_price),
            max_price: parse_or(&params.max_price, defaults.max_price),
            size: params
                .size
                .as_deref()
                .map(SizeBucket::parse)
                .unwrap_or_default(),
            location: params.location.clone().unwrap_or_else(|| defaults.location.clone()),
            sort_by: params
                .sort_by
                .as_deref()
                .map(SortKey::parse)
                .unwrap_or_default(),
        }
    }
}

fn parse_or<T: std::str::FromStr>(value: &Option<String>, default: T) -> T {
    value
        .as_deref()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// One page of query results
#[derive(Debug, Clone)]
pub struct QueryResult {
    pub items: Vec<PropertyListing>,
    pub pagination: Pagination,
}

/// Listing service backed by the injected store
pub struct ListingService {
    store: Arc<dyn ListingStore>,
}

impl ListingService {
    pub fn new(store: Arc<dyn ListingStore>) -> Self {
        Self { store }
    }

    /// Run a query against the full collection.
    ///
    /// No input combination is an error: an inverted price range or a
    /// page past the end both yield an empty page.
    pub fn search(&self, query: &ListingQuery) -> QueryResult {
        run_query(&self.store.list(), query)
    }

    pub fn get(&self, id: u64) -> Option<PropertyListing> {
        self.store.get(id)
    }
}

/// Filter, sort and paginate a collection.
pub fn run_query(listings: &[PropertyListing], query: &ListingQuery) -> QueryResult {
    let search = query.search.to_lowercase();
    let location = query.location.to_lowercase();

    let mut filtered: Vec<&PropertyListing> = listings
        .iter()
        .filter(|l| {
            search.is_empty()
                || l.title.to_lowercase().contains(&search)
                || l.location.to_lowercase().contains(&search)
        })
        .filter(|l| l.price >= query.min_price && l.price <= query.max_price)
        .filter(|l| query.size.contains(l.size_value))
        .filter(|l| location == "any" || l.location.to_lowercase().contains(&location))
        .collect();

    // Stable sort keeps the original collection order for equal keys.
    match query.sort_by {
        SortKey::Newest => filtered.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortKey::PriceAsc => filtered.sort_by(|a, b| a.price.cmp(&b.price)),
        SortKey::PriceDesc => filtered.sort_by(|a, b| b.price.cmp(&a.price)),
        SortKey::SizeAsc => filtered.sort_by(|a, b| cmp_f64(a.size_value, b.size_value)),
        SortKey::SizeDesc => filtered.sort_by(|a, b| cmp_f64(b.size_value, a.size_value)),
    }

    let total = filtered.len();
    let total_pages = total.div_ceil(query.limit);
    // Saturate the offset so an absurd page number from the wire stays
    // an empty page instead of overflowing.
    let offset = (query.page - 1).saturating_mul(query.limit);
    let items = filtered
        .into_iter()
        .skip(offset)
        .take(query.limit)
        .cloned()
        .collect();

    QueryResult {
        items,
        pagination: Pagination {
            total,
            page: query.page,
            limit: query.limit,
            total_pages,
        },
    }
}

fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn listing(id: u64, title: &str, location: &str, price: i64, size_value: f64, days_ago: i64) -> PropertyListing {
        let base = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        PropertyListing {
            id,
            title: title.to_string(),
            location: location.to_string(),
            price,
            size: format!("{size_value} m²"),
            size_value,
            created_at: base - Duration::days(days_ago),
        }
    }

    fn sample() -> Vec<PropertyListing> {
        vec![
            listing(1, "Sunrise Valley Plot", "Riverside", 250_000, 500.0, 3),
            listing(2, "Cedar Hill Parcel", "Northgate", 180_000, 450.0, 12),
            listing(3, "Lakeview Estate Land", "Riverside", 320_000, 600.0, 7),
        ]
    }

    fn ids(result: &QueryResult) -> Vec<u64> {
        result.items.iter().map(|l| l.id).collect()
    }

    #[test]
    fn price_range_is_inclusive_on_both_ends() {
        let query = ListingQuery {
            min_price: 200_000,
            max_price: 300_000,
            ..Default::default()
        };
        let result = run_query(&sample(), &query);
        assert_eq!(ids(&result), vec![1]);
        assert_eq!(result.pagination.total, 1);

        let exact = ListingQuery {
            min_price: 250_000,
            max_price: 250_000,
            ..Default::default()
        };
        assert_eq!(ids(&run_query(&sample(), &exact)), vec![1]);
    }

    #[test]
    fn inverted_price_range_yields_empty_not_error() {
        let query = ListingQuery {
            min_price: 300_000,
            max_price: 200_000,
            ..Default::default()
        };
        let result = run_query(&sample(), &query);
        assert!(result.items.is_empty());
        assert_eq!(result.pagination.total, 0);
        assert_eq!(result.pagination.total_pages, 0);
    }

    #[test]
    fn large_bucket_excludes_its_lower_neighbor() {
        // large = [500, 1000): 500 and 600 pass, 450 does not
        let query = ListingQuery {
            size: SizeBucket::Large,
            sort_by: SortKey::SizeAsc,
            ..Default::default()
        };
        let result = run_query(&sample(), &query);
        assert_eq!(ids(&result), vec![1, 3]);
    }

    #[test]
    fn search_matches_title_or_location_case_insensitively() {
        let by_title = ListingQuery {
            search: "cedar".to_string(),
            ..Default::default()
        };
        assert_eq!(ids(&run_query(&sample(), &by_title)), vec![2]);

        let by_location = ListingQuery {
            search: "RIVERSIDE".to_string(),
            ..Default::default()
        };
        assert_eq!(run_query(&sample(), &by_location).pagination.total, 2);
    }

    #[test]
    fn location_any_disables_the_filter() {
        let query = ListingQuery::default();
        assert_eq!(run_query(&sample(), &query).pagination.total, 3);

        let scoped = ListingQuery {
            location: "Riverside".to_string(),
            ..Default::default()
        };
        assert_eq!(run_query(&sample(), &scoped).pagination.total, 2);
    }

    #[test]
    fn newest_sort_is_default_and_descending() {
        let result = run_query(&sample(), &ListingQuery::default());
        assert_eq!(ids(&result), vec![1, 3, 2]);
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        let mut listings = sample();
        listings.push(listing(4, "Twin Plot", "Eastport", 250_000, 500.0, 40));
        let query = ListingQuery {
            sort_by: SortKey::PriceAsc,
            ..Default::default()
        };
        let first = run_query(&listings, &query);
        let second = run_query(&listings, &query);
        // equal prices (ids 1 and 4) keep collection order, every run
        assert_eq!(ids(&first), vec![2, 1, 4, 3]);
        assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn total_is_independent_of_page_and_limit() {
        let query = ListingQuery {
            limit: 2,
            page: 2,
            ..Default::default()
        };
        let result = run_query(&sample(), &query);
        assert_eq!(result.pagination.total, 3);
        assert_eq!(result.pagination.total_pages, 2);
        assert_eq!(result.items.len(), 1);
    }

    #[test]
    fn page_past_the_end_is_empty_not_an_error() {
        let query = ListingQuery {
            page: 9,
            ..Default::default()
        };
        let result = run_query(&sample(), &query);
        assert!(result.items.is_empty());
        assert_eq!(result.pagination.total, 3);
    }

    #[test]
    fn huge_page_number_still_yields_an_empty_page() {
        let query = ListingQuery {
            page: usize::MAX,
            ..Default::default()
        };
        let result = run_query(&sample(), &query);
        assert!(result.items.is_empty());
        assert_eq!(result.pagination.total, 3);
    }

    #[test]
    fn malformed_params_fall_back_to_defaults() {
        let params = LandsQueryParams {
            min_price: Some("abc".to_string()),
            max_price: Some("".to_string()),
            page: Some("-2".to_string()),
            limit: Some("0".to_string()),
            size: Some("gigantic".to_string()),
            sort_by: Some("bogus".to_string()),
            ..Default::default()
        };
        let query = ListingQuery::from_params(&params);
        assert_eq!(query.min_price, 0);
        assert_eq!(query.max_price, 1_000_000);
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 1);
        assert_eq!(query.size, SizeBucket::Any);
        assert_eq!(query.sort_by, SortKey::Newest);
    }
}
