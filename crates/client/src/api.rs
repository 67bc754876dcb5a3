//! Remote API seams and the JSON shapes exchanged with the backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use nooryx_core::{Barcode, LocationCode, SkuCode};
use nooryx_inventory::{InventoryRow, ListQuery, ListResult, StockStatus};

use crate::error::ApiError;

/// Read access to inventory data.
#[async_trait]
pub trait InventoryApi: Send + Sync {
    /// `GET /inventory` for one page of rows.
    async fn list_inventory(&self, query: &ListQuery) -> Result<ListResult, ApiError>;

    /// `GET /inventory/{sku_code}`, optionally narrowed to one location.
    async fn sku_snapshot(
        &self,
        sku: &SkuCode,
        location: Option<&LocationCode>,
    ) -> Result<SkuSnapshot, ApiError>;

    /// `GET /reports/trend/inventory/{sku_code}`: on-hand quantity over time.
    async fn inventory_trend(
        &self,
        sku: &SkuCode,
        period: TrendPeriod,
        location: Option<&LocationCode>,
    ) -> Result<Vec<TrendPoint>, ApiError>;
}

/// Barcode → SKU registry used by the scanning workflow.
#[async_trait]
pub trait BarcodeRegistry: Send + Sync {
    /// `Ok(None)` when the code is not mapped to any SKU.
    async fn lookup(&self, code: &Barcode) -> Result<Option<SkuMatch>, ApiError>;

    /// Map an unknown code to an existing SKU.
    async fn map_barcode(&self, code: &Barcode, sku: &SkuCode) -> Result<SkuMatch, ApiError>;
}

/// Paged response body of `GET /inventory`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryPage {
    pub items: Vec<InventoryRow>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
    pub pages: u32,
}

impl From<InventoryPage> for ListResult {
    fn from(page: InventoryPage) -> Self {
        ListResult {
            items: page.items,
            total_items: page.total,
            total_pages: page.pages,
            current_page: page.page,
            page_size: page.size,
        }
    }
}

/// Current balance of one SKU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkuSnapshot {
    pub sku_code: SkuCode,
    pub name: String,
    #[serde(default)]
    pub location: Option<LocationCode>,
    pub on_hand: i64,
    #[serde(default)]
    pub reserved: i64,
    pub available: i64,
    pub status: StockStatus,
    #[serde(default)]
    pub last_transaction_timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendPeriod {
    Week,
    Month,
    Quarter,
    Year,
}

impl TrendPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendPeriod::Week => "week",
            TrendPeriod::Month => "month",
            TrendPeriod::Quarter => "quarter",
            TrendPeriod::Year => "year",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub timestamp: DateTime<Utc>,
    pub on_hand: i64,
}

/// Trend endpoint body: either a bare array or wrapped in `points`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum TrendBody {
    Bare(Vec<TrendPoint>),
    Wrapped { points: Vec<TrendPoint> },
}

impl From<TrendBody> for Vec<TrendPoint> {
    fn from(body: TrendBody) -> Self {
        match body {
            TrendBody::Bare(points) | TrendBody::Wrapped { points } => points,
        }
    }
}

/// A barcode resolved to a SKU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkuMatch {
    pub sku_code: SkuCode,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn page_body_maps_to_list_result() {
        let page: InventoryPage = serde_json::from_value(json!({
            "items": [],
            "total": 42,
            "page": 3,
            "size": 10,
            "pages": 5,
        }))
        .unwrap();

        let result = ListResult::from(page);
        assert_eq!(result.total_items, 42);
        assert_eq!(result.total_pages, 5);
        assert_eq!(result.current_page, 3);
        assert!(result.has_next_page());
        assert!(result.has_previous_page());
    }

    #[test]
    fn trend_body_accepts_both_shapes() {
        let point = json!({ "timestamp": "2026-01-01T00:00:00Z", "on_hand": 5 });

        let bare: TrendBody = serde_json::from_value(json!([point.clone()])).unwrap();
        let wrapped: TrendBody = serde_json::from_value(json!({ "points": [point] })).unwrap();

        let bare: Vec<TrendPoint> = bare.into();
        let wrapped: Vec<TrendPoint> = wrapped.into();
        assert_eq!(bare, wrapped);
        assert_eq!(bare[0].on_hand, 5);
    }
}
