use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use nooryx_core::{LocationCode, SkuCode};

/// Stock level classification computed by the backend.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StockStatus {
    #[serde(rename = "In Stock")]
    InStock,
    #[serde(rename = "Low Stock")]
    LowStock,
    #[serde(rename = "Out of Stock")]
    OutOfStock,
}

impl StockStatus {
    pub const ALL: [StockStatus; 3] = [
        StockStatus::InStock,
        StockStatus::LowStock,
        StockStatus::OutOfStock,
    ];

    /// Wire value, used both in API parameters and URL state.
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::InStock => "In Stock",
            StockStatus::LowStock => "Low Stock",
            StockStatus::OutOfStock => "Out of Stock",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}

impl core::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the inventory table (read-only projection of a SKU at a location).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRow {
    pub sku_code: SkuCode,
    pub name: String,
    pub location: LocationCode,
    pub available_quantity: i64,
    #[serde(default)]
    pub last_transaction_timestamp: Option<DateTime<Utc>>,
    pub status: StockStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_uses_display_labels_on_the_wire() {
        let json = serde_json::to_string(&StockStatus::OutOfStock).unwrap();
        assert_eq!(json, "\"Out of Stock\"");
        assert_eq!(StockStatus::parse("Low Stock"), Some(StockStatus::LowStock));
        assert_eq!(StockStatus::parse("low"), None);
    }

    #[test]
    fn row_deserializes_without_timestamp() {
        let row: InventoryRow = serde_json::from_value(serde_json::json!({
            "sku_code": "WID-001",
            "name": "Widget",
            "location": "WH-1",
            "available_quantity": 12,
            "status": "In Stock",
        }))
        .unwrap();

        assert_eq!(row.sku_code.as_str(), "WID-001");
        assert_eq!(row.last_transaction_timestamp, None);
        assert_eq!(row.status, StockStatus::InStock);
    }
}
