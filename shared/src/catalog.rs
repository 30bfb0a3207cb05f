//! Catalog projections: stock levels and custom pricing
//!
//! Read-only views over the product catalog served to the marketplace's
//! stock and pricing pollers.

use serde::{Deserialize, Serialize};

/// Quantity reported for products with stock tracking disabled
pub const UNLIMITED_STOCK: i64 = 99999;

/// Stock availability bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockStatus {
    #[serde(rename = "in-stock")]
    InStock,
    #[serde(rename = "out-of-stock")]
    OutOfStock,
    #[serde(rename = "unknown")]
    Unknown,
}

/// Stock projection for one SKU
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockEntry {
    pub status: StockStatus,
    pub stock: i64,
}

/// Pricing projection for one SKU
///
/// Prices are free-form strings in USD cents, exactly as the merchant
/// entered them in the catalog admin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingEntry {
    /// Price for a blank product without print
    pub blank: String,
    /// Processing fee for the item
    pub processing: String,
    pub printing: PrintingPrice,
}

/// Printing price, divisible by printed area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintingPrice {
    pub areas: Vec<String>,
    pub price: String,
}

impl PrintingPrice {
    /// Single price covering all printable areas
    pub fn all_areas(price: impl Into<String>) -> Self {
        Self {
            areas: vec!["all".to_string()],
            price: price.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&StockStatus::InStock).unwrap(),
            "\"in-stock\""
        );
        assert_eq!(
            serde_json::to_string(&StockStatus::OutOfStock).unwrap(),
            "\"out-of-stock\""
        );
        assert_eq!(
            serde_json::to_string(&StockStatus::Unknown).unwrap(),
            "\"unknown\""
        );
    }

    #[test]
    fn test_pricing_entry_shape() {
        let entry = PricingEntry {
            blank: "450".to_string(),
            processing: "0".to_string(),
            printing: PrintingPrice::all_areas("120"),
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"printing\":{\"areas\":[\"all\"],\"price\":\"120\"}"));
    }
}
