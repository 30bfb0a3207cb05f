//! Product Repository
//!
//! Read-only view over the commerce catalog: SKU resolution for the
//! reconciler plus the stock/pricing projections.

use super::RepoResult;
use crate::db::models::ProductRow;
use shared::catalog::{PricingEntry, PrintingPrice, StockEntry, StockStatus, UNLIMITED_STOCK};
use sqlx::SqliteConnection;

pub struct ProductRepository;

impl ProductRepository {
    /// Resolve a SKU to a sellable product
    pub async fn find_by_sku(
        conn: &mut SqliteConnection,
        sku: &str,
    ) -> RepoResult<Option<ProductRow>> {
        let product = sqlx::query_as::<_, ProductRow>(
            "SELECT * FROM products WHERE sku = ? AND is_active = 1",
        )
        .bind(sku)
        .fetch_optional(conn)
        .await?;
        Ok(product)
    }

    /// All sellable products ordered by SKU
    pub async fn list_active(conn: &mut SqliteConnection) -> RepoResult<Vec<ProductRow>> {
        let products = sqlx::query_as::<_, ProductRow>(
            "SELECT * FROM products WHERE is_active = 1 ORDER BY sku",
        )
        .fetch_all(conn)
        .await?;
        Ok(products)
    }
}

/// Stock projection of one catalog product.
///
/// Commerce stock states map onto the marketplace vocabulary; a missing
/// quantity means tracking is disabled and reports as unlimited.
pub fn stock_entry(product: &ProductRow) -> StockEntry {
    let status = match product.stock_status.as_str() {
        "instock" => StockStatus::InStock,
        "outofstock" => StockStatus::OutOfStock,
        _ => StockStatus::Unknown,
    };
    let stock = match product.stock_quantity {
        Some(quantity) if quantity > 0 => quantity,
        _ => UNLIMITED_STOCK,
    };
    StockEntry { status, stock }
}

/// Pricing projection of one catalog product
pub fn pricing_entry(product: &ProductRow) -> PricingEntry {
    PricingEntry {
        blank: product.blank_price.clone(),
        processing: product.processing_fee.clone(),
        printing: PrintingPrice::all_areas(product.printing_price.clone()),
    }
}
