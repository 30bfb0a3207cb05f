//! Row types for the SQLite schema
//!
//! Thin `FromRow` structs plus the conversions into the wire-level types
//! from `shared`.

use crate::sync::status::ItemStatus;
use shared::order::{Address, FileMap, LineItemView, ShippingMethod};

/// Mapping row between an external (marketplace) order ID and a local one
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct OrderLink {
    pub external_order_id: String,
    pub local_order_id: i64,
}

/// Local commerce order
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderRow {
    pub id: i64,
    pub status: String,
    pub is_external: bool,

    pub sample: String,
    pub reprint: String,
    pub extra_quality_care: String,
    pub customer_email: String,
    pub shipping_carrier: String,
    pub shipping_priority: String,

    pub billing_address1: String,
    pub billing_address2: String,
    pub billing_city: String,
    pub billing_zip: String,
    pub billing_country: String,
    pub billing_region: String,
    pub billing_first_name: String,
    pub billing_last_name: String,
    pub billing_phone: String,

    pub shipping_address1: String,
    pub shipping_address2: String,
    pub shipping_city: String,
    pub shipping_zip: String,
    pub shipping_country: String,
    pub shipping_region: String,
    pub shipping_company: String,
    pub shipping_email: String,
    pub shipping_phone: String,

    pub total: f64,
    pub created_at: String,
}

impl OrderRow {
    /// "Yes"/"No" meta flag as a boolean
    fn flag(value: &str) -> bool {
        value == "Yes"
    }

    pub fn sample_flag(&self) -> bool {
        Self::flag(&self.sample)
    }

    pub fn reprint_flag(&self) -> bool {
        Self::flag(&self.reprint)
    }

    pub fn xqc_flag(&self) -> bool {
        Self::flag(&self.extra_quality_care)
    }

    /// Billing side as the marketplace `address_to`
    pub fn address_to(&self) -> Address {
        Address {
            address1: Some(self.billing_address1.clone()),
            address2: Some(self.billing_address2.clone()),
            city: Some(self.billing_city.clone()),
            zip: Some(self.billing_zip.clone()),
            country: Some(self.billing_country.clone()),
            region: Some(self.billing_region.clone()),
            first_name: Some(self.billing_first_name.clone()),
            last_name: Some(self.billing_last_name.clone()),
            company: None,
            email: Some(self.customer_email.clone()),
            phone: Some(self.billing_phone.clone()),
        }
    }

    /// Shipping side as the marketplace `address_from`
    pub fn address_from(&self) -> Address {
        Address {
            address1: Some(self.shipping_address1.clone()),
            address2: Some(self.shipping_address2.clone()),
            city: Some(self.shipping_city.clone()),
            zip: Some(self.shipping_zip.clone()),
            country: Some(self.shipping_country.clone()),
            region: Some(self.shipping_region.clone()),
            first_name: None,
            last_name: None,
            company: Some(self.shipping_company.clone()),
            email: Some(self.shipping_email.clone()),
            phone: Some(self.shipping_phone.clone()),
        }
    }

    pub fn shipping_method(&self) -> ShippingMethod {
        ShippingMethod {
            carrier: Some(self.shipping_carrier.clone()),
            priority: Some(self.shipping_priority.clone()),
        }
    }
}

/// Line item of a local order
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderItemRow {
    pub id: i64,
    pub order_id: i64,
    pub external_item_id: String,
    pub product_id: i64,
    pub name: String,
    pub sku: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub subtotal: f64,
    pub total: f64,
    pub status_code: i64,
    pub tracking_number: String,
    pub carrier: String,
    pub notes: String,
    pub print_files: String,
    pub preview_files: String,
}

impl OrderItemRow {
    /// Production status; unknown codes fall back to `Created`
    pub fn status(&self) -> ItemStatus {
        ItemStatus::from_code(self.status_code).unwrap_or(ItemStatus::Created)
    }

    pub fn print_file_map(&self) -> FileMap {
        serde_json::from_str(&self.print_files).unwrap_or_default()
    }

    pub fn preview_file_map(&self) -> FileMap {
        serde_json::from_str(&self.preview_files).unwrap_or_default()
    }

    pub fn to_view(&self) -> LineItemView {
        LineItemView {
            id: self.external_item_id.clone(),
            sku: self.sku.clone(),
            preview_files: self.preview_file_map(),
            print_files: self.print_file_map(),
            quantity: self.quantity,
        }
    }
}

/// One journal record attached to an order
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderNoteRow {
    pub id: i64,
    pub order_id: i64,
    pub content: String,
    pub is_structured: bool,
    pub created_at: String,
}

/// Catalog product
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub sku: String,
    pub name: String,
    pub price: f64,
    pub stock_status: String,
    pub stock_quantity: Option<i64>,
    pub blank_price: String,
    pub processing_fee: String,
    pub printing_price: String,
    pub is_active: bool,
}

impl ProductRow {
    /// Display identity carried on order line items:
    /// the product name with the external item ID embedded.
    pub fn display_name(&self, external_item_id: &str) -> String {
        format!("{} (ID: {})", self.name, external_item_id)
    }
}
