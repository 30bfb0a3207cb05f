//! Typed request payloads for the marketplace protocol
//!
//! Every updatable field is an explicit `Option`: a field absent from the
//! payload is not a change request for that field. This replaces the
//! duck-typed body probing of earlier integrations with a schema that is
//! validated before use.

use super::types::{Address, FileMap, ShippingMethod};
use serde::{Deserialize, Serialize};

/// POST /orders.json body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateOrderRequest {
    /// External (marketplace) order ID, unique, at most 35 characters
    pub id: String,
    pub sample: Option<bool>,
    pub reprint: Option<bool>,
    /// Extra quality care flag
    pub xqc: Option<bool>,
    pub address_to: Option<Address>,
    pub address_from: Option<Address>,
    pub shipping: Option<ShippingMethod>,
    pub items: Option<Vec<NewItemPayload>>,
}

/// One line item inside a create request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewItemPayload {
    /// External line item ID
    pub id: String,
    pub sku: String,
    pub quantity: i64,
    pub print_files: FileMap,
    pub preview_files: FileMap,
}

/// PUT /order/{external_id}.json body — partial update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateOrderRequest {
    /// New external order ID (rebind) — never gated by production state
    pub id: Option<String>,
    pub sample: Option<bool>,
    pub reprint: Option<bool>,
    pub xqc: Option<bool>,
    pub address_to: Option<Address>,
    pub address_from: Option<Address>,
    pub shipping: Option<ShippingMethod>,
    pub items: Option<Vec<ItemUpdate>>,
}

impl UpdateOrderRequest {
    /// True when the payload proposes no change at all
    pub fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.sample.is_none()
            && self.reprint.is_none()
            && self.xqc.is_none()
            && self.address_to.is_none()
            && self.address_from.is_none()
            && self.shipping.is_none()
            && self.items.is_none()
    }
}

/// Item-level change set inside an update request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemUpdate {
    /// External line item ID — must already exist in the order
    pub id: String,
    pub sku: Option<String>,
    pub quantity: Option<i64>,
    /// Print artwork; must be supplied together with `preview_files`
    pub print_files: Option<FileMap>,
    /// Preview artwork; must be supplied together with `print_files`
    pub preview_files: Option<FileMap>,
}

/// POST /order/{external_id}/cancel.json body
///
/// An absent/empty item list means "cancel every item in the order".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CancelRequest {
    pub items: Option<Vec<String>>,
    /// Cancellation reason, recorded on the internal audit note
    pub note: Option<String>,
}

/// PUT /internal/orders/{local_id}/items body — merchant-side progress
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemProgressRequest {
    pub items: Vec<ItemProgressUpdate>,
}

/// Merchant-side change to one line item's production state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemProgressUpdate {
    /// External line item ID
    pub id: String,
    /// New status as a wire ordinal into the status vocabulary
    pub status: Option<i64>,
    pub tracking_number: Option<String>,
    pub carrier: Option<String>,
    pub notes: Option<String>,
}
