//! Shared order primitives
//!
//! Addresses, file maps and field-level error descriptors used by both
//! the request and response sides of the protocol.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered `label → url` map carrying print or preview artwork.
///
/// Insertion order is part of the contract: the marketplace sends files
/// in print order and expects them back the same way.
pub type FileMap = IndexMap<String, String>;

/// Postal address as exchanged with the marketplace.
///
/// `address_to` is the end customer (billing side of the local order),
/// `address_from` is the merchant's own location (shipping side).
/// All fields are optional at the schema level so that validation can
/// accumulate every missing field instead of failing on the first one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Shipping method requested by the marketplace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingMethod {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carrier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

/// Machine-checkable code attached to a field-level error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorCode {
    /// Required field missing from the payload
    Required,
    /// Production state forbids changing this field
    OrderLocked,
    /// Proposed external order ID already taken
    DuplicateId,
    /// SKU does not resolve to a sellable product
    SkuNotFound,
    /// Only one of print/preview file sets supplied
    IncompleteFileSet,
    /// Quantity must be greater than zero
    InvalidQuantity,
    /// Referenced line item does not exist in the order
    UnknownLineItem,
    /// Anything else
    Other,
}

/// One field-level error inside a rejected request.
///
/// Field errors are accumulated — a response carries every problem found,
/// not just the first one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    pub code: FieldErrorCode,
}

impl FieldError {
    pub fn new(
        field: impl Into<String>,
        code: FieldErrorCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code,
        }
    }

    /// Shorthand for a missing required field
    pub fn required(field: impl Into<String>) -> Self {
        Self::new(field, FieldErrorCode::Required, "Was not provided")
    }
}

/// Line item as returned in the order snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItemView {
    pub id: String,
    pub sku: String,
    pub preview_files: FileMap,
    pub print_files: FileMap,
    pub quantity: i64,
}

/// Full order snapshot returned by the GET endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderView {
    /// External (marketplace) order ID
    pub id: String,
    /// Local order ID, stringified
    pub reference_id: String,
    pub sample: bool,
    pub reprint: bool,
    pub xqc: bool,
    pub address_to: Address,
    pub address_from: Address,
    pub shipping: ShippingMethod,
    pub items: Vec<LineItemView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_partial_deserialization() {
        let addr: Address =
            serde_json::from_str(r#"{"address1":"Main St 1","city":"Riga"}"#).unwrap();
        assert_eq!(addr.address1.as_deref(), Some("Main St 1"));
        assert_eq!(addr.city.as_deref(), Some("Riga"));
        assert!(addr.zip.is_none());
        assert!(addr.company.is_none());
    }

    #[test]
    fn test_field_error_code_wire_names() {
        let err = FieldError::new("sku", FieldErrorCode::SkuNotFound, "no such product");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"code\":\"sku_not_found\""));
    }

    #[test]
    fn test_file_map_preserves_insertion_order() {
        let mut files = FileMap::new();
        files.insert("front".to_string(), "https://x/front.png".to_string());
        files.insert("back".to_string(), "https://x/back.png".to_string());
        files.insert("sleeve".to_string(), "https://x/sleeve.png".to_string());

        let json = serde_json::to_string(&files).unwrap();
        let front = json.find("front").unwrap();
        let back = json.find("back").unwrap();
        let sleeve = json.find("sleeve").unwrap();
        assert!(front < back && back < sleeve);
    }
}
