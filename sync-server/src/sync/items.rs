//! Line-item reconciliation
//!
//! Applies an incoming item-level change set against the existing line
//! items of an order. The reconciler only stages changes; the mutation
//! engine persists them when, and only when, the whole request is clean.

use crate::db::models::{OrderItemRow, ProductRow};
use shared::order::{FieldError, FieldErrorCode, FileMap, ItemUpdate};
use std::collections::HashMap;

/// Replacement of the item's linked catalog product
#[derive(Debug, Clone, PartialEq)]
pub struct StagedSwap {
    pub product_id: i64,
    pub sku: String,
    /// Recomputed display identity ("<name> (ID: <id>)")
    pub name: String,
    pub unit_price: f64,
    pub quantity: i64,
}

/// Pending changes for one existing line item
#[derive(Debug, Clone, Default)]
pub struct StagedItem {
    pub item_row_id: i64,
    pub swap: Option<StagedSwap>,
    /// (print, preview) — always replaced together
    pub files: Option<(FileMap, FileMap)>,
    /// New quantity; only set when no swap carries it already
    pub quantity: Option<i64>,
}

impl StagedItem {
    fn is_noop(&self) -> bool {
        self.swap.is_none() && self.files.is_none() && self.quantity.is_none()
    }
}

/// Result of reconciling one items change set
#[derive(Debug, Default)]
pub struct ReconcileOutcome {
    pub staged: Vec<StagedItem>,
    /// Field labels for the audit note, in application order
    pub updated_fields: Vec<&'static str>,
    pub errors: Vec<FieldError>,
}

/// Reconcile the requested item changes against the existing line items.
///
/// Precondition: every requested external item ID must already exist in
/// the order; a single unknown ID fails the whole change set. Field
/// errors are accumulated across all items — the caller rejects the
/// entire update when any are present.
pub fn reconcile(
    existing: &[OrderItemRow],
    requested: &[ItemUpdate],
    catalog: &HashMap<String, ProductRow>,
) -> ReconcileOutcome {
    let mut outcome = ReconcileOutcome::default();

    // 1. Subset precondition: unknown IDs void the request
    for update in requested {
        if !existing.iter().any(|i| i.external_item_id == update.id) {
            outcome.errors.push(FieldError::new(
                "items",
                FieldErrorCode::UnknownLineItem,
                format!("Item ID {} does not exist in the order", update.id),
            ));
        }
    }
    if !outcome.errors.is_empty() {
        return outcome;
    }

    // 2. Per-item staging
    for update in requested {
        let item = existing
            .iter()
            .find(|i| i.external_item_id == update.id)
            .expect("checked above");
        let mut staged = StagedItem {
            item_row_id: item.id,
            ..Default::default()
        };

        // SKU swap: must resolve in the catalog and actually differ
        if let Some(sku) = &update.sku {
            match catalog.get(sku) {
                None => {
                    outcome.errors.push(FieldError::new(
                        "sku",
                        FieldErrorCode::SkuNotFound,
                        format!("Product SKU: {} does not exist", sku),
                    ));
                }
                Some(product) if *sku != item.sku => {
                    staged.swap = Some(StagedSwap {
                        product_id: product.id,
                        sku: sku.clone(),
                        name: product.display_name(&item.external_item_id),
                        unit_price: product.price,
                        quantity: update.quantity.unwrap_or(item.quantity),
                    });
                    outcome.updated_fields.push("SKU");
                }
                Some(_) => {}
            }
        }

        // Files: print and preview must travel together
        match (&update.print_files, &update.preview_files) {
            (Some(print), Some(preview)) => {
                staged.files = Some((print.clone(), preview.clone()));
                outcome.updated_fields.push("Print and Preview files");
            }
            (None, None) => {}
            _ => {
                outcome.errors.push(FieldError::new(
                    "item",
                    FieldErrorCode::IncompleteFileSet,
                    format!(
                        "Update request for item {} did not include both Preview and Print files",
                        update.id
                    ),
                ));
            }
        }

        // Quantity: must be positive and actually differ
        if let Some(quantity) = update.quantity {
            if quantity != item.quantity {
                if quantity > 0 {
                    if staged.swap.is_none() {
                        staged.quantity = Some(quantity);
                    }
                    outcome.updated_fields.push("Item quantity");
                } else {
                    outcome.errors.push(FieldError::new(
                        "item.quantity",
                        FieldErrorCode::InvalidQuantity,
                        format!(
                            "Item quantity value must be greater than 0. Line item: {}",
                            update.id
                        ),
                    ));
                }
            }
        }

        if !staged.is_noop() {
            outcome.staged.push(staged);
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(row_id: i64, external_id: &str, sku: &str, quantity: i64) -> OrderItemRow {
        OrderItemRow {
            id: row_id,
            order_id: 1,
            external_item_id: external_id.to_string(),
            product_id: 1,
            name: format!("Tee (ID: {})", external_id),
            sku: sku.to_string(),
            quantity,
            unit_price: 10.0,
            subtotal: 10.0 * quantity as f64,
            total: 10.0 * quantity as f64,
            status_code: 0,
            tracking_number: String::new(),
            carrier: String::new(),
            notes: String::new(),
            print_files: "{}".to_string(),
            preview_files: "{}".to_string(),
        }
    }

    fn product(id: i64, sku: &str, price: f64) -> ProductRow {
        ProductRow {
            id,
            sku: sku.to_string(),
            name: "Tee".to_string(),
            price,
            stock_status: "instock".to_string(),
            stock_quantity: None,
            blank_price: String::new(),
            processing_fee: String::new(),
            printing_price: String::new(),
            is_active: true,
        }
    }

    fn catalog(products: Vec<ProductRow>) -> HashMap<String, ProductRow> {
        products.into_iter().map(|p| (p.sku.clone(), p)).collect()
    }

    fn files(label: &str) -> FileMap {
        let mut map = FileMap::new();
        map.insert(label.to_string(), format!("https://x/{label}.png"));
        map
    }

    #[test]
    fn test_unknown_item_id_voids_whole_request() {
        let existing = vec![item(1, "i-1", "TEE-M", 1)];
        let requested = vec![
            ItemUpdate {
                id: "i-1".to_string(),
                quantity: Some(5),
                ..Default::default()
            },
            ItemUpdate {
                id: "ghost".to_string(),
                quantity: Some(2),
                ..Default::default()
            },
        ];

        let outcome = reconcile(&existing, &requested, &HashMap::new());
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].code, FieldErrorCode::UnknownLineItem);
        // nothing staged, not even the valid item
        assert!(outcome.staged.is_empty());
        assert!(outcome.updated_fields.is_empty());
    }

    #[test]
    fn test_sku_swap_staged_with_new_identity() {
        let existing = vec![item(7, "i-1", "TEE-M", 2)];
        let requested = vec![ItemUpdate {
            id: "i-1".to_string(),
            sku: Some("TEE-XL".to_string()),
            ..Default::default()
        }];
        let catalog = catalog(vec![product(99, "TEE-XL", 14.0)]);

        let outcome = reconcile(&existing, &requested, &catalog);
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.updated_fields, vec!["SKU"]);

        let swap = outcome.staged[0].swap.as_ref().unwrap();
        assert_eq!(swap.product_id, 99);
        assert_eq!(swap.name, "Tee (ID: i-1)");
        assert_eq!(swap.unit_price, 14.0);
        // quantity carried over from the existing item
        assert_eq!(swap.quantity, 2);
    }

    #[test]
    fn test_sku_swap_to_same_sku_is_noop() {
        let existing = vec![item(7, "i-1", "TEE-M", 2)];
        let requested = vec![ItemUpdate {
            id: "i-1".to_string(),
            sku: Some("TEE-M".to_string()),
            ..Default::default()
        }];
        let catalog = catalog(vec![product(1, "TEE-M", 10.0)]);

        let outcome = reconcile(&existing, &requested, &catalog);
        assert!(outcome.errors.is_empty());
        assert!(outcome.staged.is_empty());
    }

    #[test]
    fn test_unresolvable_sku_is_recorded() {
        let existing = vec![item(7, "i-1", "TEE-M", 2)];
        let requested = vec![ItemUpdate {
            id: "i-1".to_string(),
            sku: Some("GHOST".to_string()),
            quantity: Some(3),
            ..Default::default()
        }];

        let outcome = reconcile(&existing, &requested, &HashMap::new());
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].code, FieldErrorCode::SkuNotFound);
        // the quantity change is still staged; the caller decides whether
        // the accumulated errors void it
        assert_eq!(outcome.staged[0].quantity, Some(3));
    }

    #[test]
    fn test_files_must_travel_together() {
        let existing = vec![item(7, "i-1", "TEE-M", 2)];

        let requested = vec![ItemUpdate {
            id: "i-1".to_string(),
            print_files: Some(files("front")),
            ..Default::default()
        }];
        let outcome = reconcile(&existing, &requested, &HashMap::new());
        assert_eq!(outcome.errors[0].code, FieldErrorCode::IncompleteFileSet);

        let requested = vec![ItemUpdate {
            id: "i-1".to_string(),
            print_files: Some(files("front")),
            preview_files: Some(files("preview")),
            ..Default::default()
        }];
        let outcome = reconcile(&existing, &requested, &HashMap::new());
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.updated_fields, vec!["Print and Preview files"]);
        assert!(outcome.staged[0].files.is_some());
    }

    #[test]
    fn test_quantity_rules() {
        let existing = vec![item(7, "i-1", "TEE-M", 2)];

        // unchanged quantity is not an update
        let outcome = reconcile(
            &existing,
            &[ItemUpdate {
                id: "i-1".to_string(),
                quantity: Some(2),
                ..Default::default()
            }],
            &HashMap::new(),
        );
        assert!(outcome.staged.is_empty());
        assert!(outcome.errors.is_empty());

        // zero is invalid
        let outcome = reconcile(
            &existing,
            &[ItemUpdate {
                id: "i-1".to_string(),
                quantity: Some(0),
                ..Default::default()
            }],
            &HashMap::new(),
        );
        assert_eq!(outcome.errors[0].code, FieldErrorCode::InvalidQuantity);

        // a real change stages
        let outcome = reconcile(
            &existing,
            &[ItemUpdate {
                id: "i-1".to_string(),
                quantity: Some(5),
                ..Default::default()
            }],
            &HashMap::new(),
        );
        assert_eq!(outcome.staged[0].quantity, Some(5));
        assert_eq!(outcome.updated_fields, vec!["Item quantity"]);
    }

    #[test]
    fn test_swap_absorbs_quantity_change() {
        let existing = vec![item(7, "i-1", "TEE-M", 2)];
        let requested = vec![ItemUpdate {
            id: "i-1".to_string(),
            sku: Some("TEE-XL".to_string()),
            quantity: Some(4),
            ..Default::default()
        }];
        let catalog = catalog(vec![product(99, "TEE-XL", 14.0)]);

        let outcome = reconcile(&existing, &requested, &catalog);
        let staged = &outcome.staged[0];
        assert_eq!(staged.swap.as_ref().unwrap().quantity, 4);
        assert!(staged.quantity.is_none());
        assert_eq!(outcome.updated_fields, vec!["SKU", "Item quantity"]);
    }
}
