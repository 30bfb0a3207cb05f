//! Line-item status vocabulary and mutability gates
//!
//! Statuses are a stable enum; the wire contract stays positional, so
//! `code()` ordinals match the original status vocabulary
//! (Created = 0 ... Canceled = 8) and must never be reordered.

use shared::order::{FieldError, FieldErrorCode};
use std::fmt;

/// Production status of one line item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemStatus {
    Created,
    Picked,
    Printed,
    Packaged,
    Reprint,
    XUpdates,
    OnHold,
    Shipped,
    Canceled,
}

impl ItemStatus {
    /// Every status in wire-ordinal order. This is also the rollup scan
    /// order: later entries take precedence.
    pub const ALL: [ItemStatus; 9] = [
        ItemStatus::Created,
        ItemStatus::Picked,
        ItemStatus::Printed,
        ItemStatus::Packaged,
        ItemStatus::Reprint,
        ItemStatus::XUpdates,
        ItemStatus::OnHold,
        ItemStatus::Shipped,
        ItemStatus::Canceled,
    ];

    /// Positional wire ordinal
    pub fn code(self) -> i64 {
        Self::ALL.iter().position(|s| *s == self).unwrap_or(0) as i64
    }

    /// Decode a wire ordinal
    pub fn from_code(code: i64) -> Option<ItemStatus> {
        usize::try_from(code).ok().and_then(|i| Self::ALL.get(i).copied())
    }

    /// Lowercase vocabulary name as used on the wire
    pub fn name(self) -> &'static str {
        match self {
            ItemStatus::Created => "created",
            ItemStatus::Picked => "picked",
            ItemStatus::Printed => "printed",
            ItemStatus::Packaged => "packaged",
            ItemStatus::Reprint => "reprint",
            ItemStatus::XUpdates => "x-updates",
            ItemStatus::OnHold => "on hold",
            ItemStatus::Shipped => "shipped",
            ItemStatus::Canceled => "canceled",
        }
    }

    /// Member of the frozen IN_PRODUCTION set: the item has been taken
    /// into production and production-sensitive fields are locked.
    pub fn in_production(self) -> bool {
        matches!(
            self,
            ItemStatus::Picked
                | ItemStatus::Printed
                | ItemStatus::Packaged
                | ItemStatus::Reprint
                | ItemStatus::XUpdates
                | ItemStatus::OnHold
                | ItemStatus::Shipped
                | ItemStatus::Canceled
        )
    }

    /// Member of the frozen FULFILLED set: packaged or shipped
    pub fn is_fulfilled(self) -> bool {
        matches!(self, ItemStatus::Packaged | ItemStatus::Shipped)
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whole-order rollup over the items' statuses.
///
/// Fixed precedence scan: every status present is considered in
/// [`ItemStatus::ALL`] order and the last match wins, so `canceled`
/// overrides everything else. Defaults to `created` for an order with
/// no recognizable statuses.
pub fn rollup(statuses: &[ItemStatus]) -> ItemStatus {
    let mut result = ItemStatus::Created;
    for candidate in ItemStatus::ALL {
        if statuses.contains(&candidate) {
            result = candidate;
        }
    }
    result
}

/// Reason a line item cannot be canceled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelBlock {
    AlreadyCanceled,
    Fulfilled,
    InProduction,
}

/// Cancellation eligibility of one item, checked in priority order:
/// already canceled, then fulfilled, then any other production state.
pub fn cancel_block(status: ItemStatus) -> Option<CancelBlock> {
    if status == ItemStatus::Canceled {
        Some(CancelBlock::AlreadyCanceled)
    } else if status.is_fulfilled() {
        Some(CancelBlock::Fulfilled)
    } else if status.in_production() {
        Some(CancelBlock::InProduction)
    } else {
        None
    }
}

/// Top-level fields of an update request, for gating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateField {
    ExternalId,
    Sample,
    Reprint,
    ExtraQualityCare,
    AddressTo,
    AddressFrom,
    Shipping,
    Items,
}

impl UpdateField {
    pub fn name(self) -> &'static str {
        match self {
            UpdateField::ExternalId => "id",
            UpdateField::Sample => "sample",
            UpdateField::Reprint => "reprint",
            UpdateField::ExtraQualityCare => "xqc",
            UpdateField::AddressTo => "address_to",
            UpdateField::AddressFrom => "address_from",
            UpdateField::Shipping => "shipping",
            UpdateField::Items => "items",
        }
    }

    /// Locked once any item is in production
    fn production_gated(self) -> bool {
        matches!(
            self,
            UpdateField::Sample
                | UpdateField::Reprint
                | UpdateField::ExtraQualityCare
                | UpdateField::Items
        )
    }

    /// Locked once any item is packaged or shipped
    fn fulfillment_gated(self) -> bool {
        matches!(
            self,
            UpdateField::AddressTo | UpdateField::AddressFrom | UpdateField::Shipping
        )
    }
}

/// Check the requested fields against the order's item statuses.
///
/// Returns one error per gated field; a non-empty result rejects the
/// entire update request. The external order ID is never gated.
pub fn gate(statuses: &[ItemStatus], requested: &[UpdateField]) -> Vec<FieldError> {
    let in_production = statuses.iter().any(|s| s.in_production());
    let fulfilled = statuses.iter().any(|s| s.is_fulfilled());

    let mut errors = Vec::new();
    for field in requested {
        if field.production_gated() && in_production {
            errors.push(FieldError::new(
                field.name(),
                FieldErrorCode::OrderLocked,
                "Order has been taken into production",
            ));
        } else if field.fulfillment_gated() && fulfilled {
            errors.push(FieldError::new(
                field.name(),
                FieldErrorCode::OrderLocked,
                "The order has already been partially or fully packaged and shipped",
            ));
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_ordinals_are_stable() {
        assert_eq!(ItemStatus::Created.code(), 0);
        assert_eq!(ItemStatus::Packaged.code(), 3);
        assert_eq!(ItemStatus::OnHold.code(), 6);
        assert_eq!(ItemStatus::Canceled.code(), 8);

        for status in ItemStatus::ALL {
            assert_eq!(ItemStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(ItemStatus::from_code(9), None);
        assert_eq!(ItemStatus::from_code(-1), None);
    }

    #[test]
    fn test_frozen_sets() {
        assert!(!ItemStatus::Created.in_production());
        for status in ItemStatus::ALL.iter().skip(1) {
            assert!(status.in_production(), "{status} should be in production");
        }

        let fulfilled: Vec<_> = ItemStatus::ALL
            .iter()
            .filter(|s| s.is_fulfilled())
            .collect();
        assert_eq!(fulfilled, vec![&ItemStatus::Packaged, &ItemStatus::Shipped]);
    }

    #[test]
    fn test_rollup_last_match_wins() {
        assert_eq!(
            rollup(&[ItemStatus::Shipped, ItemStatus::Created]),
            ItemStatus::Shipped
        );
        assert_eq!(
            rollup(&[ItemStatus::Canceled, ItemStatus::Shipped]),
            ItemStatus::Canceled
        );
        // precedence order wins over insertion order
        assert_eq!(
            rollup(&[ItemStatus::Shipped, ItemStatus::Canceled]),
            ItemStatus::Canceled
        );
        assert_eq!(
            rollup(&[ItemStatus::Picked, ItemStatus::Printed]),
            ItemStatus::Printed
        );
        assert_eq!(rollup(&[]), ItemStatus::Created);
    }

    #[test]
    fn test_cancel_block_priority() {
        assert_eq!(
            cancel_block(ItemStatus::Canceled),
            Some(CancelBlock::AlreadyCanceled)
        );
        assert_eq!(
            cancel_block(ItemStatus::Shipped),
            Some(CancelBlock::Fulfilled)
        );
        assert_eq!(
            cancel_block(ItemStatus::Packaged),
            Some(CancelBlock::Fulfilled)
        );
        assert_eq!(
            cancel_block(ItemStatus::Picked),
            Some(CancelBlock::InProduction)
        );
        assert_eq!(cancel_block(ItemStatus::Created), None);
    }

    #[test]
    fn test_gate_production_fields() {
        let statuses = [ItemStatus::Created, ItemStatus::Picked];
        let errors = gate(&statuses, &[UpdateField::Sample, UpdateField::Items]);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "sample");
        assert_eq!(errors[0].code, FieldErrorCode::OrderLocked);

        // addresses still allowed while merely in production
        assert!(gate(&statuses, &[UpdateField::AddressTo]).is_empty());
    }

    #[test]
    fn test_gate_fulfillment_fields() {
        let statuses = [ItemStatus::Packaged];
        let errors = gate(
            &statuses,
            &[
                UpdateField::AddressTo,
                UpdateField::Shipping,
                UpdateField::ExternalId,
            ],
        );
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.field != "id"));
    }

    #[test]
    fn test_gate_clean_order_allows_everything() {
        let statuses = [ItemStatus::Created];
        let all = [
            UpdateField::ExternalId,
            UpdateField::Sample,
            UpdateField::Reprint,
            UpdateField::ExtraQualityCare,
            UpdateField::AddressTo,
            UpdateField::AddressFrom,
            UpdateField::Shipping,
            UpdateField::Items,
        ];
        assert!(gate(&statuses, &all).is_empty());
    }
}
