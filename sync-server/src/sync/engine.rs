//! Order Mutation Engine
//!
//! Orchestrates every marketplace-facing order operation. Each request
//! runs `Validate → Gate → Reconcile → Apply → Persist → Journal` inside
//! a single transaction; a failure anywhere before Apply aborts with no
//! partial writes. Cancellation is the one per-item-partial exception.

use crate::db::models::ProductRow;
use crate::db::repository::order::{NewOrder, NewOrderItem};
use crate::db::repository::{OrderLinkRepository, OrderRepository, ProductRepository, RepoError};
use crate::sync::status::{self, CancelBlock, ItemStatus, UpdateField};
use crate::sync::{items, journal};
use shared::order::{
    Address, CancelErrorCode, CancelOutcome, CancelRequest, CancelResponse, CreateOrderAccepted,
    CreateOrderRequest, EventEntry, EventsResponse, FieldError, FieldErrorCode, FileMap,
    ItemProgressRequest, OrderView, OutcomeStatus, UpdateOrderRequest,
};
use sqlx::SqlitePool;
use std::collections::HashMap;
use thiserror::Error;

/// Domain errors surfaced to the request handlers
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("order {0} has already been created")]
    DuplicateOrder(String),

    #[error("order {0} is not found")]
    OrderNotFound(String),

    #[error("no events found for order {0}")]
    NoEvents(String),

    #[error("order is locked for the requested changes")]
    Locked(Vec<FieldError>),

    #[error("request failed validation")]
    Invalid(Vec<FieldError>),

    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// The reconciliation engine. Cheap to clone per request.
#[derive(Clone)]
pub struct SyncEngine {
    db: SqlitePool,
}

impl SyncEngine {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Create a local order for an incoming marketplace order.
    ///
    /// All-or-nothing: field and item errors are accumulated and any of
    /// them rejects the whole creation with nothing persisted.
    pub async fn create_order(
        &self,
        req: &CreateOrderRequest,
    ) -> Result<CreateOrderAccepted, SyncError> {
        let mut tx = self.db.begin().await.map_err(RepoError::from)?;

        // 1. Idempotent reject on an already linked external ID
        if OrderLinkRepository::find_by_external_id(&mut tx, &req.id)
            .await?
            .is_some()
        {
            return Err(SyncError::DuplicateOrder(req.id.clone()));
        }

        // 2. Validate order-level fields, accumulating every problem
        let mut errors = validate_create(req);

        // 3. Resolve every item SKU against the catalog
        let mut resolved = Vec::new();
        match &req.items {
            Some(item_payloads) if !item_payloads.is_empty() => {
                for item in item_payloads {
                    match ProductRepository::find_by_sku(&mut tx, &item.sku).await? {
                        Some(product) => resolved.push((item, product)),
                        None => errors.push(FieldError::new(
                            "item",
                            FieldErrorCode::SkuNotFound,
                            format!("Received product SKU: {} does not exist", item.sku),
                        )),
                    }
                }
            }
            _ => errors.push(FieldError::new(
                "items",
                FieldErrorCode::Required,
                "Items were not provided",
            )),
        }

        if !errors.is_empty() {
            return Err(SyncError::Invalid(errors));
        }

        // 4. Apply: order, items, link and journal in one transaction
        let order = NewOrder {
            sample: req.sample.unwrap_or(false),
            reprint: req.reprint.unwrap_or(false),
            xqc: req.xqc.unwrap_or(false),
            customer_email: req
                .address_to
                .as_ref()
                .and_then(|a| a.email.clone())
                .unwrap_or_default(),
            carrier: req
                .shipping
                .as_ref()
                .and_then(|s| s.carrier.clone())
                .unwrap_or_default(),
            priority: req
                .shipping
                .as_ref()
                .and_then(|s| s.priority.clone())
                .unwrap_or_default(),
            address_to: req.address_to.clone().unwrap_or_default(),
            address_from: req.address_from.clone().unwrap_or_default(),
        };
        let local_id = OrderRepository::insert_order(&mut tx, &order).await?;

        let mut affected = Vec::new();
        for (item, product) in &resolved {
            let new_item = NewOrderItem {
                external_item_id: item.id.clone(),
                product_id: product.id,
                name: product.display_name(&item.id),
                sku: item.sku.clone(),
                quantity: item.quantity,
                unit_price: product.price,
                print_files: to_json(&item.print_files)?,
                preview_files: to_json(&item.preview_files)?,
            };
            OrderRepository::insert_item(&mut tx, local_id, &new_item).await?;
            affected.push(item.id.clone());
        }

        OrderRepository::recompute_total(&mut tx, local_id).await?;
        OrderRepository::update_status(&mut tx, local_id, "processing").await?;

        // The link's primary key, not the check above, is the actual
        // guard against two concurrent creates for the same ID.
        match OrderLinkRepository::create(&mut tx, &req.id, local_id).await {
            Ok(_) => {}
            Err(RepoError::Duplicate(_)) => {
                return Err(SyncError::DuplicateOrder(req.id.clone()));
            }
            Err(e) => return Err(e.into()),
        }

        journal::record(
            &mut tx,
            local_id,
            &[EventEntry::action("created", affected)],
            true,
        )
        .await?;

        tx.commit().await.map_err(RepoError::from)?;
        Ok(CreateOrderAccepted::new(req.id.clone(), local_id))
    }

    /// Full order snapshot for the marketplace
    pub async fn get_order(&self, external_id: &str) -> Result<OrderView, SyncError> {
        let mut conn = self.db.acquire().await.map_err(RepoError::from)?;

        let link = OrderLinkRepository::find_by_external_id(&mut conn, external_id)
            .await?
            .ok_or_else(|| SyncError::OrderNotFound(external_id.to_string()))?;
        let order = OrderRepository::find_by_id(&mut conn, link.local_order_id)
            .await?
            .ok_or_else(|| SyncError::OrderNotFound(external_id.to_string()))?;
        let item_rows = OrderRepository::items(&mut conn, order.id).await?;

        Ok(OrderView {
            id: external_id.to_string(),
            reference_id: order.id.to_string(),
            sample: order.sample_flag(),
            reprint: order.reprint_flag(),
            xqc: order.xqc_flag(),
            address_to: order.address_to(),
            address_from: order.address_from(),
            shipping: order.shipping_method(),
            items: item_rows.iter().map(|i| i.to_view()).collect(),
        })
    }

    /// Journal replay plus whole-order status rollup
    pub async fn order_events(&self, external_id: &str) -> Result<EventsResponse, SyncError> {
        let mut conn = self.db.acquire().await.map_err(RepoError::from)?;

        let link = OrderLinkRepository::find_by_external_id(&mut conn, external_id)
            .await?
            .ok_or_else(|| SyncError::OrderNotFound(external_id.to_string()))?;
        let order = OrderRepository::find_by_id(&mut conn, link.local_order_id)
            .await?
            .ok_or_else(|| SyncError::OrderNotFound(external_id.to_string()))?;

        if !journal::has_records(&mut conn, order.id).await? {
            return Err(SyncError::NoEvents(external_id.to_string()));
        }
        let events = journal::replay(&mut conn, order.id).await?;

        let item_rows = OrderRepository::items(&mut conn, order.id).await?;
        let statuses: Vec<ItemStatus> = item_rows.iter().map(|i| i.status()).collect();

        Ok(EventsResponse {
            status: status::rollup(&statuses).name().to_string(),
            events,
        })
    }

    /// Field-level order update.
    ///
    /// Returns the labels of the fields that actually changed. One gated
    /// or invalid field voids every other proposed change in the request.
    pub async fn update_order(
        &self,
        external_id: &str,
        req: &UpdateOrderRequest,
    ) -> Result<Vec<String>, SyncError> {
        let mut tx = self.db.begin().await.map_err(RepoError::from)?;

        let link = OrderLinkRepository::find_by_external_id(&mut tx, external_id)
            .await?
            .ok_or_else(|| SyncError::OrderNotFound(external_id.to_string()))?;
        let order = OrderRepository::find_by_id(&mut tx, link.local_order_id)
            .await?
            .ok_or_else(|| SyncError::OrderNotFound(external_id.to_string()))?;
        let item_rows = OrderRepository::items(&mut tx, order.id).await?;
        let statuses: Vec<ItemStatus> = item_rows.iter().map(|i| i.status()).collect();

        // 1. Gate: a single locked field rejects the whole request
        let gate_errors = status::gate(&statuses, &requested_fields(req));
        if !gate_errors.is_empty() {
            return Err(SyncError::Locked(gate_errors));
        }

        let mut errors: Vec<FieldError> = Vec::new();
        let mut updated: Vec<&'static str> = Vec::new();

        // 2. Stage external ID rebind (never gated, uniqueness-checked)
        let mut rebind_to: Option<&String> = None;
        if let Some(new_id) = &req.id {
            if new_id != external_id {
                if new_id.is_empty() || new_id.len() > 35 {
                    errors.push(FieldError::new(
                        "id",
                        FieldErrorCode::Other,
                        "External order ID must be 1-35 characters",
                    ));
                } else if OrderLinkRepository::find_by_external_id(&mut tx, new_id)
                    .await?
                    .is_some()
                {
                    errors.push(FieldError::new(
                        "id",
                        FieldErrorCode::DuplicateId,
                        format!(
                            "Unable to update order ID. Duplicate order ID entry. Order: {}",
                            external_id
                        ),
                    ));
                } else {
                    rebind_to = Some(new_id);
                    updated.push("ID");
                }
            }
        }

        // 3. Stage meta flags; only an actual flip counts as an update
        let mut flags = (order.sample_flag(), order.reprint_flag(), order.xqc_flag());
        let mut flags_changed = false;
        if let Some(sample) = req.sample {
            if sample != flags.0 {
                flags.0 = sample;
                flags_changed = true;
                updated.push("Sample");
            }
        }
        if let Some(reprint) = req.reprint {
            if reprint != flags.1 {
                flags.1 = reprint;
                flags_changed = true;
                updated.push("Reprint");
            }
        }
        if let Some(xqc) = req.xqc {
            if xqc != flags.2 {
                flags.2 = xqc;
                flags_changed = true;
                updated.push("Extra Quality Care");
            }
        }

        if req.address_to.is_some() {
            updated.push("Billing address");
        }
        if req.address_from.is_some() {
            updated.push("Shipping address");
        }
        if req.shipping.is_some() {
            updated.push("Shipping information");
        }

        // 4. Reconcile item-level changes
        let mut staged_items = Vec::new();
        if let Some(item_updates) = &req.items {
            let catalog = load_catalog(&mut tx, item_updates).await?;
            let outcome = items::reconcile(&item_rows, item_updates, &catalog);
            errors.extend(outcome.errors);
            updated.extend(outcome.updated_fields);
            staged_items = outcome.staged;
        }

        // One rejected field voids all other proposed changes
        if !errors.is_empty() {
            return Err(SyncError::Invalid(errors));
        }

        // 5. Apply
        if let Some(new_id) = rebind_to {
            match OrderLinkRepository::rebind_external_id(&mut tx, external_id, new_id).await {
                Ok(()) => {}
                // lost a race with a concurrent rebind to the same ID
                Err(RepoError::Duplicate(taken)) => {
                    return Err(SyncError::Invalid(vec![FieldError::new(
                        "id",
                        FieldErrorCode::DuplicateId,
                        format!("Unable to update order ID. Duplicate order ID entry: {}", taken),
                    )]));
                }
                Err(e) => return Err(e.into()),
            }
        }
        if flags_changed {
            OrderRepository::update_flags(&mut tx, order.id, flags.0, flags.1, flags.2).await?;
        }
        if let Some(address) = &req.address_to {
            OrderRepository::update_billing_address(&mut tx, order.id, address).await?;
        }
        if let Some(address) = &req.address_from {
            OrderRepository::update_shipping_address(&mut tx, order.id, address).await?;
        }
        if let Some(shipping) = &req.shipping {
            OrderRepository::update_shipping_info(
                &mut tx,
                order.id,
                shipping.carrier.as_deref().unwrap_or(""),
                shipping.priority.as_deref().unwrap_or(""),
            )
            .await?;
        }

        for staged in &staged_items {
            if let Some(swap) = &staged.swap {
                OrderRepository::swap_item(
                    &mut tx,
                    staged.item_row_id,
                    swap.product_id,
                    &swap.sku,
                    &swap.name,
                    swap.unit_price,
                    swap.quantity,
                )
                .await?;
            }
            if let Some((print, preview)) = &staged.files {
                OrderRepository::update_item_files(
                    &mut tx,
                    staged.item_row_id,
                    &to_json(print)?,
                    &to_json(preview)?,
                )
                .await?;
            }
            if let Some(quantity) = staged.quantity {
                let row = item_rows
                    .iter()
                    .find(|i| i.id == staged.item_row_id)
                    .expect("staged items come from item_rows");
                OrderRepository::update_item_quantity(
                    &mut tx,
                    staged.item_row_id,
                    quantity,
                    row.unit_price,
                )
                .await?;
            }
        }
        if !staged_items.is_empty() {
            OrderRepository::recompute_total(&mut tx, order.id).await?;
        }

        // 6. Journal: internal-only audit note, never replayed externally
        let labels = dedup(updated);
        if !labels.is_empty() {
            journal::note(
                &mut tx,
                order.id,
                &format!(
                    "Marketplace updated order. Updated fields: {}",
                    labels.join(", ")
                ),
            )
            .await?;
        }

        tx.commit().await.map_err(RepoError::from)?;
        Ok(labels.into_iter().map(String::from).collect())
    }

    /// Cancel the whole order or a set of line items.
    ///
    /// Unlike update this is per-item partial: items that cancel cleanly
    /// are committed even when sibling items fail, and the response
    /// reports every per-item outcome.
    pub async fn cancel_order(
        &self,
        external_id: &str,
        req: &CancelRequest,
    ) -> Result<CancelResponse, SyncError> {
        let mut tx = self.db.begin().await.map_err(RepoError::from)?;

        let link = OrderLinkRepository::find_by_external_id(&mut tx, external_id)
            .await?
            .ok_or_else(|| SyncError::OrderNotFound(external_id.to_string()))?;
        let order = OrderRepository::find_by_id(&mut tx, link.local_order_id)
            .await?
            .ok_or_else(|| SyncError::OrderNotFound(external_id.to_string()))?;
        let item_rows = OrderRepository::items(&mut tx, order.id).await?;

        // absent or empty list targets every item in the order
        let targeted = req.items.as_ref().filter(|list| !list.is_empty());

        let mut outcomes = Vec::new();
        let mut canceled_ids = Vec::new();

        if let Some(list) = targeted {
            for id in list {
                if !item_rows.iter().any(|i| i.external_item_id == *id) {
                    outcomes.push(CancelOutcome::failed(
                        id.clone(),
                        CancelErrorCode::UnknownLineItem,
                        "Item ID does not exist in the order",
                    ));
                }
            }
        }

        for item in &item_rows {
            if let Some(list) = targeted {
                if !list.contains(&item.external_item_id) {
                    continue;
                }
            }
            match status::cancel_block(item.status()) {
                Some(CancelBlock::AlreadyCanceled) => outcomes.push(CancelOutcome::failed(
                    item.external_item_id.clone(),
                    CancelErrorCode::AlreadyCanceled,
                    "Item has already been canceled",
                )),
                Some(CancelBlock::Fulfilled) => outcomes.push(CancelOutcome::failed(
                    item.external_item_id.clone(),
                    CancelErrorCode::CannotCancelFulfilled,
                    "Item has been packed or shipped and can not be canceled",
                )),
                Some(CancelBlock::InProduction) => outcomes.push(CancelOutcome::failed(
                    item.external_item_id.clone(),
                    CancelErrorCode::CannotCancelInProduction,
                    "Unable to cancel. Item already in production",
                )),
                None => {
                    OrderRepository::set_item_status(&mut tx, item.id, ItemStatus::Canceled.code())
                        .await?;
                    outcomes.push(CancelOutcome::success(item.external_item_id.clone()));
                    canceled_ids.push(item.external_item_id.clone());
                }
            }
        }

        let all_ok = outcomes.iter().all(|o| o.is_success());

        // whole-order transition only for a clean implicit cancel-all
        if all_ok && targeted.is_none() {
            OrderRepository::update_status(&mut tx, order.id, "cancelled").await?;
            journal::note(&mut tx, order.id, "Marketplace has canceled the order").await?;
        }

        if !canceled_ids.is_empty() {
            let mut text = format!("Marketplace canceled items: {}", canceled_ids.join(", "));
            if let Some(reason) = &req.note {
                text.push_str(&format!(". Reason: {}", reason));
            }
            journal::note(&mut tx, order.id, &text).await?;
            journal::record(
                &mut tx,
                order.id,
                &[EventEntry::action("canceled", canceled_ids)],
                true,
            )
            .await?;
        }

        tx.commit().await.map_err(RepoError::from)?;
        Ok(CancelResponse {
            status: if all_ok {
                OutcomeStatus::Success
            } else {
                OutcomeStatus::Failed
            },
            items: outcomes,
        })
    }

    /// Merchant-side production progress for line items.
    ///
    /// Items whose change-set is identical are grouped into a single
    /// externally visible journal event with a combined affected list.
    pub async fn record_item_progress(
        &self,
        local_id: i64,
        req: &ItemProgressRequest,
    ) -> Result<(), SyncError> {
        let mut tx = self.db.begin().await.map_err(RepoError::from)?;

        let order = OrderRepository::find_by_id(&mut tx, local_id)
            .await?
            .ok_or_else(|| SyncError::OrderNotFound(local_id.to_string()))?;
        let item_rows = OrderRepository::items(&mut tx, order.id).await?;

        let mut errors = Vec::new();
        let mut groups: Vec<EventEntry> = Vec::new();

        for update in &req.items {
            let Some(item) = item_rows
                .iter()
                .find(|i| i.external_item_id == update.id)
            else {
                errors.push(FieldError::new(
                    "items",
                    FieldErrorCode::UnknownLineItem,
                    format!("Item ID {} does not exist in the order", update.id),
                ));
                continue;
            };

            let new_status = match update.status {
                Some(code) => match ItemStatus::from_code(code) {
                    Some(s) => s,
                    None => {
                        errors.push(FieldError::new(
                            "status",
                            FieldErrorCode::Other,
                            format!("Unknown status code {}", code),
                        ));
                        continue;
                    }
                },
                None => item.status(),
            };
            let tracking = update
                .tracking_number
                .clone()
                .unwrap_or_else(|| item.tracking_number.clone());
            let carrier = update.carrier.clone().unwrap_or_else(|| item.carrier.clone());
            let notes = update.notes.clone().unwrap_or_else(|| item.notes.clone());

            let changed = new_status != item.status()
                || tracking != item.tracking_number
                || carrier != item.carrier
                || notes != item.notes;
            if !changed {
                continue;
            }

            OrderRepository::update_item_progress(
                &mut tx,
                item.id,
                new_status.code(),
                &tracking,
                &carrier,
                &notes,
            )
            .await?;

            let group = groups.iter_mut().find(|g| {
                g.action == new_status.name()
                    && g.tracking_number == tracking
                    && g.carrier == carrier
                    && g.notes == notes
            });
            match group {
                Some(entry) => entry.affected_items.push(update.id.clone()),
                None => groups.push(EventEntry {
                    action: new_status.name().to_string(),
                    affected_items: vec![update.id.clone()],
                    tracking_number: tracking,
                    carrier,
                    notes,
                    ..Default::default()
                }),
            }
        }

        if !errors.is_empty() {
            return Err(SyncError::Invalid(errors));
        }

        journal::record(&mut tx, order.id, &groups, true).await?;
        tx.commit().await.map_err(RepoError::from)?;
        Ok(())
    }

    /// Destroy a local order; keeps the link store consistent
    pub async fn remove_order(&self, local_id: i64) -> Result<(), SyncError> {
        let mut tx = self.db.begin().await.map_err(RepoError::from)?;

        OrderRepository::delete(&mut tx, local_id)
            .await
            .map_err(|e| match e {
                RepoError::NotFound(_) => SyncError::OrderNotFound(local_id.to_string()),
                other => SyncError::Repo(other),
            })?;
        OrderLinkRepository::delete_by_local_id(&mut tx, local_id).await?;

        tx.commit().await.map_err(RepoError::from)?;
        Ok(())
    }
}

/// Requested top-level fields of an update payload
fn requested_fields(req: &UpdateOrderRequest) -> Vec<UpdateField> {
    let mut fields = Vec::new();
    if req.id.is_some() {
        fields.push(UpdateField::ExternalId);
    }
    if req.sample.is_some() {
        fields.push(UpdateField::Sample);
    }
    if req.reprint.is_some() {
        fields.push(UpdateField::Reprint);
    }
    if req.xqc.is_some() {
        fields.push(UpdateField::ExtraQualityCare);
    }
    if req.address_to.is_some() {
        fields.push(UpdateField::AddressTo);
    }
    if req.address_from.is_some() {
        fields.push(UpdateField::AddressFrom);
    }
    if req.shipping.is_some() {
        fields.push(UpdateField::Shipping);
    }
    if req.items.is_some() {
        fields.push(UpdateField::Items);
    }
    fields
}

fn validate_create(req: &CreateOrderRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if req.id.is_empty() {
        errors.push(FieldError::required("id"));
    } else if req.id.len() > 35 {
        errors.push(FieldError::new(
            "id",
            FieldErrorCode::Other,
            "External order ID must be at most 35 characters",
        ));
    }

    let default_address = Address::default();
    let address_to = match &req.address_to {
        Some(address) => address,
        None => {
            errors.push(FieldError::new(
                "address_to",
                FieldErrorCode::Required,
                "Address to was not provided",
            ));
            &default_address
        }
    };
    require(&mut errors, "address_to.address1", &address_to.address1);
    require(&mut errors, "address_to.city", &address_to.city);
    require(&mut errors, "address_to.zip", &address_to.zip);
    require(&mut errors, "address_to.country", &address_to.country);
    require(&mut errors, "address_to.first_name", &address_to.first_name);
    require(&mut errors, "address_to.last_name", &address_to.last_name);

    let address_from = match &req.address_from {
        Some(address) => address,
        None => {
            errors.push(FieldError::new(
                "address_from",
                FieldErrorCode::Required,
                "Address from was not provided",
            ));
            &default_address
        }
    };
    require(&mut errors, "address_from.address1", &address_from.address1);
    require(&mut errors, "address_from.city", &address_from.city);
    require(&mut errors, "address_from.zip", &address_from.zip);
    require(&mut errors, "address_from.country", &address_from.country);
    require(&mut errors, "address_from.company", &address_from.company);

    match &req.shipping {
        None => {
            errors.push(FieldError::new(
                "shipping",
                FieldErrorCode::Required,
                "Shipping information was not provided",
            ));
            errors.push(FieldError::required("shipping.carrier"));
            errors.push(FieldError::required("shipping.priority"));
        }
        Some(shipping) => {
            require(&mut errors, "shipping.carrier", &shipping.carrier);
            require(&mut errors, "shipping.priority", &shipping.priority);
        }
    }

    errors
}

fn require(errors: &mut Vec<FieldError>, field: &str, value: &Option<String>) {
    if value.as_deref().is_none_or(str::is_empty) {
        errors.push(FieldError::required(field));
    }
}

async fn load_catalog(
    conn: &mut sqlx::SqliteConnection,
    updates: &[shared::order::ItemUpdate],
) -> Result<HashMap<String, ProductRow>, SyncError> {
    let mut catalog = HashMap::new();
    for update in updates {
        if let Some(sku) = &update.sku {
            if !catalog.contains_key(sku) {
                if let Some(product) = ProductRepository::find_by_sku(conn, sku).await? {
                    catalog.insert(sku.clone(), product);
                }
            }
        }
    }
    Ok(catalog)
}

fn to_json(map: &FileMap) -> Result<String, RepoError> {
    Ok(serde_json::to_string(map)?)
}

fn dedup(labels: Vec<&'static str>) -> Vec<&'static str> {
    let mut unique = Vec::new();
    for label in labels {
        if !unique.contains(&label) {
            unique.push(label);
        }
    }
    unique
}
