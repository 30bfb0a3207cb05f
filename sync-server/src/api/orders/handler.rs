//! Order API Handlers
//!
//! Maps inbound protocol payloads onto the mutation engine and the
//! engine's outcomes back onto protocol responses. Every outcome is
//! logged with a severity matching its response class, whether or not
//! an error body is returned to the caller.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::core::ServerState;
use crate::sync::SyncError;
use shared::order::{
    Acknowledged, CancelRequest, CreateOrderRequest, FailureBody, OutcomeStatus,
    UpdateOrderRequest,
};

/// POST /v2019-06/orders
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CreateOrderRequest>,
) -> Response {
    match state.engine().create_order(&payload).await {
        Ok(accepted) => {
            tracing::info!(
                external_id = %accepted.id,
                order = %accepted.reference_id,
                "Marketplace order successfully created"
            );
            (StatusCode::OK, Json(accepted)).into_response()
        }
        Err(SyncError::DuplicateOrder(id)) => {
            tracing::warn!(external_id = %id, "Order has already been created");
            (
                StatusCode::NOT_MODIFIED,
                Json(FailureBody::message(format!(
                    "The request has already been received and order created. ID: {}",
                    id
                ))),
            )
                .into_response()
        }
        Err(SyncError::Invalid(errors)) => {
            tracing::warn!(
                external_id = %payload.id,
                errors = errors.len(),
                "Unable to add all or some of the products"
            );
            (StatusCode::UNPROCESSABLE_ENTITY, Json(FailureBody::errors(errors)))
                .into_response()
        }
        Err(err) => internal_error(&payload.id, err),
    }
}

/// GET /v2019-06/orders/{external_id}
pub async fn get_by_external_id(
    State(state): State<ServerState>,
    Path(external_id): Path<String>,
) -> Response {
    match state.engine().get_order(&external_id).await {
        Ok(view) => {
            tracing::info!(
                external_id = %external_id,
                order = %view.reference_id,
                "Marketplace order successfully returned"
            );
            (StatusCode::OK, Json(view)).into_response()
        }
        Err(SyncError::OrderNotFound(id)) => order_not_found(&id),
        Err(err) => internal_error(&external_id, err),
    }
}

/// GET /v2019-06/orders/{external_id}/events
pub async fn events(
    State(state): State<ServerState>,
    Path(external_id): Path<String>,
) -> Response {
    match state.engine().order_events(&external_id).await {
        Ok(events) => {
            tracing::info!(
                external_id = %external_id,
                status = %events.status,
                count = events.events.len(),
                "Marketplace order events successfully returned"
            );
            (StatusCode::OK, Json(events)).into_response()
        }
        Err(SyncError::OrderNotFound(id)) => order_not_found(&id),
        Err(SyncError::NoEvents(id)) => {
            tracing::error!(external_id = %id, "No events found");
            (
                StatusCode::NOT_FOUND,
                Json(FailureBody::with_code(
                    404,
                    format!("No events found. ID: {}", id),
                )),
            )
                .into_response()
        }
        Err(err) => internal_error(&external_id, err),
    }
}

/// PUT /v2019-06/orders/{external_id}
pub async fn update(
    State(state): State<ServerState>,
    Path(external_id): Path<String>,
    Json(payload): Json<UpdateOrderRequest>,
) -> Response {
    match state.engine().update_order(&external_id, &payload).await {
        Ok(updated) => {
            tracing::info!(
                external_id = %external_id,
                updated_fields = %updated.join(", "),
                "Marketplace order successfully updated"
            );
            (StatusCode::OK, Json(Acknowledged::success())).into_response()
        }
        Err(SyncError::OrderNotFound(id)) => order_not_found(&id),
        Err(SyncError::Locked(errors)) | Err(SyncError::Invalid(errors)) => {
            tracing::error!(
                external_id = %external_id,
                errors = errors.len(),
                "Unable to update marketplace order"
            );
            (StatusCode::UNPROCESSABLE_ENTITY, Json(FailureBody::errors(errors)))
                .into_response()
        }
        Err(err) => internal_error(&external_id, err),
    }
}

/// POST /v2019-06/orders/{external_id}/cancel
///
/// The body is optional: no body (or no item list) cancels every item.
pub async fn cancel(
    State(state): State<ServerState>,
    Path(external_id): Path<String>,
    payload: Option<Json<CancelRequest>>,
) -> Response {
    let request = payload.map(|Json(r)| r).unwrap_or_default();
    match state.engine().cancel_order(&external_id, &request).await {
        Ok(response) => {
            let status = if response.status == OutcomeStatus::Success {
                tracing::info!(external_id = %external_id, "Marketplace order successfully canceled");
                StatusCode::OK
            } else {
                tracing::info!(
                    external_id = %external_id,
                    "Marketplace order was not canceled or partially canceled"
                );
                StatusCode::UNPROCESSABLE_ENTITY
            };
            (status, Json(response)).into_response()
        }
        Err(SyncError::OrderNotFound(id)) => order_not_found(&id),
        Err(err) => internal_error(&external_id, err),
    }
}

fn order_not_found(external_id: &str) -> Response {
    tracing::error!(external_id = %external_id, "Order is not found");
    (
        StatusCode::NOT_FOUND,
        Json(FailureBody::with_code(
            404,
            format!("Order is not found. ID: {}", external_id),
        )),
    )
        .into_response()
}

/// Backend failures are fatal for the request only; the caller gets a
/// stable message and never the internal error.
fn internal_error(external_id: &str, err: SyncError) -> Response {
    tracing::error!(external_id = %external_id, error = %err, "Backend failure");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(FailureBody::message("Commerce backend is unavailable")),
    )
        .into_response()
}
