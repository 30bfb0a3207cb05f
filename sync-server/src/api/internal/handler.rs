//! Internal API Handlers

use axum::Json;
use axum::extract::{Path, State};

use crate::core::ServerState;
use crate::sync::SyncError;
use shared::error::{ApiResponse, AppError, AppResult};
use shared::order::ItemProgressRequest;

/// PUT /internal/orders/{local_id}/items
///
/// Merchant-side production progress: status, tracking number, carrier
/// and notes per line item. Changed items are journaled as externally
/// visible events for the marketplace poller.
pub async fn update_item_progress(
    State(state): State<ServerState>,
    Path(local_id): Path<i64>,
    Json(payload): Json<ItemProgressRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .engine()
        .record_item_progress(local_id, &payload)
        .await
        .map_err(app_error)?;
    tracing::info!(order = local_id, items = payload.items.len(), "Item progress recorded");
    Ok(ApiResponse::ok())
}

/// DELETE /internal/orders/{local_id}
///
/// Destroys the local order and removes its order link so the mapping
/// store stays consistent.
pub async fn remove_order(
    State(state): State<ServerState>,
    Path(local_id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    state.engine().remove_order(local_id).await.map_err(app_error)?;
    tracing::info!(order = local_id, "Order removed, link cleaned up");
    Ok(ApiResponse::ok())
}

fn app_error(err: SyncError) -> AppError {
    match err {
        SyncError::OrderNotFound(id) => AppError::not_found(format!("Order {}", id)),
        SyncError::Invalid(errors) | SyncError::Locked(errors) => {
            let mut app = AppError::validation("Request failed validation");
            for (index, field_error) in errors.iter().enumerate() {
                app = app.with_detail(
                    format!("{}:{}", index, field_error.field),
                    field_error.message.clone(),
                );
            }
            app
        }
        other => AppError::database(other.to_string()),
    }
}
