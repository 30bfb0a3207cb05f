//! Internal (merchant-side) API
//!
//! Endpoints used by the merchant's own tooling rather than the
//! marketplace: recording production progress on line items and cleaning
//! up after order removal. Addressed by local order ID.

mod handler;

use axum::{
    Router,
    routing::{delete, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/internal", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/orders/{local_id}/items", put(handler::update_item_progress))
        .route("/orders/{local_id}", delete(handler::remove_order))
}
