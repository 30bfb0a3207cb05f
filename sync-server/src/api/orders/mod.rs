//! Marketplace Order API
//!
//! The order synchronization protocol: create, snapshot, events, update
//! and cancel. All routes require the pre-shared API key.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::api::API_BASE;
use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new().nest(API_BASE, routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/orders", post(handler::create))
        .route(
            "/orders/{external_id}",
            get(handler::get_by_external_id).put(handler::update),
        )
        .route("/orders/{external_id}/events", get(handler::events))
        .route("/orders/{external_id}/cancel", post(handler::cancel))
}
