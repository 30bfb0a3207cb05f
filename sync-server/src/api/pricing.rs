//! Pricing API
//!
//! Read-only projection of the per-SKU custom pricing fields (blank
//! price, processing fee, printing price), same pagination as stock.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing::get};
use indexmap::IndexMap;

use super::stock::{PageQuery, backend_failure, sku_not_found};
use crate::api::API_BASE;
use crate::core::ServerState;
use crate::db::repository::{ProductRepository, product};
use shared::catalog::PricingEntry;

pub fn router() -> Router<ServerState> {
    Router::new().nest(API_BASE, routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/pricing", get(list))
        .route("/pricing/{sku}", get(get_by_sku))
}

/// GET /v2019-06/pricing
async fn list(State(state): State<ServerState>, Query(page): Query<PageQuery>) -> Response {
    let mut conn = match state.db.acquire().await {
        Ok(conn) => conn,
        Err(e) => return backend_failure(e.to_string()),
    };
    match ProductRepository::list_active(&mut conn).await {
        Ok(products) => {
            let map: IndexMap<String, PricingEntry> = products
                .iter()
                .map(|p| (p.sku.clone(), product::pricing_entry(p)))
                .collect();
            (StatusCode::OK, Json(page.slice(map))).into_response()
        }
        Err(e) => backend_failure(e.to_string()),
    }
}

/// GET /v2019-06/pricing/{sku}
async fn get_by_sku(State(state): State<ServerState>, Path(sku): Path<String>) -> Response {
    let mut conn = match state.db.acquire().await {
        Ok(conn) => conn,
        Err(e) => return backend_failure(e.to_string()),
    };
    match ProductRepository::find_by_sku(&mut conn, &sku).await {
        Ok(Some(found)) => (StatusCode::OK, Json(product::pricing_entry(&found))).into_response(),
        Ok(None) => sku_not_found(&sku),
        Err(e) => backend_failure(e.to_string()),
    }
}
