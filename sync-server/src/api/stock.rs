//! Stock API
//!
//! Read-only projection of catalog stock levels for the marketplace
//! poller, paginated with `limit`/`offset`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing::get};
use indexmap::IndexMap;
use serde::Deserialize;

use crate::api::API_BASE;
use crate::core::ServerState;
use crate::db::repository::{ProductRepository, product};
use shared::catalog::StockEntry;
use shared::order::FailureBody;

pub fn router() -> Router<ServerState> {
    Router::new().nest(API_BASE, routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/stock", get(list))
        .route("/stock/{sku}", get(get_by_sku))
}

/// Pagination window, matching the poller's `?limit=20&offset=0` calls
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl PageQuery {
    /// Apply the window to an assembled SKU map
    pub fn slice<V>(&self, map: IndexMap<String, V>) -> IndexMap<String, V> {
        map.into_iter()
            .skip(self.offset.unwrap_or(0))
            .take(self.limit.unwrap_or(usize::MAX))
            .collect()
    }
}

/// GET /v2019-06/stock
async fn list(State(state): State<ServerState>, Query(page): Query<PageQuery>) -> Response {
    let mut conn = match state.db.acquire().await {
        Ok(conn) => conn,
        Err(e) => return backend_failure(e.to_string()),
    };
    match ProductRepository::list_active(&mut conn).await {
        Ok(products) => {
            let map: IndexMap<String, StockEntry> = products
                .iter()
                .map(|p| (p.sku.clone(), product::stock_entry(p)))
                .collect();
            (StatusCode::OK, Json(page.slice(map))).into_response()
        }
        Err(e) => backend_failure(e.to_string()),
    }
}

/// GET /v2019-06/stock/{sku}
async fn get_by_sku(State(state): State<ServerState>, Path(sku): Path<String>) -> Response {
    let mut conn = match state.db.acquire().await {
        Ok(conn) => conn,
        Err(e) => return backend_failure(e.to_string()),
    };
    match ProductRepository::find_by_sku(&mut conn, &sku).await {
        Ok(Some(found)) => (StatusCode::OK, Json(product::stock_entry(&found))).into_response(),
        Ok(None) => sku_not_found(&sku),
        Err(e) => backend_failure(e.to_string()),
    }
}

pub(super) fn sku_not_found(sku: &str) -> Response {
    tracing::error!(sku = %sku, "SKU is not found");
    (
        StatusCode::NOT_FOUND,
        Json(FailureBody::with_code(
            404,
            format!("SKU is not found. SKU: {}", sku),
        )),
    )
        .into_response()
}

pub(super) fn backend_failure(error: String) -> Response {
    tracing::error!(error = %error, "Backend failure");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(FailureBody::message("Commerce backend is unavailable")),
    )
        .into_response()
}
