//! API key authentication middleware
//!
//! Every marketplace and internal route is gated on the pre-shared
//! `X-API-KEY` header. Only the health endpoint is public.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::core::ServerState;
use shared::error::AppError;

/// Require a valid `X-API-KEY` header.
///
/// # Skipped paths
///
/// - `OPTIONS *` (CORS preflight)
/// - `/health`
pub async fn require_api_key(
    State(state): State<ServerState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.method() == http::Method::OPTIONS || req.uri().path() == "/health" {
        return Ok(next.run(req).await);
    }

    let provided = req
        .headers()
        .get("x-api-key")
        .and_then(|h| h.to_str().ok());

    match provided {
        Some(key) if key == state.config.api_key => Ok(next.run(req).await),
        Some(_) => {
            tracing::warn!(
                target: "security",
                uri = %req.uri(),
                "Rejected request with mismatched API key"
            );
            Err(AppError::invalid_api_key())
        }
        None => {
            tracing::warn!(
                target: "security",
                uri = %req.uri(),
                "Rejected request without API key"
            );
            Err(AppError::unauthorized())
        }
    }
}
