//! Shared types for the marketplace order sync service
//!
//! Common types used across the workspace: the wire-level order protocol
//! payloads, the catalog projections (stock/pricing) and the unified
//! error/response structures.

pub mod catalog;
pub mod error;
pub mod order;

// Re-exports
pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use serde::{Deserialize, Serialize};
