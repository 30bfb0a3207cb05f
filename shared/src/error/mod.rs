//! Unified error handling
//!
//! Error codes, the application error type and the unified API response
//! wrapper used by every non-protocol endpoint.

pub mod codes;
pub mod types;

pub use codes::ErrorCode;
pub use types::{ApiResponse, AppError, AppResult};
