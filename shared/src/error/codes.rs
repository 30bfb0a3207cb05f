//! Unified error codes for the sync service
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 4xxx: Order errors
//! - 6xxx: Catalog errors
//! - 9xxx: System errors

use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient
/// serialization and stable machine checking on the consumer side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 1xxx: Auth ====================
    /// Request is missing credentials
    NotAuthenticated = 1001,
    /// Pre-shared API key mismatch
    InvalidApiKey = 1002,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// External order ID already linked
    DuplicateOrder = 4002,
    /// Order production state forbids the requested change
    OrderLocked = 4003,
    /// Line item not found in the order
    LineItemNotFound = 4004,

    // ==================== 6xxx: Catalog ====================
    /// No sellable product for the given SKU
    SkuNotFound = 6001,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
}

impl ErrorCode {
    /// Numeric wire value of this code
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Default human-readable message for this code
    pub fn message(self) -> &'static str {
        match self {
            ErrorCode::Success => "OK",
            ErrorCode::Unknown => "Unknown error",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::NotAuthenticated => "Authentication required",
            ErrorCode::InvalidApiKey => "Invalid API key",
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::DuplicateOrder => "Order already exists",
            ErrorCode::OrderLocked => "Order has been taken into production",
            ErrorCode::LineItemNotFound => "Line item not found",
            ErrorCode::SkuNotFound => "SKU not found",
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
        }
    }

    /// HTTP status code this error maps to
    pub fn http_status(self) -> StatusCode {
        match self {
            ErrorCode::Success => StatusCode::OK,
            ErrorCode::ValidationFailed | ErrorCode::OrderLocked => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ErrorCode::NotFound
            | ErrorCode::OrderNotFound
            | ErrorCode::LineItemNotFound
            | ErrorCode::SkuNotFound => StatusCode::NOT_FOUND,
            ErrorCode::AlreadyExists | ErrorCode::DuplicateOrder => StatusCode::CONFLICT,
            ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
            ErrorCode::NotAuthenticated | ErrorCode::InvalidApiKey => StatusCode::UNAUTHORIZED,
            ErrorCode::Unknown | ErrorCode::InternalError | ErrorCode::DatabaseError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

impl TryFrom<u16> for ErrorCode {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            0 => ErrorCode::Success,
            1 => ErrorCode::Unknown,
            2 => ErrorCode::ValidationFailed,
            3 => ErrorCode::NotFound,
            4 => ErrorCode::AlreadyExists,
            5 => ErrorCode::InvalidRequest,
            1001 => ErrorCode::NotAuthenticated,
            1002 => ErrorCode::InvalidApiKey,
            4001 => ErrorCode::OrderNotFound,
            4002 => ErrorCode::DuplicateOrder,
            4003 => ErrorCode::OrderLocked,
            4004 => ErrorCode::LineItemNotFound,
            6001 => ErrorCode::SkuNotFound,
            9001 => ErrorCode::InternalError,
            9002 => ErrorCode::DatabaseError,
            other => return Err(format!("unknown error code: {}", other)),
        };
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_values_are_stable() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::OrderNotFound.code(), 4001);
        assert_eq!(ErrorCode::DuplicateOrder.code(), 4002);
        assert_eq!(ErrorCode::SkuNotFound.code(), 6001);
        assert_eq!(ErrorCode::DatabaseError.code(), 9002);
    }

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(
            ErrorCode::OrderNotFound.http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ErrorCode::OrderLocked.http_status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(ErrorCode::DuplicateOrder.http_status(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorCode::InvalidApiKey.http_status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_round_trip_through_u16() {
        for code in [
            ErrorCode::Success,
            ErrorCode::ValidationFailed,
            ErrorCode::OrderLocked,
            ErrorCode::SkuNotFound,
            ErrorCode::InternalError,
        ] {
            let raw: u16 = code.into();
            assert_eq!(ErrorCode::try_from(raw), Ok(code));
        }
        assert!(ErrorCode::try_from(777).is_err());
    }
}
