//! Protocol response bodies returned to the marketplace

use super::event::EventEntry;
use super::types::FieldError;
use serde::{Deserialize, Serialize};

/// Two-valued outcome marker used across the protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
    Failed,
}

/// Successful order creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderAccepted {
    pub status: OutcomeStatus,
    /// External order ID echoed back
    pub id: String,
    /// Local order ID, stringified
    pub reference_id: String,
}

impl CreateOrderAccepted {
    pub fn new(external_id: impl Into<String>, local_id: i64) -> Self {
        Self {
            status: OutcomeStatus::Success,
            id: external_id.into(),
            reference_id: local_id.to_string(),
        }
    }
}

/// Bare success acknowledgement (update endpoint)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Acknowledged {
    pub status: OutcomeStatus,
}

impl Acknowledged {
    pub fn success() -> Self {
        Self {
            status: OutcomeStatus::Success,
        }
    }
}

/// Generic failure body: a message, field errors, or both
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureBody {
    pub status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl FailureBody {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Failed,
            code: None,
            message: Some(message.into()),
            errors: Vec::new(),
        }
    }

    pub fn with_code(code: u16, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            ..Self::message(message)
        }
    }

    pub fn errors(errors: Vec<FieldError>) -> Self {
        Self {
            status: OutcomeStatus::Failed,
            code: None,
            message: None,
            errors,
        }
    }
}

/// GET /order/{id}/events.json body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsResponse {
    /// Whole-order status rollup (lowercase vocabulary name)
    pub status: String,
    pub events: Vec<EventEntry>,
}

/// Per-item failure reason inside a cancel response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelErrorCode {
    AlreadyCanceled,
    CannotCancelFulfilled,
    CannotCancelInProduction,
    UnknownLineItem,
}

/// Per-item cancellation outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelOutcome {
    /// External line item ID
    pub id: String,
    pub status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<CancelErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CancelOutcome {
    pub fn success(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: OutcomeStatus::Success,
            code: None,
            message: None,
        }
    }

    pub fn failed(
        id: impl Into<String>,
        code: CancelErrorCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            status: OutcomeStatus::Failed,
            code: Some(code),
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}

/// POST /order/{id}/cancel.json body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelResponse {
    pub status: OutcomeStatus,
    pub items: Vec<CancelOutcome>,
}
