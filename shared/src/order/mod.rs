//! Order protocol types
//!
//! Typed request payloads, response bodies and the journal event entry
//! format exchanged with the marketplace.

pub mod event;
pub mod request;
pub mod response;
pub mod types;

pub use event::EventEntry;
pub use request::{
    CancelRequest, CreateOrderRequest, ItemProgressRequest, ItemProgressUpdate, ItemUpdate,
    NewItemPayload, UpdateOrderRequest,
};
pub use response::{
    Acknowledged, CancelErrorCode, CancelOutcome, CancelResponse, CreateOrderAccepted,
    EventsResponse, FailureBody, OutcomeStatus,
};
pub use types::{Address, FieldError, FieldErrorCode, FileMap, LineItemView, OrderView, ShippingMethod};
