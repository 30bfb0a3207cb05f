//! Order Synchronization Module
//!
//! The status-reconciliation core of the server:
//!
//! - **status**: status vocabulary, mutability gates, whole-order rollup
//! - **items**: line-item reconciliation (SKU swaps, files, quantities)
//! - **engine**: the per-request mutation pipeline
//! - **journal**: append-only event journal the marketplace polls
//!
//! # Data Flow
//!
//! 1. A handler receives a marketplace request
//! 2. The engine loads the order link, order and line items
//! 3. The status resolver gates the requested fields
//! 4. The reconciler stages item-level changes
//! 5. Clean requests apply inside one transaction and journal an event
//! 6. The handler maps the result to a protocol response

pub mod engine;
pub mod items;
pub mod journal;
pub mod status;

// Re-exports
pub use engine::{SyncEngine, SyncError};
pub use status::ItemStatus;
