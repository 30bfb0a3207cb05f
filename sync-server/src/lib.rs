//! Marketplace Order Sync Server
//!
//! Reconciles order state between a print-on-demand marketplace and the
//! merchant's commerce backend.
//!
//! # Module structure
//!
//! ```text
//! sync-server/src/
//! ├── core/   # configuration, state, HTTP server
//! ├── auth/   # API key middleware
//! ├── api/    # routes and handlers (orders, stock, pricing, internal)
//! ├── sync/   # status resolver, reconciler, mutation engine, journal
//! ├── db/     # SQLite pool, migrations, repositories
//! └── utils/  # logging
//! ```
//!
//! # Data flow
//!
//! Inbound request → handler → mutation engine (status gating, line-item
//! reconciliation) → order link store + commerce order storage → event
//! journal → response.

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod sync;
pub mod utils;

// Re-export public types
pub use crate::core::{Config, Server, ServerState};
pub use crate::sync::{SyncEngine, SyncError};
pub use crate::utils::logger::init_logger;
pub use crate::utils::{AppError, AppResult};
