//! Test harness for the Orders API.
//!
//! Scenarios talk to the live HTTP service through a logging
//! [`ApiClient`](orders_client::ApiClient) and verify what the service
//! persisted by reading the order store directly.
//!
//! # Running
//!
//! ```bash
//! # Against an in-process service and a scratch SQLite store
//! cargo test -p orders-harness --test orders_api
//!
//! # Against an already running service and its store
//! ORDERS_API_URL=http://localhost:8000 DATABASE_URL=sqlite://orders.db \
//!     cargo test -p orders-harness --test orders_api
//!
//! # Only cases tagged `smoke`, or whose name contains the filter
//! cargo test -p orders-harness --test orders_api -- smoke
//! ```
//!
//! # Lifecycle
//!
//! - session: logging, store connection (pinged up front), API client, and
//!   the local service when no `ORDERS_API_URL` is configured. Built once by
//!   [`TestSession::connect`] and passed to every case.
//! - case: [`run_case`] brackets the body with start/end markers;
//!   [`TestSession::with_created_order`] creates an order and always deletes
//!   it once the body finishes.

pub mod config;
pub mod errors;
pub mod fixtures;
pub mod logging;
pub mod runner;

pub use config::HarnessConfig;
pub use errors::SetupError;
pub use fixtures::{new_order_payload, LocalService, TestSession, NONEXISTENT_ORDER_ID};
pub use runner::{
    filter_from_args, raise_error, run_case, CaseError, OrErrored, Outcome, Report, Suite,
};
