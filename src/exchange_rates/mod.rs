//! Exchange rates between KRW and the display currencies.
//!
//! Rates are refreshed from an upstream API (on a timer or via the update
//! endpoint), stored in Postgres and served to clients and the quote service.

pub mod models;
pub mod queries;
pub mod responses;
pub mod routes;
pub mod services;

pub use models::{rate_table_from_rows, ExchangeRate};
pub use routes::router;
