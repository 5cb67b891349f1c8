//! # bqsearch Warehouse
//!
//! BigQuery implementation of [`bqsearch_core::WarehouseConnector`].
//!
//! - [`ServiceAccountKey`] - service-account key file loading and validation
//! - [`ServiceAccountTokenSource`] - JWT bearer grant with token caching
//! - [`BigQueryConnector`] - `jobs.query` / `jobs.getQueryResults` over REST,
//!   with named parameters and typed row decoding

pub mod auth;
pub mod bigquery;
pub mod credentials;

pub use auth::{ServiceAccountTokenSource, StaticToken, TokenSource, BIGQUERY_SCOPE};
pub use bigquery::{BigQueryConfig, BigQueryConnector, DEFAULT_API_BASE};
pub use credentials::{ServiceAccountKey, DEFAULT_TOKEN_URI};
