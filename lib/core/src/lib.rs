//! # bqsearch Core
//!
//! Core library for bqsearch, a thin HTTP front end over a warehouse-side
//! vector search.
//!
//! This crate provides the pieces that do not depend on a particular
//! warehouse or web framework:
//!
//! - [`SearchConfig`] - model, table, embedding column and fan-out
//! - [`QueryTemplate`] - renders the `VECTOR_SEARCH` statement with the text bound as `@query`
//! - [`ResultRow`] / [`NormalizedRecord`] - typed rows and their all-text JSON form
//! - [`WarehouseConnector`] - the seam a warehouse client implements
//! - [`SearchService`] - templating, submission and normalization in one call
//!
//! ## Example
//!
//! ```rust
//! use bqsearch_core::{QueryTemplate, SearchConfig, SearchQuery, QUERY_PARAM};
//!
//! let config = SearchConfig::new("proj.shop.fashion_dataset", "proj.shop.embedding_model");
//! let template = QueryTemplate::new(&config).unwrap();
//!
//! let descriptor = template.render(&SearchQuery::new("red sneakers"));
//! assert_eq!(descriptor.parameter(QUERY_PARAM), Some("red sneakers"));
//! assert!(descriptor.sql.ends_with("top_k => 6)"));
//! ```

pub mod config;
pub mod connector;
pub mod error;
pub mod query;
pub mod row;
pub mod service;

pub use config::{SearchConfig, DEFAULT_EMBEDDING_COLUMN, DEFAULT_TOP_K};
pub use connector::{WarehouseConnector, PING_SQL};
pub use error::{Error, Result};
pub use query::{QueryDescriptor, QueryParameter, QueryTemplate, SearchQuery, QUERY_PARAM, RESULT_COLUMNS};
pub use row::{normalize, NormalizedRecord, ResultRow, ResultSet, NULL_REPLACEMENT};
pub use service::SearchService;
