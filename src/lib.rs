//! # bqsearch
//!
//! Free-text vector search over a BigQuery table, served over HTTP.
//!
//! A client posts `{"query": "red sneakers"}`. bqsearch binds the text into a
//! `VECTOR_SEARCH` statement that embeds it with `ML.GENERATE_EMBEDDING`,
//! runs it in BigQuery, and returns the top-k rows with every field as text.
//!
//! ## Quick Start
//!
//! ```bash
//! bqsearch --credentials big_query_conn.json \
//!     --table my-project.shop.fashion_dataset \
//!     --model my-project.shop.embedding_model
//! curl -X POST localhost:8000/query -H 'content-type: application/json' \
//!     -d '{"query": "red sneakers"}'
//! ```
//!
//! ## Crate Structure
//!
//! - `bqsearch-core` - config, query templating, typed rows, normalization
//! - `bqsearch-warehouse` - service-account auth and the BigQuery connector
//! - `bqsearch-api` - actix-web routes and CORS

pub use bqsearch_core::{
    normalize, Error, NormalizedRecord, QueryDescriptor, QueryTemplate, Result, ResultRow,
    ResultSet, SearchConfig, SearchQuery, SearchService, WarehouseConnector,
};

pub use bqsearch_warehouse::{
    BigQueryConfig, BigQueryConnector, ServiceAccountKey, ServiceAccountTokenSource,
};

pub use bqsearch_api::{AppState, RestApi};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        AppState, BigQueryConfig, BigQueryConnector, Error, NormalizedRecord, RestApi, Result,
        ResultRow, SearchConfig, SearchQuery, SearchService, ServiceAccountKey,
        ServiceAccountTokenSource, WarehouseConnector,
    };
}
