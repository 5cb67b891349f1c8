//! # bqsearch API
//!
//! actix-web REST surface for bqsearch.
//!
//! | Route | Purpose |
//! |---|---|
//! | `GET /` | welcome message |
//! | `GET /health` | liveness, always `{"status": "ok"}` |
//! | `GET /ready` | warehouse connectivity check |
//! | `POST /query` | `{"query": "..."}` in, normalized records out |

pub mod error;
pub mod rest;

pub use error::ApiError;
pub use rest::{configure, cors, AppState, RestApi, WELCOME_MESSAGE};
