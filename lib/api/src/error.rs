use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

/// Failures surfaced to HTTP clients. Warehouse details stay in the logs.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("warehouse query failed")]
    Warehouse(#[source] bqsearch_core::Error),
}

impl From<bqsearch_core::Error> for ApiError {
    fn from(err: bqsearch_core::Error) -> Self {
        ApiError::Warehouse(err)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Warehouse(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ApiError::Warehouse(source) = self {
            tracing::error!(error = %source, "Search request failed");
        }
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string()
        }))
    }
}
