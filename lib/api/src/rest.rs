use crate::error::ApiError;
use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpResponse, HttpServer, Result as ActixResult};
use bqsearch_core::{SearchQuery, SearchService};
use serde::{Deserialize, Serialize};

pub const WELCOME_MESSAGE: &str = "Welcome to the bqsearch vector search API!";

#[derive(Deserialize)]
struct QueryRequest {
    query: String,
}

#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
}

/// Shared per-process state handed to every worker
#[derive(Clone)]
pub struct AppState {
    pub search: SearchService,
}

impl AppState {
    pub fn new(search: SearchService) -> Self {
        Self { search }
    }
}

pub struct RestApi;

impl RestApi {
    pub async fn start(state: AppState, host: &str, port: u16) -> std::io::Result<()> {
        HttpServer::new(move || {
            App::new()
                .wrap(middleware::Logger::default())
                .wrap(cors())
                .app_data(web::Data::new(state.clone()))
                .configure(configure)
        })
        .bind((host, port))?
        .run()
        .await
    }
}

/// Fully open CORS: any origin, method and header, credentials allowed
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
        .max_age(3600)
}

/// Register routes and the JSON body error handler. Expects
/// `web::Data<AppState>` to be registered on the app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        ApiError::BadRequest(err.to_string()).into()
    }))
    .route("/", web::get().to(root))
    .route("/health", web::get().to(health))
    .route("/ready", web::get().to(ready))
    .route("/query", web::post().to(run_query));
}

async fn root() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": WELCOME_MESSAGE
    })))
}

/// Liveness only. Never touches the warehouse.
async fn health() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(StatusResponse { status: "ok" }))
}

/// Warehouse reachability. Failure details go to the log only.
async fn ready(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    match state.search.ping().await {
        Ok(()) => Ok(HttpResponse::Ok().json(StatusResponse { status: "ok" })),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            Ok(HttpResponse::ServiceUnavailable().json(StatusResponse {
                status: "unavailable",
            }))
        }
    }
}

async fn run_query(
    state: web::Data<AppState>,
    req: web::Json<QueryRequest>,
) -> Result<HttpResponse, ApiError> {
    let query = SearchQuery::new(req.into_inner().query);
    let records = state.search.search(&query).await?;
    Ok(HttpResponse::Ok().json(records))
}
