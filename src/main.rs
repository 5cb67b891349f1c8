use anyhow::Context;
use bqsearch_api::{AppState, RestApi};
use bqsearch_core::{SearchConfig, SearchService};
use bqsearch_warehouse::{BigQueryConfig, BigQueryConnector, ServiceAccountKey, ServiceAccountTokenSource};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// HTTP front end for BigQuery vector search
#[derive(Parser, Debug)]
#[command(name = "bqsearch")]
#[command(about = "Free-text vector search over a BigQuery table", long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, env = "BQSEARCH_HOST", default_value = "0.0.0.0")]
    host: String,

    /// HTTP API port
    #[arg(long, env = "BQSEARCH_HTTP_PORT", default_value_t = 8000)]
    http_port: u16,

    /// Path to the service-account key file
    #[arg(long, env = "BQSEARCH_CREDENTIALS", default_value = "big_query_conn.json")]
    credentials: PathBuf,

    /// Project to run query jobs in (defaults to the key's project_id)
    #[arg(long, env = "BQSEARCH_PROJECT")]
    project: Option<String>,

    /// Source table, `project.dataset.table`
    #[arg(long, env = "BQSEARCH_TABLE")]
    table: String,

    /// Embedding model, `project.dataset.model`
    #[arg(long, env = "BQSEARCH_MODEL")]
    model: String,

    /// Column of the table holding precomputed embeddings
    #[arg(long, env = "BQSEARCH_EMBEDDING_COLUMN", default_value = bqsearch_core::DEFAULT_EMBEDDING_COLUMN)]
    embedding_column: String,

    /// Number of results returned per query
    #[arg(long, env = "BQSEARCH_TOP_K", default_value_t = bqsearch_core::DEFAULT_TOP_K)]
    top_k: usize,

    /// BigQuery job location, e.g. US
    #[arg(long, env = "BQSEARCH_LOCATION")]
    location: Option<String>,

    /// HTTP timeout for warehouse calls in seconds (none by default)
    #[arg(long, env = "BQSEARCH_QUERY_TIMEOUT_SECS")]
    query_timeout_secs: Option<u64>,

    /// Log level, overridden by RUST_LOG when set
    #[arg(long, env = "BQSEARCH_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str().to_lowercase()));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;

    info!("Starting bqsearch v{}", env!("CARGO_PKG_VERSION"));

    let search_config = SearchConfig::new(args.table, args.model)
        .with_embedding_column(args.embedding_column)
        .with_top_k(args.top_k);
    search_config.validate()?;
    info!("Table: {}", search_config.table);
    info!("Model: {}", search_config.model);
    info!("top_k: {}", search_config.top_k);

    let key = ServiceAccountKey::from_file(&args.credentials)
        .with_context(|| format!("loading credentials from {}", args.credentials.display()))?;
    info!("Loaded credentials for {}", key.client_email);

    let project = args
        .project
        .or_else(|| key.project_id.clone())
        .context("no --project given and the key file has no project_id")?;

    let mut http = reqwest::Client::builder();
    if let Some(secs) = args.query_timeout_secs {
        http = http.timeout(Duration::from_secs(secs));
    }
    let http = http.build()?;

    let tokens = Arc::new(ServiceAccountTokenSource::new(key, http.clone())?);

    let mut warehouse_config = BigQueryConfig::new(project);
    warehouse_config.location = args.location;
    info!("Warehouse project: {}", warehouse_config.project);

    let connector = Arc::new(BigQueryConnector::with_client(warehouse_config, tokens, http));
    let search = SearchService::new(&search_config, connector)?;
    let state = AppState::new(search);

    let host = args.host;
    let http_port = args.http_port;
    let http_handle = std::thread::spawn(move || {
        info!("Starting HTTP server on {}:{}", host, http_port);
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(state, &host, http_port).await {
                tracing::error!("HTTP server error: {}", e);
            }
        })
    });

    info!("bqsearch started successfully");
    info!("HTTP API: http://localhost:{}/", args.http_port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = tokio::task::spawn_blocking(move || {
            http_handle.join().ok();
        }) => {
            info!("HTTP server stopped");
        }
    }

    info!("Shutting down...");
    Ok(())
}
