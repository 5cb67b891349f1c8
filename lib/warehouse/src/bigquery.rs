use crate::auth::TokenSource;
use async_trait::async_trait;
use bqsearch_core::{Error, QueryDescriptor, ResultRow, Result, WarehouseConnector, PING_SQL};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://bigquery.googleapis.com/bigquery/v2";

/// How long each `jobs.query` / `jobs.getQueryResults` call waits server-side
/// for the job to finish before answering with `jobComplete: false`
const DEFAULT_WAIT_MS: u64 = 10_000;

#[derive(Debug, Clone)]
pub struct BigQueryConfig {
    /// Project the query jobs run (and are billed) in
    pub project: String,
    /// Job location, e.g. `US` or `europe-west1`
    pub location: Option<String>,
    pub api_base: String,
    /// Whole-request HTTP timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    pub wait_ms: u64,
}

impl BigQueryConfig {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            location: None,
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: None,
            wait_ms: DEFAULT_WAIT_MS,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    query: &'a str,
    use_legacy_sql: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameter_mode: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    query_parameters: Vec<ApiParameter<'a>>,
    request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<&'a str>,
    timeout_ms: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiParameter<'a> {
    name: &'a str,
    parameter_type: ParameterType,
    parameter_value: ParameterValue<'a>,
}

#[derive(Serialize)]
struct ParameterType {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct ParameterValue<'a> {
    value: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResponse {
    #[serde(default)]
    job_complete: bool,
    job_reference: Option<JobReference>,
    schema: Option<TableSchema>,
    #[serde(default)]
    rows: Vec<TableRow>,
    page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobReference {
    job_id: String,
    location: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TableSchema {
    #[serde(default)]
    fields: Vec<FieldSchema>,
}

#[derive(Debug, Deserialize)]
struct FieldSchema {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TableRow {
    #[serde(default)]
    f: Vec<TableCell>,
}

#[derive(Debug, Deserialize)]
struct TableCell {
    #[serde(default)]
    v: Value,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// [`WarehouseConnector`] backed by the BigQuery v2 REST API
pub struct BigQueryConnector {
    config: BigQueryConfig,
    http: reqwest::Client,
    tokens: Arc<dyn TokenSource>,
}

impl BigQueryConnector {
    pub fn new(config: BigQueryConfig, tokens: Arc<dyn TokenSource>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| Error::Http(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(config, tokens, http))
    }

    pub fn with_client(
        config: BigQueryConfig,
        tokens: Arc<dyn TokenSource>,
        http: reqwest::Client,
    ) -> Self {
        Self { config, http, tokens }
    }

    pub fn config(&self) -> &BigQueryConfig {
        &self.config
    }

    fn queries_url(&self) -> String {
        format!(
            "{}/projects/{}/queries",
            self.config.api_base.trim_end_matches('/'),
            self.config.project
        )
    }

    /// `jobs.query` body: legacy SQL off, every parameter bound as a named STRING
    fn query_request<'a>(&'a self, descriptor: &'a QueryDescriptor) -> QueryRequest<'a> {
        QueryRequest {
            query: &descriptor.sql,
            use_legacy_sql: false,
            parameter_mode: (!descriptor.parameters.is_empty()).then_some("NAMED"),
            query_parameters: descriptor
                .parameters
                .iter()
                .map(|p| ApiParameter {
                    name: &p.name,
                    parameter_type: ParameterType { kind: "STRING" },
                    parameter_value: ParameterValue { value: &p.value },
                })
                .collect(),
            request_id: uuid::Uuid::new_v4().to_string(),
            location: self.config.location.as_deref(),
            timeout_ms: self.config.wait_ms,
        }
    }

    /// Run a statement to completion and collect every page of its result
    async fn run(&self, descriptor: &QueryDescriptor) -> Result<(TableSchema, Vec<TableRow>)> {
        let request = self.query_request(descriptor);

        let token = self.tokens.access_token().await?;
        let response = self
            .http
            .post(self.queries_url())
            .bearer_auth(&token)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;
        let mut page: QueryResponse = decode_response(response).await?;

        let mut schema = None;
        let mut rows = Vec::new();
        loop {
            if page.job_complete {
                if schema.is_none() {
                    schema = page.schema.take();
                }
                rows.append(&mut page.rows);
                if page.page_token.is_none() {
                    break;
                }
            }

            let job = page.job_reference.clone().ok_or_else(|| {
                Error::Decode("incomplete query response without a jobReference".to_string())
            })?;
            tracing::debug!(
                job_id = %job.job_id,
                complete = page.job_complete,
                "Fetching query results"
            );
            let page_token = page.page_token.take();
            page = self.get_query_results(&job, page_token.as_deref()).await?;
            if page.job_reference.is_none() {
                page.job_reference = Some(job);
            }
        }

        Ok((schema.unwrap_or_default(), rows))
    }

    async fn get_query_results(
        &self,
        job: &JobReference,
        page_token: Option<&str>,
    ) -> Result<QueryResponse> {
        let mut params = vec![("timeoutMs", self.config.wait_ms.to_string())];
        if let Some(location) = job.location.as_deref().or(self.config.location.as_deref()) {
            params.push(("location", location.to_string()));
        }
        if let Some(token) = page_token {
            params.push(("pageToken", token.to_string()));
        }

        let token = self.tokens.access_token().await?;
        let response = self
            .http
            .get(format!("{}/{}", self.queries_url(), job.job_id))
            .bearer_auth(&token)
            .query(&params)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;
        decode_response(response).await
    }
}

#[async_trait]
impl WarehouseConnector for BigQueryConnector {
    async fn submit(&self, query: &QueryDescriptor) -> Result<Vec<ResultRow>> {
        let (schema, rows) = self.run(query).await?;
        decode_rows(&schema, &rows)
    }

    async fn ping(&self) -> Result<()> {
        self.run(&QueryDescriptor::plain(PING_SQL)).await?;
        Ok(())
    }
}

async fn decode_response(response: reqwest::Response) -> Result<QueryResponse> {
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|e| Error::Http(e.to_string()))?;

    if !status.is_success() {
        let message = serde_json::from_slice::<ErrorEnvelope>(&body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| String::from_utf8_lossy(&body).into_owned());
        tracing::error!(status = status.as_u16(), %message, "BigQuery request failed");
        return Err(Error::Warehouse {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_slice(&body).map_err(|e| Error::Decode(e.to_string()))
}

/// Map the `f`/`v` row encoding onto typed rows by column name
fn decode_rows(schema: &TableSchema, rows: &[TableRow]) -> Result<Vec<ResultRow>> {
    let columns: HashMap<&str, usize> = schema
        .fields
        .iter()
        .enumerate()
        .map(|(i, f)| (f.name.as_str(), i))
        .collect();

    let cell = |row: &TableRow, column: &str| -> Option<Value> {
        columns
            .get(column)
            .and_then(|&i| row.f.get(i))
            .map(|c| c.v.clone())
            .filter(|v| !v.is_null())
    };

    rows.iter()
        .map(|row| -> Result<ResultRow> {
            Ok(ResultRow {
                name: cell(row, "name").map(text_value),
                img: cell(row, "img").map(text_value),
                price: cell(row, "price")
                    .map(|v| number_value("price", v))
                    .transpose()?
                    .filter(|n| !n.is_nan()),
                brand: cell(row, "brand").map(text_value),
                avg_rating: cell(row, "avg_rating")
                    .map(|v| number_value("avg_rating", v))
                    .transpose()?
                    .filter(|n| !n.is_nan()),
            })
        })
        .collect()
}

fn text_value(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn number_value(column: &str, value: Value) -> Result<f64> {
    match &value {
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| {
            Error::Decode(format!("column {} holds non-numeric value '{}'", column, s))
        }),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| Error::Decode(format!("column {} holds unrepresentable number", column))),
        other => Err(Error::Decode(format!(
            "column {} holds non-numeric value {}",
            column, other
        ))),
    }
}
