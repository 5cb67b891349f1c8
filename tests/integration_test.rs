// Integration tests for bqsearch: HTTP surface over a fake warehouse
use actix_web::{
    http::{Method, StatusCode},
    test, web, App,
};
use async_trait::async_trait;
use bqsearch::{AppState, Error, QueryDescriptor, Result, ResultRow, SearchConfig, SearchService, WarehouseConnector};
use bqsearch_api::{configure, cors, WELCOME_MESSAGE};
use bqsearch_core::QUERY_PARAM;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

/// Returns canned rows and records every descriptor it receives
#[derive(Default)]
struct FakeWarehouse {
    rows: Vec<ResultRow>,
    unreachable: bool,
    submitted: Mutex<Vec<QueryDescriptor>>,
}

#[async_trait]
impl WarehouseConnector for FakeWarehouse {
    async fn submit(&self, query: &QueryDescriptor) -> Result<Vec<ResultRow>> {
        self.submitted.lock().unwrap().push(query.clone());
        if self.unreachable {
            return Err(Error::Http("connection refused".to_string()));
        }
        Ok(self.rows.clone())
    }

    async fn ping(&self) -> Result<()> {
        if self.unreachable {
            return Err(Error::Http("connection refused".to_string()));
        }
        Ok(())
    }
}

fn product(name: &str, price: Option<f64>, rating: Option<f64>) -> ResultRow {
    ResultRow {
        name: Some(name.to_string()),
        img: Some(format!("https://img.example/{}.jpg", name.to_lowercase().replace(' ', "-"))),
        price,
        brand: Some("Acme".to_string()),
        avg_rating: rating,
    }
}

fn state(warehouse: Arc<FakeWarehouse>) -> AppState {
    let config = SearchConfig::new("proj.shop.fashion_dataset", "proj.shop.embedding_model");
    AppState::new(SearchService::new(&config, warehouse).unwrap())
}

macro_rules! app {
    ($warehouse:expr) => {
        test::init_service(
            App::new()
                .wrap(cors())
                .app_data(web::Data::new(state($warehouse)))
                .configure(configure),
        )
        .await
    };
}

#[actix_web::test]
async fn test_root_welcome() {
    let app = app!(Arc::new(FakeWarehouse::default()));
    let resp: Value = test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(resp, json!({ "message": WELCOME_MESSAGE }));
}

#[actix_web::test]
async fn test_health_ignores_warehouse_state() {
    let warehouse = Arc::new(FakeWarehouse {
        unreachable: true,
        ..Default::default()
    });
    let app = app!(warehouse.clone());

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "status": "ok" }));

    // the probe must not have reached the warehouse at all
    assert!(warehouse.submitted.lock().unwrap().is_empty());
}

#[actix_web::test]
async fn test_ready_reflects_warehouse_state() {
    let down = app!(Arc::new(FakeWarehouse {
        unreachable: true,
        ..Default::default()
    }));
    let resp = test::call_service(&down, test::TestRequest::get().uri("/ready").to_request()).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "status": "unavailable" }));

    let up = app!(Arc::new(FakeWarehouse::default()));
    let resp = test::call_service(&up, test::TestRequest::get().uri("/ready").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_query_red_sneakers() {
    let warehouse = Arc::new(FakeWarehouse {
        rows: vec![
            product("Red Runner", Some(2499.0), Some(4.3)),
            product("Crimson Court", None, Some(3.9)),
            product("Scarlet Trainer", Some(1799.5), None),
        ],
        ..Default::default()
    });
    let app = app!(warehouse.clone());

    let req = test::TestRequest::post()
        .uri("/query")
        .set_json(json!({ "query": "red sneakers" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 3);

    let names: Vec<&str> = records.iter().map(|r| r["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Red Runner", "Crimson Court", "Scarlet Trainer"]);
    assert_eq!(records[0]["price"], "2499");
    assert_eq!(records[1]["price"], "0");
    assert_eq!(records[2]["price"], "1799.5");
    assert_eq!(records[2]["avg_rating"], "0");

    for record in records {
        let obj = record.as_object().unwrap();
        for key in ["name", "img", "price", "brand", "avg_rating"] {
            assert!(obj[key].is_string(), "{} must be a non-null string", key);
        }
    }

    let submitted = warehouse.submitted.lock().unwrap();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].parameter(QUERY_PARAM), Some("red sneakers"));
}

#[actix_web::test]
async fn test_query_empty_text_still_submitted() {
    let warehouse = Arc::new(FakeWarehouse::default());
    let app = app!(warehouse.clone());

    let req = test::TestRequest::post()
        .uri("/query")
        .set_json(json!({ "query": "" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!([]));

    let submitted = warehouse.submitted.lock().unwrap();
    assert_eq!(submitted[0].parameter(QUERY_PARAM), Some(""));
}

#[actix_web::test]
async fn test_query_injection_text_is_bound_not_spliced() {
    let warehouse = Arc::new(FakeWarehouse::default());
    let app = app!(warehouse.clone());

    for text in ["plain", "x' AS content)); DROP TABLE t; --"] {
        let req = test::TestRequest::post()
            .uri("/query")
            .set_json(json!({ "query": text }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let submitted = warehouse.submitted.lock().unwrap();
    assert_eq!(submitted.len(), 2);
    assert_eq!(submitted[0].sql, submitted[1].sql);
    assert!(!submitted[1].sql.contains("DROP TABLE"));
}

#[actix_web::test]
async fn test_query_results_bounded_by_top_k() {
    let warehouse = Arc::new(FakeWarehouse {
        rows: (0..8).map(|i| product(&format!("Item {}", i), Some(i as f64), None)).collect(),
        ..Default::default()
    });
    let app = app!(warehouse);

    let req = test::TestRequest::post()
        .uri("/query")
        .set_json(json!({ "query": "anything" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 6);
    assert_eq!(records[0]["name"], "Item 0");
}

#[actix_web::test]
async fn test_query_warehouse_failure_is_500() {
    let app = app!(Arc::new(FakeWarehouse {
        unreachable: true,
        ..Default::default()
    }));

    let req = test::TestRequest::post()
        .uri("/query")
        .set_json(json!({ "query": "boots" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "warehouse query failed" }));
}

#[actix_web::test]
async fn test_query_missing_field_is_400() {
    let app = app!(Arc::new(FakeWarehouse::default()));

    let req = test::TestRequest::post()
        .uri("/query")
        .set_json(json!({ "text": "boots" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("query"));
}

#[actix_web::test]
async fn test_cors_allows_any_origin_with_credentials() {
    let app = app!(Arc::new(FakeWarehouse::default()));

    let req = test::TestRequest::get()
        .uri("/health")
        .insert_header(("Origin", "https://shop.example"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let headers = resp.headers();
    assert_eq!(
        headers.get("access-control-allow-origin").unwrap(),
        "https://shop.example"
    );
    assert_eq!(
        headers.get("access-control-allow-credentials").unwrap(),
        "true"
    );
}

#[actix_web::test]
async fn test_cors_preflight_allows_any_method_and_header() {
    let app = app!(Arc::new(FakeWarehouse::default()));

    let req = test::TestRequest::default()
        .method(Method::OPTIONS)
        .uri("/query")
        .insert_header(("Origin", "https://shop.example"))
        .insert_header(("Access-Control-Request-Method", "POST"))
        .insert_header(("Access-Control-Request-Headers", "content-type, x-custom"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let headers = resp.headers();
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_lowercase()
    };
    assert_eq!(header("access-control-allow-origin"), "https://shop.example");
    assert_eq!(header("access-control-allow-credentials"), "true");
    assert!(header("access-control-allow-methods").contains("post"));
    assert!(header("access-control-allow-headers").contains("x-custom"));
    assert!(header("access-control-allow-headers").contains("content-type"));
}
