//! End-to-end API tests
//!
//! Drive the fully assembled router (middleware included) with in-memory
//! requests. The chart renderer is stubbed so these tests exercise the
//! boundary and the analysis pipeline without a graphics backend.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::NaiveDate;
use dashly_server::analysis::{AnalyzeError, ChartRenderer};
use dashly_server::{Config, ServerState, api};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;

/// Fixed fake image bytes, enough to verify the base64 round-trip
const STUB_PNG: &[u8] = b"\x89PNG-stub-image-bytes";

struct StubRenderer;

impl ChartRenderer for StubRenderer {
    fn render(&self, series: &[(NaiveDate, f64)]) -> Result<Vec<u8>, AnalyzeError> {
        assert!(!series.is_empty(), "renderer must never see an empty series");
        Ok(STUB_PNG.to_vec())
    }
}

fn app() -> axum::Router {
    let config = Config::with_overrides(0, Decimal::new(15, 2));
    let state = ServerState::with_renderer(&config, Arc::new(StubRenderer));
    api::build_app(&state).with_state(state)
}

const BOUNDARY: &str = "dashly-test-boundary";

fn analyze_request(period: &str, filename: &str, content: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"period\"\r\n\r\n{period}\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: text/csv\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/analyze")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

const WEEK_CSV: &str = "date,sku,title,qty,revenue\n\
    2025-10-14,A1,Mug,2,200\n\
    2025-10-16,B1,Plate,5,500\n\
    2025-10-20,A1,Mug,1,100\n";

#[tokio::test]
async fn test_health() {
    let response = app()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_analyze_week_without_comparison_data() {
    let response = app()
        .oneshot(analyze_request("week", "sales.csv", WEEK_CSV.as_bytes()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;

    assert_eq!(json["revenue"], 800.0);
    assert_eq!(json["orders"], 8);
    assert_eq!(json["avg_check"], 100.0);
    assert_eq!(json["commission"], 120.0);
    assert_eq!(json["profit"], 680.0);

    // no rows before the window: all three deltas are null
    assert!(json["revenue_change_pct"].is_null());
    assert!(json["orders_change_pct"].is_null());
    assert!(json["avg_check_change_pct"].is_null());

    let top5 = json["top5"].as_array().unwrap();
    assert_eq!(top5.len(), 2);
    assert_eq!(top5[0]["sku"], "B1");
    assert_eq!(top5[0]["qty"], 5);

    assert!(!json["tips"].as_array().unwrap().is_empty());

    assert_eq!(json["meta"]["source"], "csv");
    assert_eq!(json["meta"]["mode"], "manual");
    assert_eq!(json["meta"]["period"], "week");
    assert_eq!(json["meta"]["period_start"], "2025-10-14");
    assert_eq!(json["meta"]["period_end"], "2025-10-20");
    assert_eq!(json["meta"]["rows_processed"], 3);
}

#[tokio::test]
async fn test_chart_base64_round_trip() {
    let response = app()
        .oneshot(analyze_request("week", "sales.csv", WEEK_CSV.as_bytes()))
        .await
        .unwrap();

    let json = json_body(response).await;
    let encoded = json["chart_png_base64"].as_str().unwrap();
    let decoded = STANDARD.decode(encoded).unwrap();
    assert_eq!(decoded, STUB_PNG);
}

#[tokio::test]
async fn test_analyze_today_with_comparison_data() {
    let csv = "date,sku,title,qty,revenue\n\
        2025-10-13,A1,Mug,4,400\n\
        2025-10-14,A1,Mug,2,200\n\
        2025-10-14,B1,Plate,3,300\n";
    let response = app()
        .oneshot(analyze_request("today", "sales.csv", csv.as_bytes()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["revenue"], 500.0);
    assert_eq!(json["revenue_change_pct"], 25.0);
    assert_eq!(json["orders_change_pct"], 25.0);
}

#[tokio::test]
async fn test_period_is_case_insensitive() {
    let response = app()
        .oneshot(analyze_request("WEEK", "sales.csv", WEEK_CSV.as_bytes()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_locked_periods_are_forbidden() {
    for period in ["month", "all"] {
        let response = app()
            .oneshot(analyze_request(period, "sales.csv", WEEK_CSV.as_bytes()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let json = json_body(response).await;
        assert_eq!(json["code"], "E2001");
        assert!(
            json["message"].as_str().unwrap().contains("Feature locked"),
            "{json}"
        );
    }
}

#[tokio::test]
async fn test_unknown_period_is_rejected() {
    let response = app()
        .oneshot(analyze_request("year", "sales.csv", WEEK_CSV.as_bytes()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert!(
        json["message"]
            .as_str()
            .unwrap()
            .contains("today, week, month, all"),
        "{json}"
    );
}

#[tokio::test]
async fn test_missing_column_is_named() {
    let csv = "date,sku,qty,revenue\n2025-10-14,A1,2,200\n";
    let response = app()
        .oneshot(analyze_request("week", "sales.csv", csv.as_bytes()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert!(
        json["message"].as_str().unwrap().contains("title"),
        "{json}"
    );
}

#[tokio::test]
async fn test_unsupported_file_format() {
    let response = app()
        .oneshot(analyze_request("week", "sales.json", b"{}"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert!(
        json["message"].as_str().unwrap().contains("Unsupported"),
        "{json}"
    );
}

#[tokio::test]
async fn test_empty_table_is_no_data() {
    let response = app()
        .oneshot(analyze_request(
            "week",
            "sales.csv",
            b"date,sku,title,qty,revenue\n",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert!(
        json["message"].as_str().unwrap().contains("No data"),
        "{json}"
    );
}

#[tokio::test]
async fn test_missing_file_field() {
    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"period\"\r\n\r\nweek\r\n--{BOUNDARY}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/analyze")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_request_id_header_is_set() {
    let response = app()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert!(response.headers().contains_key("x-request-id"));
}
