#![cfg(any(feature = "web-sqlite", feature = "web-postgres"))]
//! HTTP boundary tests: routes, status codes and the JSON wire shape.

mod common;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use invtracker::adapters::web::{AppState, build_router};
use invtracker::service::InvestmentService;
use serde_json::{Value, json};
use tower::ServiceExt;

use common::*;

fn create_test_app() -> (Router, InvestmentService) {
    let (service, _) = service_at(instant(2024, 1, 1));
    seed(&service);
    let app = build_router(AppState {
        service: service.clone(),
    });
    (app, service)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn health_is_ok() {
        let (app, _) = create_test_app();
        let response = app.oneshot(empty_request("GET", "/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn list_returns_all_seeded_rows() {
        let (app, _) = create_test_app();
        let response = app.oneshot(empty_request("GET", "/investment")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn list_filters_by_date_query() {
        let (app, _) = create_test_app();
        let response = app
            .oneshot(empty_request(
                "GET",
                "/investment?fromDate=2023-05-01&toDate=2023-12-31",
            ))
            .await
            .unwrap();
        let body = body_json(response).await;
        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["purchasedDate"], "2023-06-01");
    }

    #[tokio::test]
    async fn list_rejects_unparsable_date() {
        let (app, _) = create_test_app();
        let response = app
            .oneshot(empty_request("GET", "/investment?fromDate=yesterday"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn enums_travel_as_ordinals() {
        let (app, _) = create_test_app();
        let response = app.oneshot(empty_request("GET", "/investment/3")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["id"], 3);
        assert_eq!(body["type"], 6);
        assert_eq!(body["status"], 2);
        assert_eq!(body["sellDate"], "2023-04-01");
        assert_eq!(body["duration"], 90);
        assert!(body["createdOn"].is_string());
    }

    #[tokio::test]
    async fn get_missing_is_404() {
        let (app, _) = create_test_app();
        let response = app.oneshot(empty_request("GET", "/investment/99")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let (app, _) = create_test_app();
        let response = app.oneshot(empty_request("GET", "/nowhere")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

mod searching {
    use super::*;

    #[tokio::test]
    async fn search_sorts_and_pages() {
        let (app, _) = create_test_app();
        let response = app
            .oneshot(json_request(
                "POST",
                "/investment/search",
                json!({"sortField": "amount", "sortOrder": 1, "pageNumber": 1, "pageSize": 2}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let ids: Vec<i64> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[tokio::test]
    async fn search_with_numeric_filter_value() {
        let (app, _) = create_test_app();
        let response = app
            .oneshot(json_request(
                "POST",
                "/investment/search",
                json!({"filterColumn": "status", "filterValue": 2}),
            ))
            .await
            .unwrap();
        let body = body_json(response).await;
        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["status"], 2);
    }

    #[tokio::test]
    async fn search_respects_date_query() {
        let (app, _) = create_test_app();
        let response = app
            .oneshot(json_request(
                "POST",
                "/investment/search?toDate=2023-03-01",
                json!({}),
            ))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn search_rejects_zero_page() {
        let (app, _) = create_test_app();
        let response = app
            .oneshot(json_request(
                "POST",
                "/investment/search",
                json!({"pageNumber": 0}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

mod writing {
    use super::*;

    #[tokio::test]
    async fn post_creates_with_location() {
        let (app, service) = create_test_app();
        let response = app
            .oneshot(json_request(
                "POST",
                "/investment",
                json!({
                    "amount": 2500.5,
                    "type": 8,
                    "purchasedDate": "2023-11-15",
                    "description": "btc",
                    "status": 0
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/investment/5"
        );

        let body = body_json(response).await;
        assert_eq!(body["id"], 5);
        assert_eq!(body["type"], 8);
        assert_eq!(body["duration"], 47);
        assert!(service.get_by_id(5).unwrap().is_some());
    }

    #[tokio::test]
    async fn post_rejects_unknown_ordinal() {
        let (app, _) = create_test_app();
        let response = app
            .oneshot(json_request(
                "POST",
                "/investment",
                json!({"amount": 1, "type": 42, "purchasedDate": "2023-11-15", "status": 0}),
            ))
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn post_rejects_sell_before_purchase() {
        let (app, _) = create_test_app();
        let response = app
            .oneshot(json_request(
                "POST",
                "/investment",
                json!({
                    "amount": 1,
                    "type": 0,
                    "purchasedDate": "2023-11-15",
                    "sellDate": "2023-11-01",
                    "status": 1
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn put_replaces_record() {
        let (app, service) = create_test_app();
        let response = app
            .oneshot(json_request(
                "PUT",
                "/investment/1",
                json!({
                    "id": 1,
                    "amount": 2100,
                    "type": 5,
                    "purchasedDate": "2023-01-01",
                    "sellDate": "2023-12-01",
                    "status": 1
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let updated = service.get_by_id(1).unwrap().unwrap();
        assert_eq!(updated.amount, rust_decimal::Decimal::from(2100));
        assert_eq!(updated.description, None);
    }

    #[tokio::test]
    async fn put_with_mismatched_id_is_400() {
        let (app, _) = create_test_app();
        let response = app
            .oneshot(json_request(
                "PUT",
                "/investment/1",
                json!({"id": 2, "amount": 1, "type": 0, "purchasedDate": "2023-01-01", "status": 0}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn put_missing_is_404() {
        let (app, _) = create_test_app();
        let response = app
            .oneshot(json_request(
                "PUT",
                "/investment/50",
                json!({"id": 50, "amount": 1, "type": 0, "purchasedDate": "2023-01-01", "status": 0}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_is_204_whether_or_not_present() {
        let (app, service) = create_test_app();
        let response = app
            .clone()
            .oneshot(empty_request("DELETE", "/investment/1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(service.get_by_id(1).unwrap().is_none());

        let response = app
            .oneshot(empty_request("DELETE", "/investment/1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}

mod summaries {
    use super::*;

    #[tokio::test]
    async fn summary_reports_totals() {
        let (app, _) = create_test_app();
        let response = app
            .oneshot(empty_request("GET", "/investment/summary"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["count"], 4);
        assert_eq!(body["byStatus"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn monthly_summary_has_twelve_months() {
        let (app, _) = create_test_app();
        let response = app
            .oneshot(empty_request("GET", "/investment/summary/monthly?year=2023"))
            .await
            .unwrap();
        let body = body_json(response).await;
        let months = body.as_array().unwrap();
        assert_eq!(months.len(), 12);
        assert_eq!(months[0]["month"], "January");
    }
}

mod rejections {
    use super::*;

    async fn assert_json_error(response: axum::response::Response, status: StatusCode) {
        assert_eq!(response.status(), status);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let body = body_json(response).await;
        assert!(!body["error"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_json_body_gets_json_error() {
        let (app, _) = create_test_app();
        let request = Request::builder()
            .method("POST")
            .uri("/investment")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"amount\": "))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_json_error(response, StatusCode::BAD_REQUEST).await;
    }

    #[tokio::test]
    async fn unknown_ordinal_gets_json_error() {
        let (app, _) = create_test_app();
        let response = app
            .oneshot(json_request(
                "POST",
                "/investment",
                json!({"amount": 1, "type": 42, "purchasedDate": "2023-11-15", "status": 0}),
            ))
            .await
            .unwrap();
        assert_json_error(response, StatusCode::UNPROCESSABLE_ENTITY).await;
    }

    #[tokio::test]
    async fn missing_content_type_gets_json_error() {
        let (app, _) = create_test_app();
        let request = Request::builder()
            .method("POST")
            .uri("/investment/search")
            .body(Body::from("{}"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_json_error(response, StatusCode::UNSUPPORTED_MEDIA_TYPE).await;
    }

    #[tokio::test]
    async fn non_numeric_id_gets_json_error() {
        let (app, _) = create_test_app();
        let response = app
            .oneshot(empty_request("GET", "/investment/abc"))
            .await
            .unwrap();
        assert_json_error(response, StatusCode::BAD_REQUEST).await;
    }

    #[tokio::test]
    async fn non_numeric_year_gets_json_error() {
        let (app, _) = create_test_app();
        let response = app
            .oneshot(empty_request("GET", "/investment/summary/monthly?year=soon"))
            .await
            .unwrap();
        assert_json_error(response, StatusCode::BAD_REQUEST).await;
    }
}
