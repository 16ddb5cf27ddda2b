use super::common::*;
use axum::body::{to_bytes, Body};
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::assessments::router::{assessment_router, score_handler};

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}

fn score_request(assessment_id: &str, body: Value) -> Request<Body> {
    Request::post(format!("/api/v1/assessments/{assessment_id}/score"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

#[tokio::test]
async fn list_route_returns_catalog_summaries() {
    let response = assessment_router(catalog())
        .oneshot(
            Request::get("/api/v1/assessments")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let entries = body.as_array().expect("array");
    assert_eq!(entries.len(), 5);
    assert_eq!(entries[0]["id"], COGNITIVE_STYLE);
    assert_eq!(entries[0]["item_count"], 10);
    assert_eq!(entries[4]["id"], SENSORY_PROFILE);
}

#[tokio::test]
async fn detail_route_returns_items_with_their_kind() {
    let response = assessment_router(catalog())
        .oneshot(
            Request::get(format!("/api/v1/assessments/{SENSORY_PROFILE}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["items"][0]["id"], "noise");
    assert_eq!(body["items"][0]["kind"], "slider");
    assert_eq!(body["items"][0]["default"], 4.0);
    assert_eq!(body["analysis_route"]["route"], "local_only");
}

#[tokio::test]
async fn detail_route_returns_not_found_for_unknown_ids() {
    let response = assessment_router(catalog())
        .oneshot(
            Request::get("/api/v1/assessments/memory-palace")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("memory-palace"));
}

#[tokio::test]
async fn score_route_returns_the_local_summary() {
    let response = assessment_router(catalog())
        .oneshot(score_request(
            SENSORY_PROFILE,
            json!({
                "noise": 4,
                "interruptions": 4,
                "lighting": 4,
                "crowding": 4,
                "schedule_changes": 4
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["assessment_id"], SENSORY_PROFILE);
    assert_eq!(body["local_summary"]["normalized_percent"], 57);
    assert_eq!(
        body["local_summary"]["narrative_lines"][0],
        "Balanced sensory profile: adapts comfortably to most work environments."
    );
}

#[tokio::test]
async fn score_route_lists_missing_items_for_incomplete_sets() {
    let response = assessment_router(catalog())
        .oneshot(score_request(
            COGNITIVE_STYLE,
            json!({ "cs-01": "Read the details line by line" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    let missing = body["missing_items"].as_array().expect("missing items");
    assert_eq!(missing.len(), 9);
    assert_eq!(missing[0], "cs-02");
}

#[tokio::test]
async fn score_handler_rejects_invalid_answers() {
    let responses = serde_json::from_value(json!({ "noise": 12 })).expect("response set");

    let response = score_handler(
        State(catalog()),
        Path(SENSORY_PROFILE.to_string()),
        axum::Json(responses),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("outside"));
}

#[tokio::test]
async fn score_route_returns_not_found_for_unknown_ids() {
    let response = assessment_router(catalog())
        .oneshot(score_request("memory-palace", json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
