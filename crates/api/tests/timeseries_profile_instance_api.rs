//! HTTP-level integration tests for `/timeseries/profile-instance`.

mod common;

use axum::http::StatusCode;
use axum::Router;
use common::{body_json, delete_auth, get, post_json_auth, query_escape, token_for};
use serde_json::json;
use sqlx::PgPool;

async fn store_profile(app: Router, location: &str) {
    let response = post_json_auth(
        app,
        "/api/v1/timeseries/profile",
        json!({
            "office-id": "SWT",
            "location-id": location,
            "key-parameter-id": "Depth",
            "parameter-list": ["Depth", "Temp-Water"],
        }),
        &token_for("q0writer", "user"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

fn instance_body(location: &str, version: &str, version_date: &str) -> serde_json::Value {
    json!({
        "office-id": "SWT",
        "location-id": location,
        "key-parameter-id": "Depth",
        "version-id": version,
        "version-date": version_date,
        "first-date": "2026-03-01T00:00:00Z",
        "last-date": "2026-03-01T06:00:00Z",
    })
}

async fn store(app: Router, body: serde_json::Value, query: &str) -> StatusCode {
    post_json_auth(
        app,
        &format!("/api/v1/timeseries/profile-instance{query}"),
        body,
        &token_for("q0writer", "user"),
    )
    .await
    .status()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn store_retrieve_and_delete_instance(pool: PgPool) {
    let app = common::build_test_app(pool);
    store_profile(app.clone(), "KEYS").await;

    let body = instance_body("KEYS", "Raw", "2026-03-01T06:00:00Z");
    assert_eq!(store(app.clone(), body.clone(), "").await, StatusCode::CREATED);
    assert_eq!(store(app.clone(), body.clone(), "").await, StatusCode::CONFLICT);
    assert_eq!(
        store(app.clone(), body, "?fail-if-exists=false").await,
        StatusCode::CREATED
    );

    let uri = "/api/v1/timeseries/profile-instance/KEYS/Depth/Raw?office=SWT\
               &version-date=2026-03-01T06:00:00Z";
    let response = get(app.clone(), uri).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["version-id"], "Raw");
    assert_eq!(json["first-date"], "2026-03-01T00:00:00Z");
    assert!(json.get("id").is_none());

    let other_date = "/api/v1/timeseries/profile-instance/KEYS/Depth/Raw?office=SWT\
                      &version-date=2026-03-02T06:00:00Z";
    assert_eq!(get(app.clone(), other_date).await.status(), StatusCode::NOT_FOUND);

    let token = token_for("q0writer", "user");
    assert_eq!(delete_auth(app.clone(), uri, &token).await.status(), StatusCode::NO_CONTENT);
    assert_eq!(delete_auth(app, uri, &token).await.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn store_rejects_inverted_window_and_unknown_profile(pool: PgPool) {
    let app = common::build_test_app(pool);
    store_profile(app.clone(), "KEYS").await;

    let mut inverted = instance_body("KEYS", "Raw", "2026-03-01T06:00:00Z");
    inverted["first-date"] = json!("2026-03-02T00:00:00Z");
    let response = post_json_auth(
        app.clone(),
        "/api/v1/timeseries/profile-instance",
        inverted,
        &token_for("q0writer", "user"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let orphan = instance_body("NOPE", "Raw", "2026-03-01T06:00:00Z");
    assert_eq!(store(app, orphan, "").await, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn retrieve_requires_office_and_version_date(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/timeseries/profile-instance/KEYS/Depth/Raw").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "MISSING_PARAMETERS");
    assert_eq!(json["error"], "Missing required parameters: office, version-date");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn catalog_pages_through_versions(pool: PgPool) {
    let app = common::build_test_app(pool);
    store_profile(app.clone(), "KEYS").await;
    for day in 1..=5 {
        let date = format!("2026-03-0{day}T06:00:00Z");
        let mut body = instance_body("KEYS", "Raw", &date);
        body["first-date"] = json!(date);
        body["last-date"] = json!(date);
        assert_eq!(store(app.clone(), body, "").await, StatusCode::CREATED);
    }

    let mut seen = Vec::new();
    let mut uri = "/api/v1/timeseries/profile-instance?version-mask=raw&page-size=2".to_string();
    loop {
        let response = get(app.clone(), &uri).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["total"], 5);
        for item in json["items"].as_array().unwrap() {
            seen.push(item["version-date"].as_str().unwrap().to_string());
        }
        match json["next-page"].as_str() {
            Some(next) => {
                uri = format!(
                    "/api/v1/timeseries/profile-instance?page={}",
                    query_escape(next)
                )
            }
            None => break,
        }
    }

    let expected: Vec<String> = (1..=5).map(|d| format!("2026-03-0{d}T06:00:00Z")).collect();
    assert_eq!(seen, expected);
}
