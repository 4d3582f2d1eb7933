//! HTTP-level integration tests for `/timeseries/profile-parser`.

mod common;

use axum::http::StatusCode;
use axum::Router;
use common::{body_json, delete_auth, get, post_json, post_json_auth, token_for};
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

fn parser_body(location: &str) -> serde_json::Value {
    json!({
        "office-id": "SWT",
        "location-id": location,
        "key-parameter-id": "Depth",
        "record-delimiter": "\n",
        "field-delimiter": ",",
        "time-format": "MM/DD/YYYY,HH24:MI:SS",
        "time-zone": "UTC",
        "time-field": 1,
        "time-in-two-fields": true,
        "parameter-info-list": [
            { "parameter-id": "Depth", "unit": "m", "index": 3 },
            { "parameter-id": "Temp-Water", "unit": "C", "index": 4 },
        ],
    })
}

async fn store(app: Router, body: serde_json::Value, query: &str) -> StatusCode {
    post_json_auth(
        app,
        &format!("/api/v1/timeseries/profile-parser{query}"),
        body,
        &token_for("q0writer", "user"),
    )
    .await
    .status()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn store_retrieve_and_delete_parser(pool: PgPool) {
    let app = common::build_test_app(pool);
    store_profile(app.clone(), "KEYS").await;

    let body = parser_body("KEYS");
    assert_eq!(store(app.clone(), body.clone(), "").await, StatusCode::CREATED);
    assert_eq!(store(app.clone(), body.clone(), "").await, StatusCode::CONFLICT);
    assert_eq!(
        store(app.clone(), body, "?fail-if-exists=false").await,
        StatusCode::CREATED
    );

    let uri = "/api/v1/timeseries/profile-parser/Depth?office=SWT&location-id=KEYS";
    let response = get(app.clone(), uri).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["field-delimiter"], ",");
    assert_eq!(json["time-field"], 1);
    assert!(json.get("time-start-column").is_none());
    assert!(json.get("id").is_none());
    assert_eq!(
        json["parameter-info-list"],
        json!([
            { "parameter-id": "Depth", "unit": "m", "index": 3 },
            { "parameter-id": "Temp-Water", "unit": "C", "index": 4 },
        ])
    );

    let token = token_for("q0writer", "user");
    assert_eq!(delete_auth(app.clone(), uri, &token).await.status(), StatusCode::NO_CONTENT);
    assert_eq!(delete_auth(app.clone(), uri, &token).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(get(app, uri).await.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn store_requires_authentication_and_a_profile(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app.clone(),
        "/api/v1/timeseries/profile-parser",
        parser_body("KEYS"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    assert_eq!(store(app, parser_body("KEYS"), "").await, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn store_rejects_inconsistent_layout(pool: PgPool) {
    let app = common::build_test_app(pool);
    store_profile(app.clone(), "KEYS").await;

    let mut mixed = parser_body("KEYS");
    mixed["time-start-column"] = json!(1);
    mixed["time-end-column"] = json!(19);
    let response = post_json_auth(
        app.clone(),
        "/api/v1/timeseries/profile-parser",
        mixed,
        &token_for("q0writer", "user"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let mut unparsed_key = parser_body("KEYS");
    unparsed_key["parameter-info-list"] =
        json!([{ "parameter-id": "Temp-Water", "unit": "C", "index": 4 }]);
    assert_eq!(store(app, unparsed_key, "").await, StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn retrieve_names_every_missing_parameter(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/timeseries/profile-parser/Depth").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "MISSING_PARAMETERS");
    assert_eq!(json["error"], "Missing required parameters: office, location-id");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn catalog_filters_by_location(pool: PgPool) {
    let app = common::build_test_app(pool);
    for location in ["KEYS", "TENK", "KEYS-Dam"] {
        store_profile(app.clone(), location).await;
        assert_eq!(store(app.clone(), parser_body(location), "").await, StatusCode::CREATED);
    }

    let json = body_json(
        get(app.clone(), "/api/v1/timeseries/profile-parser?location-mask=keys*").await,
    )
    .await;
    let locations: Vec<&str> = json["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["location-id"].as_str().unwrap())
        .collect();
    assert_eq!(locations, vec!["KEYS", "KEYS-Dam"]);
    assert_eq!(json["total"], 2);
    assert_eq!(json["items"][0]["parameter-info-list"].as_array().unwrap().len(), 2);

    let response = get(app, "/api/v1/timeseries/profile-parser?office-mask=%5Bbad").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn deleting_profile_removes_parser(pool: PgPool) {
    let app = common::build_test_app(pool);
    store_profile(app.clone(), "KEYS").await;
    assert_eq!(store(app.clone(), parser_body("KEYS"), "").await, StatusCode::CREATED);

    let token = token_for("q0writer", "user");
    let response = delete_auth(
        app.clone(),
        "/api/v1/timeseries/profile/KEYS/Depth?office=SWT",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(
        app,
        "/api/v1/timeseries/profile-parser/Depth?office=SWT&location-id=KEYS",
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
