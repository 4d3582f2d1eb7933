//! HTTP-level integration tests for `/timeseries/profile`.

mod common;

use axum::http::StatusCode;
use axum::Router;
use common::{body_json, delete_auth, get, post_json_auth, query_escape, token_for};
use serde_json::json;
use sqlx::PgPool;

fn profile_body(location: &str, key: &str, parameters: &[&str]) -> serde_json::Value {
    json!({
        "office-id": "SWT",
        "location-id": location,
        "key-parameter-id": key,
        "parameter-list": parameters,
        "description": "Temperature string",
    })
}

async fn store(app: Router, body: serde_json::Value, query: &str) -> StatusCode {
    post_json_auth(
        app,
        &format!("/api/v1/timeseries/profile{query}"),
        body,
        &token_for("q0writer", "user"),
    )
    .await
    .status()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn store_retrieve_and_delete_profile(pool: PgPool) {
    let app = common::build_test_app(pool);
    let body = profile_body("KEYS", "Depth", &["Depth", "Temp-Water"]);
    assert_eq!(store(app.clone(), body.clone(), "").await, StatusCode::CREATED);
    assert_eq!(store(app.clone(), body.clone(), "").await, StatusCode::CONFLICT);
    assert_eq!(
        store(app.clone(), body, "?fail-if-exists=false").await,
        StatusCode::CREATED
    );

    let response = get(app.clone(), "/api/v1/timeseries/profile/KEYS/Depth?office=SWT").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["parameter-list"], json!(["Depth", "Temp-Water"]));

    let token = token_for("q0writer", "user");
    let uri = "/api/v1/timeseries/profile/KEYS/Depth?office=SWT";
    assert_eq!(delete_auth(app.clone(), uri, &token).await.status(), StatusCode::NO_CONTENT);
    assert_eq!(delete_auth(app.clone(), uri, &token).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(get(app, uri).await.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn key_parameter_must_be_in_parameter_list(pool: PgPool) {
    let app = common::build_test_app(pool);
    let status = store(app, profile_body("KEYS", "Depth", &["Temp-Water"]), "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn catalog_masks_and_pages(pool: PgPool) {
    let app = common::build_test_app(pool);
    for location in ["KEYS", "KAW", "EUFA", "TENK", "OOLO"] {
        let body = profile_body(location, "Depth", &["Depth", "Temp-Water"]);
        assert_eq!(store(app.clone(), body, "").await, StatusCode::CREATED);
    }

    let json = body_json(
        get(
            app.clone(),
            "/api/v1/timeseries/profile?location-mask=K*&parameter-id-mask=depth",
        )
        .await,
    )
    .await;
    assert_eq!(json["total"], 2);

    let mut locations = Vec::new();
    let mut uri = "/api/v1/timeseries/profile?office-mask=SWT&page-size=2".to_string();
    loop {
        let json = body_json(get(app.clone(), &uri).await).await;
        assert_eq!(json["total"], 5);
        for item in json["items"].as_array().unwrap() {
            locations.push(item["location-id"].as_str().unwrap().to_string());
        }
        match json["next-page"].as_str() {
            Some(next) => {
                uri = format!("/api/v1/timeseries/profile?office-mask=SWT&page={}", query_escape(next))
            }
            None => break,
        }
    }
    assert_eq!(locations, vec!["EUFA", "KAW", "KEYS", "OOLO", "TENK"]);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn profile_catalogs_default_to_pages_of_500(pool: PgPool) {
    let app = common::build_test_app(pool);
    for uri in [
        "/api/v1/timeseries/profile",
        "/api/v1/timeseries/profile-parser",
        "/api/v1/timeseries/profile-instance",
    ] {
        let json = body_json(get(app.clone(), uri).await).await;
        assert_eq!(json["page-size"], 500, "{uri}");
    }

    let json = body_json(get(app, "/api/v1/projects").await).await;
    assert_eq!(json["page-size"], 100);
}
