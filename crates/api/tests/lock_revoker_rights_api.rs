//! HTTP-level integration tests for lock revoker rights administration.

mod common;

use axum::http::StatusCode;
use axum::Router;
use common::{body_json, delete_auth, get, post_auth, post_json_auth, token_for};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn admin() -> String {
    token_for("q0admin", "admin")
}

async fn update_rights(app: Router, action: &str, mask: &str, user: &str) -> StatusCode {
    post_auth(
        app,
        &format!(
            "/api/v1/lock-revoker-rights/{action}?office=SWT&project-mask={mask}&application-id=cwms-ui&user-id={user}"
        ),
        &admin(),
    )
    .await
    .status()
}

async fn check(app: Router, project: &str, user: &str) -> (StatusCode, serde_json::Value) {
    let response = get(
        app,
        &format!(
            "/api/v1/lock-revoker-rights/check?office=SWT&project-id={project}&application-id=cwms-ui&user-id={user}"
        ),
    )
    .await;
    let status = response.status();
    (status, body_json(response).await)
}

async fn setup_projects(pool: &PgPool) -> Router {
    let app = common::build_test_app(pool.clone());
    for name in ["KEYS", "KAW", "EUFA"] {
        let response = post_json_auth(
            app.clone(),
            "/api/v1/projects",
            json!({ "office-id": "SWT", "name": name }),
            &token_for("q0writer", "user"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }
    app
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn granting_rights_requires_admin(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_auth(
        app.clone(),
        "/api/v1/lock-revoker-rights/allow?office=SWT&project-mask=*&application-id=cwms-ui&user-id=q0user",
        &token_for("q0user", "user"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_auth(
        app,
        "/api/v1/lock-revoker-rights/allow?office=SWT&project-mask=*&application-id=cwms-ui&user-id=q0user",
        "not-a-token",
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn deny_list_wins_over_allow_list(pool: PgPool) {
    let app = setup_projects(&pool).await;

    assert_eq!(update_rights(app.clone(), "allow", "K*", "q0user").await, StatusCode::OK);
    assert_eq!(update_rights(app.clone(), "deny", "KAW", "q0user").await, StatusCode::OK);

    let (status, json) = check(app.clone(), "KEYS", "q0user").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["has-rights"], true);

    let (_, json) = check(app.clone(), "KAW", "q0user").await;
    assert_eq!(json["has-rights"], false);

    let (_, json) = check(app, "EUFA", "q0user").await;
    assert_eq!(json["has-rights"], false);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn deny_star_clears_both_lists(pool: PgPool) {
    let app = setup_projects(&pool).await;

    update_rights(app.clone(), "allow", "*", "q0user").await;
    update_rights(app.clone(), "deny", "KAW", "q0user").await;
    assert_eq!(update_rights(app.clone(), "deny", "*", "q0user").await, StatusCode::OK);

    let (_, json) = check(app.clone(), "KEYS", "q0user").await;
    assert_eq!(json["has-rights"], false);

    // Off the deny list: a fresh grant covers KAW again.
    update_rights(app.clone(), "allow", "*", "q0user").await;
    let (_, json) = check(app, "KAW", "q0user").await;
    assert_eq!(json["has-rights"], true);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn check_on_unknown_project_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (status, _) = check(app, "NOPE", "q0user").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn catalog_lists_effective_grants(pool: PgPool) {
    let app = common::build_test_app(pool);

    update_rights(app.clone(), "allow", "K*", "q0alpha").await;
    update_rights(app.clone(), "allow", "EUFA", "q0alpha").await;
    update_rights(app.clone(), "deny", "EUF*", "q0alpha").await;
    update_rights(app.clone(), "allow", "KEYS", "q0bravo").await;

    let response = get(app.clone(), "/api/v1/lock-revoker-rights").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(get(app, "/api/v1/lock-revoker-rights?office-mask=SWT").await).await;
    let grants: Vec<(String, String)> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|r| {
            (
                r["user-id"].as_str().unwrap().to_string(),
                r["project-mask"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    assert_eq!(
        grants,
        vec![
            ("q0alpha".to_string(), "K*".to_string()),
            ("q0bravo".to_string(), "KEYS".to_string()),
        ]
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn remove_all_clears_user_rights(pool: PgPool) {
    let app = setup_projects(&pool).await;
    update_rights(app.clone(), "allow", "*", "q0user").await;

    let response = delete_auth(
        app.clone(),
        "/api/v1/lock-revoker-rights?office=SWT&application-id=cwms-ui&user-id=q0user",
        &admin(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let (_, json) = check(app, "KEYS", "q0user").await;
    assert_eq!(json["has-rights"], false);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn invalid_project_mask_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let status = update_rights(app, "allow", "%5Bbroken", "q0user").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn catalog_for_a_project_agrees_with_check(pool: PgPool) {
    let app = setup_projects(&pool).await;

    update_rights(app.clone(), "allow", "K*", "q0alpha").await;
    update_rights(app.clone(), "deny", "KEYS", "q0alpha").await;
    update_rights(app.clone(), "allow", "*", "q0bravo").await;

    for project in ["KEYS", "KAW", "EUFA"] {
        let json = body_json(
            get(
                app.clone(),
                &format!("/api/v1/lock-revoker-rights?office-mask=SWT&project-mask={project}"),
            )
            .await,
        )
        .await;
        let listed: Vec<&str> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["user-id"].as_str().unwrap())
            .collect();

        for user in ["q0alpha", "q0bravo"] {
            let (_, rights) = check(app.clone(), project, user).await;
            assert_eq!(
                listed.contains(&user),
                rights["has-rights"].as_bool().unwrap(),
                "{user} on {project}"
            );
        }
    }
}
