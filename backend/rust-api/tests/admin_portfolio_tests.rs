use axum::http::StatusCode;
use serde_json::json;

mod common;

use common::{admin_auth, get, post, send};

#[tokio::test]
async fn test_login_checks_password() {
    let app = common::create_test_app().await;

    let ok = post(
        &app,
        "/api/v1/admin/login",
        Some(json!({ "password": "admin123" })),
    )
    .await;
    assert_eq!(ok.status, StatusCode::OK);
    assert_eq!(ok.body["authenticated"], true);

    let denied = post(
        &app,
        "/api/v1/admin/login",
        Some(json!({ "password": "hunter2" })),
    )
    .await;
    assert_eq!(denied.status, StatusCode::UNAUTHORIZED);
    assert_eq!(denied.body["status"], 401);
}

#[tokio::test]
async fn test_admin_routes_require_basic_auth() {
    let app = common::create_test_app().await;

    let response = send(
        &app,
        "POST",
        "/admin/portfolio/skills",
        Some(json!({ "name": "Rust" })),
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(response.headers.contains_key("www-authenticate"));

    let listing = get(&app, "/api/v1/portfolio/skills").await;
    assert_eq!(listing.status, StatusCode::OK);
    assert_eq!(listing.body, json!([]));
}

#[tokio::test]
async fn test_skill_crud_and_reorder() {
    let app = common::create_test_app().await;
    let auth = admin_auth("admin123");

    let mut ids = Vec::new();
    for name in ["Rust", "Go", "TypeScript"] {
        let created = send(
            &app,
            "POST",
            "/admin/portfolio/skills",
            Some(json!({ "name": name, "level": "advanced" })),
            Some(&auth),
        )
        .await;
        assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);
        ids.push(created.body["id"].as_str().unwrap().to_string());
    }

    let listing = get(&app, "/api/v1/portfolio/skills").await;
    let names: Vec<_> = listing
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Rust", "Go", "TypeScript"]);

    let updated = send(
        &app,
        "PATCH",
        &format!("/admin/portfolio/skills/{}", ids[1]),
        Some(json!({ "level": "intermediate" })),
        Some(&auth),
    )
    .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["name"], "Go");
    assert_eq!(updated.body["level"], "intermediate");

    let reordered = send(
        &app,
        "POST",
        "/admin/portfolio/skills/reorder",
        Some(json!({ "ids": [ids[2], ids[0], ids[1]] })),
        Some(&auth),
    )
    .await;
    assert_eq!(reordered.status, StatusCode::OK, "{}", reordered.body);
    assert_eq!(reordered.body[0]["name"], "TypeScript");
    assert_eq!(reordered.body[2]["name"], "Go");

    let deleted = send(
        &app,
        "DELETE",
        &format!("/admin/portfolio/skills/{}", ids[0]),
        None,
        Some(&auth),
    )
    .await;
    assert_eq!(deleted.status, StatusCode::OK);

    let missing = send(
        &app,
        "DELETE",
        &format!("/admin/portfolio/skills/{}", ids[0]),
        None,
        Some(&auth),
    )
    .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_experience_dates_are_validated() {
    let app = common::create_test_app().await;
    let auth = admin_auth("admin123");

    let backwards = send(
        &app,
        "POST",
        "/admin/portfolio/experiences",
        Some(json!({
            "company": "Acme",
            "position": "Engineer",
            "start_date": "2022-05-01",
            "end_date": "2021-01-01"
        })),
        Some(&auth),
    )
    .await;
    assert_eq!(backwards.status, StatusCode::BAD_REQUEST);

    let current = send(
        &app,
        "POST",
        "/admin/portfolio/experiences",
        Some(json!({
            "company": "Acme",
            "position": "Engineer",
            "start_date": "2022-05-01",
            "is_current": true
        })),
        Some(&auth),
    )
    .await;
    assert_eq!(current.status, StatusCode::CREATED, "{}", current.body);
    let id = current.body["id"].as_str().unwrap();

    let conflicting = send(
        &app,
        "PATCH",
        &format!("/admin/portfolio/experiences/{}", id),
        Some(json!({ "end_date": "2023-01-01" })),
        Some(&auth),
    )
    .await;
    assert_eq!(conflicting.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_project_categories_sort_by_name_and_refuse_reorder() {
    let app = common::create_test_app().await;
    let auth = admin_auth("admin123");

    let mut ids = Vec::new();
    for name in ["Web", "CLI", "Games"] {
        let created = send(
            &app,
            "POST",
            "/admin/portfolio/project-categories",
            Some(json!({ "name": name })),
            Some(&auth),
        )
        .await;
        assert_eq!(created.status, StatusCode::CREATED);
        ids.push(created.body["id"].as_str().unwrap().to_string());
    }

    let listing = get(&app, "/api/v1/portfolio/project-categories").await;
    assert_eq!(listing.body[0]["name"], "CLI");
    assert_eq!(listing.body[1]["name"], "Games");
    assert_eq!(listing.body[2]["name"], "Web");

    let reorder = send(
        &app,
        "POST",
        "/admin/portfolio/project-categories/reorder",
        Some(json!({ "ids": ids })),
        Some(&auth),
    )
    .await;
    assert_eq!(reorder.status, StatusCode::BAD_REQUEST);
}
