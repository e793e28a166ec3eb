//! Project CRUD over HTTP

mod common;

use axum::http::StatusCode;
use common::{ALICE_TOKEN, TestApp, project_body};
use serde_json::{Value, json};

#[tokio::test]
async fn test_create_defaults_status() {
    let app = TestApp::new();
    let project = app.create_project(ALICE_TOKEN, project_body("Roof")).await;

    assert_eq!(project["title"], "Roof");
    assert_eq!(project["status"], "Not Started");
    assert_eq!(project["start_date"], "2024-01-15T00:00:00Z");
    assert!(project["end_date"].is_null());
    assert!(project["id"].as_str().is_some());
}

#[tokio::test]
async fn test_create_validation_errors() {
    let app = TestApp::new();

    let response = app
        .server
        .post("/api/projects")
        .authorization_bearer(ALICE_TOKEN)
        .json(&json!({ "description": "no title", "start_date": "2024-01-01" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["details"]["fields"][0]["field"], "title");

    let response = app
        .server
        .post("/api/projects")
        .authorization_bearer(ALICE_TOKEN)
        .json(&json!({ "title": "", "description": "d", "start_date": "2024-01-01" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = app
        .server
        .post("/api/projects")
        .authorization_bearer(ALICE_TOKEN)
        .json(&json!({
            "title": "t",
            "description": "d",
            "start_date": "2024-01-01",
            "status": "Finished"
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = app
        .server
        .post("/api/projects")
        .authorization_bearer(ALICE_TOKEN)
        .json(&json!({
            "title": "t",
            "description": "d",
            "start_date": "2024-02-01",
            "end_date": "2024-01-01"
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_route_aliases() {
    let app = TestApp::new();

    let response = app
        .server
        .post("/api/projects/create")
        .authorization_bearer(ALICE_TOKEN)
        .json(&project_body("Roof"))
        .await;
    response.assert_status(StatusCode::CREATED);

    let response = app
        .server
        .get("/api/projects/get")
        .authorization_bearer(ALICE_TOKEN)
        .await;
    response.assert_status_ok();
    let projects: Vec<Value> = response.json();
    assert_eq!(projects.len(), 1);
}

#[tokio::test]
async fn test_update_with_only_status_keeps_other_fields() {
    let app = TestApp::new();
    let mut body = project_body("Roof");
    body["end_date"] = json!("2024-03-01");
    let project = app.create_project(ALICE_TOKEN, body).await;
    let path = format!("/api/projects/{}", project["id"].as_str().unwrap());

    let response = app
        .server
        .put(&path)
        .authorization_bearer(ALICE_TOKEN)
        .json(&json!({ "status": "Completed" }))
        .await;
    response.assert_status_ok();
    let updated: Value = response.json();

    assert_eq!(updated["status"], "Completed");
    for field in ["title", "description", "start_date", "end_date", "owner_id", "created_at"] {
        assert_eq!(updated[field], project[field], "{field} changed");
    }
}

#[tokio::test]
async fn test_update_clears_end_date_with_null() {
    let app = TestApp::new();
    let mut body = project_body("Roof");
    body["end_date"] = json!("2024-03-01");
    let project = app.create_project(ALICE_TOKEN, body).await;

    let response = app
        .server
        .put(&format!("/api/projects/{}", project["id"].as_str().unwrap()))
        .authorization_bearer(ALICE_TOKEN)
        .json(&json!({ "end_date": null }))
        .await;
    response.assert_status_ok();
    let updated: Value = response.json();
    assert!(updated["end_date"].is_null());
}

#[tokio::test]
async fn test_update_with_empty_title_is_rejected() {
    let app = TestApp::new();
    let project = app.create_project(ALICE_TOKEN, project_body("Roof")).await;
    let path = format!("/api/projects/{}", project["id"].as_str().unwrap());

    let response = app
        .server
        .put(&path)
        .authorization_bearer(ALICE_TOKEN)
        .json(&json!({ "title": "" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = app.server.get(&path).authorization_bearer(ALICE_TOKEN).await;
    let stored: Value = response.json();
    assert_eq!(stored["title"], "Roof");
}

#[tokio::test]
async fn test_delete_then_get_is_not_found() {
    let app = TestApp::new();
    let project = app.create_project(ALICE_TOKEN, project_body("Roof")).await;
    let path = format!("/api/projects/{}", project["id"].as_str().unwrap());

    let response = app
        .server
        .delete(&path)
        .authorization_bearer(ALICE_TOKEN)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Project removed");

    let response = app.server.get(&path).authorization_bearer(ALICE_TOKEN).await;
    response.assert_status(StatusCode::NOT_FOUND);

    let response = app
        .server
        .delete(&path)
        .authorization_bearer(ALICE_TOKEN)
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_json_body_is_bad_request() {
    let app = TestApp::new();

    let response = app
        .server
        .post("/api/projects")
        .authorization_bearer(ALICE_TOKEN)
        .content_type("application/json")
        .bytes("{ not json".into())
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_camel_case_date_keys_are_applied() {
    let app = TestApp::new();
    let project = app
        .create_project(
            ALICE_TOKEN,
            json!({ "title": "Roof", "description": "Tiles", "startDate": "2024-01-15" }),
        )
        .await;
    assert_eq!(project["start_date"], "2024-01-15T00:00:00Z");

    let response = app
        .server
        .put(&format!("/api/projects/{}", project["id"].as_str().unwrap()))
        .authorization_bearer(ALICE_TOKEN)
        .json(&json!({ "startDate": "2030-01-01", "endDate": "2031-01-01" }))
        .await;
    response.assert_status_ok();
    let updated: Value = response.json();
    assert_eq!(updated["start_date"], "2030-01-01T00:00:00Z");
    assert_eq!(updated["end_date"], "2031-01-01T00:00:00Z");
}
