//! Shared fixtures for HTTP-level tests

#![allow(dead_code)]

use axum_test::TestServer;
use ledger::config::InterchangeConfig;
use ledger::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;
use uuid::Uuid;

pub const ALICE_TOKEN: &str = "alice-token";
pub const BOB_TOKEN: &str = "bob-token";

pub struct TestApp {
    pub server: TestServer,
    pub storage: Storage,
    pub transient_dir: TempDir,
    pub alice: Uuid,
    pub bob: Uuid,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_upload_limit(InterchangeConfig::default().max_upload_bytes)
    }

    pub fn with_upload_limit(max_upload_bytes: usize) -> Self {
        Self::build(Storage::in_memory(), max_upload_bytes)
    }

    pub fn with_storage(storage: Storage) -> Self {
        Self::build(storage, InterchangeConfig::default().max_upload_bytes)
    }

    fn build(storage: Storage, max_upload_bytes: usize) -> Self {
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let transient_dir = tempfile::tempdir().expect("Failed to create transient dir");

        let app = ServerBuilder::new()
            .with_storage(storage.clone())
            .with_auth_provider(
                StaticTokenProvider::new()
                    .with_token(ALICE_TOKEN, alice)
                    .with_token(BOB_TOKEN, bob),
            )
            .with_interchange_config(InterchangeConfig {
                transient_dir: transient_dir.path().to_path_buf(),
                max_upload_bytes,
            })
            .build()
            .expect("Failed to build app");

        let server = TestServer::new(app).expect("Failed to create test server");

        Self {
            server,
            storage,
            transient_dir,
            alice,
            bob,
        }
    }

    /// No export or upload file may outlive its request
    pub fn assert_no_transient_files(&self) {
        let leftovers: Vec<_> = std::fs::read_dir(self.transient_dir.path())
            .expect("transient dir readable")
            .collect();
        assert!(leftovers.is_empty(), "leftover files: {:?}", leftovers);
    }

    pub async fn create_project(&self, token: &str, body: Value) -> Value {
        let response = self
            .server
            .post("/api/projects")
            .authorization_bearer(token)
            .json(&body)
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json()
    }

    pub async fn create_payment(&self, token: &str, project_id: &str, amount: f64) -> Value {
        let response = self
            .server
            .post("/api/payments")
            .authorization_bearer(token)
            .json(&json!({ "projectId": project_id, "amount": amount }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json()
    }
}

pub fn project_body(title: &str) -> Value {
    json!({
        "title": title,
        "description": format!("{} description", title),
        "start_date": "2024-01-15"
    })
}
