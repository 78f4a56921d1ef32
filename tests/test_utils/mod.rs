//! Test utilities for API and database testing.
//!
//! Provides an in-memory SQLite database with migrations applied, bearer token
//! minting and a helper that serves the full router on a random local port.

#![allow(dead_code)]

use anyhow::{Context, Result};
use jsonwebtoken::{EncodingKey, Header, encode};
use migration::{Migrator, MigratorTrait};
use object_catalog::{
    config::AppConfig,
    server::{AppState, create_app},
};
use sea_orm::{Database, DatabaseConnection};
use serde_json::{Value, json};
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};

/// Sets up an in-memory SQLite database with all migrations applied.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

/// Default configuration for tests: decode-only tokens and no agent delay.
pub fn test_config() -> AppConfig {
    AppConfig {
        agent_step_delay_ms: 0,
        ..Default::default()
    }
}

/// Mints an HS256 token carrying `oid` and `tid`. The decode-only verifier
/// ignores the signature.
pub fn mint_token(oid: &str, tid: &str) -> String {
    mint_token_with_claims(json!({
        "oid": oid,
        "tid": tid,
        "preferred_username": format!("{oid}@example.com"),
        "name": "Test User",
    }))
}

pub fn mint_token_with_claims(claims: Value) -> String {
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"test-secret"),
    )
    .expect("token encoding")
}

pub struct TestServerHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    join_handle: Option<JoinHandle<Result<()>>>,
}

impl TestServerHandle {
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        if let Some(handle) = self.join_handle.take() {
            handle.await.context("server task join failed")??;
        }

        Ok(())
    }
}

impl Drop for TestServerHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// A running API bound to a random port
pub struct TestApp {
    pub base_url: String,
    pub db: DatabaseConnection,
    pub client: reqwest::Client,
    pub handle: TestServerHandle,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// URL under the versioned API prefix
    pub fn api(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    pub async fn get_as(&self, token: &str, path: &str) -> reqwest::Response {
        self.client
            .get(self.api(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("GET request")
    }

    pub async fn post_as(&self, token: &str, path: &str, body: Value) -> reqwest::Response {
        self.client
            .post(self.api(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .expect("POST request")
    }

    pub async fn put_as(&self, token: &str, path: &str, body: Value) -> reqwest::Response {
        self.client
            .put(self.api(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .expect("PUT request")
    }

    pub async fn delete_as(&self, token: &str, path: &str) -> reqwest::Response {
        self.client
            .delete(self.api(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("DELETE request")
    }

    /// Creates a business object and returns its JSON representation.
    pub async fn create_object(&self, token: &str, name: &str, object_type: &str) -> Value {
        let response = self
            .post_as(token, "/objects/", json!({ "name": name, "type": object_type }))
            .await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        response.json().await.expect("object body")
    }
}

/// Serves the router over a fresh migrated database.
pub async fn spawn_test_app(config: AppConfig) -> TestApp {
    let db = setup_test_db().await.expect("test database");
    spawn_test_app_with_db(config, db).await
}

pub async fn spawn_test_app_with_db(config: AppConfig, db: DatabaseConnection) -> TestApp {
    let state = AppState::from_config(config, db.clone()).expect("app state");
    let app = create_app(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");

    let (ready_tx, ready_rx) = oneshot::channel();
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let join_handle = tokio::spawn(async move {
        let server = axum::serve(listener, app).with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        });

        let _ = ready_tx.send(());

        server.await.context("axum server error")
    });

    ready_rx.await.expect("server task to signal readiness");

    TestApp {
        base_url: format!("http://{}", addr),
        db,
        client: reqwest::Client::new(),
        handle: TestServerHandle {
            shutdown_tx: Some(shutdown_tx),
            join_handle: Some(join_handle),
        },
    }
}
