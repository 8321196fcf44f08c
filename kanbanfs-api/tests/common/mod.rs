//! Common test utilities for API integration tests
//!
//! Requires a running PostgreSQL database via DATABASE_URL; without it every
//! test returns early. Each context uses a fresh random user id.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use kanbanfs_api::app::{build_router, AppState};
use kanbanfs_api::config::Config;
use kanbanfs_api::middleware::identity::USER_ID_HEADER;
use kanbanfs_shared::db::migrations::{ensure_database_exists, run_migrations};
use kanbanfs_shared::db::pool::{create_pool, DatabaseConfig};
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub user_id: Uuid,
}

impl TestContext {
    /// Builds the app against the test database, or `None` when DATABASE_URL is unset
    pub async fn new() -> Option<Self> {
        if std::env::var("DATABASE_URL").is_err() {
            eprintln!("DATABASE_URL not set, skipping API test");
            return None;
        }

        let config = Config::from_env().expect("Failed to load config");
        ensure_database_exists(&config.database.url)
            .await
            .expect("Failed to create database");

        let db = create_pool(DatabaseConfig {
            url: config.database.url.clone(),
            max_connections: 5,
            ..Default::default()
        })
        .await
        .expect("Failed to create pool");

        run_migrations(&db).await.expect("Failed to run migrations");

        let app = build_router(AppState::new(db.clone(), config));

        Some(Self {
            db,
            app,
            user_id: Uuid::new_v4(),
        })
    }

    /// Sends a request as the test user and returns status plus JSON body
    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.send_as(Some(self.user_id), method, uri, body).await
    }

    pub async fn send_as(
        &self,
        user_id: Option<Uuid>,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user_id) = user_id {
            builder = builder.header(USER_ID_HEADER, user_id.to_string());
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, json)
    }

    /// Cleans up test data
    pub async fn cleanup(&self) {
        sqlx::query("DELETE FROM nodes WHERE user_id = $1")
            .bind(self.user_id)
            .execute(&self.db)
            .await
            .expect("Failed to clean up");
    }
}

/// Id field of a JSON response
pub fn id_of(json: &Value) -> String {
    json["id"].as_str().expect("response has no id").to_string()
}

/// Titles of a JSON array in order
pub fn titles(json: &Value) -> Vec<String> {
    json.as_array()
        .expect("expected an array")
        .iter()
        .map(|item| item["title"].as_str().unwrap_or_default().to_string())
        .collect()
}
