// SPDX-FileCopyrightText: 2026 Tagtimer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the complete stack (temp SQLite storage, engine,
//! signed session store, axum router) around a [`ManualClock`]. Provides
//! `request()` to drive the HTTP API in-process without binding a socket.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use tagtimer_config::model::StorageConfig;
use tagtimer_core::{SessionToken, StorageAdapter, TagTimerError, User, UserId, UserProfile};
use tagtimer_engine::Engine;
use tagtimer_gateway::{AppState, AuthState, CookieSettings, SignedSessionStore, build_router};
use tagtimer_storage::SqliteStorage;
use tower::ServiceExt;

use crate::clock::ManualClock;

/// Secret used by every harness session store.
pub const TEST_SESSION_SECRET: &[u8] = b"tagtimer-test-secret-0123456789ab";

/// Cookie name used by every harness router.
pub const TEST_COOKIE_NAME: &str = "tagtimer_session";

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    start: chrono::DateTime<chrono::Utc>,
    session_max_age_secs: u64,
    cors_origins: Vec<String>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            start: ManualClock::default_start(),
            session_max_age_secs: 86_400 * 30,
            cors_origins: Vec::new(),
        }
    }

    /// Set the initial time of the manual clock.
    pub fn starting_at(mut self, start: chrono::DateTime<chrono::Utc>) -> Self {
        self.start = start;
        self
    }

    /// Set the session token lifetime.
    pub fn with_session_max_age(mut self, secs: u64) -> Self {
        self.session_max_age_secs = secs;
        self
    }

    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins;
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, TagTimerError> {
        // Create temp directory for SQLite
        let temp_dir = tempfile::TempDir::new().map_err(TagTimerError::storage)?;
        let db_path = temp_dir.path().join("test.db");

        let storage = SqliteStorage::new(StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        });
        storage.initialize().await?;
        let storage: Arc<dyn StorageAdapter + Send + Sync> = Arc::new(storage);

        let clock = Arc::new(ManualClock::new(self.start));
        let engine = Engine::new(storage.clone(), clock.clone());
        let sessions = Arc::new(SignedSessionStore::new(
            TEST_SESSION_SECRET,
            self.session_max_age_secs,
            clock.clone(),
        ));

        let state = AppState {
            engine: engine.clone(),
            storage: storage.clone(),
            cookie: CookieSettings {
                name: TEST_COOKIE_NAME.to_string(),
                secure: false,
            },
        };
        let auth = AuthState {
            sessions: sessions.clone(),
            cookie_name: TEST_COOKIE_NAME.to_string(),
        };
        let router = build_router(state, auth, &self.cors_origins);

        Ok(TestHarness {
            storage,
            engine,
            clock,
            sessions,
            router,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment backed by a temp database.
pub struct TestHarness {
    /// SQLite storage adapter (temp DB, cleaned up on drop).
    pub storage: Arc<dyn StorageAdapter + Send + Sync>,
    /// Engine services sharing the storage and clock.
    pub engine: Engine,
    /// The clock every service reads.
    pub clock: Arc<ManualClock>,
    /// Session store backing the router's auth middleware.
    pub sessions: Arc<SignedSessionStore>,
    /// Fully layered router.
    pub router: Router,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

/// Status and JSON body of a harness request.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    /// `Value::Null` for empty bodies.
    pub body: serde_json::Value,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Harness with default options.
    pub async fn new() -> Result<Self, TagTimerError> {
        Self::builder().build().await
    }

    /// Log `name` in through a fake identity provider and issue a session.
    pub async fn login(&self, name: &str) -> Result<(User, SessionToken), TagTimerError> {
        let profile = UserProfile {
            provider: "test".to_string(),
            provider_id: name.to_string(),
            email: format!("{name}@example.com"),
            name: name.to_string(),
            ..UserProfile::default()
        };
        let user = self.engine.users.login(&profile).await?;
        let token = self.sessions.issue(&UserId(user.id.clone()))?;
        Ok((user, token))
    }

    /// Send a request through the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&SessionToken>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token.0));
        }
        let request = builder
            .body(Body::empty())
            .expect("test request should build");
        self.send(request).await
    }

    /// Send a prepared request through the router.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("body should be JSON")
        };
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: &SessionToken) -> TestResponse {
        self.request(Method::GET, uri, Some(token)).await
    }

    pub async fn post(&self, uri: &str, token: &SessionToken) -> TestResponse {
        self.request(Method::POST, uri, Some(token)).await
    }

    pub async fn delete(&self, uri: &str, token: &SessionToken) -> TestResponse {
        self.request(Method::DELETE, uri, Some(token)).await
    }
}
