// SPDX-FileCopyrightText: 2026 Tagtimer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tagtimer serve` command implementation.
//!
//! Opens SQLite storage, wires the engine and session store into the HTTP
//! router, and serves until SIGINT/SIGTERM. Storage is checkpointed and
//! closed after the listener drains.

use std::sync::Arc;

use tagtimer_config::model::{AuthConfig, TagTimerConfig};
use tagtimer_core::{Clock, StorageAdapter, SystemClock, TagTimerError};
use tagtimer_engine::Engine;
use tagtimer_gateway::{
    AppState, AuthState, CookieSettings, SignedSessionStore, build_router, start_server,
};
use tagtimer_storage::SqliteStorage;
use tracing::{info, warn};

use crate::shutdown;

/// Opens and migrates the configured database.
pub(crate) async fn open_storage(
    config: &TagTimerConfig,
) -> Result<Arc<SqliteStorage>, TagTimerError> {
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    Ok(Arc::new(storage))
}

/// Session store keyed by the configured secret, or by a random key when
/// none is configured.
pub(crate) fn session_store(auth: &AuthConfig, clock: Arc<dyn Clock>) -> SignedSessionStore {
    match &auth.session_secret {
        Some(secret) => {
            SignedSessionStore::new(secret.as_bytes(), auth.session_max_age_secs, clock)
        }
        None => {
            warn!("auth.session_secret is not set; sessions will not survive a restart");
            SignedSessionStore::ephemeral(auth.session_max_age_secs, clock)
        }
    }
}

/// Runs the `tagtimer serve` command.
pub async fn run_serve(config: TagTimerConfig) -> Result<(), TagTimerError> {
    info!("starting tagtimer serve");

    let storage = open_storage(&config).await?;
    info!(path = %config.storage.database_path, "storage initialized");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let dyn_storage: Arc<dyn StorageAdapter + Send + Sync> = storage.clone();
    let engine = Engine::new(dyn_storage.clone(), clock.clone());
    let sessions = Arc::new(session_store(&config.auth, clock));

    let state = AppState {
        engine,
        storage: dyn_storage,
        cookie: CookieSettings {
            name: config.auth.cookie_name.clone(),
            secure: config.auth.secure_cookie,
        },
    };
    let auth = AuthState {
        sessions,
        cookie_name: config.auth.cookie_name.clone(),
    };
    let router = build_router(state, auth, &config.server.cors_origins);

    let cancel = shutdown::install_signal_handler();
    let served = start_server(&config.server, router, cancel).await;

    // Close storage even when the server failed.
    if let Err(e) = storage.close().await {
        warn!(error = %e, "failed to close storage cleanly");
    }
    served?;

    info!("tagtimer serve shutdown complete");
    Ok(())
}
