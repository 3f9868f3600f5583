// SPDX-FileCopyrightText: 2026 Tagtimer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tagtimer login` command implementation.
//!
//! Upserts the user for an identity-provider profile and prints a session
//! token usable as `Authorization: Bearer <token>` against `serve`.

use std::sync::Arc;

use tagtimer_config::model::TagTimerConfig;
use tagtimer_core::{Clock, StorageAdapter, SystemClock, TagTimerError, UserId, UserProfile};
use tagtimer_engine::UserDirectory;
use tagtimer_gateway::SignedSessionStore;

use crate::serve::open_storage;

/// Runs the `tagtimer login` command.
pub async fn run_login(config: &TagTimerConfig, profile: UserProfile) -> Result<(), TagTimerError> {
    // An ephemeral key would sign a token no server accepts.
    let secret = config.auth.session_secret.as_deref().ok_or_else(|| {
        TagTimerError::Config(
            "auth.session_secret must be set to issue sessions from the command line".into(),
        )
    })?;

    let storage = open_storage(config).await?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let users = UserDirectory::new(storage.clone(), clock.clone());
    let user = users.login(&profile).await;
    storage.close().await?;
    let user = user?;

    let sessions =
        SignedSessionStore::new(secret.as_bytes(), config.auth.session_max_age_secs, clock);
    let token = sessions.issue(&UserId(user.id.clone()))?;

    eprintln!("logged in as {}", user.id);
    println!("{}", token.0);
    Ok(())
}
