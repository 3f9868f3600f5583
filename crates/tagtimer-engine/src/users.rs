// SPDX-FileCopyrightText: 2026 Tagtimer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User records created on login.

use std::sync::Arc;

use tagtimer_core::{Clock, StorageAdapter, TagTimerError, User, UserProfile};
use tracing::info;

#[derive(Clone)]
pub struct UserDirectory {
    storage: Arc<dyn StorageAdapter + Send + Sync>,
    clock: Arc<dyn Clock>,
}

impl UserDirectory {
    pub fn new(storage: Arc<dyn StorageAdapter + Send + Sync>, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    /// Upsert the user behind an identity-provider profile.
    pub async fn login(&self, profile: &UserProfile) -> Result<User, TagTimerError> {
        if profile.provider.trim().is_empty() || profile.provider_id.trim().is_empty() {
            return Err(TagTimerError::Validation(
                "profile must carry a provider and provider id".into(),
            ));
        }
        let user = self
            .storage
            .find_or_create_user(profile, self.clock.now())
            .await?;
        info!(user_id = %user.id, provider = %user.provider, "user logged in");
        Ok(user)
    }

    /// The stored record for an authenticated id.
    ///
    /// A valid session for a user that no longer exists is unauthorized.
    pub async fn get_user(&self, id: &str) -> Result<User, TagTimerError> {
        self.storage
            .get_user(id)
            .await?
            .ok_or_else(|| TagTimerError::Unauthorized(format!("unknown user `{id}`")))
    }
}
