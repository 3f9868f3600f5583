// SPDX-FileCopyrightText: 2026 Tagtimer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lifetime per-tag statistics.
//!
//! Updates are read-modify-write against the storage adapter: the caller
//! loads a row, changes it in memory, and writes the whole row back. Two
//! concurrent stops on the same tag can therefore lose one increment.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tagtimer_core::{StorageAdapter, TagTimerError, UserTagStats};
use tracing::{debug, info};

use crate::validate_tag;

#[derive(Clone)]
pub struct TagStatsAggregator {
    storage: Arc<dyn StorageAdapter + Send + Sync>,
}

impl TagStatsAggregator {
    pub fn new(storage: Arc<dyn StorageAdapter + Send + Sync>) -> Self {
        Self { storage }
    }

    /// Load the (user, tag) row, creating it with `session_count = 1` when
    /// absent. The flag is true when the row was created by this call.
    pub async fn find_or_create(
        &self,
        user_id: &str,
        tag: &str,
        now: DateTime<Utc>,
    ) -> Result<(UserTagStats, bool), TagTimerError> {
        if let Some(stats) = self.storage.find_user_tag_stats(user_id, tag).await? {
            return Ok((stats, false));
        }
        let stats = UserTagStats::new(user_id, tag, now);
        self.storage.create_user_tag_stats(&stats).await?;
        debug!(user_id, tag, "created tag stats");
        Ok((stats, true))
    }

    /// Count one fresh run of `tag`.
    pub async fn record_fresh_run(
        &self,
        user_id: &str,
        tag: &str,
        now: DateTime<Utc>,
    ) -> Result<UserTagStats, TagTimerError> {
        let (mut stats, created) = self.find_or_create(user_id, tag, now).await?;
        if !created {
            stats.record_fresh_run(now);
            self.update(&stats).await?;
        }
        Ok(stats)
    }

    /// Fold `elapsed_secs` into the lifetime total. The row must exist.
    pub async fn add_elapsed(
        &self,
        user_id: &str,
        tag: &str,
        elapsed_secs: i64,
        now: DateTime<Utc>,
    ) -> Result<UserTagStats, TagTimerError> {
        let mut stats = self
            .storage
            .find_user_tag_stats(user_id, tag)
            .await?
            .ok_or_else(|| TagTimerError::not_found("tag stats", user_id, tag))?;
        stats.add_elapsed(elapsed_secs, now);
        self.update(&stats).await?;
        Ok(stats)
    }

    /// Full overwrite of the stored row.
    pub async fn update(&self, stats: &UserTagStats) -> Result<(), TagTimerError> {
        self.storage.update_user_tag_stats(stats).await
    }

    /// Every tag the user has ever started, sorted by tag.
    pub async fn find_all(&self, user_id: &str) -> Result<Vec<UserTagStats>, TagTimerError> {
        self.storage.find_all_user_tag_stats(user_id).await
    }

    pub async fn list_tags(&self, user_id: &str) -> Result<Vec<String>, TagTimerError> {
        Ok(self
            .find_all(user_id)
            .await?
            .into_iter()
            .map(|stats| stats.tag)
            .collect())
    }

    /// Remove the tag's stats row, then every session recorded under it.
    ///
    /// The two deletes are separate statements. Deleting an unknown tag
    /// succeeds without touching anything.
    pub async fn delete_tag(&self, user_id: &str, tag: &str) -> Result<(), TagTimerError> {
        let tag = validate_tag(tag)?;
        self.storage.delete_user_tag_stats(user_id, tag).await?;
        let sessions = self.storage.delete_timer_sessions(user_id, tag).await?;
        info!(user_id, tag, sessions, "deleted tag");
        Ok(())
    }
}
