// SPDX-FileCopyrightText: 2026 Tagtimer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait: the persistence contract the timer engine relies on.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::TagTimerError;
use crate::range::DateRange;
use crate::traits::adapter::PluginAdapter;
use crate::types::{StatsSummary, TimerSession, TimerStatus, User, UserProfile, UserTagStats};

/// Adapter for storage and persistence backends.
///
/// Holds three collections: users, timer sessions, and per-tag lifetime
/// stats. Every call is an independent round-trip; the contract offers no
/// transactions, so read-modify-write sequences in the engine can interleave.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), TagTimerError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), TagTimerError>;

    // --- Timer sessions ---

    /// Most recently updated session for (user, tag) in the given status.
    async fn find_timer_session(
        &self,
        user_id: &str,
        tag: &str,
        status: TimerStatus,
    ) -> Result<Option<TimerSession>, TagTimerError>;

    async fn create_timer_session(&self, session: &TimerSession) -> Result<(), TagTimerError>;

    /// Overwrites every mutable field of the session row with `session`.
    async fn update_timer_session(&self, session: &TimerSession) -> Result<(), TagTimerError>;

    /// Flips every `running` row for (user, tag) to `completed`.
    ///
    /// Returns the number of rows changed.
    async fn abandon_running_timers(
        &self,
        user_id: &str,
        tag: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, TagTimerError>;

    /// Deletes every session row for (user, tag). Returns the number deleted.
    async fn delete_timer_sessions(&self, user_id: &str, tag: &str) -> Result<u64, TagTimerError>;

    // --- Lifetime tag stats ---

    async fn find_user_tag_stats(
        &self,
        user_id: &str,
        tag: &str,
    ) -> Result<Option<UserTagStats>, TagTimerError>;

    async fn create_user_tag_stats(&self, stats: &UserTagStats) -> Result<(), TagTimerError>;

    /// Full overwrite of the row from the caller's copy.
    async fn update_user_tag_stats(&self, stats: &UserTagStats) -> Result<(), TagTimerError>;

    /// Every stats row for the user, ordered by tag.
    async fn find_all_user_tag_stats(
        &self,
        user_id: &str,
    ) -> Result<Vec<UserTagStats>, TagTimerError>;

    async fn delete_user_tag_stats(&self, user_id: &str, tag: &str) -> Result<(), TagTimerError>;

    // --- Derived reads over completed sessions ---

    async fn get_stats_summary(
        &self,
        user_id: &str,
        range: &DateRange,
    ) -> Result<StatsSummary, TagTimerError>;

    /// Completed sessions for one tag in range, most recent first.
    async fn get_tag_sessions(
        &self,
        user_id: &str,
        tag: &str,
        range: &DateRange,
    ) -> Result<Vec<TimerSession>, TagTimerError>;

    // --- Users ---

    /// Upsert keyed by (provider, provider id); refreshes profile and last login.
    async fn find_or_create_user(
        &self,
        profile: &UserProfile,
        now: DateTime<Utc>,
    ) -> Result<User, TagTimerError>;

    async fn get_user(&self, id: &str) -> Result<Option<User>, TagTimerError>;
}
