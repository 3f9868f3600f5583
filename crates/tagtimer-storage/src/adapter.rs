// SPDX-FileCopyrightText: 2026 Tagtimer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;
use tracing::debug;

use tagtimer_config::model::StorageConfig;
use tagtimer_core::{
    AdapterType, DateRange, HealthStatus, PluginAdapter, StatsSummary, StorageAdapter,
    TagTimerError, TimerSession, TimerStatus, User, UserProfile, UserTagStats,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily initialized on the first
/// call to [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until [`StorageAdapter::initialize`] is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, TagTimerError> {
        self.db.get().ok_or_else(|| TagTimerError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    async fn checkpoint(&self, db: &Database) -> Result<(), TagTimerError> {
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, TagTimerError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TagTimerError> {
        // Shutdown delegates to a checkpoint if the DB was initialized.
        if let Some(db) = self.db.get() {
            self.checkpoint(db).await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), TagTimerError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| TagTimerError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), TagTimerError> {
        let db = self.db()?;
        self.checkpoint(db).await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    // --- Timer sessions ---

    async fn find_timer_session(
        &self,
        user_id: &str,
        tag: &str,
        status: TimerStatus,
    ) -> Result<Option<TimerSession>, TagTimerError> {
        queries::timer_sessions::find_timer_session(self.db()?, user_id, tag, status).await
    }

    async fn create_timer_session(&self, session: &TimerSession) -> Result<(), TagTimerError> {
        queries::timer_sessions::create_timer_session(self.db()?, session).await
    }

    async fn update_timer_session(&self, session: &TimerSession) -> Result<(), TagTimerError> {
        queries::timer_sessions::update_timer_session(self.db()?, session).await
    }

    async fn abandon_running_timers(
        &self,
        user_id: &str,
        tag: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, TagTimerError> {
        queries::timer_sessions::abandon_running_timers(self.db()?, user_id, tag, now).await
    }

    async fn delete_timer_sessions(&self, user_id: &str, tag: &str) -> Result<u64, TagTimerError> {
        queries::timer_sessions::delete_timer_sessions(self.db()?, user_id, tag).await
    }

    // --- Lifetime tag stats ---

    async fn find_user_tag_stats(
        &self,
        user_id: &str,
        tag: &str,
    ) -> Result<Option<UserTagStats>, TagTimerError> {
        queries::tag_stats::find_user_tag_stats(self.db()?, user_id, tag).await
    }

    async fn create_user_tag_stats(&self, stats: &UserTagStats) -> Result<(), TagTimerError> {
        queries::tag_stats::create_user_tag_stats(self.db()?, stats).await
    }

    async fn update_user_tag_stats(&self, stats: &UserTagStats) -> Result<(), TagTimerError> {
        queries::tag_stats::update_user_tag_stats(self.db()?, stats).await
    }

    async fn find_all_user_tag_stats(
        &self,
        user_id: &str,
    ) -> Result<Vec<UserTagStats>, TagTimerError> {
        queries::tag_stats::find_all_user_tag_stats(self.db()?, user_id).await
    }

    async fn delete_user_tag_stats(&self, user_id: &str, tag: &str) -> Result<(), TagTimerError> {
        queries::tag_stats::delete_user_tag_stats(self.db()?, user_id, tag).await
    }

    // --- Derived reads ---

    async fn get_stats_summary(
        &self,
        user_id: &str,
        range: &DateRange,
    ) -> Result<StatsSummary, TagTimerError> {
        queries::stats::get_stats_summary(self.db()?, user_id, range).await
    }

    async fn get_tag_sessions(
        &self,
        user_id: &str,
        tag: &str,
        range: &DateRange,
    ) -> Result<Vec<TimerSession>, TagTimerError> {
        queries::stats::get_tag_sessions(self.db()?, user_id, tag, range).await
    }

    // --- Users ---

    async fn find_or_create_user(
        &self,
        profile: &UserProfile,
        now: DateTime<Utc>,
    ) -> Result<User, TagTimerError> {
        queries::users::find_or_create_user(self.db()?, profile, now).await
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, TagTimerError> {
        queries::users::get_user(self.db()?, id).await
    }
}
