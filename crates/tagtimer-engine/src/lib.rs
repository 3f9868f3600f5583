// SPDX-FileCopyrightText: 2026 Tagtimer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Timer engine for tagtimer.
//!
//! Drives the per-(user, tag) timer state machine, keeps lifetime tag
//! statistics in step with it, and answers summary queries over completed
//! sessions. Every operation runs against an injected [`StorageAdapter`] and
//! [`Clock`], so the engine holds no state of its own.

use std::sync::Arc;

use tagtimer_core::{Clock, StorageAdapter, TagTimerError};

pub mod summary;
pub mod tag_stats;
pub mod timer;
pub mod users;

pub use summary::SummaryEngine;
pub use tag_stats::TagStatsAggregator;
pub use timer::{IdleView, LiveTimer, TimerEngine};
pub use users::UserDirectory;

/// Every engine service wired against one storage backend and clock.
#[derive(Clone)]
pub struct Engine {
    pub timers: TimerEngine,
    pub tag_stats: TagStatsAggregator,
    pub summary: SummaryEngine,
    pub users: UserDirectory,
    clock: Arc<dyn Clock>,
}

impl Engine {
    pub fn new(storage: Arc<dyn StorageAdapter + Send + Sync>, clock: Arc<dyn Clock>) -> Self {
        let tag_stats = TagStatsAggregator::new(storage.clone());
        Self {
            timers: TimerEngine::new(storage.clone(), clock.clone(), tag_stats.clone()),
            summary: SummaryEngine::new(storage.clone()),
            users: UserDirectory::new(storage, clock.clone()),
            tag_stats,
            clock,
        }
    }

    /// The clock the engine stamps updates with.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }
}

/// Trimmed, non-empty tag name.
///
/// Checked before any storage access.
pub fn validate_tag(tag: &str) -> Result<&str, TagTimerError> {
    let tag = tag.trim();
    if tag.is_empty() {
        return Err(TagTimerError::Validation("tag must not be empty".into()));
    }
    Ok(tag)
}
