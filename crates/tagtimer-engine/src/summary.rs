// SPDX-FileCopyrightText: 2026 Tagtimer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only views over completed sessions.

use std::sync::Arc;

use tagtimer_core::{DateRange, StatsSummary, StorageAdapter, TagTimerError, TimerSession};
use tracing::debug;

use crate::validate_tag;

#[derive(Clone)]
pub struct SummaryEngine {
    storage: Arc<dyn StorageAdapter + Send + Sync>,
}

impl SummaryEngine {
    pub fn new(storage: Arc<dyn StorageAdapter + Send + Sync>) -> Self {
        Self { storage }
    }

    /// Totals per tag for completed sessions that started inside `range`.
    pub async fn get_stats_summary(
        &self,
        user_id: &str,
        range: &DateRange,
    ) -> Result<StatsSummary, TagTimerError> {
        let summary = self.storage.get_stats_summary(user_id, range).await?;
        debug!(
            user_id,
            start = %range.start,
            end = %range.end,
            tags = summary.tag_breakdown.len(),
            total_duration = summary.total_duration,
            "stats summary"
        );
        Ok(summary)
    }

    /// Completed sessions of one tag inside `range`, most recent first.
    pub async fn get_tag_sessions(
        &self,
        user_id: &str,
        tag: &str,
        range: &DateRange,
    ) -> Result<Vec<TimerSession>, TagTimerError> {
        let tag = validate_tag(tag)?;
        self.storage.get_tag_sessions(user_id, tag, range).await
    }
}
