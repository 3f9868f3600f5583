// SPDX-FileCopyrightText: 2026 Tagtimer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-(user, tag) timer state machine.
//!
//! ```text
//!            start                stop
//!   idle ─────────────▶ running ────────▶ stopped
//!    ▲                    ▲                 │  │
//!    │                    └──── start ──────┘  │ reset
//!    └──────────────── completed ◀─────────────┘
//! ```
//!
//! `idle` has no row: either nothing was ever started for the tag or the
//! latest row is `completed`. Only a `stopped` row is resumed by start;
//! anything else begins a fresh run.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tagtimer_core::{Clock, StorageAdapter, TagTimerError, TimerSession, TimerStatus};
use tracing::{debug, info, warn};

use crate::tag_stats::TagStatsAggregator;
use crate::validate_tag;

/// A session as seen right now, with the in-flight interval included.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveTimer {
    pub session: TimerSession,
    /// Seconds accumulated so far, counting up to now when running.
    pub duration: i64,
}

/// What the user sees after a reset: no active timer, plus every tag they
/// have used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdleView {
    pub tags: Vec<String>,
}

#[derive(Clone)]
pub struct TimerEngine {
    storage: Arc<dyn StorageAdapter + Send + Sync>,
    clock: Arc<dyn Clock>,
    tag_stats: TagStatsAggregator,
}

impl TimerEngine {
    pub fn new(
        storage: Arc<dyn StorageAdapter + Send + Sync>,
        clock: Arc<dyn Clock>,
        tag_stats: TagStatsAggregator,
    ) -> Self {
        Self {
            storage,
            clock,
            tag_stats,
        }
    }

    /// Start or resume the timer for `tag`.
    ///
    /// Any `running` row left behind by a client that vanished is completed
    /// first. A `stopped` row is resumed with its duration intact; otherwise
    /// a fresh run is created and counted in the tag's lifetime stats.
    pub async fn start(&self, user_id: &str, tag: &str) -> Result<TimerSession, TagTimerError> {
        let tag = validate_tag(tag)?;
        let now = self.clock.now();

        self.recover_orphans(user_id, tag, now).await?;

        if let Some(mut session) = self
            .storage
            .find_timer_session(user_id, tag, TimerStatus::Stopped)
            .await?
        {
            session.resume(now)?;
            self.storage.update_timer_session(&session).await?;
            info!(
                user_id,
                tag,
                session_id = %session.id,
                duration = session.duration,
                "timer resumed"
            );
            return Ok(session);
        }

        let session = TimerSession::new(user_id, tag, now);
        self.storage.create_timer_session(&session).await?;
        let stats = self.tag_stats.record_fresh_run(user_id, tag, now).await?;
        info!(
            user_id,
            tag,
            session_id = %session.id,
            session_count = stats.session_count,
            "timer started"
        );
        Ok(session)
    }

    /// Stop the running timer and fold the elapsed time into lifetime stats.
    ///
    /// Fails with `NotFound` when nothing is running and with `ClockAnomaly`
    /// when the clock moved backwards; neither case writes anything.
    pub async fn stop(&self, user_id: &str, tag: &str) -> Result<TimerSession, TagTimerError> {
        let tag = validate_tag(tag)?;
        let now = self.clock.now();

        let mut session = self
            .storage
            .find_timer_session(user_id, tag, TimerStatus::Running)
            .await?
            .ok_or_else(|| TagTimerError::not_found("running timer", user_id, tag))?;

        let elapsed_secs = session.stop(now).inspect_err(|e| {
            if let TagTimerError::ClockAnomaly { elapsed_ms } = e {
                warn!(user_id, tag, elapsed_ms, "refusing to stop timer: clock went backwards");
            }
        })?;
        self.storage.update_timer_session(&session).await?;

        let stats = self
            .tag_stats
            .add_elapsed(user_id, tag, elapsed_secs, now)
            .await?;
        info!(
            user_id,
            tag,
            session_id = %session.id,
            elapsed_secs,
            duration = session.duration,
            total_duration = stats.total_duration,
            "timer stopped"
        );
        Ok(session)
    }

    /// Complete the stopped timer. Its duration is final; time since the
    /// stop is not counted.
    pub async fn reset(&self, user_id: &str, tag: &str) -> Result<IdleView, TagTimerError> {
        let tag = validate_tag(tag)?;
        let now = self.clock.now();

        let mut session = self
            .storage
            .find_timer_session(user_id, tag, TimerStatus::Stopped)
            .await?
            .ok_or_else(|| TagTimerError::not_found("stopped timer", user_id, tag))?;

        session.complete(now)?;
        self.storage.update_timer_session(&session).await?;
        info!(
            user_id,
            tag,
            session_id = %session.id,
            duration = session.duration,
            "timer reset"
        );

        Ok(IdleView {
            tags: self.tag_stats.list_tags(user_id).await?,
        })
    }

    /// The active (running or stopped) session for `tag`, read-only.
    pub async fn current(&self, user_id: &str, tag: &str) -> Result<LiveTimer, TagTimerError> {
        let tag = validate_tag(tag)?;
        let now = self.clock.now();

        for status in [TimerStatus::Running, TimerStatus::Stopped] {
            if let Some(session) = self.storage.find_timer_session(user_id, tag, status).await? {
                let duration = session.live_duration(now)?;
                return Ok(LiveTimer { session, duration });
            }
        }
        Err(TagTimerError::not_found("active timer", user_id, tag))
    }

    async fn recover_orphans(
        &self,
        user_id: &str,
        tag: &str,
        now: DateTime<Utc>,
    ) -> Result<(), TagTimerError> {
        let abandoned = self
            .storage
            .abandon_running_timers(user_id, tag, now)
            .await?;
        if abandoned > 0 {
            warn!(user_id, tag, abandoned, "completed orphaned running timers");
        } else {
            debug!(user_id, tag, "no orphaned timers");
        }
        Ok(())
    }
}
