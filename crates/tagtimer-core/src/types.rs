// SPDX-FileCopyrightText: 2026 Tagtimer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the timer engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::TagTimerError;

/// Stable identifier of an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque session token presented by a client (cookie value or bearer token).
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(pub String);

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken([redacted])")
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Storage,
    SessionStore,
}

// --- Timer sessions ---

/// Status of a persisted timer session.
///
/// `Completed` is terminal for a row; a later start for the same tag
/// creates a new row.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Running,
    Stopped,
    Completed,
}

/// Whole seconds elapsed between `from` and `to`.
///
/// A negative interval means the clock went backwards and is rejected
/// instead of being folded into a duration.
pub fn elapsed_secs(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<i64, TagTimerError> {
    let elapsed_ms = (to - from).num_milliseconds();
    if elapsed_ms < 0 {
        return Err(TagTimerError::ClockAnomaly { elapsed_ms });
    }
    Ok(elapsed_ms / 1000)
}

/// One active or historical timer run for a (user, tag) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSession {
    pub id: String,
    pub user_id: String,
    pub tag: String,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Accumulated running time in seconds.
    pub duration: i64,
    pub status: TimerStatus,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl TimerSession {
    /// A fresh run, started at `now`.
    pub fn new(user_id: &str, tag: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            tag: tag.to_string(),
            start_time: now,
            end_time: None,
            duration: 0,
            status: TimerStatus::Running,
            created_at: now,
            last_updated: now,
        }
    }

    fn require(&self, expected: TimerStatus, action: &'static str) -> Result<(), TagTimerError> {
        if self.status == expected {
            Ok(())
        } else {
            Err(TagTimerError::InvalidTransition {
                from: self.status,
                action,
            })
        }
    }

    /// stopped -> running. Duration is preserved.
    pub fn resume(&mut self, now: DateTime<Utc>) -> Result<(), TagTimerError> {
        self.require(TimerStatus::Stopped, "resume")?;
        self.status = TimerStatus::Running;
        self.last_updated = now;
        Ok(())
    }

    /// running -> stopped. Returns the seconds added to `duration`.
    ///
    /// Nothing is mutated when the transition or the clock check fails.
    pub fn stop(&mut self, now: DateTime<Utc>) -> Result<i64, TagTimerError> {
        self.require(TimerStatus::Running, "stop")?;
        let elapsed = elapsed_secs(self.last_updated, now)?;
        self.duration += elapsed;
        self.status = TimerStatus::Stopped;
        self.last_updated = now;
        Ok(elapsed)
    }

    /// stopped -> completed. The time since the stop is not counted.
    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<(), TagTimerError> {
        self.require(TimerStatus::Stopped, "reset")?;
        self.status = TimerStatus::Completed;
        self.end_time = Some(now);
        self.last_updated = now;
        Ok(())
    }

    /// Duration including the in-flight interval of a running session.
    pub fn live_duration(&self, now: DateTime<Utc>) -> Result<i64, TagTimerError> {
        match self.status {
            TimerStatus::Running => Ok(self.duration + elapsed_secs(self.last_updated, now)?),
            TimerStatus::Stopped | TimerStatus::Completed => Ok(self.duration),
        }
    }
}

// --- Lifetime tag statistics ---

/// Lifetime running total for a (user, tag) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTagStats {
    pub id: String,
    pub user_id: String,
    pub tag: String,
    /// Cumulative seconds across every stop.
    pub total_duration: i64,
    /// Number of fresh runs started (resumes are not counted).
    pub session_count: i64,
    pub last_updated: DateTime<Utc>,
}

impl UserTagStats {
    /// Row for the first run ever started on this tag.
    pub fn new(user_id: &str, tag: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            tag: tag.to_string(),
            total_duration: 0,
            session_count: 1,
            last_updated: now,
        }
    }

    pub fn record_fresh_run(&mut self, now: DateTime<Utc>) {
        self.session_count += 1;
        self.last_updated = now;
    }

    pub fn add_elapsed(&mut self, elapsed_secs: i64, now: DateTime<Utc>) {
        self.total_duration = self.total_duration.saturating_add(elapsed_secs.max(0));
        self.last_updated = now;
    }
}

// --- Users ---

/// Profile fields handed over by the identity provider at login.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub provider: String,
    pub provider_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub nick_name: String,
    #[serde(default)]
    pub avatar_url: String,
}

/// Identity record keyed by (provider, provider id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub nick_name: String,
    pub avatar_url: String,
    pub provider: String,
    pub provider_id: String,
    pub created_at: DateTime<Utc>,
    pub last_login_at: DateTime<Utc>,
}

impl User {
    /// User id derived from the identity provider's key.
    ///
    /// `%` and `:` are percent-escaped in both parts, so the single
    /// unescaped `:` always separates provider from provider id.
    pub fn id_for(provider: &str, provider_id: &str) -> String {
        format!(
            "{}:{}",
            escape_id_part(provider),
            escape_id_part(provider_id)
        )
    }

    pub fn from_profile(profile: UserProfile, now: DateTime<Utc>) -> Self {
        Self {
            id: Self::id_for(&profile.provider, &profile.provider_id),
            email: profile.email,
            name: profile.name,
            first_name: profile.first_name,
            last_name: profile.last_name,
            nick_name: profile.nick_name,
            avatar_url: profile.avatar_url,
            provider: profile.provider,
            provider_id: profile.provider_id,
            created_at: now,
            last_login_at: now,
        }
    }
}

fn escape_id_part(part: &str) -> String {
    part.replace('%', "%25").replace(':', "%3A")
}

// --- Derived statistics ---

/// Raw per-tag aggregate over completed sessions, as produced by storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagTotal {
    pub tag: String,
    pub total_duration: i64,
    pub session_count: i64,
}

/// Stats for a single tag within a time period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagStats {
    pub tag: String,
    pub total_duration: i64,
    pub session_count: i64,
    pub average_session: i64,
    pub percentage_of_total: f64,
}

/// Aggregated stats for a time period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub total_duration: i64,
    pub total_sessions: i64,
    pub average_session: i64,
    /// Tag with the largest total; empty when nothing matched.
    pub most_used_tag: String,
    pub tag_breakdown: Vec<TagStats>,
}

impl StatsSummary {
    /// Derive the summary from per-tag totals.
    ///
    /// Tags are ordered by total duration descending, ties by tag name.
    pub fn from_tag_totals(mut totals: Vec<TagTotal>) -> Self {
        totals.sort_by(|a, b| {
            b.total_duration
                .cmp(&a.total_duration)
                .then_with(|| a.tag.cmp(&b.tag))
        });

        let total_duration: i64 = totals.iter().map(|t| t.total_duration).sum();
        let total_sessions: i64 = totals.iter().map(|t| t.session_count).sum();

        let tag_breakdown: Vec<TagStats> = totals
            .into_iter()
            .map(|t| TagStats {
                average_session: average(t.total_duration, t.session_count),
                percentage_of_total: if total_duration > 0 {
                    t.total_duration as f64 * 100.0 / total_duration as f64
                } else {
                    0.0
                },
                tag: t.tag,
                total_duration: t.total_duration,
                session_count: t.session_count,
            })
            .collect();

        Self {
            total_duration,
            total_sessions,
            average_session: average(total_duration, total_sessions),
            most_used_tag: tag_breakdown
                .first()
                .map(|t| t.tag.clone())
                .unwrap_or_default(),
            tag_breakdown,
        }
    }
}

fn average(total: i64, count: i64) -> i64 {
    if count > 0 { total / count } else { 0 }
}
