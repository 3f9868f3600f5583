// SPDX-FileCopyrightText: 2026 Tagtimer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only aggregation over completed timer sessions.
//!
//! Only `completed` rows whose `start_time` falls inside the inclusive range
//! take part. Grouping happens in SQL; ordering, averages, and percentages
//! are derived by [`StatsSummary::from_tag_totals`].

use rusqlite::params;
use tagtimer_core::types::TagTotal;
use tagtimer_core::{DateRange, StatsSummary, TagTimerError};

use crate::database::Database;
use crate::models::{TimerSession, format_ts};
use crate::queries::timer_sessions::{SESSION_COLUMNS, session_from_row};

/// Per-tag totals of completed sessions for the user within `range`.
pub async fn tag_totals(
    db: &Database,
    user_id: &str,
    range: &DateRange,
) -> Result<Vec<TagTotal>, TagTimerError> {
    let user_id = user_id.to_string();
    let (start, end) = (format_ts(range.start), format_ts(range.end));
    db.connection()
        .call(move |conn| -> Result<Vec<TagTotal>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT tag, COALESCE(SUM(duration), 0), COUNT(*)
                 FROM timer_sessions
                 WHERE user_id = ?1 AND status = 'completed'
                   AND start_time >= ?2 AND start_time <= ?3
                 GROUP BY tag",
            )?;
            let rows = stmt.query_map(params![user_id, start, end], |row| {
                Ok(TagTotal {
                    tag: row.get(0)?,
                    total_duration: row.get(1)?,
                    session_count: row.get(2)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn get_stats_summary(
    db: &Database,
    user_id: &str,
    range: &DateRange,
) -> Result<StatsSummary, TagTimerError> {
    let totals = tag_totals(db, user_id, range).await?;
    Ok(StatsSummary::from_tag_totals(totals))
}

/// Completed sessions for one tag within `range`, most recent start first.
pub async fn get_tag_sessions(
    db: &Database,
    user_id: &str,
    tag: &str,
    range: &DateRange,
) -> Result<Vec<TimerSession>, TagTimerError> {
    let user_id = user_id.to_string();
    let tag = tag.to_string();
    let (start, end) = (format_ts(range.start), format_ts(range.end));
    db.connection()
        .call(move |conn| -> Result<Vec<TimerSession>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM timer_sessions
                 WHERE user_id = ?1 AND tag = ?2 AND status = 'completed'
                   AND start_time >= ?3 AND start_time <= ?4
                 ORDER BY start_time DESC"
            ))?;
            let rows = stmt.query_map(params![user_id, tag, start, end], session_from_row)?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}
