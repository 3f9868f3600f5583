// SPDX-FileCopyrightText: 2026 Tagtimer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Timer session CRUD operations.

use chrono::{DateTime, Utc};
use rusqlite::params;
use tagtimer_core::TagTimerError;

use crate::database::Database;
use crate::models::{TimerSession, TimerStatus, format_ts, get_ts, parse_status};

pub(crate) const SESSION_COLUMNS: &str =
    "id, user_id, tag, start_time, end_time, duration, status, created_at, last_updated";

/// Decode a row selected with [`SESSION_COLUMNS`].
pub(crate) fn session_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TimerSession> {
    let end_time: Option<String> = row.get(4)?;
    let status: String = row.get(6)?;
    Ok(TimerSession {
        id: row.get(0)?,
        user_id: row.get(1)?,
        tag: row.get(2)?,
        start_time: get_ts(row, 3)?,
        end_time: end_time
            .map(|raw| crate::models::parse_ts(4, &raw))
            .transpose()?,
        duration: row.get(5)?,
        status: parse_status(6, &status)?,
        created_at: get_ts(row, 7)?,
        last_updated: get_ts(row, 8)?,
    })
}

/// Most recently updated session for (user, tag) in `status`.
pub async fn find_timer_session(
    db: &Database,
    user_id: &str,
    tag: &str,
    status: TimerStatus,
) -> Result<Option<TimerSession>, TagTimerError> {
    let user_id = user_id.to_string();
    let tag = tag.to_string();
    let status = status.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<TimerSession>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM timer_sessions
                 WHERE user_id = ?1 AND tag = ?2 AND status = ?3
                 ORDER BY last_updated DESC LIMIT 1"
            ))?;
            match stmt.query_row(params![user_id, tag, status], session_from_row) {
                Ok(session) => Ok(Some(session)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert a new session row.
pub async fn create_timer_session(
    db: &Database,
    session: &TimerSession,
) -> Result<(), TagTimerError> {
    let session = session.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO timer_sessions
                 (id, user_id, tag, start_time, end_time, duration, status, created_at, last_updated)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    session.id,
                    session.user_id,
                    session.tag,
                    format_ts(session.start_time),
                    session.end_time.map(format_ts),
                    session.duration,
                    session.status.to_string(),
                    format_ts(session.created_at),
                    format_ts(session.last_updated),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Overwrite the mutable fields of an existing session row.
///
/// Returns `NotFound` when no row has the session's id.
pub async fn update_timer_session(
    db: &Database,
    session: &TimerSession,
) -> Result<(), TagTimerError> {
    let session = session.clone();
    let (user_id, tag) = (session.user_id.clone(), session.tag.clone());
    let changed = db
        .connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(
                "UPDATE timer_sessions
                 SET start_time = ?2, end_time = ?3, duration = ?4, status = ?5, last_updated = ?6
                 WHERE id = ?1",
                params![
                    session.id,
                    format_ts(session.start_time),
                    session.end_time.map(format_ts),
                    session.duration,
                    session.status.to_string(),
                    format_ts(session.last_updated),
                ],
            )
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if changed == 0 {
        return Err(TagTimerError::not_found("timer session", &user_id, &tag));
    }
    Ok(())
}

/// Mark every running session for (user, tag) as completed at `now`.
///
/// Accumulated durations are kept; the in-flight interval of an orphaned
/// run is not counted.
pub async fn abandon_running_timers(
    db: &Database,
    user_id: &str,
    tag: &str,
    now: DateTime<Utc>,
) -> Result<u64, TagTimerError> {
    let user_id = user_id.to_string();
    let tag = tag.to_string();
    let now = format_ts(now);
    let changed = db
        .connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(
                "UPDATE timer_sessions
                 SET status = 'completed', end_time = ?3, last_updated = ?3
                 WHERE user_id = ?1 AND tag = ?2 AND status = 'running'",
                params![user_id, tag, now],
            )
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    Ok(changed as u64)
}

/// Delete every session row for (user, tag).
pub async fn delete_timer_sessions(
    db: &Database,
    user_id: &str,
    tag: &str,
) -> Result<u64, TagTimerError> {
    let user_id = user_id.to_string();
    let tag = tag.to_string();
    let deleted = db
        .connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(
                "DELETE FROM timer_sessions WHERE user_id = ?1 AND tag = ?2",
                params![user_id, tag],
            )
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    Ok(deleted as u64)
}
