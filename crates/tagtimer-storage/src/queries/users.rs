// SPDX-FileCopyrightText: 2026 Tagtimer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User identity records.

use chrono::{DateTime, Utc};
use rusqlite::params;
use tagtimer_core::{TagTimerError, UserProfile};

use crate::database::Database;
use crate::models::{User, format_ts, get_ts};

const USER_COLUMNS: &str = "id, email, name, first_name, last_name, nick_name, avatar_url, \
                            provider, provider_id, created_at, last_login_at";

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        nick_name: row.get(5)?,
        avatar_url: row.get(6)?,
        provider: row.get(7)?,
        provider_id: row.get(8)?,
        created_at: get_ts(row, 9)?,
        last_login_at: get_ts(row, 10)?,
    })
}

/// Insert the user, or refresh profile fields and `last_login_at` if the
/// (provider, provider id) pair is already known. `created_at` is kept.
pub async fn find_or_create_user(
    db: &Database,
    profile: &UserProfile,
    now: DateTime<Utc>,
) -> Result<User, TagTimerError> {
    let user = User::from_profile(profile.clone(), now);
    db.connection()
        .call(move |conn| -> Result<User, rusqlite::Error> {
            conn.execute(
                "INSERT INTO users
                 (id, email, name, first_name, last_name, nick_name, avatar_url,
                  provider, provider_id, created_at, last_login_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
                 ON CONFLICT (provider, provider_id) DO UPDATE SET
                   email = excluded.email,
                   name = excluded.name,
                   first_name = excluded.first_name,
                   last_name = excluded.last_name,
                   nick_name = excluded.nick_name,
                   avatar_url = excluded.avatar_url,
                   last_login_at = excluded.last_login_at",
                params![
                    user.id,
                    user.email,
                    user.name,
                    user.first_name,
                    user.last_name,
                    user.nick_name,
                    user.avatar_url,
                    user.provider,
                    user.provider_id,
                    format_ts(now),
                ],
            )?;
            conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE provider = ?1 AND provider_id = ?2"),
                params![user.provider, user.provider_id],
                user_from_row,
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn get_user(db: &Database, id: &str) -> Result<Option<User>, TagTimerError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<User>, rusqlite::Error> {
            let result = conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id],
                user_from_row,
            );
            match result {
                Ok(user) => Ok(Some(user)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}
