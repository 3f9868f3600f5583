// SPDX-FileCopyrightText: 2026 Tagtimer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lifetime per-tag statistics.

use rusqlite::params;
use tagtimer_core::TagTimerError;

use crate::database::Database;
use crate::models::{UserTagStats, format_ts, get_ts};

fn stats_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserTagStats> {
    Ok(UserTagStats {
        id: row.get(0)?,
        user_id: row.get(1)?,
        tag: row.get(2)?,
        total_duration: row.get(3)?,
        session_count: row.get(4)?,
        last_updated: get_ts(row, 5)?,
    })
}

pub async fn find_user_tag_stats(
    db: &Database,
    user_id: &str,
    tag: &str,
) -> Result<Option<UserTagStats>, TagTimerError> {
    let user_id = user_id.to_string();
    let tag = tag.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<UserTagStats>, rusqlite::Error> {
            let result = conn.query_row(
                "SELECT id, user_id, tag, total_duration, session_count, last_updated
                 FROM user_tag_stats WHERE user_id = ?1 AND tag = ?2",
                params![user_id, tag],
                stats_from_row,
            );
            match result {
                Ok(stats) => Ok(Some(stats)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert a stats row. Fails if (user, tag) already has one.
pub async fn create_user_tag_stats(
    db: &Database,
    stats: &UserTagStats,
) -> Result<(), TagTimerError> {
    let stats = stats.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO user_tag_stats
                 (id, user_id, tag, total_duration, session_count, last_updated)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    stats.id,
                    stats.user_id,
                    stats.tag,
                    stats.total_duration,
                    stats.session_count,
                    format_ts(stats.last_updated),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Full overwrite of the (user, tag) row from the caller's copy.
pub async fn update_user_tag_stats(
    db: &Database,
    stats: &UserTagStats,
) -> Result<(), TagTimerError> {
    let stats = stats.clone();
    let (user_id, tag) = (stats.user_id.clone(), stats.tag.clone());
    let changed = db
        .connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(
                "UPDATE user_tag_stats
                 SET total_duration = ?3, session_count = ?4, last_updated = ?5
                 WHERE user_id = ?1 AND tag = ?2",
                params![
                    stats.user_id,
                    stats.tag,
                    stats.total_duration,
                    stats.session_count,
                    format_ts(stats.last_updated),
                ],
            )
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if changed == 0 {
        return Err(TagTimerError::not_found("tag stats", &user_id, &tag));
    }
    Ok(())
}

/// Every stats row for the user, ordered by tag.
pub async fn find_all_user_tag_stats(
    db: &Database,
    user_id: &str,
) -> Result<Vec<UserTagStats>, TagTimerError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Vec<UserTagStats>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, tag, total_duration, session_count, last_updated
                 FROM user_tag_stats WHERE user_id = ?1 ORDER BY tag ASC",
            )?;
            let rows = stmt.query_map(params![user_id], stats_from_row)?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete the (user, tag) row. Deleting a missing row is not an error.
pub async fn delete_user_tag_stats(
    db: &Database,
    user_id: &str,
    tag: &str,
) -> Result<(), TagTimerError> {
    let user_id = user_id.to_string();
    let tag = tag.to_string();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "DELETE FROM user_tag_stats WHERE user_id = ?1 AND tag = ?2",
                params![user_id, tag],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 1, 8, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn create_find_update_roundtrip() {
        let (db, _dir) = setup_db().await;
        let mut stats = UserTagStats::new("alice", "writing", now());
        create_user_tag_stats(&db, &stats).await.unwrap();

        let found = find_user_tag_stats(&db, "alice", "writing")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found, stats);
        assert_eq!(found.session_count, 1);
        assert_eq!(found.total_duration, 0);

        stats.add_elapsed(42, now() + chrono::Duration::seconds(42));
        update_user_tag_stats(&db, &stats).await.unwrap();
        let found = find_user_tag_stats(&db, "alice", "writing")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.total_duration, 42);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_create_is_rejected() {
        let (db, _dir) = setup_db().await;
        create_user_tag_stats(&db, &UserTagStats::new("alice", "writing", now()))
            .await
            .unwrap();
        let second = create_user_tag_stats(&db, &UserTagStats::new("alice", "writing", now())).await;
        assert!(second.is_err());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn update_without_row_is_not_found() {
        let (db, _dir) = setup_db().await;
        let err = update_user_tag_stats(&db, &UserTagStats::new("alice", "writing", now()))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn find_all_is_sorted_and_scoped() {
        let (db, _dir) = setup_db().await;
        for (user, tag) in [("alice", "writing"), ("alice", "admin"), ("bob", "reading")] {
            create_user_tag_stats(&db, &UserTagStats::new(user, tag, now()))
                .await
                .unwrap();
        }
        let tags: Vec<String> = find_all_user_tag_stats(&db, "alice")
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.tag)
            .collect();
        assert_eq!(tags, vec!["admin", "writing"]);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (db, _dir) = setup_db().await;
        create_user_tag_stats(&db, &UserTagStats::new("alice", "writing", now()))
            .await
            .unwrap();
        delete_user_tag_stats(&db, "alice", "writing").await.unwrap();
        delete_user_tag_stats(&db, "alice", "writing").await.unwrap();
        assert!(
            find_user_tag_stats(&db, "alice", "writing")
                .await
                .unwrap()
                .is_none()
        );
        db.close().await.unwrap();
    }
}
