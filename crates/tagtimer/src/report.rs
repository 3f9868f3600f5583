// SPDX-FileCopyrightText: 2026 Tagtimer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tagtimer tags` and `tagtimer summary` command implementations.
//!
//! Both read the configured database directly, so they work whether or not
//! the server is running. `--json` prints the same shapes the HTTP API
//! returns.

use std::sync::Arc;

use tagtimer_config::model::TagTimerConfig;
use tagtimer_core::{
    Clock, DateRange, StatsSummary, StorageAdapter, SystemClock, TagTimerError, UserTagStats,
};
use tagtimer_engine::Engine;
use tagtimer_storage::SqliteStorage;

use crate::serve::open_storage;

/// Format seconds as `1h 02m 03s`, dropping leading zero units.
fn format_duration(secs: i64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if hours > 0 {
        format!("{hours}h {minutes:02}m {seconds:02}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds:02}s")
    } else {
        format!("{seconds}s")
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, TagTimerError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| TagTimerError::Internal(format!("failed to serialize output: {e}")))
}

fn render_tags(stats: &[UserTagStats]) -> String {
    if stats.is_empty() {
        return "no tags recorded".to_string();
    }
    let width = stats.iter().map(|s| s.tag.len()).max().unwrap_or(0).max(3);
    let mut out = format!("{:<width$}  {:>12}  {:>8}\n", "TAG", "TOTAL", "RUNS");
    for s in stats {
        out.push_str(&format!(
            "{:<width$}  {:>12}  {:>8}\n",
            s.tag,
            format_duration(s.total_duration),
            s.session_count
        ));
    }
    out
}

fn render_summary(summary: &StatsSummary, range: &DateRange) -> String {
    let mut out = format!(
        "{} .. {}\ntotal {} over {} sessions (avg {})\n",
        range.start.to_rfc3339(),
        range.end.to_rfc3339(),
        format_duration(summary.total_duration),
        summary.total_sessions,
        format_duration(summary.average_session),
    );
    if summary.tag_breakdown.is_empty() {
        out.push_str("no completed sessions in range\n");
        return out;
    }
    out.push_str(&format!("most used: {}\n", summary.most_used_tag));
    for t in &summary.tag_breakdown {
        out.push_str(&format!(
            "  {:<20} {:>12} {:>6.1}%  {} sessions, avg {}\n",
            t.tag,
            format_duration(t.total_duration),
            t.percentage_of_total,
            t.session_count,
            format_duration(t.average_session),
        ));
    }
    out
}

async fn engine(config: &TagTimerConfig) -> Result<(Engine, Arc<SqliteStorage>), TagTimerError> {
    let storage = open_storage(config).await?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    Ok((Engine::new(storage.clone(), clock), storage))
}

/// Runs the `tagtimer tags` command.
pub async fn run_tags(
    config: &TagTimerConfig,
    user: &str,
    json: bool,
) -> Result<(), TagTimerError> {
    let (engine, storage) = engine(config).await?;
    let stats = engine.tag_stats.find_all(user).await;
    storage.close().await?;
    let stats = stats?;

    if json {
        println!("{}", to_json(&stats)?);
    } else {
        print!("{}", render_tags(&stats));
    }
    Ok(())
}

/// Runs the `tagtimer summary` command.
pub async fn run_summary(
    config: &TagTimerConfig,
    user: &str,
    start: Option<&str>,
    end: Option<&str>,
    json: bool,
) -> Result<(), TagTimerError> {
    let (engine, storage) = engine(config).await?;
    let range = DateRange::from_query(start, end, engine.clock().now())?;
    let summary = engine.summary.get_stats_summary(user, &range).await;
    storage.close().await?;
    let summary = summary?;

    if json {
        println!("{}", to_json(&summary)?);
    } else {
        print!("{}", render_summary(&summary, &range));
    }
    Ok(())
}
