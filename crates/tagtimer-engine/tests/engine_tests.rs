// SPDX-FileCopyrightText: 2026 Tagtimer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Timer engine behavior against real SQLite storage and a manual clock.

use chrono::Duration;
use tagtimer_core::{Clock, DateRange, TagTimerError, TimerSession, TimerStatus, UserProfile};
use tagtimer_test_utils::TestHarness;
use tracing_test::traced_test;

async fn harness() -> TestHarness {
    TestHarness::new().await.expect("harness should build")
}

fn whole_day(h: &TestHarness) -> DateRange {
    let now = h.clock.now();
    DateRange::new(now - Duration::hours(1), now + Duration::days(1)).unwrap()
}

async fn session_in(
    h: &TestHarness,
    user: &str,
    tag: &str,
    status: TimerStatus,
) -> Option<TimerSession> {
    h.storage.find_timer_session(user, tag, status).await.unwrap()
}

#[tokio::test]
async fn fresh_start_creates_running_session_and_stats_row() {
    let h = harness().await;
    let t0 = h.clock.now();

    let session = h.engine.timers.start("alice", "writing").await.unwrap();
    assert_eq!(session.status, TimerStatus::Running);
    assert_eq!(session.duration, 0);
    assert_eq!(session.start_time, t0);
    assert_eq!(session.last_updated, t0);
    assert!(session.end_time.is_none());

    let stored = session_in(&h, "alice", "writing", TimerStatus::Running).await.unwrap();
    assert_eq!(stored.id, session.id);

    let stats = h.storage.find_user_tag_stats("alice", "writing").await.unwrap().unwrap();
    assert_eq!(stats.session_count, 1);
    assert_eq!(stats.total_duration, 0);
}

#[tokio::test]
async fn alice_writing_scenario() {
    let h = harness().await;
    let t0 = h.clock.now();

    h.engine.timers.start("alice", "writing").await.unwrap();

    h.clock.advance(10);
    let stopped = h.engine.timers.stop("alice", "writing").await.unwrap();
    assert_eq!(stopped.duration, 10);
    assert_eq!(stopped.status, TimerStatus::Stopped);
    let stats = h.storage.find_user_tag_stats("alice", "writing").await.unwrap().unwrap();
    assert_eq!(stats.total_duration, 10);

    h.clock.advance(10);
    let resumed = h.engine.timers.start("alice", "writing").await.unwrap();
    assert_eq!(resumed.id, stopped.id);
    assert_eq!(resumed.duration, 10);
    assert_eq!(resumed.status, TimerStatus::Running);
    assert_eq!(resumed.last_updated, t0 + Duration::seconds(20));
    let stats = h.storage.find_user_tag_stats("alice", "writing").await.unwrap().unwrap();
    assert_eq!(stats.session_count, 1, "resume must not count a new session");

    h.clock.advance(5);
    let stopped = h.engine.timers.stop("alice", "writing").await.unwrap();
    assert_eq!(stopped.duration, 15);
    let stats = h.storage.find_user_tag_stats("alice", "writing").await.unwrap().unwrap();
    assert_eq!(stats.total_duration, 15);

    h.clock.advance(100);
    let idle = h.engine.timers.reset("alice", "writing").await.unwrap();
    assert_eq!(idle.tags, vec!["writing"]);

    let completed = session_in(&h, "alice", "writing", TimerStatus::Completed).await.unwrap();
    assert_eq!(completed.duration, 15, "time after the stop is not counted");
    assert_eq!(completed.end_time, Some(t0 + Duration::seconds(125)));
    assert!(session_in(&h, "alice", "writing", TimerStatus::Stopped).await.is_none());
}

#[tokio::test]
async fn stop_without_running_timer_is_not_found_and_writes_nothing() {
    let h = harness().await;

    let err = h.engine.timers.stop("alice", "writing").await.unwrap_err();
    assert!(err.is_not_found(), "got {err:?}");
    assert!(h.storage.find_user_tag_stats("alice", "writing").await.unwrap().is_none());
    for status in [TimerStatus::Running, TimerStatus::Stopped, TimerStatus::Completed] {
        assert!(session_in(&h, "alice", "writing", status).await.is_none());
    }

    // Stopping twice: the second stop finds nothing running.
    h.engine.timers.start("alice", "writing").await.unwrap();
    h.clock.advance(3);
    h.engine.timers.stop("alice", "writing").await.unwrap();
    h.clock.advance(3);
    let err = h.engine.timers.stop("alice", "writing").await.unwrap_err();
    assert!(err.is_not_found());
    let stats = h.storage.find_user_tag_stats("alice", "writing").await.unwrap().unwrap();
    assert_eq!(stats.total_duration, 3);
}

#[tokio::test]
async fn lifetime_total_is_the_sum_of_stop_intervals() {
    let h = harness().await;
    let intervals = [7_i64, 0, 42, 1, 3600];

    for secs in intervals {
        h.engine.timers.start("alice", "deep-work").await.unwrap();
        h.clock.advance(secs);
        let session = h.engine.timers.stop("alice", "deep-work").await.unwrap();
        let stats = h.storage.find_user_tag_stats("alice", "deep-work").await.unwrap().unwrap();
        assert_eq!(stats.total_duration, session.duration);
        h.clock.advance(30);
    }

    let stats = h.storage.find_user_tag_stats("alice", "deep-work").await.unwrap().unwrap();
    assert_eq!(stats.total_duration, intervals.iter().sum::<i64>());
    assert_eq!(stats.session_count, 1);
}

#[tokio::test]
async fn reset_requires_a_stopped_timer() {
    let h = harness().await;

    let err = h.engine.timers.reset("alice", "writing").await.unwrap_err();
    assert!(err.is_not_found());

    h.engine.timers.start("alice", "writing").await.unwrap();
    h.clock.advance(5);
    let err = h.engine.timers.reset("alice", "writing").await.unwrap_err();
    assert!(err.is_not_found(), "reset of a running timer must fail");
    let running = session_in(&h, "alice", "writing", TimerStatus::Running).await.unwrap();
    assert!(running.end_time.is_none());
}

#[tokio::test]
async fn start_after_reset_begins_a_new_counted_run() {
    let h = harness().await;

    let first = h.engine.timers.start("alice", "writing").await.unwrap();
    h.clock.advance(10);
    h.engine.timers.stop("alice", "writing").await.unwrap();
    h.engine.timers.reset("alice", "writing").await.unwrap();

    h.clock.advance(60);
    let second = h.engine.timers.start("alice", "writing").await.unwrap();
    assert_ne!(second.id, first.id);
    assert_eq!(second.duration, 0);

    let stats = h.storage.find_user_tag_stats("alice", "writing").await.unwrap().unwrap();
    assert_eq!(stats.session_count, 2);
    assert_eq!(stats.total_duration, 10);
}

#[tokio::test]
#[traced_test]
async fn start_completes_orphaned_running_timers() {
    let h = harness().await;

    // A client vanished while this run was going.
    let orphan = TimerSession::new("alice", "writing", h.clock.now());
    h.storage.create_timer_session(&orphan).await.unwrap();

    h.clock.advance(3600);
    let session = h.engine.timers.start("alice", "writing").await.unwrap();
    assert_ne!(session.id, orphan.id);

    let completed = session_in(&h, "alice", "writing", TimerStatus::Completed).await.unwrap();
    assert_eq!(completed.id, orphan.id);
    assert_eq!(completed.duration, 0, "orphaned time is not credited");

    let running = session_in(&h, "alice", "writing", TimerStatus::Running).await.unwrap();
    assert_eq!(running.id, session.id);
    assert!(logs_contain("completed orphaned running timers"));
}

#[tokio::test]
async fn backwards_clock_on_stop_is_rejected_without_writes() {
    let h = harness().await;
    h.engine.timers.start("alice", "writing").await.unwrap();

    h.clock.rewind(5);
    let err = h.engine.timers.stop("alice", "writing").await.unwrap_err();
    assert!(matches!(err, TagTimerError::ClockAnomaly { .. }), "got {err:?}");

    let running = session_in(&h, "alice", "writing", TimerStatus::Running).await.unwrap();
    assert_eq!(running.duration, 0);
    let stats = h.storage.find_user_tag_stats("alice", "writing").await.unwrap().unwrap();
    assert_eq!(stats.total_duration, 0);
}

#[tokio::test]
async fn blank_tag_is_rejected_before_storage() {
    let h = harness().await;
    for tag in ["", "   "] {
        let err = h.engine.timers.start("alice", tag).await.unwrap_err();
        assert!(matches!(err, TagTimerError::Validation(_)));
        assert!(matches!(
            h.engine.timers.stop("alice", tag).await,
            Err(TagTimerError::Validation(_))
        ));
        assert!(matches!(
            h.engine.tag_stats.delete_tag("alice", tag).await,
            Err(TagTimerError::Validation(_))
        ));
    }
    assert!(h.engine.tag_stats.find_all("alice").await.unwrap().is_empty());
}

#[tokio::test]
async fn current_reports_live_duration() {
    let h = harness().await;

    let err = h.engine.timers.current("alice", "writing").await.unwrap_err();
    assert!(err.is_not_found());

    h.engine.timers.start("alice", "writing").await.unwrap();
    h.clock.advance(12);
    let live = h.engine.timers.current("alice", "writing").await.unwrap();
    assert_eq!(live.duration, 12);
    assert_eq!(live.session.duration, 0, "current is read-only");

    h.engine.timers.stop("alice", "writing").await.unwrap();
    h.clock.advance(100);
    let live = h.engine.timers.current("alice", "writing").await.unwrap();
    assert_eq!(live.duration, 12);
    assert_eq!(live.session.status, TimerStatus::Stopped);

    h.engine.timers.reset("alice", "writing").await.unwrap();
    assert!(h.engine.timers.current("alice", "writing").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn timers_are_isolated_per_user_and_tag() {
    let h = harness().await;
    h.engine.timers.start("alice", "writing").await.unwrap();
    h.engine.timers.start("bob", "writing").await.unwrap();
    h.engine.timers.start("alice", "reading").await.unwrap();

    h.clock.advance(8);
    h.engine.timers.stop("alice", "writing").await.unwrap();

    assert!(session_in(&h, "bob", "writing", TimerStatus::Running).await.is_some());
    assert!(session_in(&h, "alice", "reading", TimerStatus::Running).await.is_some());
    assert_eq!(
        h.engine.tag_stats.list_tags("alice").await.unwrap(),
        vec!["reading", "writing"]
    );
    assert_eq!(h.engine.tag_stats.list_tags("bob").await.unwrap(), vec!["writing"]);
}

/// Run `tag` for `secs` and complete it.
async fn completed_run(h: &TestHarness, user: &str, tag: &str, secs: i64) {
    h.engine.timers.start(user, tag).await.unwrap();
    h.clock.advance(secs);
    h.engine.timers.stop(user, tag).await.unwrap();
    h.engine.timers.reset(user, tag).await.unwrap();
    h.clock.advance(60);
}

#[tokio::test]
async fn summary_scenario() {
    let h = harness().await;
    let range = whole_day(&h);
    completed_run(&h, "alice", "writing", 15).await;
    completed_run(&h, "alice", "writing", 30).await;
    completed_run(&h, "alice", "reading", 5).await;
    // Still running: excluded.
    h.engine.timers.start("alice", "admin").await.unwrap();

    let summary = h.engine.summary.get_stats_summary("alice", &range).await.unwrap();
    assert_eq!(summary.total_duration, 50);
    assert_eq!(summary.total_sessions, 3);
    assert_eq!(summary.average_session, 16);
    assert_eq!(summary.most_used_tag, "writing");

    let writing = &summary.tag_breakdown[0];
    assert_eq!(writing.tag, "writing");
    assert_eq!(writing.total_duration, 45);
    assert_eq!(writing.session_count, 2);
    assert_eq!(writing.average_session, 22);
    assert!((writing.percentage_of_total - 90.0).abs() < 1e-9);

    let reading = &summary.tag_breakdown[1];
    assert_eq!(reading.tag, "reading");
    assert!((reading.percentage_of_total - 10.0).abs() < 1e-9);
    assert_eq!(summary.tag_breakdown.len(), 2);

    let sessions = h
        .engine
        .summary
        .get_tag_sessions("alice", "writing", &range)
        .await
        .unwrap();
    let durations: Vec<i64> = sessions.iter().map(|s| s.duration).collect();
    assert_eq!(durations, vec![30, 15]);
}

#[tokio::test]
async fn summary_reads_are_idempotent() {
    let h = harness().await;
    let range = whole_day(&h);
    completed_run(&h, "alice", "writing", 20).await;

    let first = h.engine.summary.get_stats_summary("alice", &range).await.unwrap();
    let second = h.engine.summary.get_stats_summary("alice", &range).await.unwrap();
    assert_eq!(first, second);

    let a = h.engine.summary.get_tag_sessions("alice", "writing", &range).await.unwrap();
    let b = h.engine.summary.get_tag_sessions("alice", "writing", &range).await.unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn empty_summary_has_no_most_used_tag() {
    let h = harness().await;
    let summary = h
        .engine
        .summary
        .get_stats_summary("nobody", &whole_day(&h))
        .await
        .unwrap();
    assert_eq!(summary.total_duration, 0);
    assert_eq!(summary.average_session, 0);
    assert!(summary.most_used_tag.is_empty());
    assert!(summary.tag_breakdown.is_empty());
}

#[tokio::test]
async fn delete_tag_removes_stats_and_sessions() {
    let h = harness().await;
    let range = whole_day(&h);
    completed_run(&h, "alice", "writing", 15).await;
    completed_run(&h, "alice", "reading", 5).await;

    h.engine.tag_stats.delete_tag("alice", "writing").await.unwrap();

    let tags = h.engine.tag_stats.list_tags("alice").await.unwrap();
    assert_eq!(tags, vec!["reading"]);
    assert!(
        h.engine
            .summary
            .get_tag_sessions("alice", "writing", &range)
            .await
            .unwrap()
            .is_empty()
    );
    let summary = h.engine.summary.get_stats_summary("alice", &range).await.unwrap();
    assert_eq!(summary.most_used_tag, "reading");

    // Unknown tags delete cleanly.
    h.engine.tag_stats.delete_tag("alice", "never-used").await.unwrap();
}

#[tokio::test]
async fn stop_after_stats_row_deleted_is_not_found() {
    let h = harness().await;
    h.engine.timers.start("alice", "writing").await.unwrap();
    h.storage.delete_user_tag_stats("alice", "writing").await.unwrap();

    h.clock.advance(4);
    let err = h.engine.timers.stop("alice", "writing").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn login_upserts_user() {
    let h = harness().await;
    let profile = UserProfile {
        provider: "github".into(),
        provider_id: "77".into(),
        name: "Alice".into(),
        ..UserProfile::default()
    };
    let user = h.engine.users.login(&profile).await.unwrap();
    assert_eq!(user.id, "github:77");
    assert_eq!(h.engine.users.get_user("github:77").await.unwrap(), user);

    let missing = UserProfile::default();
    assert!(matches!(
        h.engine.users.login(&missing).await,
        Err(TagTimerError::Validation(_))
    ));
    assert!(matches!(
        h.engine.users.get_user("github:0").await,
        Err(TagTimerError::Unauthorized(_))
    ));
}

#[tokio::test]
async fn login_with_colons_in_provider_keys_stays_distinct() {
    let h = harness().await;
    let first = UserProfile {
        provider: "google".into(),
        provider_id: "a:b".into(),
        ..UserProfile::default()
    };
    let second = UserProfile {
        provider: "google:a".into(),
        provider_id: "b".into(),
        ..UserProfile::default()
    };
    let a = h.engine.users.login(&first).await.unwrap();
    let b = h.engine.users.login(&second).await.unwrap();
    assert_ne!(a.id, b.id);
    assert_eq!(h.engine.users.get_user(&a.id).await.unwrap().provider_id, "a:b");
    assert_eq!(h.engine.users.get_user(&b.id).await.unwrap().provider, "google:a");

    // A second login for the same identity keeps its id.
    assert_eq!(h.engine.users.login(&first).await.unwrap().id, a.id);
}
