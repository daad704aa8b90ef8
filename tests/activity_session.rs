//! Session and routine behavior against a scripted gateway client.

mod common;

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use chrono::Utc;

use engage_bot::ledger::FollowLedger;
use engage_bot::services::activity::ActivityOrchestrator;
use engage_bot::services::cooldown::CooldownGate;
use engage_bot::services::status::{BotStatus, StatusCell};

use common::{account, clip, post, temp_ledger, test_config, MockClient};

fn gate() -> CooldownGate {
    CooldownGate::new(Duration::ZERO)
}

#[tokio::test]
async fn feed_fetch_failure_yields_outcome_with_error() {
    let client = MockClient {
        fail_feed: true,
        ..Default::default()
    };
    let (_dir, mut ledger) = temp_ledger();
    let mut orchestrator = ActivityOrchestrator::new(
        &client,
        &mut ledger,
        gate(),
        test_config(),
        StatusCell::new(),
    );

    let outcome = orchestrator.run_session().await;

    assert!(outcome.error.is_some());
    assert_eq!(outcome.likes, 0);
    assert_eq!(outcome.follows, 0);
    assert_eq!(outcome.clips_watched, 0);
}

#[tokio::test]
async fn successful_session_counts_every_action() {
    let mut config = test_config();
    config.comment_probability = 1.0;
    let client = MockClient {
        feed: vec![post("p1"), post("p2"), post("p3")],
        clips: vec![clip("c1")],
        suggested: vec![account("7")],
        ..Default::default()
    };
    let (_dir, mut ledger) = temp_ledger();
    let mut orchestrator =
        ActivityOrchestrator::new(&client, &mut ledger, gate(), config, StatusCell::new());

    let outcome = orchestrator.run_session().await;

    assert!(outcome.error.is_none());
    // Two feed likes plus the clip like at probability 1.0.
    assert_eq!(outcome.likes, 3);
    assert_eq!(outcome.clips_watched, 1);
    assert_eq!(outcome.comments, 1);
    assert_eq!(outcome.follows, 1);
    assert_eq!(outcome.skipped, 0);

    assert_eq!(*client.follows.lock().unwrap(), vec!["7".to_string()]);
    assert!(ledger.get("7").is_some());
    assert!(!ledger.get("7").unwrap().unfollowed);
}

#[tokio::test]
async fn like_failures_are_skipped_without_aborting() {
    let mut config = test_config();
    config.clip_like_probability = 0.0;
    let client = MockClient {
        feed: vec![post("p1"), post("p2"), post("p3")],
        fail_like: true,
        ..Default::default()
    };
    let (_dir, mut ledger) = temp_ledger();
    let mut orchestrator =
        ActivityOrchestrator::new(&client, &mut ledger, gate(), config, StatusCell::new());

    let outcome = orchestrator.run_session().await;

    assert!(outcome.error.is_none());
    assert_eq!(outcome.likes, 0);
    assert_eq!(outcome.skipped, 2);
}

#[tokio::test]
async fn already_followed_suggestions_are_passed_over() {
    let mut config = test_config();
    config.follows_per_session = 2;
    let client = MockClient {
        suggested: vec![account("a"), account("b")],
        already_following: HashSet::from(["a".to_string()]),
        ..Default::default()
    };
    let (_dir, mut ledger) = temp_ledger();
    let mut orchestrator =
        ActivityOrchestrator::new(&client, &mut ledger, gate(), config, StatusCell::new());

    let outcome = orchestrator.run_session().await;

    assert_eq!(outcome.follows, 1);
    assert_eq!(*client.follows.lock().unwrap(), vec!["b".to_string()]);
    assert!(ledger.get("a").is_none());
}

#[tokio::test]
async fn simulate_activity_stops_at_max_sessions() {
    let client = MockClient {
        feed: vec![post("p1")],
        ..Default::default()
    };
    let (_dir, mut ledger) = temp_ledger();
    let mut orchestrator = ActivityOrchestrator::new(
        &client,
        &mut ledger,
        gate(),
        test_config(),
        StatusCell::new(),
    );

    let sessions = orchestrator
        .simulate_activity(Duration::from_secs(3600), 3)
        .await;

    assert_eq!(sessions, 3);
}

#[tokio::test]
async fn simulate_activity_survives_failing_sessions() {
    let client = MockClient {
        fail_feed: true,
        ..Default::default()
    };
    let (_dir, mut ledger) = temp_ledger();
    let status = StatusCell::new();
    let mut orchestrator = ActivityOrchestrator::new(
        &client,
        &mut ledger,
        gate(),
        test_config(),
        status.clone(),
    );

    let sessions = orchestrator
        .simulate_activity(Duration::from_secs(3600), 3)
        .await;

    assert_eq!(sessions, 3);
    assert!(matches!(status.get(), BotStatus::SessionError(_)));
}

fn backdated_history(dir: &tempfile::TempDir) -> FollowLedger {
    let path = dir.path().join("follow_history.json");
    let four_days_ago = (Utc::now() - chrono::Duration::days(4)).to_rfc3339();
    let now = Utc::now().to_rfc3339();
    let json = serde_json::json!({
        "a": {
            "display_name": "user_a",
            "followed_at": four_days_ago,
            "unfollowed": false
        },
        "c": {
            "display_name": "user_c",
            "followed_at": now,
            "unfollowed": false
        }
    });
    std::fs::write(&path, json.to_string()).unwrap();
    FollowLedger::load(&path).unwrap()
}

#[tokio::test]
async fn unfollow_targets_aged_and_untracked_non_followers() {
    let dir = tempfile::tempdir().unwrap();
    let mut ledger = backdated_history(&dir);
    let client = MockClient {
        following: HashMap::from([
            ("a".to_string(), account("a")),
            ("b".to_string(), account("b")),
            ("c".to_string(), account("c")),
            ("d".to_string(), account("d")),
        ]),
        followers: HashSet::from(["b".to_string()]),
        ..Default::default()
    };
    let mut orchestrator = ActivityOrchestrator::new(
        &client,
        &mut ledger,
        gate(),
        test_config(),
        StatusCell::new(),
    );

    let count = orchestrator.unfollow_non_followers(10).await.unwrap();

    // "a" aged past the threshold, "d" never tracked; "b" follows back and
    // "c" is too recent.
    assert_eq!(count, 2);
    let mut unfollowed = client.unfollows.lock().unwrap().clone();
    unfollowed.sort();
    assert_eq!(unfollowed, vec!["a".to_string(), "d".to_string()]);
    assert!(ledger.get("a").unwrap().unfollowed);
    assert!(!ledger.get("c").unwrap().unfollowed);
}

#[tokio::test]
async fn unfollow_respects_the_per_run_cap() {
    let (_dir, mut ledger) = temp_ledger();
    let client = MockClient {
        following: HashMap::from([
            ("a".to_string(), account("a")),
            ("b".to_string(), account("b")),
            ("c".to_string(), account("c")),
        ]),
        ..Default::default()
    };
    let mut orchestrator = ActivityOrchestrator::new(
        &client,
        &mut ledger,
        gate(),
        test_config(),
        StatusCell::new(),
    );

    let count = orchestrator.unfollow_non_followers(1).await.unwrap();

    assert_eq!(count, 1);
    assert_eq!(client.unfollows.lock().unwrap().len(), 1);
}
