//! Common test utilities: a scripted gateway client and ledger helpers.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use tempfile::TempDir;

use engage_bot::client::ActivityClient;
use engage_bot::error::ClientError;
use engage_bot::interfaces::{Account, Clip, FriendshipStatus, Post, Session};
use engage_bot::ledger::FollowLedger;
use engage_bot::services::activity::OrchestratorConfig;

pub fn post(id: &str) -> Post {
    Post {
        id: id.to_string(),
        author: format!("author_{id}"),
        caption: String::new(),
    }
}

pub fn clip(id: &str) -> Clip {
    Clip {
        id: id.to_string(),
        author: format!("author_{id}"),
    }
}

pub fn account(id: &str) -> Account {
    Account {
        id: id.to_string(),
        username: format!("user_{id}"),
        full_name: String::new(),
    }
}

/// Orchestrator config with all pacing zeroed and pinned probabilities,
/// so session tests are fast and deterministic.
pub fn test_config() -> OrchestratorConfig {
    OrchestratorConfig {
        feed_limit: 5,
        likes_per_session: 2,
        clip_limit: 2,
        clip_watch_secs: (0, 0),
        clip_like_probability: 1.0,
        comment_probability: 0.0,
        follows_per_session: 1,
        suggested_fetch_limit: 10,
        action_pause_secs: (0, 0),
        routine_pause_secs: (0, 0),
        session_pause_secs: (0, 0),
        recovery_pause_secs: 0,
        unfollow_days_threshold: 3,
    }
}

pub fn temp_ledger() -> (TempDir, FollowLedger) {
    let dir = tempfile::tempdir().expect("temp directory");
    let ledger = FollowLedger::load(dir.path().join("follow_history.json")).expect("empty ledger");
    (dir, ledger)
}

fn api_error(message: &str) -> ClientError {
    ClientError::Api {
        status: 500,
        message: message.to_string(),
    }
}

/// In-memory [`ActivityClient`] with scripted data and failures; records
/// every mutating call for assertions.
#[derive(Default)]
pub struct MockClient {
    pub feed: Vec<Post>,
    pub clips: Vec<Clip>,
    pub suggested: Vec<Account>,
    pub following: HashMap<String, Account>,
    pub followers: HashSet<String>,
    pub already_following: HashSet<String>,
    pub fail_feed: bool,
    pub fail_like: bool,
    pub likes: Mutex<Vec<String>>,
    pub follows: Mutex<Vec<String>>,
    pub unfollows: Mutex<Vec<String>>,
    pub comments: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl ActivityClient for MockClient {
    async fn login(&self) -> Result<Session, ClientError> {
        Ok(Session {
            token: "test-token".to_string(),
            account_id: "me".to_string(),
        })
    }

    async fn account_id(&self) -> Result<String, ClientError> {
        Ok("me".to_string())
    }

    async fn fetch_feed(&self, limit: usize) -> Result<Vec<Post>, ClientError> {
        if self.fail_feed {
            return Err(api_error("feed unavailable"));
        }
        Ok(self.feed.iter().take(limit).cloned().collect())
    }

    async fn like(&self, media_id: &str) -> Result<(), ClientError> {
        if self.fail_like {
            return Err(api_error("like rejected"));
        }
        self.likes.lock().unwrap().push(media_id.to_string());
        Ok(())
    }

    async fn comment(&self, media_id: &str, text: &str) -> Result<(), ClientError> {
        self.comments
            .lock()
            .unwrap()
            .push((media_id.to_string(), text.to_string()));
        Ok(())
    }

    async fn follow(&self, subject_id: &str) -> Result<(), ClientError> {
        self.follows.lock().unwrap().push(subject_id.to_string());
        Ok(())
    }

    async fn unfollow(&self, subject_id: &str) -> Result<(), ClientError> {
        self.unfollows.lock().unwrap().push(subject_id.to_string());
        Ok(())
    }

    async fn fetch_trending_clips(&self, limit: usize) -> Result<Vec<Clip>, ClientError> {
        Ok(self.clips.iter().take(limit).cloned().collect())
    }

    async fn fetch_suggested_accounts(&self, limit: usize) -> Result<Vec<Account>, ClientError> {
        Ok(self.suggested.iter().take(limit).cloned().collect())
    }

    async fn friendship_status(&self, subject_id: &str) -> Result<FriendshipStatus, ClientError> {
        Ok(FriendshipStatus {
            following: self.already_following.contains(subject_id),
            followed_by: self.followers.contains(subject_id),
        })
    }

    async fn list_following(
        &self,
        _account_id: &str,
    ) -> Result<HashMap<String, Account>, ClientError> {
        Ok(self.following.clone())
    }

    async fn list_followers(&self, _account_id: &str) -> Result<HashSet<String>, ClientError> {
        Ok(self.followers.clone())
    }
}
