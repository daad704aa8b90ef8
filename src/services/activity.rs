use std::time::{Duration, Instant};

use rand::Rng;

use crate::client::ActivityClient;
use crate::error::ClientError;
use crate::interfaces::Clip;
use crate::ledger::FollowLedger;
use crate::services::cooldown::CooldownGate;
use crate::services::status::{BotStatus, StatusCell};
use crate::utils::Logger;

const CLIP_COMMENTS: &[&str] = &[
    "Great content! 👏",
    "Love this",
    "So good 😍",
    "Top quality!",
    "Thanks for sharing!",
    "Amazing 🔥",
    "This made my day",
    "Really useful, thanks!",
];

/// Pacing and volume knobs for one orchestrator run. Production values
/// come from [`Env::orchestrator_config`](crate::config::Env); tests zero
/// the pauses and pin the probabilities.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub feed_limit: usize,
    pub likes_per_session: usize,
    pub clip_limit: usize,
    pub clip_watch_secs: (u64, u64),
    pub clip_like_probability: f64,
    pub comment_probability: f64,
    pub follows_per_session: u32,
    pub suggested_fetch_limit: usize,
    pub action_pause_secs: (u64, u64),
    pub routine_pause_secs: (u64, u64),
    pub session_pause_secs: (u64, u64),
    pub recovery_pause_secs: u64,
    pub unfollow_days_threshold: i64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            feed_limit: 5,
            likes_per_session: 2,
            clip_limit: 2,
            clip_watch_secs: (5, 15),
            clip_like_probability: 0.5,
            comment_probability: 0.2,
            follows_per_session: 1,
            suggested_fetch_limit: 20,
            action_pause_secs: (10, 30),
            routine_pause_secs: (300, 600),
            session_pause_secs: (600, 1200),
            recovery_pause_secs: 300,
            unfollow_days_threshold: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    FeedFetch,
    Liking,
    ClipWatch,
    Following,
    Done,
    Failed,
}

impl SessionPhase {
    fn as_str(self) -> &'static str {
        match self {
            SessionPhase::Idle => "idle",
            SessionPhase::FeedFetch => "feed-fetch",
            SessionPhase::Liking => "liking",
            SessionPhase::ClipWatch => "clip-watch",
            SessionPhase::Following => "following",
            SessionPhase::Done => "done",
            SessionPhase::Failed => "failed",
        }
    }
}

/// What one activity session did. Transient; only logged and reported.
#[derive(Debug, Clone, Default)]
pub struct SessionOutcome {
    pub likes: u32,
    pub follows: u32,
    pub comments: u32,
    pub clips_watched: u32,
    pub skipped: u32,
    pub error: Option<String>,
}

impl SessionOutcome {
    pub fn summary(&self) -> String {
        format!(
            "{} like(s), {} follow(s), {} comment(s), {} clip(s) watched, {} skipped",
            self.likes, self.follows, self.comments, self.clips_watched, self.skipped
        )
    }
}

/// Runs bounded sessions of engagement actions against the gateway,
/// spacing them through the cooldown gate and recording follows in the
/// ledger. Strictly sequential: one orchestrator owns one gate and drives
/// one action at a time.
pub struct ActivityOrchestrator<'a, C> {
    client: &'a C,
    ledger: &'a mut FollowLedger,
    gate: CooldownGate,
    config: OrchestratorConfig,
    status: StatusCell,
    phase: SessionPhase,
}

impl<'a, C: ActivityClient> ActivityOrchestrator<'a, C> {
    pub fn new(
        client: &'a C,
        ledger: &'a mut FollowLedger,
        gate: CooldownGate,
        config: OrchestratorConfig,
        status: StatusCell,
    ) -> Self {
        Self {
            client,
            ledger,
            gate,
            config,
            status,
            phase: SessionPhase::Idle,
        }
    }

    fn enter(&mut self, phase: SessionPhase) {
        self.phase = phase;
        Logger::info(&format!("Session phase: {}", phase.as_str()));
    }

    fn pick_secs(range: (u64, u64)) -> u64 {
        let (min, max) = range;
        if max == 0 {
            return 0;
        }
        rand::thread_rng().gen_range(min..=max)
    }

    async fn pause(&self, range: (u64, u64)) {
        let secs = Self::pick_secs(range);
        if secs > 0 {
            Logger::info(&format!("Pausing {}s", secs));
            tokio::time::sleep(Duration::from_secs(secs)).await;
        }
    }

    /// One bounded session: feed scan, a few likes, clip watching, a
    /// follow. Collaborator errors never escape; a failed session comes
    /// back as an outcome with `error` set.
    pub async fn run_session(&mut self) -> SessionOutcome {
        let mut outcome = SessionOutcome::default();
        Logger::info("Starting activity session");

        self.enter(SessionPhase::FeedFetch);
        self.gate.wait_if_needed().await;
        let feed = match self.client.fetch_feed(self.config.feed_limit).await {
            Ok(feed) => feed,
            Err(e) => {
                Logger::error(&format!(
                    "Session aborted during {}: {}",
                    self.phase.as_str(),
                    e
                ));
                self.enter(SessionPhase::Failed);
                outcome.error = Some(e.to_string());
                return outcome;
            }
        };
        Logger::info(&format!("Feed loaded: {} post(s)", feed.len()));

        self.enter(SessionPhase::Liking);
        for post in feed.iter().take(self.config.likes_per_session) {
            self.gate.wait_if_needed().await;
            match self.client.like(&post.id).await {
                Ok(()) => {
                    outcome.likes += 1;
                    self.pause(self.config.action_pause_secs).await;
                }
                Err(e) => {
                    Logger::warning(&format!("Like failed for {}: {}", post.id, e));
                    outcome.skipped += 1;
                }
            }
        }

        self.enter(SessionPhase::ClipWatch);
        match self.client.fetch_trending_clips(self.config.clip_limit).await {
            Ok(clips) => {
                for clip in &clips {
                    self.watch_clip(clip, &mut outcome).await;
                }
            }
            Err(e) => Logger::warning(&format!("Trending clips unavailable: {}", e)),
        }

        self.enter(SessionPhase::Following);
        match self
            .follow_suggested_accounts(self.config.follows_per_session)
            .await
        {
            Ok(follows) => outcome.follows += follows,
            Err(e) => Logger::warning(&format!("Could not follow suggested accounts: {}", e)),
        }

        self.enter(SessionPhase::Done);
        Logger::success(&format!("Session complete: {}", outcome.summary()));
        outcome
    }

    async fn watch_clip(&mut self, clip: &Clip, outcome: &mut SessionOutcome) {
        let dwell = Self::pick_secs(self.config.clip_watch_secs);
        Logger::info(&format!("Watching clip {} for {}s", clip.id, dwell));
        tokio::time::sleep(Duration::from_secs(dwell)).await;
        outcome.clips_watched += 1;

        let (like, comment, comment_idx) = {
            let mut rng = rand::thread_rng();
            (
                rng.gen_bool(self.config.clip_like_probability),
                rng.gen_bool(self.config.comment_probability),
                rng.gen_range(0..CLIP_COMMENTS.len()),
            )
        };

        if like {
            self.gate.wait_if_needed().await;
            match self.client.like(&clip.id).await {
                Ok(()) => {
                    outcome.likes += 1;
                    self.pause(self.config.action_pause_secs).await;
                }
                Err(e) => {
                    Logger::warning(&format!("Like failed for clip {}: {}", clip.id, e));
                    outcome.skipped += 1;
                }
            }
        }

        if comment {
            let text = CLIP_COMMENTS[comment_idx];
            if !(2..=200).contains(&text.len()) {
                Logger::warning("Comment text out of bounds, skipping");
                return;
            }
            self.gate.wait_if_needed().await;
            match self.client.comment(&clip.id, text).await {
                Ok(()) => {
                    outcome.comments += 1;
                    self.pause(self.config.action_pause_secs).await;
                }
                Err(e) => Logger::warning(&format!("Comment failed for clip {}: {}", clip.id, e)),
            }
        }
    }

    /// Follow up to `max_follows` suggested accounts we are not already
    /// following, recording each success in the ledger. A fetch failure
    /// propagates; per-account failures are logged and skipped.
    pub async fn follow_suggested_accounts(
        &mut self,
        max_follows: u32,
    ) -> Result<u32, ClientError> {
        if max_follows == 0 {
            return Ok(0);
        }
        let suggestions = self
            .client
            .fetch_suggested_accounts(self.config.suggested_fetch_limit)
            .await?;

        let mut followed = 0;
        for account in suggestions {
            if followed >= max_follows {
                break;
            }
            match self.client.friendship_status(&account.id).await {
                Ok(status) if status.following => continue,
                Ok(_) => {}
                Err(e) => {
                    Logger::warning(&format!(
                        "Friendship check failed for {}: {}",
                        account.username, e
                    ));
                    continue;
                }
            }
            self.gate.wait_if_needed().await;
            match self.client.follow(&account.id).await {
                Ok(()) => {
                    if let Err(e) = self.ledger.record_follow(&account.id, &account.username) {
                        Logger::error(&format!(
                            "Follow of {} applied remotely but not persisted: {}",
                            account.username, e
                        ));
                    }
                    Logger::info(&format!("Now following {}", account.username));
                    followed += 1;
                    self.pause(self.config.action_pause_secs).await;
                }
                Err(e) => Logger::warning(&format!("Follow failed for {}: {}", account.username, e)),
            }
        }
        Ok(followed)
    }

    /// Unfollow accounts that do not follow back, when the ledger says the
    /// follow is old enough. Capped at `max_unfollows` per run.
    pub async fn unfollow_non_followers(&mut self, max_unfollows: u32) -> Result<u32, ClientError> {
        if max_unfollows == 0 {
            return Ok(0);
        }
        self.gate.wait_if_needed().await;
        let me = self.client.account_id().await?;
        let following = self.client.list_following(&me).await?;
        let followers = self.client.list_followers(&me).await?;

        let mut unfollowed = 0;
        for (subject_id, account) in following {
            if unfollowed >= max_unfollows {
                break;
            }
            if followers.contains(&subject_id) {
                continue;
            }
            if !self
                .ledger
                .should_unfollow(&subject_id, self.config.unfollow_days_threshold)
            {
                continue;
            }
            self.gate.wait_if_needed().await;
            match self.client.unfollow(&subject_id).await {
                Ok(()) => {
                    if let Err(e) = self.ledger.mark_unfollowed(&subject_id) {
                        Logger::error(&format!(
                            "Unfollow of {} applied remotely but not persisted: {}",
                            account.username, e
                        ));
                    }
                    Logger::info(&format!("Unfollowed non-follower {}", account.username));
                    unfollowed += 1;
                    self.pause(self.config.action_pause_secs).await;
                }
                Err(e) => {
                    Logger::warning(&format!("Unfollow failed for {}: {}", account.username, e))
                }
            }
        }
        Logger::success(&format!("{} non-reciprocal unfollow(s) done", unfollowed));
        Ok(unfollowed)
    }

    /// The daily maintenance pass: clear out non-followers, breathe, then
    /// pick up new suggested accounts.
    pub async fn daily_routine(&mut self, max_follows: u32, max_unfollows: u32) {
        Logger::header("Daily follow/unfollow routine");

        let unfollowed = match self.unfollow_non_followers(max_unfollows).await {
            Ok(n) => n,
            Err(e) => {
                Logger::error(&format!("Unfollow routine failed: {}", e));
                0
            }
        };

        self.pause(self.config.routine_pause_secs).await;

        let followed = match self.follow_suggested_accounts(max_follows).await {
            Ok(n) => n,
            Err(e) => {
                Logger::error(&format!("Follow routine failed: {}", e));
                0
            }
        };

        Logger::success(&format!(
            "Routine finished: {} unfollow(s), {} follow(s)",
            unfollowed, followed
        ));
    }

    /// Repeat sessions until `duration` elapses or `max_sessions` have
    /// run, with a randomized pause between sessions and a fixed recovery
    /// pause after a failed one. A failed session never ends the loop.
    pub async fn simulate_activity(&mut self, duration: Duration, max_sessions: u32) -> u32 {
        Logger::info(&format!(
            "Simulating activity for {}min (up to {} session(s))",
            duration.as_secs() / 60,
            max_sessions
        ));
        let deadline = Instant::now() + duration;
        let mut sessions = 0;

        while Instant::now() < deadline && sessions < max_sessions {
            sessions += 1;
            Logger::info(&format!("Session {}/{}", sessions, max_sessions));
            let outcome = self.run_session().await;

            match &outcome.error {
                Some(detail) => {
                    self.status.set(BotStatus::SessionError(detail.clone()));
                    Logger::warning(&format!(
                        "Session {} failed, recovery pause {}s",
                        sessions, self.config.recovery_pause_secs
                    ));
                    tokio::time::sleep(Duration::from_secs(self.config.recovery_pause_secs)).await;
                    continue;
                }
                None => self.status.set(BotStatus::Running),
            }

            if Instant::now() < deadline && sessions < max_sessions {
                self.pause(self.config.session_pause_secs).await;
            }
        }

        Logger::info(&format!(
            "Activity simulation finished: {} session(s)",
            sessions
        ));
        sessions
    }
}
