pub mod rest;

pub use rest::RestActivityClient;

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use crate::error::ClientError;
use crate::interfaces::{Account, Clip, FriendshipStatus, Post, Session};

/// Capability interface over the remote activity gateway.
///
/// The orchestrator only ever talks to this trait, so the wire protocol,
/// session handling and pacing heuristics of the gateway never leak into
/// the core. Every call may fail with a [`ClientError`]; the core treats
/// all of them as recoverable at session level.
#[async_trait]
pub trait ActivityClient: Send + Sync {
    /// Establish a session, preferring a cached one over password login.
    async fn login(&self) -> Result<Session, ClientError>;

    /// The id of the account the bot is driving.
    async fn account_id(&self) -> Result<String, ClientError>;

    async fn fetch_feed(&self, limit: usize) -> Result<Vec<Post>, ClientError>;

    async fn like(&self, media_id: &str) -> Result<(), ClientError>;

    async fn comment(&self, media_id: &str, text: &str) -> Result<(), ClientError>;

    async fn follow(&self, subject_id: &str) -> Result<(), ClientError>;

    async fn unfollow(&self, subject_id: &str) -> Result<(), ClientError>;

    async fn fetch_trending_clips(&self, limit: usize) -> Result<Vec<Clip>, ClientError>;

    async fn fetch_suggested_accounts(&self, limit: usize) -> Result<Vec<Account>, ClientError>;

    async fn friendship_status(&self, subject_id: &str) -> Result<FriendshipStatus, ClientError>;

    async fn list_following(
        &self,
        account_id: &str,
    ) -> Result<HashMap<String, Account>, ClientError>;

    async fn list_followers(&self, account_id: &str) -> Result<HashSet<String>, ClientError>;
}
