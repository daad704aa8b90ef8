use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::client::ActivityClient;
use crate::config::Env;
use crate::error::ClientError;
use crate::interfaces::{Account, Clip, FriendshipStatus, Post, Session};
use crate::utils::Logger;

const RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

/// Gateway-backed implementation of [`ActivityClient`].
///
/// Holds a bearer session that is restored from `session_file` when
/// possible and re-established with the account password otherwise.
pub struct RestActivityClient {
    http: Client,
    base_url: String,
    username: String,
    password: String,
    session_file: PathBuf,
    session: RwLock<Option<Session>>,
    retry_limit: u32,
}

impl RestActivityClient {
    pub fn new(env: &Env) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(Duration::from_millis(env.request_timeout_ms))
            .build()?;
        Ok(Self {
            http,
            base_url: env.gateway_url.trim_end_matches('/').to_string(),
            username: env.account_username.clone(),
            password: env.account_password.clone(),
            session_file: env.session_file.clone(),
            session: RwLock::new(None),
            retry_limit: env.network_retry_limit,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn current_session(&self) -> Option<Session> {
        match self.session.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn store_session(&self, session: Option<Session>) {
        match self.session.write() {
            Ok(mut guard) => *guard = session,
            Err(poisoned) => *poisoned.into_inner() = session,
        }
    }

    fn restore_cached_session(&self) -> Option<Session> {
        let contents = fs::read_to_string(&self.session_file).ok()?;
        serde_json::from_str(&contents).ok()
    }

    fn dump_session(&self, session: &Session) {
        match serde_json::to_string_pretty(session) {
            Ok(json) => {
                if let Err(e) = fs::write(&self.session_file, json) {
                    Logger::warning(&format!("Could not cache session: {}", e));
                }
            }
            Err(e) => Logger::warning(&format!("Could not serialize session: {}", e)),
        }
    }

    fn discard_cached_session(&self) {
        let _ = fs::remove_file(&self.session_file);
        self.store_session(None);
    }

    fn authed(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match self.current_session() {
            Some(session) => builder.bearer_auth(session.token),
            None => builder,
        }
    }

    /// Send with bounded retry and exponential backoff on network errors
    /// and non-auth HTTP failures. Auth failures surface immediately.
    async fn send_with_retry(
        &self,
        make_request: impl Fn() -> RequestBuilder,
    ) -> Result<reqwest::Response, ClientError> {
        let retries = self.retry_limit.max(1);
        for attempt in 1..=retries {
            match make_request().send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }
                    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                        let message = response.text().await.unwrap_or_default();
                        return Err(ClientError::Auth(message));
                    }
                    if attempt < retries && status.is_server_error() {
                        let delay = RETRY_BASE_DELAY * (1 << (attempt - 1));
                        Logger::warning(&format!(
                            "Gateway returned {} (attempt {}/{}), retrying in {:?}",
                            status, attempt, retries, delay
                        ));
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    let message = response.text().await.unwrap_or_default();
                    return Err(ClientError::Api {
                        status: status.as_u16(),
                        message,
                    });
                }
                Err(e) => {
                    let network_error = e.is_timeout() || e.is_connect() || e.is_request();
                    if network_error && attempt < retries {
                        let delay = RETRY_BASE_DELAY * (1 << (attempt - 1));
                        Logger::warning(&format!(
                            "Network error (attempt {}/{}), retrying in {:?}",
                            attempt, retries, delay
                        ));
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }
        unreachable!("retry loop always returns")
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let url = self.url(path);
        let response = self
            .send_with_retry(|| self.authed(Method::GET, &url).query(query))
            .await?;
        Ok(response.json().await?)
    }

    async fn post_action(&self, path: &str, body: serde_json::Value) -> Result<(), ClientError> {
        let url = self.url(path);
        self.send_with_retry(|| self.authed(Method::POST, &url).json(&body))
            .await?;
        Ok(())
    }

    async fn password_login(&self) -> Result<Session, ClientError> {
        let url = self.url("/v1/auth/login");
        let body = json!({
            "username": self.username,
            "password": self.password,
        });
        let response = self
            .send_with_retry(|| self.http.post(&url).json(&body))
            .await?;
        let session: Session = response.json().await?;
        self.store_session(Some(session.clone()));
        self.dump_session(&session);
        Logger::success("Signed in with password");
        Ok(session)
    }
}

#[async_trait]
impl ActivityClient for RestActivityClient {
    async fn login(&self) -> Result<Session, ClientError> {
        if let Some(session) = self.restore_cached_session() {
            self.store_session(Some(session.clone()));
            // Probe the feed to confirm the cached session still holds.
            match self.fetch_feed(1).await {
                Ok(_) => {
                    Logger::success("Signed in via cached session");
                    return Ok(session);
                }
                Err(ClientError::Auth(_)) => {
                    Logger::info("Cached session expired, re-authenticating");
                    self.discard_cached_session();
                }
                Err(e) => return Err(e),
            }
        }
        self.password_login().await
    }

    async fn account_id(&self) -> Result<String, ClientError> {
        if let Some(session) = self.current_session() {
            return Ok(session.account_id);
        }
        let me: Account = self.get_json("/v1/me", &[]).await?;
        Ok(me.id)
    }

    async fn fetch_feed(&self, limit: usize) -> Result<Vec<Post>, ClientError> {
        self.get_json("/v1/feed", &[("limit", limit.to_string())])
            .await
    }

    async fn like(&self, media_id: &str) -> Result<(), ClientError> {
        self.post_action(&format!("/v1/media/{media_id}/like"), json!({}))
            .await
    }

    async fn comment(&self, media_id: &str, text: &str) -> Result<(), ClientError> {
        self.post_action(
            &format!("/v1/media/{media_id}/comment"),
            json!({ "text": text }),
        )
        .await
    }

    async fn follow(&self, subject_id: &str) -> Result<(), ClientError> {
        self.post_action(&format!("/v1/accounts/{subject_id}/follow"), json!({}))
            .await
    }

    async fn unfollow(&self, subject_id: &str) -> Result<(), ClientError> {
        self.post_action(&format!("/v1/accounts/{subject_id}/unfollow"), json!({}))
            .await
    }

    async fn fetch_trending_clips(&self, limit: usize) -> Result<Vec<Clip>, ClientError> {
        self.get_json("/v1/clips/trending", &[("limit", limit.to_string())])
            .await
    }

    async fn fetch_suggested_accounts(&self, limit: usize) -> Result<Vec<Account>, ClientError> {
        self.get_json("/v1/accounts/suggested", &[("limit", limit.to_string())])
            .await
    }

    async fn friendship_status(&self, subject_id: &str) -> Result<FriendshipStatus, ClientError> {
        self.get_json(&format!("/v1/accounts/{subject_id}/friendship"), &[])
            .await
    }

    async fn list_following(
        &self,
        account_id: &str,
    ) -> Result<HashMap<String, Account>, ClientError> {
        self.get_json(&format!("/v1/accounts/{account_id}/following"), &[])
            .await
    }

    async fn list_followers(&self, account_id: &str) -> Result<HashSet<String>, ClientError> {
        let ids: Vec<String> = self
            .get_json(&format!("/v1/accounts/{account_id}/followers"), &[])
            .await?;
        Ok(ids.into_iter().collect())
    }
}
