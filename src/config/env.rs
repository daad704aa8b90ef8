use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveTime;
use regex::Regex;

use crate::services::activity::OrchestratorConfig;

const PLACEHOLDER_USERNAME: &str = "your_username";
const PLACEHOLDER_PASSWORD: &str = "your_password";

/// Marker error for absent or placeholder credentials, so `main` can map
/// it to the missing-credentials status before exiting.
#[derive(Debug, thiserror::Error)]
#[error("ACCOUNT_USERNAME / ACCOUNT_PASSWORD are unset or left at their placeholder values")]
pub struct CredentialsError;

#[derive(Debug, Clone)]
pub struct Env {
    pub account_username: String,
    pub account_password: String,
    pub gateway_url: String,
    pub port: u16,
    pub schedule_times: Vec<NaiveTime>,
    pub follow_history_file: PathBuf,
    pub session_file: PathBuf,
    pub action_cooldown_secs: u64,
    pub unfollow_days_threshold: i64,
    pub max_follows_per_run: u32,
    pub max_unfollows_per_run: u32,
    pub activity_duration_mins: u64,
    pub max_sessions_per_cycle: u32,
    pub recovery_pause_secs: u64,
    pub request_timeout_ms: u64,
    pub network_retry_limit: u32,
}

impl Env {
    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            unfollow_days_threshold: self.unfollow_days_threshold,
            recovery_pause_secs: self.recovery_pause_secs,
            ..OrchestratorConfig::default()
        }
    }
}

fn validate_credentials() -> Result<()> {
    let username = env::var("ACCOUNT_USERNAME").unwrap_or_default();
    let password = env::var("ACCOUNT_PASSWORD").unwrap_or_default();

    if username.is_empty()
        || password.is_empty()
        || username == PLACEHOLDER_USERNAME
        || password == PLACEHOLDER_PASSWORD
    {
        eprintln!("\n❌ Configuration Error: account credentials are not set\n");
        eprintln!("Set ACCOUNT_USERNAME and ACCOUNT_PASSWORD in your environment or .env file.");
        eprintln!("Placeholder values are rejected.\n");
        return Err(anyhow::Error::new(CredentialsError));
    }
    Ok(())
}

fn validate_urls() -> Result<()> {
    let gateway_url = env::var("GATEWAY_URL").map_err(|_| {
        eprintln!("\n❌ Configuration Error: GATEWAY_URL is not set\n");
        eprintln!("Point GATEWAY_URL at the activity gateway, e.g. https://gateway.internal:8443\n");
        anyhow::anyhow!("Missing required environment variable: GATEWAY_URL")
    })?;

    if !gateway_url.starts_with("http") {
        eprintln!("\n❌ Invalid GATEWAY_URL\n");
        eprintln!("Current value: {}", gateway_url);
        eprintln!("Must start with: http:// or https://\n");
        anyhow::bail!("Invalid GATEWAY_URL: must be a valid HTTP/HTTPS URL");
    }
    Ok(())
}

fn validate_numeric_config() -> Result<()> {
    let request_timeout = env::var("REQUEST_TIMEOUT_MS")
        .unwrap_or_else(|_| "10000".to_string())
        .parse::<u64>()
        .context("Invalid REQUEST_TIMEOUT_MS")?;
    if request_timeout < 1000 {
        anyhow::bail!("Invalid REQUEST_TIMEOUT_MS: must be at least 1000ms");
    }

    let retry_limit = env::var("NETWORK_RETRY_LIMIT")
        .unwrap_or_else(|_| "3".to_string())
        .parse::<u32>()
        .context("Invalid NETWORK_RETRY_LIMIT")?;
    if !(1..=10).contains(&retry_limit) {
        anyhow::bail!("Invalid NETWORK_RETRY_LIMIT: must be between 1 and 10");
    }

    let cooldown = env::var("ACTION_COOLDOWN_SECS")
        .unwrap_or_else(|_| "300".to_string())
        .parse::<u64>()
        .context("Invalid ACTION_COOLDOWN_SECS")?;
    if cooldown == 0 {
        anyhow::bail!("Invalid ACTION_COOLDOWN_SECS: must be positive");
    }

    let duration = env::var("ACTIVITY_DURATION_MINS")
        .unwrap_or_else(|_| "60".to_string())
        .parse::<u64>()
        .context("Invalid ACTIVITY_DURATION_MINS")?;
    if duration == 0 {
        anyhow::bail!("Invalid ACTIVITY_DURATION_MINS: must be positive");
    }

    let sessions = env::var("MAX_SESSIONS_PER_CYCLE")
        .unwrap_or_else(|_| "3".to_string())
        .parse::<u32>()
        .context("Invalid MAX_SESSIONS_PER_CYCLE")?;
    if sessions == 0 {
        anyhow::bail!("Invalid MAX_SESSIONS_PER_CYCLE: must be at least 1");
    }

    let threshold = env::var("UNFOLLOW_DAYS_THRESHOLD")
        .unwrap_or_else(|_| "3".to_string())
        .parse::<i64>()
        .context("Invalid UNFOLLOW_DAYS_THRESHOLD")?;
    if threshold < 0 {
        anyhow::bail!("Invalid UNFOLLOW_DAYS_THRESHOLD: must be zero or more days");
    }

    Ok(())
}

fn parse_schedule_times(input: &str) -> Result<Vec<NaiveTime>> {
    let re = Regex::new(r"^([01]?\d|2[0-3]):[0-5]\d$").expect("schedule time pattern compiles");
    let mut times = Vec::new();
    for part in input.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        if !re.is_match(part) {
            anyhow::bail!("Invalid SCHEDULE_TIMES entry '{part}': expected HH:MM");
        }
        let time = NaiveTime::parse_from_str(part, "%H:%M")
            .with_context(|| format!("Invalid SCHEDULE_TIMES entry '{part}'"))?;
        times.push(time);
    }
    if times.is_empty() {
        anyhow::bail!("SCHEDULE_TIMES must contain at least one HH:MM entry");
    }
    Ok(times)
}

pub fn load_env() -> Result<Env> {
    dotenvy::dotenv().ok(); // Load .env file if it exists

    validate_credentials()?;
    validate_urls()?;
    validate_numeric_config()?;

    let schedule_times = parse_schedule_times(
        &env::var("SCHEDULE_TIMES").unwrap_or_else(|_| "10:00,16:00,20:00".to_string()),
    )?;

    Ok(Env {
        account_username: env::var("ACCOUNT_USERNAME").context("ACCOUNT_USERNAME is required")?,
        account_password: env::var("ACCOUNT_PASSWORD").context("ACCOUNT_PASSWORD is required")?,
        gateway_url: env::var("GATEWAY_URL").context("GATEWAY_URL is required")?,
        port: env::var("PORT")
            .unwrap_or_else(|_| "10000".to_string())
            .parse::<u16>()
            .context("Invalid PORT")?,
        schedule_times,
        follow_history_file: env::var("FOLLOW_HISTORY_FILE")
            .unwrap_or_else(|_| "follow_history.json".to_string())
            .into(),
        session_file: env::var("SESSION_FILE")
            .unwrap_or_else(|_| "session.json".to_string())
            .into(),
        action_cooldown_secs: env::var("ACTION_COOLDOWN_SECS")
            .unwrap_or_else(|_| "300".to_string())
            .parse::<u64>()
            .unwrap_or(300),
        unfollow_days_threshold: env::var("UNFOLLOW_DAYS_THRESHOLD")
            .unwrap_or_else(|_| "3".to_string())
            .parse::<i64>()
            .unwrap_or(3),
        max_follows_per_run: env::var("MAX_FOLLOWS_PER_RUN")
            .unwrap_or_else(|_| "15".to_string())
            .parse::<u32>()
            .unwrap_or(15),
        max_unfollows_per_run: env::var("MAX_UNFOLLOWS_PER_RUN")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()
            .unwrap_or(10),
        activity_duration_mins: env::var("ACTIVITY_DURATION_MINS")
            .unwrap_or_else(|_| "60".to_string())
            .parse::<u64>()
            .unwrap_or(60),
        max_sessions_per_cycle: env::var("MAX_SESSIONS_PER_CYCLE")
            .unwrap_or_else(|_| "3".to_string())
            .parse::<u32>()
            .unwrap_or(3),
        recovery_pause_secs: env::var("RECOVERY_PAUSE_SECS")
            .unwrap_or_else(|_| "300".to_string())
            .parse::<u64>()
            .unwrap_or(300),
        request_timeout_ms: env::var("REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "10000".to_string())
            .parse::<u64>()
            .unwrap_or(10000),
        network_retry_limit: env::var("NETWORK_RETRY_LIMIT")
            .unwrap_or_else(|_| "3".to_string())
            .parse::<u32>()
            .unwrap_or(3),
    })
}
