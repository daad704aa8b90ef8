use std::sync::Arc;

use anyhow::Result;

use engage_bot::config::{load_env, CredentialsError};
use engage_bot::ledger::FollowLedger;
use engage_bot::server;
use engage_bot::services::scheduler::run_bot;
use engage_bot::services::status::{BotStatus, StatusCell};
use engage_bot::utils::{log_health_check, perform_health_check, Logger};

#[tokio::main]
async fn main() -> Result<()> {
    let status = StatusCell::new();

    let env = match load_env() {
        Ok(env) => Arc::new(env),
        Err(e) => {
            if e.is::<CredentialsError>() {
                status.set(BotStatus::MissingCredentials);
            }
            Logger::error(&format!("Configuration error: {e:#}"));
            std::process::exit(1);
        }
    };

    Logger::header("Engagement bot starting");
    Logger::info(&format!("Account: {}", env.account_username));
    Logger::info(&format!(
        "Schedule: {}",
        env.schedule_times
            .iter()
            .map(|t| t.format("%H:%M").to_string())
            .collect::<Vec<_>>()
            .join(", ")
    ));

    let health = perform_health_check(&env).await;
    log_health_check(&health);
    if !health.healthy {
        Logger::warning("Health check failed, continuing startup...");
    }

    // A corrupt follow history is a configuration problem; refuse to start
    // rather than silently resetting it.
    let ledger = FollowLedger::load(&env.follow_history_file)?;
    Logger::info(&format!(
        "Follow history loaded: {} record(s)",
        ledger.len()
    ));

    let bot_env = env.clone();
    let bot_status = status.clone();
    tokio::spawn(async move {
        run_bot(bot_env, bot_status, ledger).await;
    });

    server::serve(env.port, status).await
}
