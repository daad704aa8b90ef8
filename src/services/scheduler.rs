use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveTime};

use crate::client::{ActivityClient, RestActivityClient};
use crate::config::Env;
use crate::ledger::FollowLedger;
use crate::services::activity::ActivityOrchestrator;
use crate::services::cooldown::CooldownGate;
use crate::services::status::{BotStatus, StatusCell};
use crate::utils::Logger;

/// Fires the bot cycle at fixed local times of day, forever.
pub struct DailyScheduler {
    times: Vec<NaiveTime>,
}

impl DailyScheduler {
    pub fn new(mut times: Vec<NaiveTime>) -> Self {
        times.sort();
        times.dedup();
        Self { times }
    }

    /// Time until the next configured trigger: the first remaining time
    /// today, or the earliest time tomorrow.
    pub fn until_next(&self, now: DateTime<Local>) -> chrono::Duration {
        let Some(first) = self.times.first() else {
            return chrono::Duration::days(1);
        };
        let now_naive = now.naive_local();
        let today = now.date_naive();
        for time in &self.times {
            let candidate = today.and_time(*time);
            if candidate > now_naive {
                return candidate - now_naive;
            }
        }
        let tomorrow = today.succ_opt().unwrap_or(today).and_time(*first);
        tomorrow - now_naive
    }
}

/// The background bot task: one immediate cycle at startup, then the
/// daily schedule forever. Every cycle absorbs its own errors; this loop
/// only ever sleeps and goes again.
pub async fn run_bot(env: Arc<Env>, status: StatusCell, mut ledger: FollowLedger) {
    status.set(BotStatus::Running);
    run_cycle(&env, &status, &mut ledger).await;

    let scheduler = DailyScheduler::new(env.schedule_times.clone());
    loop {
        let wait = scheduler.until_next(Local::now());
        let secs = wait.num_seconds().max(1) as u64;
        Logger::info(&format!(
            "Next scheduled cycle in {}h{:02}m",
            secs / 3600,
            (secs % 3600) / 60
        ));
        tokio::time::sleep(Duration::from_secs(secs)).await;
        run_cycle(&env, &status, &mut ledger).await;
    }
}

/// One scheduled cycle: sign in, run the daily follow/unfollow routine,
/// then simulate activity for the configured window. An auth failure ends
/// the cycle after a recovery pause; the next trigger retries.
async fn run_cycle(env: &Env, status: &StatusCell, ledger: &mut FollowLedger) {
    Logger::header("Scheduled bot cycle");
    status.set(BotStatus::Running);

    let client = match RestActivityClient::new(env) {
        Ok(client) => client,
        Err(e) => {
            status.set(BotStatus::SessionError(e.to_string()));
            Logger::error(&format!("Could not build gateway client: {}", e));
            return;
        }
    };

    match client.login().await {
        Ok(session) => {
            status.set(BotStatus::Connected);
            Logger::success(&format!("Connected as account {}", session.account_id));
        }
        Err(e) => {
            status.set(BotStatus::SessionError(e.to_string()));
            Logger::error(&format!("Login failed: {}", e));
            Logger::info(&format!(
                "Recovery pause {}s, will retry at the next trigger",
                env.recovery_pause_secs
            ));
            tokio::time::sleep(Duration::from_secs(env.recovery_pause_secs)).await;
            return;
        }
    }

    let gate = CooldownGate::new(Duration::from_secs(env.action_cooldown_secs));
    let mut orchestrator = ActivityOrchestrator::new(
        &client,
        ledger,
        gate,
        env.orchestrator_config(),
        status.clone(),
    );

    orchestrator
        .daily_routine(env.max_follows_per_run, env.max_unfollows_per_run)
        .await;
    orchestrator
        .simulate_activity(
            Duration::from_secs(env.activity_duration_mins * 60),
            env.max_sessions_per_cycle,
        )
        .await;

    status.set(BotStatus::Running);
    Logger::success("Cycle complete");
}
