use serde::{Deserialize, Serialize};

use crate::config::Env;
use crate::ledger::FollowLedger;
use crate::utils::Logger;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub healthy: bool,
    pub checks: HealthChecks,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthChecks {
    pub gateway: CheckResult,
    pub ledger: CheckResult,
    pub session_cache: CheckResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub status: String, // "ok" | "warning" | "error"
    pub message: String,
}

impl CheckResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            status: "warning".to_string(),
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
        }
    }
}

pub async fn perform_health_check(env: &Env) -> HealthCheckResult {
    // Gateway reachability
    let gateway = {
        let client = reqwest::Client::new();
        let url = format!("{}/health", env.gateway_url.trim_end_matches('/'));
        match tokio::time::timeout(std::time::Duration::from_secs(5), client.get(&url).send())
            .await
        {
            Ok(Ok(response)) if response.status().is_success() => {
                CheckResult::ok("Gateway responding")
            }
            Ok(Ok(response)) => CheckResult::error(format!("HTTP {}", response.status())),
            Ok(Err(e)) => CheckResult::error(format!("Gateway check failed: {}", e)),
            Err(_) => CheckResult::error("Gateway check timeout"),
        }
    };

    // Follow history readability
    let ledger = match FollowLedger::load(&env.follow_history_file) {
        Ok(ledger) if ledger.is_empty() => CheckResult::ok("Follow history empty"),
        Ok(ledger) => CheckResult::ok(format!("{} follow record(s)", ledger.len())),
        Err(e) => CheckResult::error(format!("Follow history unreadable: {}", e)),
    };

    // Cached session presence
    let session_cache = if env.session_file.exists() {
        CheckResult::ok("Cached session present")
    } else {
        CheckResult::warning("No cached session (password login will be used)")
    };

    let healthy = gateway.status == "ok" && ledger.status == "ok";

    HealthCheckResult {
        healthy,
        checks: HealthChecks {
            gateway,
            ledger,
            session_cache,
        },
        timestamp: chrono::Utc::now().timestamp(),
    }
}

pub fn log_health_check(result: &HealthCheckResult) {
    Logger::separator();
    Logger::header("Health check");
    Logger::info(&format!(
        "Overall: {}",
        if result.healthy { "healthy" } else { "unhealthy" }
    ));
    for (name, check) in [
        ("Gateway", &result.checks.gateway),
        ("Follow history", &result.checks.ledger),
        ("Session cache", &result.checks.session_cache),
    ] {
        match check.status.as_str() {
            "ok" => Logger::success(&format!("{}: {}", name, check.message)),
            "warning" => Logger::warning(&format!("{}: {}", name, check.message)),
            _ => Logger::error(&format!("{}: {}", name, check.message)),
        }
    }
    Logger::separator();
}
