use std::time::{Duration, Instant};

use crate::utils::Logger;

/// Enforces a minimum wall-clock spacing between consequential actions.
///
/// One gate is owned by exactly one orchestrator run; the `&mut self`
/// receiver keeps concurrent sharing out of the type system entirely.
pub struct CooldownGate {
    last_action_at: Option<Instant>,
    minimum_interval: Duration,
}

impl CooldownGate {
    pub fn new(minimum_interval: Duration) -> Self {
        Self {
            last_action_at: None,
            minimum_interval,
        }
    }

    /// Sleep until `minimum_interval` has passed since the previous call,
    /// then stamp the current time. The first call never waits.
    pub async fn wait_if_needed(&mut self) {
        if let Some(last) = self.last_action_at {
            let elapsed = last.elapsed();
            if elapsed < self.minimum_interval {
                let remaining = self.minimum_interval - elapsed;
                if remaining >= Duration::from_secs(1) {
                    Logger::info(&format!(
                        "Cooldown: waiting {}s before the next action",
                        remaining.as_secs()
                    ));
                }
                tokio::time::sleep(remaining).await;
            }
        }
        self.last_action_at = Some(Instant::now());
    }
}
