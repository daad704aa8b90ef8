use std::fmt;
use std::sync::{Arc, RwLock};

/// Lifecycle of the bot, as exposed on the status surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotStatus {
    Starting,
    Running,
    Connected,
    SessionError(String),
    MissingCredentials,
}

impl BotStatus {
    pub fn label(&self) -> &'static str {
        match self {
            BotStatus::Starting => "starting",
            BotStatus::Running => "running",
            BotStatus::Connected => "connected",
            BotStatus::SessionError(_) => "session-error",
            BotStatus::MissingCredentials => "missing-credentials",
        }
    }
}

impl fmt::Display for BotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BotStatus::SessionError(detail) => write!(f, "session-error: {detail}"),
            other => f.write_str(other.label()),
        }
    }
}

/// Process-wide status value shared between the background bot task (sole
/// writer) and the HTTP handlers (readers). The value is replaced as a
/// whole; readers clone and tolerate being one update behind.
#[derive(Clone)]
pub struct StatusCell {
    inner: Arc<RwLock<BotStatus>>,
}

impl StatusCell {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(BotStatus::Starting)),
        }
    }

    pub fn set(&self, status: BotStatus) {
        match self.inner.write() {
            Ok(mut guard) => *guard = status,
            Err(poisoned) => *poisoned.into_inner() = status,
        }
    }

    pub fn get(&self) -> BotStatus {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Default for StatusCell {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_in_starting_state() {
        assert_eq!(StatusCell::new().get(), BotStatus::Starting);
    }

    #[test]
    fn set_replaces_the_whole_value() {
        let cell = StatusCell::new();
        cell.set(BotStatus::SessionError("login failed".into()));
        assert_eq!(
            cell.get(),
            BotStatus::SessionError("login failed".into())
        );

        let reader = cell.clone();
        cell.set(BotStatus::Connected);
        assert_eq!(reader.get(), BotStatus::Connected);
    }

    #[test]
    fn labels_are_stable() {
        assert_eq!(BotStatus::Starting.label(), "starting");
        assert_eq!(BotStatus::MissingCredentials.label(), "missing-credentials");
        assert_eq!(
            BotStatus::SessionError("x".into()).to_string(),
            "session-error: x"
        );
    }
}
