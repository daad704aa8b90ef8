use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the remote activity gateway.
///
/// Every variant is recoverable at session level: the orchestrator logs,
/// skips the action and keeps going. `Auth` additionally aborts the current
/// cycle; the scheduler retries at the next trigger.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("gateway error ({status}): {message}")]
    Api { status: u16, message: String },
}

/// Errors from the follow-history store. Never swallowed: callers decide
/// whether a failed write is fatal (startup) or logged (mid-session).
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("failed to persist follow history: {0}")]
    Io(#[from] std::io::Error),

    #[error("follow history at {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
