use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};

use crate::services::status::StatusCell;
use crate::utils::Logger;

pub const SERVICE_NAME: &str = "engage-bot";

#[derive(Clone)]
pub struct AppState {
    pub status: StatusCell,
}

/// Build the axum Router for the status surface. Exposed separately from
/// `serve` so it is available for integration testing.
pub fn build_router(status: StatusCell) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(home))
        .route("/status", get(status_json))
        .route("/health", get(health))
        .route("/ping", get(ping))
        .layer(cors)
        .with_state(AppState { status })
}

async fn home(State(state): State<AppState>) -> Html<String> {
    let bot_status = state.status.get();
    Html(format!(
        r#"<html>
    <head>
        <title>Engagement Bot</title>
        <meta charset="utf-8">
        <style>
            body {{ font-family: Arial, sans-serif; margin: 40px; }}
            .status {{ padding: 10px; border-radius: 5px; background: #f0f0f0; }}
        </style>
    </head>
    <body>
        <h1>🤖 Engagement Bot</h1>
        <div class="status">
            <strong>Status:</strong> {bot_status}
        </div>
        <p>The bot is running in the background.</p>
        <p><a href="/health">Health Check</a> | <a href="/status">Status API</a></p>
    </body>
</html>"#
    ))
}

async fn status_json(State(state): State<AppState>) -> Json<serde_json::Value> {
    let bot_status = state.status.get();
    Json(serde_json::json!({
        "status": "running",
        "bot_status": bot_status.to_string(),
        "service": SERVICE_NAME,
        "timestamp": chrono::Utc::now().timestamp(),
    }))
}

async fn health() -> &'static str {
    "OK"
}

async fn ping() -> &'static str {
    "pong"
}

/// Serve the status surface in the foreground until ctrl-c.
pub async fn serve(port: u16, status: StatusCell) -> anyhow::Result<()> {
    let app = build_router(status);
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    Logger::info(&format!(
        "Status server listening on http://localhost:{port}"
    ));
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            Logger::info("Received SIGINT, shutting down");
        })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::status::BotStatus;

    #[tokio::test]
    async fn status_json_carries_the_bot_status() {
        let cell = StatusCell::new();
        cell.set(BotStatus::Connected);

        let Json(body) = status_json(State(AppState {
            status: cell.clone(),
        }))
        .await;

        assert_eq!(body["status"], "running");
        assert_eq!(body["bot_status"], "connected");
        assert_eq!(body["service"], SERVICE_NAME);
        assert!(body["timestamp"].is_i64());
    }

    #[tokio::test]
    async fn home_page_shows_session_errors() {
        let cell = StatusCell::new();
        cell.set(BotStatus::SessionError("login failed".into()));

        let Html(page) = home(State(AppState { status: cell })).await;
        assert!(page.contains("session-error: login failed"));
    }

    #[tokio::test]
    async fn liveness_endpoints_are_fixed() {
        assert_eq!(health().await, "OK");
        assert_eq!(ping().await, "pong");
    }
}
