//! interview-relay server entry point.
//!
//! Starts the Axum HTTP server with the signaling WebSocket and REST
//! monitoring endpoints.

use tracing_subscriber::EnvFilter;

use interview_relay::app_state::AppState;
use interview_relay::config::RelayConfig;
use interview_relay::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing; LOG_FORMAT=json switches to structured output
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json_logs {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    // Load configuration
    let config = RelayConfig::from_env()?;
    tracing::info!(
        addr = %config.listen_addr,
        max_room_participants = config.max_room_participants,
        room_replay_capacity = config.room_replay_capacity,
        outbox_capacity = config.outbox_capacity,
        "starting interview-relay"
    );

    let state = AppState::new(&config);
    let app = server::build_app(state, &config);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    server::serve(listener, app).await?;

    Ok(())
}
