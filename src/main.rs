//! Tag Arena Client - game-session engine for the multiplayer tag arena
//!
//! This is the main entry point for the headless client. It handles:
//! - Profile bootstrap and room listing over the REST api
//! - The WebSocket session with the game server
//! - The per-frame simulation loop and input aggregation
//! - A local diagnostics endpoint and a line-based console

mod api;
mod app;
mod config;
mod console;
mod game;
mod http;
mod input;
mod render;
mod room;
mod util;
mod ws;

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::ApiClient;
use crate::app::AppState;
use crate::config::Config;
use crate::console::{parse_line, ConsoleCommand, HELP};
use crate::game::{ClientCommand, GameClient, SessionHandle, SessionRunner};
use crate::http::build_router;
use crate::render::TracingRenderer;
use crate::util::time::init_client_time;
use crate::ws::WsGateway;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Arc::new(Config::from_env()?);

    // Initialize tracing
    init_tracing(&config.log_level);

    init_client_time();

    info!("Starting Tag Arena client");

    // Bootstrap the local profile
    let api = ApiClient::new(&config);
    let profile = api.get_profile().await?;
    info!(player_id = %profile.id, username = %profile.username, coins = profile.coins, "Signed in");

    // Connect to the game server
    let (gateway, events_rx) = WsGateway::connect(&config.game_server_url, &config.auth_token).await?;

    let client = GameClient::new(
        profile,
        Arc::new(gateway),
        Box::new(TracingRenderer::new()),
        config.move_speed,
        config.joystick_max_radius,
    );
    let (runner, session) = SessionRunner::new(client, events_rx, config.frame_rate);
    let runner_task = tokio::spawn(runner.run());

    // Diagnostics server
    let state = AppState::new(config.clone(), api.clone(), session.clone());
    let listener = TcpListener::bind(config.diagnostics_addr).await?;
    info!("Diagnostics listening on {}", config.diagnostics_addr);
    info!("Session status: http://{}/session", config.diagnostics_addr);

    let console_session = session.clone();
    let console_api = api.clone();
    tokio::spawn(async move {
        run_console(console_session, console_api).await;
    });

    let shutdown_session = session.clone();
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = shutdown_signal() => {}
                _ = shutdown_session.closed() => {}
            }
        })
        .await?;

    session.command(ClientCommand::Shutdown);
    if let Err(e) = runner_task.await {
        error!(error = %e, "Session runner panicked");
    }

    info!("Client shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Read console lines from stdin until `quit` or EOF
async fn run_console(session: SessionHandle, api: ApiClient) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "Failed to read console input");
                break;
            }
        };

        match parse_line(&line) {
            Ok(Some(ConsoleCommand::Client(command))) => {
                session.command(command);
            }
            Ok(Some(ConsoleCommand::Input(event))) => session.input(event),
            Ok(Some(ConsoleCommand::Rooms)) => match api.joinable_rooms().await {
                Ok(rooms) if rooms.is_empty() => println!("No joinable rooms"),
                Ok(rooms) => {
                    for room in rooms {
                        println!(
                            "{}  {}  {:?}  {}/{}",
                            room.id, room.name, room.game_mode, room.players, room.max_players
                        );
                    }
                }
                Err(e) => warn!(error = %e, "Failed to list rooms"),
            },
            Ok(Some(ConsoleCommand::Status)) => match serde_json::to_string_pretty(&session.status()) {
                Ok(json) => println!("{json}"),
                Err(e) => warn!(error = %e, "Failed to encode status"),
            },
            Ok(Some(ConsoleCommand::Help)) => println!("{HELP}"),
            Ok(Some(ConsoleCommand::Quit)) => break,
            Ok(None) => {}
            Err(e) => println!("{e}"),
        }
    }

    session.command(ClientCommand::Shutdown);
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        }
    }
}
