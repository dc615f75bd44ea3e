// Framework bootstrap for the bubbles server runtime.

use crate::domain::BoardTuning;
use crate::frameworks::config;
use crate::interface_adapters::net::{
    restart_handler, resume_handler, spawn_world_serializer, stats_handler, suspend_handler,
    ws_handler,
};
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::stats::GameStats;
use crate::use_cases::{Board, BoardCommand, BoardPhase, RedrawFlag, WorldUpdate, board_task};

use axum::{
    Router,
    extract::ws::Utf8Bytes,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::{io::Result, sync::Arc, time::Duration};
use tokio::sync::{Notify, broadcast, mpsc, watch};

/// Everything needed to start a board and its host surface.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub tuning: BoardTuning,
    pub refresh_interval: Duration,
    pub stats_path: Option<PathBuf>,
}

impl ServerSettings {
    pub fn from_env() -> Self {
        Self {
            tuning: config::board_tuning(),
            refresh_interval: config::refresh_interval(),
            stats_path: config::stats_path(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            tuning: BoardTuning::default(),
            refresh_interval: Duration::from_millis(16),
            stats_path: None,
        }
    }
}

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/game/suspend", post(suspend_handler))
        .route("/game/resume", post(resume_handler))
        .route("/game/restart", post(restart_handler))
        .route("/stats", get(stats_handler))
        .with_state(state)
}

/// Serves on `listener` with default settings.
pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    run_with_settings(listener, ServerSettings::default()).await
}

pub async fn run_with_settings(
    listener: tokio::net::TcpListener,
    settings: ServerSettings,
) -> Result<()> {
    let address = listener.local_addr()?;
    let state = build_state(settings).await?;
    let shutdown = state.shutdown.clone();

    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking
    let served = axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .inspect_err(|e| {
            tracing::error!(error = %e, "server error");
        });

    // Stop the drivers whichever way serving ended.
    shutdown.notify_one();
    served
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = SocketAddr::from(([127, 0, 0, 1], config::http_port()));

    // Bind TCP listener with error handling
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run_with_settings(listener, ServerSettings::from_env()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

/// Builds the board, spawns its task and the world serializer, and returns the shared
/// state the routes run on.
pub async fn build_state(settings: ServerSettings) -> Result<Arc<AppState>> {
    let stats = Arc::new(match settings.stats_path.clone() {
        Some(path) => GameStats::load(path).await,
        None => GameStats::new(),
    });
    let redraw = Arc::new(RedrawFlag::default());

    let board = Board::builder()
        .tuning(settings.tuning)
        .redraw_signal(redraw.clone())
        .game_over_listener(stats.clone())
        .build()
        .map_err(|e| std::io::Error::other(format!("failed to initialize board: {e}")))?;
    tracing::debug!(
        tuning = ?settings.tuning,
        refresh_ms = settings.refresh_interval.as_millis(),
        "board configured"
    );

    // Setup Channels
    // command_tx/rx: every host request goes to the single board task.
    let (command_tx, command_rx) = mpsc::channel::<BoardCommand>(config::COMMAND_CHANNEL_CAPACITY);
    // world_tx: redraws broadcast to the serializer.
    let (world_tx, _world_rx) = broadcast::channel::<WorldUpdate>(config::WORLD_BROADCAST_CAPACITY);
    // world_bytes_tx: serialized world updates shared across all clients.
    let (world_bytes_tx, _world_bytes_rx) =
        broadcast::channel::<Utf8Bytes>(config::WORLD_BROADCAST_CAPACITY);
    let (world_latest_tx, _world_latest_rx) = watch::channel::<Utf8Bytes>(Utf8Bytes::from(""));
    let (phase_tx, _phase_rx) = watch::channel::<BoardPhase>(BoardPhase::Uninitialized);
    let shutdown = Arc::new(Notify::new());

    let state = Arc::new(AppState {
        command_tx,
        world_tx,
        world_bytes_tx,
        world_latest_tx,
        phase_tx,
        stats,
        border: settings.tuning.border,
        shutdown: shutdown.clone(),
    });

    // Subscribe before the board task can publish anything.
    spawn_world_serializer(&state);

    tokio::spawn(board_task(
        board,
        command_rx,
        state.world_tx.clone(),
        state.phase_tx.clone(),
        redraw,
        settings.refresh_interval,
        shutdown,
    ));

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    async fn post_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        (status, serde_json::from_slice(&body).expect("json body"))
    }

    #[tokio::test]
    async fn lifecycle_routes_report_the_resulting_phase() {
        let state = build_state(ServerSettings::default())
            .await
            .expect("state builds");
        state
            .command_tx
            .send(BoardCommand::Viewport {
                width: 800.0,
                height: 480.0,
            })
            .await
            .expect("board task alive");

        let (status, body) = post_json(app(state.clone()), "/game/suspend").await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["phase"], "Suspended");

        let (status, body) = post_json(app(state.clone()), "/game/resume").await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["phase"], "Active");

        let (status, body) = post_json(app(state.clone()), "/game/restart").await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["phase"], "Active");

        state.shutdown.notify_one();
    }

    #[tokio::test]
    async fn lifecycle_routes_fail_once_the_board_is_gone() {
        let state = build_state(ServerSettings::default())
            .await
            .expect("state builds");
        state.shutdown.notify_one();
        state.command_tx.closed().await;

        let (status, body) = post_json(app(state), "/game/suspend").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "board unavailable");
    }

    #[tokio::test]
    async fn stats_start_at_zero() {
        let state = build_state(ServerSettings::default())
            .await
            .expect("state builds");

        let response = app(state.clone())
            .oneshot(
                Request::builder()
                    .uri("/stats")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let stats: Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(stats["games_played"], 0);
        assert_eq!(stats["wins"], 0);

        state.shutdown.notify_one();
    }

    #[tokio::test]
    async fn invalid_tuning_fails_startup() {
        let settings = ServerSettings {
            tuning: BoardTuning {
                border: 1.0,
                ..BoardTuning::default()
            },
            ..ServerSettings::default()
        };
        assert!(build_state(settings).await.is_err());
    }
}
