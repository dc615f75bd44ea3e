use crate::interface_adapters::http::{ErrorResponse, PhaseResponse};
use crate::interface_adapters::state::AppState;
use crate::use_cases::{BoardCommand, BoardPhase};

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::warn;

pub async fn suspend_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    lifecycle(&state, "suspend", |reply| BoardCommand::Suspend { reply }).await
}

pub async fn resume_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    lifecycle(&state, "resume", |reply| BoardCommand::Resume { reply }).await
}

pub async fn restart_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    lifecycle(&state, "restart", |reply| BoardCommand::Restart { reply }).await
}

pub async fn stats_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.stats.snapshot())
}

// Sends one lifecycle command and waits for the phase it produced.
async fn lifecycle(
    state: &AppState,
    action: &'static str,
    command: impl FnOnce(oneshot::Sender<BoardPhase>) -> BoardCommand,
) -> axum::response::Response {
    let (reply_tx, reply_rx) = oneshot::channel();

    let phase = match state.command_tx.send(command(reply_tx)).await {
        Ok(()) => reply_rx.await.ok(),
        Err(_) => None,
    };

    match phase {
        Some(phase) => (
            StatusCode::ACCEPTED,
            Json(PhaseResponse {
                phase: phase.into(),
            }),
        )
            .into_response(),
        None => {
            warn!(action, "board task unavailable");
            // Keep failures consistent with the JSON error schema.
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: "board unavailable".to_string(),
                }),
            )
                .into_response()
        }
    }
}
